//! flatjl-compiler
//!
//! Emits Julia source for a resolved FlatBuffers schema IR:
//!  1) type names and literals (`type_map`),
//!  2) per-entity import tracking (`namespace`),
//!  3) read accessors (`accessor`) and builders (`builder`) that agree on layout,
//!  4) struct/table declarations with symbol and marker-type dispatch (`entity`),
//!  5) enums (`enums`),
//!  6) unit assembly and persistence (`output`), driven by `generator`.

pub mod error;
pub mod utils;
pub mod namespace;
pub mod type_map;
pub mod accessor;
pub mod builder;
pub mod entity;
pub mod enums;
pub mod options;
pub mod output;
pub mod generator;

pub use error::GenError;
pub use generator::{generate_julia, load_schema, JuliaGenerator};
pub use options::GeneratorOptions;
pub use output::{FileSink, MemorySink, OutputSink, OutputUnit};
