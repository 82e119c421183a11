//! flatjl
//!
//! Front door for generating Julia FlatBuffers code from a schema IR.
//!
//! - `load_schema` / `load_schema_file` read the JSON IR
//! - `generate_to_memory` returns the units instead of writing them
//! - everything else is re-exported from the compiler and schema crates

use std::fs;
use std::path::Path;

pub use flatjl_compiler::error::GenError;
pub use flatjl_compiler::output::{FileSink, MemorySink, OutputSink, OutputUnit};
pub use flatjl_compiler::{generate_julia, load_schema, GeneratorOptions, JuliaGenerator};
pub use flatjl_schema::{EnumDef, EnumVal, FieldDef, Namespace, ScalarType, Schema, StructDef, TypeRef};

/// Reads and decodes a schema IR file.
pub fn load_schema_file(path: &Path) -> Result<Schema, GenError> {
    let text = fs::read_to_string(path)?;
    load_schema(&text)
}

/// Runs the generator into a [`MemorySink`] and hands back what it produced.
pub fn generate_to_memory(schema: &Schema, options: &GeneratorOptions) -> Result<Vec<OutputUnit>, GenError> {
    let mut sink = MemorySink::default();
    generate_julia(schema, options, &mut sink)?;
    Ok(sink.units)
}

/// Pretty-printed JSON for a schema, the same format `load_schema` reads.
pub fn schema_to_json(schema: &Schema) -> Result<String, GenError> {
    Ok(serde_json::to_string_pretty(schema)?)
}

pub mod error {
    pub use flatjl_compiler::error::GenError;
}

pub mod schema {
    pub use flatjl_schema::*;
}
