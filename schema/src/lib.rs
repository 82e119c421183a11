//! Schema IR and reference buffer runtime shared by the flatjl generator.
//!
//! The IR is what a front end hands over once parsing, validation and layout
//! have run: every field already carries its byte offset (fixed structs) or
//! slot index (tables), padding and default literal.
//!
//! ```
//! use flatjl_schema::*;
//!
//! let schema: Schema = serde_json::from_str(r#"{
//!     "structs": [{
//!         "name": "Vec2", "fixed": true, "minalign": 4, "bytesize": 8,
//!         "fields": [
//!             { "name": "x", "type": { "scalar": "float" }, "offset": 0 },
//!             { "name": "y", "type": { "scalar": "float" }, "offset": 4 }
//!         ]
//!     }]
//! }"#).unwrap();
//!
//! assert_eq!(schema.inline_size(&TypeRef::Struct(0)), Some(8));
//! ```

pub mod bb;
pub mod schema;
pub mod value;

pub use bb::*;
pub use schema::*;
pub use value::*;
