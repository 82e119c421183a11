//! Schema types to Julia type names and literals.
//!
//! | Schema type | value position | argument position |
//! |-------------|----------------|-------------------|
//! | `bool` … `double` | `Bool` … `Float64` | same |
//! | enum | enum name | same |
//! | `string` | `String` | `String` |
//! | `[T]` | `FlatBuffers.Array{T}` | `T` |
//! | struct / table | type name | type name |
//! | union | `FlatBuffers.Table` | `FlatBuffers.Table` |
//!
//! Names defined in another namespace are qualified with that namespace's
//! import name, and the namespace is recorded on the entity's import tracker.

use flatjl_schema::{EnumDef, FieldDef, Namespace, ScalarType, ScalarValue, Schema, StructDef, TypeRef};

use crate::error::GenError;
use crate::namespace::{wrap_in_namespace_and_track, Import, ImportTracker};

pub fn basic_type_name(ty: ScalarType) -> &'static str {
    match ty {
        ScalarType::Bool => "Bool",
        ScalarType::Byte => "Int8",
        ScalarType::UByte => "UInt8",
        ScalarType::Short => "Int16",
        ScalarType::UShort => "UInt16",
        ScalarType::Int => "Int32",
        ScalarType::UInt => "UInt32",
        ScalarType::Long => "Int64",
        ScalarType::ULong => "UInt64",
        ScalarType::Float => "Float32",
        ScalarType::Double => "Float64",
    }
}

fn number_text(value: &ScalarValue) -> String {
    fn float_text(v: f64) -> String {
        if v.is_nan() {
            "NaN".to_string()
        } else if v.is_infinite() {
            if v > 0.0 { "Inf".to_string() } else { "-Inf".to_string() }
        } else {
            format!("{:?}", v)
        }
    }

    match *value {
        ScalarValue::Bool(v) => v.to_string(),
        ScalarValue::Byte(v) => v.to_string(),
        ScalarValue::UByte(v) => v.to_string(),
        ScalarValue::Short(v) => v.to_string(),
        ScalarValue::UShort(v) => v.to_string(),
        ScalarValue::Int(v) => v.to_string(),
        ScalarValue::UInt(v) => v.to_string(),
        ScalarValue::Long(v) => v.to_string(),
        ScalarValue::ULong(v) => v.to_string(),
        // `{:?}` on the f32 itself keeps the shortest form that round-trips.
        ScalarValue::Float(v) => {
            if v.is_finite() {
                format!("{:?}", v)
            } else {
                float_text(v as f64)
            }
        }
        ScalarValue::Double(v) => float_text(v),
    }
}

/// Literal as passed to builder functions: `false`, `42`, `1.5`, `Float32(1.5)`.
pub fn bare_literal(value: &ScalarValue) -> String {
    match value {
        ScalarValue::Float(_) => format!("Float32({})", number_text(value)),
        _ => number_text(value),
    }
}

/// Literal converted to `type_name`, as returned by accessors: `false`,
/// `Int16(100)`, `Color(2)`. Booleans stay plain literals.
pub fn typed_literal(value: &ScalarValue, type_name: &str) -> String {
    match value {
        ScalarValue::Bool(_) => number_text(value),
        _ => format!("{}({})", type_name, number_text(value)),
    }
}

/// State for emitting one entity: the schema, the namespace the entity lives
/// in, and the imports its code needs.
pub struct EntityContext<'a> {
    pub schema: &'a Schema,
    pub current: &'a Namespace,
    pub entity: &'a str,
    imports: ImportTracker,
}

impl<'a> EntityContext<'a> {
    pub fn new(schema: &'a Schema, current: &'a Namespace, entity: &'a str) -> Self {
        EntityContext {
            schema,
            current,
            entity,
            imports: ImportTracker::new(),
        }
    }

    pub fn imports(&self) -> &ImportTracker {
        &self.imports
    }

    /// Ends the entity's emission, handing back what it imported.
    pub fn finish(self) -> Vec<Import> {
        self.imports.into_imports()
    }

    pub fn invariant(&self, msg: impl Into<String>) -> GenError {
        GenError::invariant(self.entity, msg)
    }

    pub fn enum_def(&self, index: usize) -> Result<&'a EnumDef, GenError> {
        self.schema
            .enum_def(index)
            .ok_or_else(|| self.invariant(format!("dangling enum reference {}", index)))
    }

    pub fn struct_def(&self, index: usize) -> Result<&'a StructDef, GenError> {
        self.schema
            .struct_def(index)
            .ok_or_else(|| self.invariant(format!("dangling struct reference {}", index)))
    }

    pub fn enum_type_name(&mut self, index: usize) -> Result<String, GenError> {
        let def = self.enum_def(index)?;
        Ok(wrap_in_namespace_and_track(&mut self.imports, self.current, &def.namespace, &def.name))
    }

    pub fn struct_type_name(&mut self, index: usize) -> Result<String, GenError> {
        let def = self.struct_def(index)?;
        Ok(wrap_in_namespace_and_track(&mut self.imports, self.current, &def.namespace, &def.name))
    }

    /// Type returned by an accessor.
    pub fn value_type(&mut self, ty: &TypeRef) -> Result<String, GenError> {
        match ty {
            TypeRef::Scalar(s) => Ok(basic_type_name(*s).to_string()),
            TypeRef::Enum(i) => self.enum_type_name(*i),
            TypeRef::Vector(elem) => Ok(format!("FlatBuffers.Array{{{}}}", self.arg_type(elem)?)),
            other => self.arg_type(other),
        }
    }

    /// Type used for parameters and element types.
    pub fn arg_type(&mut self, ty: &TypeRef) -> Result<String, GenError> {
        match ty {
            TypeRef::Scalar(s) => Ok(basic_type_name(*s).to_string()),
            TypeRef::Enum(i) => self.enum_type_name(*i),
            TypeRef::String => Ok("String".to_string()),
            TypeRef::Vector(elem) => self.value_type(elem),
            TypeRef::Struct(i) => self.struct_type_name(*i),
            TypeRef::Union(_) => Ok("FlatBuffers.Table".to_string()),
        }
    }

    /// Wire scalar of a scalar or enum type.
    pub fn scalar_of(&self, ty: &TypeRef) -> Result<Option<ScalarType>, GenError> {
        match ty {
            TypeRef::Scalar(s) => Ok(Some(*s)),
            TypeRef::Enum(i) => Ok(Some(self.enum_def(*i)?.underlying)),
            _ => Ok(None),
        }
    }

    /// The field's default literal parsed as its wire scalar.
    pub fn constant(&self, field: &FieldDef, ty: ScalarType) -> Result<ScalarValue, GenError> {
        ScalarValue::parse(&field.default, ty).map_err(|e| GenError::InvalidConstant {
            field:   format!("{}.{}", self.entity, field.name),
            literal: field.default.clone(),
            reason:  e.to_string(),
        })
    }

    /// `value` converted to the enum's base type when `ty` is an enum, as
    /// needed when writing enum values into a struct.
    pub fn cast_to_base_type(&self, ty: &TypeRef, value: &str) -> Result<String, GenError> {
        match ty {
            TypeRef::Enum(i) => {
                let def = self.enum_def(*i)?;
                Ok(format!("{}({})", basic_type_name(def.underlying), value))
            }
            _ => Ok(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatjl_schema::EnumVal;

    fn schema() -> Schema {
        Schema {
            enums: vec![EnumDef {
                name:        "Color".into(),
                namespace:   Namespace::from_dotted("Game.Gfx"),
                underlying:  ScalarType::UByte,
                values:      vec![EnumVal { name: "Red".into(), value: 0 }],
                is_union:    false,
                doc_comment: vec![],
                generated:   false,
            }],
            structs: vec![StructDef {
                name:        "Vec3".into(),
                namespace:   Namespace::from_dotted("Game"),
                fixed:       true,
                fields:      vec![],
                minalign:    4,
                bytesize:    12,
                doc_comment: vec![],
                generated:   false,
            }],
        }
    }

    #[test]
    fn value_and_argument_positions_differ_for_vectors() {
        let schema = schema();
        let ns = Namespace::from_dotted("Game");
        let mut cx = EntityContext::new(&schema, &ns, "Monster");
        let ty = TypeRef::Vector(Box::new(TypeRef::Struct(0)));
        assert_eq!(cx.value_type(&ty).unwrap(), "FlatBuffers.Array{Vec3}");
        assert_eq!(cx.arg_type(&ty).unwrap(), "Vec3");
        assert_eq!(cx.value_type(&TypeRef::Union(0)).unwrap(), "FlatBuffers.Table");
        assert_eq!(cx.value_type(&TypeRef::String).unwrap(), "String");
        assert!(cx.imports().is_empty());
    }

    #[test]
    fn foreign_enums_are_qualified_and_tracked() {
        let schema = schema();
        let ns = Namespace::from_dotted("Game");
        let mut cx = EntityContext::new(&schema, &ns, "Monster");
        assert_eq!(cx.value_type(&TypeRef::Enum(0)).unwrap(), "Game__Gfx.Color");
        let imports = cx.finish();
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].path, "Game/Gfx");
    }

    #[test]
    fn dangling_references_are_invariant_violations() {
        let schema = schema();
        let ns = Namespace::default();
        let mut cx = EntityContext::new(&schema, &ns, "Monster");
        assert!(matches!(
            cx.value_type(&TypeRef::Struct(3)),
            Err(GenError::InvariantViolation { .. })
        ));
    }

    #[test]
    fn literals() {
        assert_eq!(bare_literal(&ScalarValue::Bool(false)), "false");
        assert_eq!(typed_literal(&ScalarValue::Bool(false), "Bool"), "false");
        assert_eq!(typed_literal(&ScalarValue::Short(100), "Int16"), "Int16(100)");
        assert_eq!(bare_literal(&ScalarValue::Float(1.5)), "Float32(1.5)");
        assert_eq!(bare_literal(&ScalarValue::Double(3.0)), "3.0");
        assert_eq!(bare_literal(&ScalarValue::Double(f64::NEG_INFINITY)), "-Inf");
        assert_eq!(typed_literal(&ScalarValue::Float(f32::NAN), "Float32"), "Float32(NaN)");
        assert_eq!(typed_literal(&ScalarValue::UByte(2), "Color"), "Color(2)");
    }
}
