//! Read accessors.
//!
//! Each non-deprecated field gets an [`Accessor`] describing how its value is
//! found in the buffer; [`render_accessor`] turns that into Julia. The offset
//! conventions here must match what `builder` writes:
//!
//! - fixed struct members sit at `pos + offset`, always present;
//! - table fields go through the vtable entry at `field_index_to_offset(slot)`,
//!   zero meaning absent;
//! - tables and strings referenced from a table are one `uoffset` hop away,
//!   fixed structs referenced from a table are stored inline.

use flatjl_schema::{field_index_to_offset, FieldDef, ScalarType, ScalarValue, StructDef, TypeRef, VOffset};
use log::warn;

use crate::error::GenError;
use crate::type_map::{typed_literal, EntityContext};
use crate::utils::{julia_identity, quote};

/// Marker placed where a union accessor or builder would go.
pub const UNSUPPORTED_UNION: &str = "UNSUPPORTED(union)";

#[derive(Debug, Clone, PartialEq)]
pub enum Accessor {
    /// Scalar or enum member of a fixed struct.
    StructScalar {
        offset:    usize,
        scalar:    ScalarType,
        type_name: String,
    },
    /// Fixed struct nested in a fixed struct, viewed in place.
    StructStruct {
        offset:    usize,
        type_name: String,
    },
    TableScalar {
        vtable_offset: VOffset,
        scalar:        ScalarType,
        type_name:     String,
        default:       ScalarValue,
    },
    TableString {
        vtable_offset: VOffset,
        default:       String,
    },
    /// Struct or table referenced from a table. `inline` is set for fixed
    /// structs, which need no indirection hop.
    TableStruct {
        vtable_offset: VOffset,
        type_name:     String,
        inline:        bool,
    },
    TableVector {
        vtable_offset: VOffset,
        element_type:  String,
        elem_size:     usize,
        elem_scalar:   Option<ScalarType>,
    },
    UnsupportedUnion,
}

impl Accessor {
    /// Whether the rendered body can finish without returning.
    pub fn falls_through(&self) -> bool {
        matches!(
            self,
            Accessor::TableStruct { .. } | Accessor::TableVector { .. } | Accessor::UnsupportedUnion
        )
    }
}

/// An accessor together with the field it reads.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAccessor {
    pub field:      String,
    pub ident:      String,
    pub value_type: String,
    pub accessor:   Accessor,
}

/// Accessors for every non-deprecated field, in declaration order.
pub fn field_accessors(
    cx: &mut EntityContext,
    def: &StructDef,
    strict_unions: bool,
) -> Result<Vec<FieldAccessor>, GenError> {
    let mut out = Vec::new();
    for field in def.fields.iter().filter(|f| !f.deprecated) {
        let accessor = accessor_for(cx, def, field, strict_unions)?;
        let value_type = cx.value_type(&field.ty)?;
        out.push(FieldAccessor {
            field: field.name.clone(),
            ident: julia_identity(&field.name),
            value_type,
            accessor,
        });
    }
    Ok(out)
}

pub(crate) fn union_placeholder(
    cx: &EntityContext,
    field: &FieldDef,
    strict_unions: bool,
) -> Result<(), GenError> {
    let tag = match &field.ty {
        TypeRef::Union(i) => *i,
        TypeRef::Vector(elem) => match elem.as_ref() {
            TypeRef::Union(i) => *i,
            _ => return Err(cx.invariant(format!("field {} is not a union", field.name))),
        },
        _ => return Err(cx.invariant(format!("field {} is not a union", field.name))),
    };
    if !cx.enum_def(tag)?.is_union {
        return Err(cx.invariant(format!("union field {} refers to a plain enum", field.name)));
    }
    if strict_unions {
        return Err(GenError::UnsupportedUnion {
            entity: cx.entity.to_string(),
            field:  field.name.clone(),
        });
    }
    warn!("{}.{}: union fields are not supported, emitting a placeholder", cx.entity, field.name);
    Ok(())
}

/// Flatbuffers front ends use `"0"` for "no default" on non-scalar fields.
fn string_default(field: &FieldDef) -> String {
    if field.default == "0" {
        String::new()
    } else {
        field.default.clone()
    }
}

fn accessor_for(
    cx: &mut EntityContext,
    def: &StructDef,
    field: &FieldDef,
    strict_unions: bool,
) -> Result<Accessor, GenError> {
    if def.fixed {
        return match &field.ty {
            TypeRef::Scalar(_) | TypeRef::Enum(_) => {
                let scalar = cx.scalar_of(&field.ty)?.ok_or_else(|| cx.invariant("scalar without width"))?;
                Ok(Accessor::StructScalar {
                    offset: field.offset,
                    scalar,
                    type_name: cx.value_type(&field.ty)?,
                })
            }
            TypeRef::Struct(i) => {
                if !cx.struct_def(*i)?.fixed {
                    return Err(cx.invariant(format!("fixed struct field {} references a table", field.name)));
                }
                Ok(Accessor::StructStruct {
                    offset:    field.offset,
                    type_name: cx.struct_type_name(*i)?,
                })
            }
            TypeRef::String | TypeRef::Vector(_) | TypeRef::Union(_) => Err(cx.invariant(format!(
                "fixed struct field {} has a variable-size type",
                field.name
            ))),
        };
    }

    let vtable_offset = field_index_to_offset(field.offset);
    match &field.ty {
        TypeRef::Scalar(_) | TypeRef::Enum(_) => {
            let scalar = cx.scalar_of(&field.ty)?.ok_or_else(|| cx.invariant("scalar without width"))?;
            Ok(Accessor::TableScalar {
                vtable_offset,
                scalar,
                type_name: cx.value_type(&field.ty)?,
                default: cx.constant(field, scalar)?,
            })
        }
        TypeRef::String => Ok(Accessor::TableString {
            vtable_offset,
            default: string_default(field),
        }),
        TypeRef::Struct(i) => Ok(Accessor::TableStruct {
            vtable_offset,
            type_name: cx.struct_type_name(*i)?,
            inline: cx.struct_def(*i)?.fixed,
        }),
        TypeRef::Vector(elem) => match elem.as_ref() {
            TypeRef::Vector(_) => Err(cx.invariant(format!("field {} is a vector of vectors", field.name))),
            TypeRef::Union(_) => {
                union_placeholder(cx, field, strict_unions)?;
                Ok(Accessor::UnsupportedUnion)
            }
            elem => Ok(Accessor::TableVector {
                vtable_offset,
                element_type: cx.arg_type(&field.ty)?,
                elem_size: cx
                    .schema
                    .inline_size(elem)
                    .ok_or_else(|| cx.invariant(format!("unsized vector element in {}", field.name)))?,
                elem_scalar: cx.scalar_of(elem)?,
            }),
        },
        TypeRef::Union(_) => {
            union_placeholder(cx, field, strict_unions)?;
            Ok(Accessor::UnsupportedUnion)
        }
    }
}

/// Julia statements for one accessor body, each line prefixed with `indent`.
pub fn render_accessor(acc: &FieldAccessor, indent: &str) -> String {
    let mut lines = vec![format!("# {}::{}", acc.ident, acc.value_type)];
    match &acc.accessor {
        Accessor::StructScalar { offset, type_name, .. } => {
            lines.push(format!(
                "return FlatBuffers.get(x, FlatBuffers.pos(x) + {}, {})",
                offset, type_name
            ));
        }
        Accessor::StructStruct { offset, type_name } => {
            lines.push(format!(
                "return FlatBuffers.init({}, FlatBuffers.bytes(x), FlatBuffers.pos(x) + {})",
                type_name, offset
            ));
        }
        Accessor::TableScalar { vtable_offset, type_name, default, .. } => {
            lines.push(format!("o = FlatBuffers.offset(x, {})", vtable_offset));
            lines.push(format!(
                "o != 0 && return FlatBuffers.get(x, o + FlatBuffers.pos(x), {})",
                type_name
            ));
            lines.push(format!("return {}", typed_literal(default, type_name)));
        }
        Accessor::TableString { vtable_offset, default } => {
            lines.push(format!("o = FlatBuffers.offset(x, {})", vtable_offset));
            lines.push("o != 0 && return String(x, o + FlatBuffers.pos(x))".to_string());
            lines.push(format!("return {}", quote(default)));
        }
        Accessor::TableStruct { vtable_offset, type_name, inline } => {
            lines.push(format!("o = FlatBuffers.offset(x, {})", vtable_offset));
            lines.push("if o != 0".to_string());
            if *inline {
                lines.push("\ty = o + FlatBuffers.pos(x)".to_string());
            } else {
                lines.push("\ty = FlatBuffers.indirect(x, o + FlatBuffers.pos(x))".to_string());
            }
            lines.push(format!("\treturn FlatBuffers.init({}, FlatBuffers.bytes(x), y)", type_name));
            lines.push("end".to_string());
        }
        Accessor::TableVector { vtable_offset, element_type, .. } => {
            lines.push(format!("o = FlatBuffers.offset(x, {})", vtable_offset));
            lines.push(format!("o != 0 && return FlatBuffers.Array{{{}}}(x, o)", element_type));
        }
        Accessor::UnsupportedUnion => {
            lines.push(format!("# {}: no accessor generated for `{}`", UNSUPPORTED_UNION, acc.field));
        }
    }

    let mut out = String::new();
    for line in lines {
        out.push_str(indent);
        out.push_str(&line);
        out.push('\n');
    }
    out
}
