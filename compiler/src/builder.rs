//! Builder functions.
//!
//! Tables get `Start`/`Add<Field>`/`Start<Field>Vector`/`End` functions that
//! fill slots by index. Fixed structs get one `create<Name>` function taking
//! every leaf member (nested structs flattened, names prefixed with the path of
//! containing fields) and writing them back-to-front: members in reverse
//! declaration order, each member's trailing padding first.

use flatjl_schema::{Namespace, ScalarType, ScalarValue, StructDef, TypeRef};

use crate::accessor::{union_placeholder, UNSUPPORTED_UNION};
use crate::error::GenError;
use crate::type_map::{bare_literal, typed_literal, EntityContext};
use crate::utils::{julia_identity, make_camel};

#[derive(Debug, Clone, PartialEq)]
pub enum SlotKind {
    /// Written in place, skipped when equal to `default`.
    Scalar { scalar: ScalarType, default: ScalarValue },
    /// Out-of-line data: strings, vectors, tables.
    Offset,
    /// A fixed struct written inline just before the slot is recorded.
    Struct,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableBuildStep {
    Start {
        num_fields: usize,
    },
    AddField {
        slot:      usize,
        field:     String,
        ident:     String,
        type_name: String,
        kind:      SlotKind,
        /// Default as rendered into the call.
        default:   String,
    },
    StartVector {
        field:     String,
        elem_size: usize,
        alignment: usize,
    },
    UnsupportedUnion {
        field: String,
    },
    End,
}

/// One parameter of a struct constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct StructParam {
    /// Prefixed identifier, e.g. `pos_x`.
    pub name:      String,
    /// Schema field names from the outer struct down to this member.
    pub path:      Vec<String>,
    pub type_name: String,
    pub scalar:    ScalarType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StructWrite {
    Prep { alignment: usize, bytesize: usize },
    Pad(usize),
    /// Writes `params[param]`; `expr` is the Julia argument (cast for enums).
    Prepend { param: usize, expr: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuilderPlan {
    Table {
        name:  String,
        steps: Vec<TableBuildStep>,
    },
    Struct {
        name:   String,
        params: Vec<StructParam>,
        body:   Vec<StructWrite>,
    },
}

pub fn builder_plan(
    cx: &mut EntityContext,
    def: &StructDef,
    strict_unions: bool,
) -> Result<BuilderPlan, GenError> {
    if def.fixed {
        let mut params = Vec::new();
        let mut visiting = vec![(def.namespace.clone(), def.name.clone())];
        struct_builder_args(cx, def, "", &mut Vec::new(), &mut visiting, &mut params)?;
        let mut body = Vec::new();
        let mut remaining = params.len();
        struct_builder_body(cx, def, &params, &mut remaining, &mut body)?;
        Ok(BuilderPlan::Struct {
            name: def.name.clone(),
            params,
            body,
        })
    } else {
        Ok(BuilderPlan::Table {
            name:  def.name.clone(),
            steps: table_builder_steps(cx, def, strict_unions)?,
        })
    }
}

fn table_builder_steps(
    cx: &mut EntityContext,
    def: &StructDef,
    strict_unions: bool,
) -> Result<Vec<TableBuildStep>, GenError> {
    let mut steps = vec![TableBuildStep::Start { num_fields: def.fields.len() }];

    for field in def.fields.iter().filter(|f| !f.deprecated) {
        let ident = julia_identity(&field.name);
        let kind = match &field.ty {
            TypeRef::Scalar(_) | TypeRef::Enum(_) => {
                let scalar = cx.scalar_of(&field.ty)?.ok_or_else(|| cx.invariant("scalar without width"))?;
                SlotKind::Scalar {
                    scalar,
                    default: cx.constant(field, scalar)?,
                }
            }
            TypeRef::Vector(elem) if matches!(elem.as_ref(), TypeRef::Union(_)) => {
                union_placeholder(cx, field, strict_unions)?;
                steps.push(TableBuildStep::UnsupportedUnion { field: field.name.clone() });
                continue;
            }
            TypeRef::Union(_) => {
                union_placeholder(cx, field, strict_unions)?;
                steps.push(TableBuildStep::UnsupportedUnion { field: field.name.clone() });
                continue;
            }
            TypeRef::Struct(i) => {
                if cx.struct_def(*i)?.fixed {
                    SlotKind::Struct
                } else {
                    SlotKind::Offset
                }
            }
            TypeRef::String | TypeRef::Vector(_) => SlotKind::Offset,
        };

        let (type_name, default) = match &kind {
            SlotKind::Scalar { default, .. } => {
                let type_name = cx.value_type(&field.ty)?;
                let literal = match field.ty {
                    TypeRef::Enum(_) => typed_literal(default, &type_name),
                    _ => bare_literal(default),
                };
                (type_name, literal)
            }
            SlotKind::Offset | SlotKind::Struct => ("FlatBuffers.UOffsetT".to_string(), "0".to_string()),
        };

        steps.push(TableBuildStep::AddField {
            slot: field.offset,
            field: field.name.clone(),
            ident,
            type_name,
            kind,
            default,
        });

        if let TypeRef::Vector(elem) = &field.ty {
            if matches!(elem.as_ref(), TypeRef::Vector(_)) {
                return Err(cx.invariant(format!("field {} is a vector of vectors", field.name)));
            }
            let elem_size = cx.schema.inline_size(elem);
            let alignment = cx.schema.inline_alignment(elem);
            match (elem_size, alignment) {
                (Some(elem_size), Some(alignment)) => steps.push(TableBuildStep::StartVector {
                    field: field.name.clone(),
                    elem_size,
                    alignment,
                }),
                _ => return Err(cx.invariant(format!("unsized vector element in {}", field.name))),
            }
        }
    }

    steps.push(TableBuildStep::End);
    Ok(steps)
}

/// Collects constructor parameters in declaration order, descending into
/// nested structs with `prefix` extended by the containing field's name.
fn struct_builder_args(
    cx: &mut EntityContext,
    def: &StructDef,
    prefix: &str,
    path: &mut Vec<String>,
    visiting: &mut Vec<(Namespace, String)>,
    params: &mut Vec<StructParam>,
) -> Result<(), GenError> {
    for field in &def.fields {
        path.push(field.name.clone());
        match &field.ty {
            TypeRef::Struct(i) => {
                let nested = cx.struct_def(*i)?;
                if !nested.fixed {
                    return Err(cx.invariant(format!("fixed struct field {} references a table", field.name)));
                }
                let key = (nested.namespace.clone(), nested.name.clone());
                if visiting.contains(&key) {
                    return Err(cx.invariant(format!("struct {} contains itself", nested.name)));
                }
                visiting.push(key);
                let nested_prefix = format!("{}{}_", prefix, field.name);
                struct_builder_args(cx, nested, &nested_prefix, path, visiting, params)?;
                visiting.pop();
            }
            TypeRef::Scalar(_) | TypeRef::Enum(_) => {
                let scalar = cx.scalar_of(&field.ty)?.ok_or_else(|| cx.invariant("scalar without width"))?;
                let name = format!("{}{}", prefix, julia_identity(&field.name));
                if params.iter().any(|p| p.name == name) {
                    return Err(cx.invariant(format!(
                        "flattened parameter {} of {} is ambiguous",
                        name,
                        path.join(".")
                    )));
                }
                params.push(StructParam {
                    name,
                    path: path.clone(),
                    type_name: cx.value_type(&field.ty)?,
                    scalar,
                });
            }
            TypeRef::String | TypeRef::Vector(_) | TypeRef::Union(_) => {
                return Err(cx.invariant(format!(
                    "fixed struct field {} has a variable-size type",
                    field.name
                )));
            }
        }
        path.pop();
    }
    Ok(())
}

/// Emits the writes for `def` back-to-front. Leaves are met in exactly the
/// reverse of the order `struct_builder_args` collected them, so `remaining`
/// counts down through the parameter indices.
fn struct_builder_body(
    cx: &EntityContext,
    def: &StructDef,
    params: &[StructParam],
    remaining: &mut usize,
    body: &mut Vec<StructWrite>,
) -> Result<(), GenError> {
    body.push(StructWrite::Prep {
        alignment: def.minalign,
        bytesize:  def.bytesize,
    });
    for field in def.fields.iter().rev() {
        if field.padding > 0 {
            body.push(StructWrite::Pad(field.padding));
        }
        if let TypeRef::Struct(i) = &field.ty {
            let nested = cx.struct_def(*i)?;
            struct_builder_body(cx, nested, params, remaining, body)?;
        } else {
            *remaining = remaining
                .checked_sub(1)
                .ok_or_else(|| cx.invariant(format!("no constructor parameter left for {}", field.name)))?;
            body.push(StructWrite::Prepend {
                param: *remaining,
                expr:  cx.cast_to_base_type(&field.ty, &params[*remaining].name)?,
            });
        }
    }
    Ok(())
}

pub fn render_builder(plan: &BuilderPlan) -> String {
    match plan {
        BuilderPlan::Table { name, steps } => render_table_builder(name, steps),
        BuilderPlan::Struct { name, params, body } => render_struct_builder(name, params, body),
    }
}

fn render_table_builder(name: &str, steps: &[TableBuildStep]) -> String {
    let mut code = String::new();
    for step in steps {
        match step {
            TableBuildStep::Start { num_fields } => {
                code += &format!(
                    "{}Start(b::FlatBuffers.Builder) = FlatBuffers.startobject!(b, {})\n",
                    name, num_fields
                );
            }
            TableBuildStep::AddField { slot, field, ident, type_name, kind, default } => {
                let call = match kind {
                    SlotKind::Scalar { .. } => "prependslot!",
                    SlotKind::Offset => "prependoffsetslot!",
                    SlotKind::Struct => "prependstructslot!",
                };
                code += &format!(
                    "{}Add{}(b::FlatBuffers.Builder, {}::{}) = FlatBuffers.{}(b, {}, {}, {})\n",
                    name,
                    make_camel(field, true),
                    ident,
                    type_name,
                    call,
                    slot,
                    ident,
                    default
                );
            }
            TableBuildStep::StartVector { field, elem_size, alignment } => {
                code += &format!(
                    "{}Start{}Vector(b::FlatBuffers.Builder, numelems::Integer) = FlatBuffers.startvector!(b, {}, numelems, {})\n",
                    name,
                    make_camel(field, true),
                    elem_size,
                    alignment
                );
            }
            TableBuildStep::UnsupportedUnion { field } => {
                code += &format!("# {}: no builder generated for `{}`\n", UNSUPPORTED_UNION, field);
            }
            TableBuildStep::End => {
                code += &format!("{}End(b::FlatBuffers.Builder) = FlatBuffers.endobject!(b)\n", name);
            }
        }
    }
    code += "\n";
    code
}

fn render_struct_builder(name: &str, params: &[StructParam], body: &[StructWrite]) -> String {
    let mut code = format!("function create{}(b::FlatBuffers.Builder", name);
    for p in params {
        code += &format!(", {}::{}", p.name, p.type_name);
    }
    code += ")\n";
    for write in body {
        match write {
            StructWrite::Prep { alignment, bytesize } => {
                code += &format!("\tFlatBuffers.prep!(b, {}, {})\n", alignment, bytesize);
            }
            StructWrite::Pad(n) => {
                code += &format!("\tFlatBuffers.pad!(b, {})\n", n);
            }
            StructWrite::Prepend { expr, .. } => {
                code += &format!("\tFlatBuffers.prepend!(b, {})\n", expr);
            }
        }
    }
    code += "\treturn FlatBuffers.offset(b)\n";
    code += "end\n\n";
    code
}
