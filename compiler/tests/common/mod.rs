#![allow(dead_code)]

use std::collections::HashMap;

use flatjl_compiler::accessor::{Accessor, FieldAccessor};
use flatjl_compiler::builder::{BuilderPlan, SlotKind, StructParam, StructWrite, TableBuildStep};
use flatjl_compiler::entity::{struct_artifacts, StructArtifacts};
use flatjl_compiler::type_map::EntityContext;
use flatjl_schema::{
    Builder, EnumDef, EnumVal, FieldDef, Namespace, ScalarType, ScalarValue, Schema, StructDef,
    Table, TypeRef, UOffset,
};

pub const VEC3: usize = 0;
pub const PADDED: usize = 1;
pub const WEAPON: usize = 2;
pub const MONSTER: usize = 3;
pub const SEGMENT: usize = 4;
pub const PATROL: usize = 5;

pub fn field(name: &str, ty: TypeRef, offset: usize) -> FieldDef {
    FieldDef {
        name: name.into(),
        ty,
        offset,
        padding: 0,
        deprecated: false,
        default: "0".into(),
    }
}

pub fn with_default(mut f: FieldDef, default: &str) -> FieldDef {
    f.default = default.into();
    f
}

pub fn with_padding(mut f: FieldDef, padding: usize) -> FieldDef {
    f.padding = padding;
    f
}

pub fn fixed(name: &str, ns: &str, fields: Vec<FieldDef>, minalign: usize, bytesize: usize) -> StructDef {
    StructDef {
        name: name.into(),
        namespace: Namespace::from_dotted(ns),
        fixed: true,
        fields,
        minalign,
        bytesize,
        doc_comment: vec![],
        generated: false,
    }
}

pub fn table(name: &str, ns: &str, fields: Vec<FieldDef>) -> StructDef {
    StructDef {
        name: name.into(),
        namespace: Namespace::from_dotted(ns),
        fixed: false,
        fields,
        minalign: 1,
        bytesize: 0,
        doc_comment: vec![],
        generated: false,
    }
}

pub fn color_enum() -> EnumDef {
    EnumDef {
        name: "Color".into(),
        namespace: Namespace::from_dotted("Game"),
        underlying: ScalarType::UByte,
        values: vec![
            EnumVal { name: "Red".into(), value: 0 },
            EnumVal { name: "Green".into(), value: 1 },
            EnumVal { name: "Blue".into(), value: 2 },
        ],
        is_union: false,
        doc_comment: vec![],
        generated: false,
    }
}

/// A small game schema. `Weapon` lives in `Game.Items`, everything else in `Game`.
pub fn game_schema() -> Schema {
    use ScalarType::*;

    let mut friendly = field("friendly", TypeRef::Scalar(Bool), 4);
    friendly.deprecated = true;

    Schema {
        enums: vec![color_enum()],
        structs: vec![
            fixed(
                "Vec3",
                "Game",
                vec![
                    field("x", TypeRef::Scalar(Float), 0),
                    field("y", TypeRef::Scalar(Float), 4),
                    field("z", TypeRef::Scalar(Float), 8),
                ],
                4,
                12,
            ),
            fixed(
                "Padded",
                "Game",
                vec![
                    with_padding(field("tag", TypeRef::Scalar(UByte), 0), 3),
                    field("count", TypeRef::Scalar(Int), 4),
                    with_padding(field("level", TypeRef::Scalar(Short), 8), 2),
                ],
                4,
                12,
            ),
            table(
                "Weapon",
                "Game.Items",
                vec![
                    field("name", TypeRef::String, 0),
                    field("damage", TypeRef::Scalar(Short), 1),
                ],
            ),
            table(
                "Monster",
                "Game",
                vec![
                    field("pos", TypeRef::Struct(VEC3), 0),
                    with_default(field("mana", TypeRef::Scalar(Short), 1), "150"),
                    with_default(field("hp", TypeRef::Scalar(Short), 2), "100"),
                    field("name", TypeRef::String, 3),
                    friendly,
                    field("inventory", TypeRef::Vector(Box::new(TypeRef::Scalar(UByte))), 5),
                    with_default(field("color", TypeRef::Enum(0), 6), "2"),
                    field("weapon", TypeRef::Struct(WEAPON), 7),
                    field("alive", TypeRef::Scalar(Bool), 8),
                ],
            ),
            fixed(
                "Segment",
                "Game",
                vec![
                    field("start", TypeRef::Struct(VEC3), 0),
                    field("end", TypeRef::Struct(VEC3), 12),
                ],
                4,
                24,
            ),
            table(
                "Patrol",
                "Game",
                vec![
                    field("waypoints", TypeRef::Vector(Box::new(TypeRef::Struct(VEC3))), 0),
                    field("colors", TypeRef::Vector(Box::new(TypeRef::Enum(0))), 1),
                ],
            ),
        ],
    }
}

pub fn artifacts(schema: &Schema, index: usize) -> StructArtifacts {
    let def = &schema.structs[index];
    let mut cx = EntityContext::new(schema, &def.namespace, &def.name);
    struct_artifacts(&mut cx, def, false).unwrap()
}

pub fn table_steps(plan: &BuilderPlan) -> &[TableBuildStep] {
    match plan {
        BuilderPlan::Table { steps, .. } => steps,
        BuilderPlan::Struct { name, .. } => panic!("{} is a fixed struct", name),
    }
}

pub fn struct_plan(plan: &BuilderPlan) -> (&[StructParam], &[StructWrite]) {
    match plan {
        BuilderPlan::Struct { params, body, .. } => (params, body),
        BuilderPlan::Table { name, .. } => panic!("{} is a table", name),
    }
}

pub fn accessor<'a>(accessors: &'a [FieldAccessor], field: &str) -> &'a Accessor {
    &accessors
        .iter()
        .find(|a| a.field == field)
        .unwrap_or_else(|| panic!("no accessor for {}", field))
        .accessor
}

/// Value handed to a table builder for one field.
pub enum FieldInput {
    Scalar(ScalarValue),
    Offset(UOffset),
    Struct { body: Vec<StructWrite>, args: Vec<ScalarValue> },
}

/// Executes a struct constructor body the way `create<Name>` does.
pub fn run_struct(b: &mut Builder, body: &[StructWrite], args: &[ScalarValue]) -> UOffset {
    for write in body {
        match write {
            StructWrite::Prep { alignment, bytesize } => b.prep(*alignment, *bytesize),
            StructWrite::Pad(n) => b.pad(*n),
            StructWrite::Prepend { param, .. } => b.prepend(args[*param]),
        }
    }
    b.offset()
}

/// Executes `<Name>Start` .. `<Name>End`, calling `Add<Field>` for every field
/// present in `inputs`. Out-of-line data must already be in the buffer.
pub fn run_table(b: &mut Builder, steps: &[TableBuildStep], inputs: &HashMap<&str, FieldInput>) -> UOffset {
    for step in steps {
        match step {
            TableBuildStep::Start { num_fields } => b.start_object(*num_fields),
            TableBuildStep::AddField { slot, field, kind, .. } => match (kind, inputs.get(field.as_str())) {
                (_, None) => {}
                (SlotKind::Scalar { default, .. }, Some(FieldInput::Scalar(v))) => {
                    b.prepend_slot(*slot, *v, *default)
                }
                (SlotKind::Offset, Some(FieldInput::Offset(off))) => b.prepend_offset_slot(*slot, *off, 0),
                (SlotKind::Struct, Some(FieldInput::Struct { body, args })) => {
                    let off = run_struct(b, body, args);
                    b.prepend_struct_slot(*slot, off, 0);
                }
                (kind, Some(_)) => panic!("input for {} does not fit slot kind {:?}", field, kind),
            },
            TableBuildStep::StartVector { .. } | TableBuildStep::UnsupportedUnion { .. } => {}
            TableBuildStep::End => return b.end_object(),
        }
    }
    panic!("build plan has no End step")
}

/// Element size and alignment passed to `Start<Field>Vector`.
pub fn vector_layout(steps: &[TableBuildStep], field: &str) -> (usize, usize) {
    steps
        .iter()
        .find_map(|s| match s {
            TableBuildStep::StartVector { field: f, elem_size, alignment } if f == field => {
                Some((*elem_size, *alignment))
            }
            _ => None,
        })
        .unwrap_or_else(|| panic!("no vector builder for {}", field))
}

/// `Start<Field>Vector`, then the elements back-to-front.
pub fn build_vector(b: &mut Builder, steps: &[TableBuildStep], field: &str, elems: &[ScalarValue]) -> UOffset {
    let (elem_size, alignment) = vector_layout(steps, field);
    b.start_vector(elem_size, elems.len(), alignment);
    for e in elems.iter().rev() {
        b.prepend(*e);
    }
    b.end_vector(elems.len())
}

/// Like `build_vector`, with each element written by a struct constructor body.
pub fn build_struct_vector(
    b: &mut Builder,
    steps: &[TableBuildStep],
    field: &str,
    body: &[StructWrite],
    elems: &[Vec<ScalarValue>],
) -> UOffset {
    let (elem_size, alignment) = vector_layout(steps, field);
    b.start_vector(elem_size, elems.len(), alignment);
    for args in elems.iter().rev() {
        run_struct(b, body, args);
    }
    b.end_vector(elems.len())
}

/// What a generated accessor would return.
#[derive(Debug, PartialEq)]
pub enum Read {
    Scalar(ScalarValue),
    Str(String),
    /// Position of a struct or table view.
    At(usize),
    Vector {
        start:       usize,
        len:         usize,
        elem_size:   usize,
        elem_scalar: Option<ScalarType>,
    },
    Nothing,
}

pub fn read(t: &Table, acc: &Accessor) -> Read {
    match acc {
        Accessor::StructScalar { offset, scalar, .. } => Read::Scalar(t.get(t.pos() + offset, *scalar)),
        Accessor::StructStruct { offset, .. } => Read::At(t.pos() + offset),
        Accessor::TableScalar { vtable_offset, scalar, default, .. } => {
            let o = t.offset(*vtable_offset) as usize;
            if o != 0 {
                Read::Scalar(t.get(o + t.pos(), *scalar))
            } else {
                Read::Scalar(*default)
            }
        }
        Accessor::TableString { vtable_offset, default } => {
            let o = t.offset(*vtable_offset) as usize;
            if o != 0 {
                Read::Str(t.string(o + t.pos()).to_string())
            } else {
                Read::Str(default.clone())
            }
        }
        Accessor::TableStruct { vtable_offset, inline, .. } => {
            let o = t.offset(*vtable_offset) as usize;
            if o == 0 {
                Read::Nothing
            } else if *inline {
                Read::At(o + t.pos())
            } else {
                Read::At(t.indirect(o + t.pos()))
            }
        }
        Accessor::TableVector { vtable_offset, elem_size, elem_scalar, .. } => {
            let o = t.offset(*vtable_offset) as usize;
            if o == 0 {
                Read::Nothing
            } else {
                Read::Vector {
                    start:       t.vector(o),
                    len:         t.vector_len(o),
                    elem_size:   *elem_size,
                    elem_scalar: *elem_scalar,
                }
            }
        }
        Accessor::UnsupportedUnion => Read::Nothing,
    }
}

pub fn at(r: Read) -> usize {
    match r {
        Read::At(pos) => pos,
        other => panic!("expected a struct or table, got {:?}", other),
    }
}

/// Elements of a scalar or enum vector, stepping by the accessor's element size.
pub fn scalars(t: &Table, r: Read) -> Vec<ScalarValue> {
    match r {
        Read::Vector { start, len, elem_size, elem_scalar: Some(scalar) } => {
            (0..len).map(|i| t.get(start + i * elem_size, scalar)).collect()
        }
        other => panic!("expected a scalar vector, got {:?}", other),
    }
}

/// Positions of the elements of a vector of inline structs.
pub fn struct_positions(r: Read) -> Vec<usize> {
    match r {
        Read::Vector { start, len, elem_size, elem_scalar: None } => {
            (0..len).map(|i| start + i * elem_size).collect()
        }
        other => panic!("expected a struct vector, got {:?}", other),
    }
}
