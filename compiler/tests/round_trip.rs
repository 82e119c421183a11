//! Builds buffers by executing builder plans against the reference runtime and
//! reads them back through the accessor plans for the same schema.

mod common;

use std::collections::HashMap;

use common::*;
use flatjl_compiler::builder::StructWrite;
use flatjl_schema::{Builder, ScalarValue, Table, TypeRef};

#[test]
fn monster_round_trip() {
    let schema = game_schema();
    let monster = artifacts(&schema, MONSTER);
    let weapon = artifacts(&schema, WEAPON);
    let vec3 = artifacts(&schema, VEC3);

    let mut b = Builder::new();

    let sword = b.create_string("sword");
    let mut inputs = HashMap::new();
    inputs.insert("name", FieldInput::Offset(sword));
    inputs.insert("damage", FieldInput::Scalar(ScalarValue::Short(3)));
    let weapon_off = run_table(&mut b, table_steps(&weapon.builder), &inputs);

    let name = b.create_string("orc");
    let inventory = build_vector(
        &mut b,
        table_steps(&monster.builder),
        "inventory",
        &[ScalarValue::UByte(0), ScalarValue::UByte(1), ScalarValue::UByte(2)],
    );

    let (_, vec3_body) = struct_plan(&vec3.builder);
    let mut inputs = HashMap::new();
    inputs.insert(
        "pos",
        FieldInput::Struct {
            body: vec3_body.to_vec(),
            args: vec![ScalarValue::Float(1.0), ScalarValue::Float(2.0), ScalarValue::Float(3.0)],
        },
    );
    inputs.insert("hp", FieldInput::Scalar(ScalarValue::Short(300)));
    inputs.insert("name", FieldInput::Offset(name));
    inputs.insert("inventory", FieldInput::Offset(inventory));
    inputs.insert("color", FieldInput::Scalar(ScalarValue::UByte(0)));
    inputs.insert("weapon", FieldInput::Offset(weapon_off));
    let root = run_table(&mut b, table_steps(&monster.builder), &inputs);
    b.finish(root);

    let t = Table::root(b.finished_data());
    let acc = &monster.accessors;
    assert_eq!(read(&t, accessor(acc, "hp")), Read::Scalar(ScalarValue::Short(300)));
    assert_eq!(read(&t, accessor(acc, "mana")), Read::Scalar(ScalarValue::Short(150)));
    assert_eq!(read(&t, accessor(acc, "name")), Read::Str("orc".into()));
    assert_eq!(read(&t, accessor(acc, "color")), Read::Scalar(ScalarValue::UByte(0)));

    let pos = Table::new(t.bytes(), at(read(&t, accessor(acc, "pos"))));
    assert_eq!(read(&pos, accessor(&vec3.accessors, "x")), Read::Scalar(ScalarValue::Float(1.0)));
    assert_eq!(read(&pos, accessor(&vec3.accessors, "y")), Read::Scalar(ScalarValue::Float(2.0)));
    assert_eq!(read(&pos, accessor(&vec3.accessors, "z")), Read::Scalar(ScalarValue::Float(3.0)));

    assert_eq!(
        scalars(&t, read(&t, accessor(acc, "inventory"))),
        vec![ScalarValue::UByte(0), ScalarValue::UByte(1), ScalarValue::UByte(2)]
    );

    let w = Table::new(t.bytes(), at(read(&t, accessor(acc, "weapon"))));
    assert_eq!(read(&w, accessor(&weapon.accessors, "name")), Read::Str("sword".into()));
    assert_eq!(read(&w, accessor(&weapon.accessors, "damage")), Read::Scalar(ScalarValue::Short(3)));
}

#[test]
fn absent_fields_read_as_defaults() {
    let schema = game_schema();
    let monster = artifacts(&schema, MONSTER);

    let mut b = Builder::new();
    let root = run_table(&mut b, table_steps(&monster.builder), &HashMap::new());
    b.finish(root);

    let t = Table::root(b.finished_data());
    let acc = &monster.accessors;
    assert_eq!(read(&t, accessor(acc, "alive")), Read::Scalar(ScalarValue::Bool(false)));
    assert_eq!(read(&t, accessor(acc, "hp")), Read::Scalar(ScalarValue::Short(100)));
    assert_eq!(read(&t, accessor(acc, "color")), Read::Scalar(ScalarValue::UByte(2)));
    assert_eq!(read(&t, accessor(acc, "name")), Read::Str(String::new()));
    assert_eq!(read(&t, accessor(acc, "pos")), Read::Nothing);
    assert_eq!(read(&t, accessor(acc, "inventory")), Read::Nothing);
    assert_eq!(read(&t, accessor(acc, "weapon")), Read::Nothing);
}

#[test]
fn values_equal_to_the_default_are_not_stored() {
    let schema = game_schema();
    let monster = artifacts(&schema, MONSTER);

    let mut b = Builder::new();
    let mut inputs = HashMap::new();
    inputs.insert("hp", FieldInput::Scalar(ScalarValue::Short(100)));
    let root = run_table(&mut b, table_steps(&monster.builder), &inputs);
    b.finish(root);

    let t = Table::root(b.finished_data());
    match accessor(&monster.accessors, "hp") {
        flatjl_compiler::accessor::Accessor::TableScalar { vtable_offset, .. } => {
            assert_eq!(t.offset(*vtable_offset), 0);
        }
        other => panic!("unexpected accessor {:?}", other),
    }
    assert_eq!(read(&t, accessor(&monster.accessors, "hp")), Read::Scalar(ScalarValue::Short(100)));
}

#[test]
fn struct_padding_is_written_back_to_front() {
    let schema = game_schema();
    let padded = artifacts(&schema, PADDED);
    let (params, body) = struct_plan(&padded.builder);

    let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["tag", "count", "level"]);

    let written: usize = body
        .iter()
        .map(|w| match w {
            StructWrite::Prep { .. } => 0,
            StructWrite::Pad(n) => *n,
            StructWrite::Prepend { param, .. } => params[*param].scalar.size(),
        })
        .sum();
    assert_eq!(written, schema.structs[PADDED].bytesize);

    let mut b = Builder::new();
    let before = b.offset();
    let args = [ScalarValue::UByte(0xaa), ScalarValue::Int(-2), ScalarValue::Short(7)];
    let end = run_struct(&mut b, body, &args);
    assert_eq!((end - before) as usize, 12);
    assert_eq!(
        b.finished_data(),
        &[0xaa, 0, 0, 0, 0xfe, 0xff, 0xff, 0xff, 7, 0, 0, 0]
    );

    let view = Table::new(b.finished_data(), 0);
    assert_eq!(read(&view, accessor(&padded.accessors, "tag")), Read::Scalar(ScalarValue::UByte(0xaa)));
    assert_eq!(read(&view, accessor(&padded.accessors, "count")), Read::Scalar(ScalarValue::Int(-2)));
    assert_eq!(read(&view, accessor(&padded.accessors, "level")), Read::Scalar(ScalarValue::Short(7)));
}

#[test]
fn nested_structs_flatten_into_prefixed_parameters() {
    let schema = game_schema();
    let segment = artifacts(&schema, SEGMENT);
    let vec3 = artifacts(&schema, VEC3);
    let (params, body) = struct_plan(&segment.builder);

    let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["start_x", "start_y", "start_z", "end_x", "end_y", "end_z"]);
    assert_eq!(params[3].path, vec!["end".to_string(), "x".to_string()]);

    let written: Vec<_> = body
        .iter()
        .filter_map(|w| match w {
            StructWrite::Prepend { param, expr } => Some((*param, expr.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(
        written,
        vec![(5, "end_z"), (4, "end_y"), (3, "end_x"), (2, "start_z"), (1, "start_y"), (0, "start_x")]
    );

    let args: Vec<_> = (1..=6).map(|i| ScalarValue::Float(i as f32)).collect();
    let mut b = Builder::new();
    let end = run_struct(&mut b, body, &args);
    assert_eq!(end, 24);

    let view = Table::new(b.finished_data(), 0);
    let start = Table::new(view.bytes(), at(read(&view, accessor(&segment.accessors, "start"))));
    let finish = Table::new(view.bytes(), at(read(&view, accessor(&segment.accessors, "end"))));
    assert_eq!(finish.pos(), 12);
    assert_eq!(read(&start, accessor(&vec3.accessors, "x")), Read::Scalar(ScalarValue::Float(1.0)));
    assert_eq!(read(&start, accessor(&vec3.accessors, "z")), Read::Scalar(ScalarValue::Float(3.0)));
    assert_eq!(read(&finish, accessor(&vec3.accessors, "x")), Read::Scalar(ScalarValue::Float(4.0)));
    assert_eq!(read(&finish, accessor(&vec3.accessors, "z")), Read::Scalar(ScalarValue::Float(6.0)));
}

#[test]
fn vectors_of_structs_and_enums_round_trip() {
    let schema = game_schema();
    let patrol = artifacts(&schema, PATROL);
    let vec3 = artifacts(&schema, VEC3);
    let steps = table_steps(&patrol.builder);
    let (_, vec3_body) = struct_plan(&vec3.builder);

    let vec3_ty = TypeRef::Struct(VEC3);
    assert_eq!(
        vector_layout(steps, "waypoints"),
        (schema.inline_size(&vec3_ty).unwrap(), schema.inline_alignment(&vec3_ty).unwrap())
    );
    assert_eq!(vector_layout(steps, "colors"), (1, 1));

    let points: Vec<Vec<ScalarValue>> = vec![
        vec![ScalarValue::Float(1.0), ScalarValue::Float(2.0), ScalarValue::Float(3.0)],
        vec![ScalarValue::Float(-4.0), ScalarValue::Float(5.5), ScalarValue::Float(6.0)],
        vec![ScalarValue::Float(7.0), ScalarValue::Float(8.0), ScalarValue::Float(9.25)],
    ];
    let colors = [ScalarValue::UByte(2), ScalarValue::UByte(0), ScalarValue::UByte(1)];

    let mut b = Builder::new();
    let waypoints = build_struct_vector(&mut b, steps, "waypoints", vec3_body, &points);
    let color_vec = build_vector(&mut b, steps, "colors", &colors);
    let mut inputs = HashMap::new();
    inputs.insert("waypoints", FieldInput::Offset(waypoints));
    inputs.insert("colors", FieldInput::Offset(color_vec));
    let root = run_table(&mut b, steps, &inputs);
    b.finish(root);

    let t = Table::root(b.finished_data());
    let positions = struct_positions(read(&t, accessor(&patrol.accessors, "waypoints")));
    assert_eq!(positions.len(), 3);
    for (pos, expected) in positions.iter().zip(&points) {
        assert_eq!(pos % 4, 0, "waypoint at {} is misaligned", pos);
        let view = Table::new(t.bytes(), *pos);
        for (name, value) in ["x", "y", "z"].iter().zip(expected) {
            assert_eq!(read(&view, accessor(&vec3.accessors, name)), Read::Scalar(*value));
        }
    }
    assert_eq!(positions[1] - positions[0], 12);

    assert_eq!(scalars(&t, read(&t, accessor(&patrol.accessors, "colors"))), colors.to_vec());
}
