// example/src/main.rs

use flatjl::*;

fn field(name: &str, ty: TypeRef, offset: usize) -> FieldDef {
    FieldDef {
        name: name.into(),
        ty,
        offset,
        padding: 0,
        deprecated: false,
        default: "0".into(),
    }
}

/// The classic monster sample, built by hand instead of loaded from JSON.
fn monster_schema() -> Schema {
    let ns = Namespace::from_dotted("MyGame.Sample");

    let color = EnumDef {
        name:        "Color".into(),
        namespace:   ns.clone(),
        underlying:  ScalarType::Byte,
        values:      vec![
            EnumVal { name: "Red".into(), value: 0 },
            EnumVal { name: "Green".into(), value: 1 },
            EnumVal { name: "Blue".into(), value: 2 },
        ],
        is_union:    false,
        doc_comment: vec![],
        generated:   false,
    };

    let vec3 = StructDef {
        name:        "Vec3".into(),
        namespace:   ns.clone(),
        fixed:       true,
        fields:      vec![
            field("x", TypeRef::Scalar(ScalarType::Float), 0),
            field("y", TypeRef::Scalar(ScalarType::Float), 4),
            field("z", TypeRef::Scalar(ScalarType::Float), 8),
        ],
        minalign:    4,
        bytesize:    12,
        doc_comment: vec![],
        generated:   false,
    };

    let weapon = StructDef {
        name:        "Weapon".into(),
        namespace:   ns.clone(),
        fixed:       false,
        fields:      vec![
            field("name", TypeRef::String, 0),
            field("damage", TypeRef::Scalar(ScalarType::Short), 1),
        ],
        minalign:    1,
        bytesize:    0,
        doc_comment: vec![],
        generated:   false,
    };

    let mut hp = field("hp", TypeRef::Scalar(ScalarType::Short), 2);
    hp.default = "100".into();
    let mut mana = field("mana", TypeRef::Scalar(ScalarType::Short), 1);
    mana.default = "150".into();
    let mut color_field = field("color", TypeRef::Enum(0), 6);
    color_field.default = "2".into();
    let mut friendly = field("friendly", TypeRef::Scalar(ScalarType::Bool), 4);
    friendly.deprecated = true;

    let monster = StructDef {
        name:        "Monster".into(),
        namespace:   ns,
        fixed:       false,
        fields:      vec![
            field("pos", TypeRef::Struct(0), 0),
            mana,
            hp,
            field("name", TypeRef::String, 3),
            friendly,
            field("inventory", TypeRef::Vector(Box::new(TypeRef::Scalar(ScalarType::UByte))), 5),
            color_field,
            field("weapons", TypeRef::Vector(Box::new(TypeRef::Struct(1))), 7),
        ],
        minalign:    1,
        bytesize:    0,
        doc_comment: vec!["A monster in the sample game.".into()],
        generated:   false,
    };

    Schema {
        enums:   vec![color],
        structs: vec![vec3, weapon, monster],
    }
}

fn main() -> Result<(), GenError> {
    let schema = monster_schema();

    let options = GeneratorOptions {
        single_file: true,
        file_name: "monster".into(),
        ..GeneratorOptions::default()
    };

    for unit in generate_to_memory(&schema, &options)? {
        println!("==> {}", unit.path.display());
        println!("{}", unit.contents);
    }

    // The same schema as JSON, ready for `flatjl gen --input`.
    println!("{}", schema_to_json(&schema)?);
    Ok(())
}
