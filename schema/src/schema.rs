use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bb::SIZE_UOFFSET;

/// A resolved schema, as handed over by the front end.
///
/// Enums and aggregates are kept in declaration order; `TypeRef` back-references
/// index into these two vectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub enums:   Vec<EnumDef>,
    #[serde(default)]
    pub structs: Vec<StructDef>,
}

/// Dotted namespace, e.g. `MyGame.Sample` → `["MyGame", "Sample"]`.
///
/// Ordering is lexicographic over components, which is what import sets sort by.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Namespace {
    pub components: Vec<String>,
}

impl Namespace {
    pub fn new<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Namespace {
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits a dotted name. Empty segments are dropped, so `""` is the root namespace.
    pub fn from_dotted(name: &str) -> Self {
        Namespace::new(name.split('.').filter(|c| !c.is_empty()))
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.components.join("."))
    }
}

/// Fixed-width scalar kinds understood by the wire format. Serialized with the
/// schema language's spelling: `ubyte`, `ushort`, `ulong`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Bool,
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
}

impl ScalarType {
    /// Width in bytes on the wire.
    pub fn size(self) -> usize {
        match self {
            ScalarType::Bool | ScalarType::Byte | ScalarType::UByte => 1,
            ScalarType::Short | ScalarType::UShort => 2,
            ScalarType::Int | ScalarType::UInt | ScalarType::Float => 4,
            ScalarType::Long | ScalarType::ULong | ScalarType::Double => 8,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, ScalarType::Float | ScalarType::Double)
    }
}

/// The declared type of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    Scalar(ScalarType),
    String,
    Vector(Box<TypeRef>),
    /// Index into `Schema::structs`; covers both fixed structs and tables.
    Struct(usize),
    /// Index into `Schema::enums`.
    Enum(usize),
    /// Index into `Schema::enums` of the union's tag enum.
    Union(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumVal {
    pub name:  String,
    /// Wide enough for every `long` and `ulong` member.
    pub value: i128,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDef {
    pub name:       String,
    #[serde(default)]
    pub namespace:  Namespace,
    pub underlying: ScalarType,
    pub values:     Vec<EnumVal>,
    #[serde(default)]
    pub is_union:   bool,
    #[serde(default)]
    pub doc_comment: Vec<String>,
    /// Already emitted by an included schema; skipped by generators.
    #[serde(default)]
    pub generated:  bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name:       String,
    #[serde(rename = "type")]
    pub ty:         TypeRef,
    /// Byte offset inside a fixed struct, or slot index inside a table.
    pub offset:     usize,
    /// Filler bytes that follow this field inside a fixed struct. When a struct
    /// is written back-to-front they are emitted just before the field itself.
    #[serde(default)]
    pub padding:    usize,
    #[serde(default)]
    pub deprecated: bool,
    /// Default value literal, as written in the schema (`"0"`, `"1.5"`, `"hi"`).
    #[serde(default = "default_constant")]
    pub default:    String,
}

fn default_constant() -> String {
    "0".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDef {
    pub name:       String,
    #[serde(default)]
    pub namespace:  Namespace,
    /// `true` for fixed structs, `false` for tables.
    pub fixed:      bool,
    pub fields:     Vec<FieldDef>,
    #[serde(default = "one")]
    pub minalign:   usize,
    #[serde(default)]
    pub bytesize:   usize,
    #[serde(default)]
    pub doc_comment: Vec<String>,
    #[serde(default)]
    pub generated:  bool,
}

fn one() -> usize {
    1
}

impl Schema {
    pub fn enum_def(&self, index: usize) -> Option<&EnumDef> {
        self.enums.get(index)
    }

    pub fn struct_def(&self, index: usize) -> Option<&StructDef> {
        self.structs.get(index)
    }

    /// Size in bytes a value of `ty` takes when stored inline (vector element or
    /// struct member). Offsets for out-of-line data take one `uoffset`.
    pub fn inline_size(&self, ty: &TypeRef) -> Option<usize> {
        match ty {
            TypeRef::Scalar(s) => Some(s.size()),
            TypeRef::Enum(i) => self.enum_def(*i).map(|e| e.underlying.size()),
            TypeRef::Struct(i) => {
                let def = self.struct_def(*i)?;
                Some(if def.fixed { def.bytesize } else { SIZE_UOFFSET })
            }
            TypeRef::String | TypeRef::Vector(_) | TypeRef::Union(_) => Some(SIZE_UOFFSET),
        }
    }

    pub fn inline_alignment(&self, ty: &TypeRef) -> Option<usize> {
        match ty {
            TypeRef::Struct(i) => {
                let def = self.struct_def(*i)?;
                Some(if def.fixed { def.minalign } else { SIZE_UOFFSET })
            }
            other => self.inline_size(other),
        }
    }
}

#[test]
fn namespace_from_dotted() {
    assert_eq!(Namespace::from_dotted("MyGame.Sample").components, vec!["MyGame", "Sample"]);
    assert!(Namespace::from_dotted("").is_root());
    assert_eq!(Namespace::from_dotted("A..B").to_string(), "A.B");
}

#[test]
fn namespace_order_is_componentwise() {
    let a = Namespace::from_dotted("A");
    let ab = Namespace::from_dotted("A.B");
    let b = Namespace::from_dotted("B");
    assert!(a < ab);
    assert!(ab < b);
}

#[test]
fn inline_layout_of_vector_elements() {
    let schema = Schema {
        enums: vec![EnumDef {
            name:        "Color".into(),
            namespace:   Namespace::default(),
            underlying:  ScalarType::UByte,
            values:      vec![],
            is_union:    false,
            doc_comment: vec![],
            generated:   false,
        }],
        structs: vec![StructDef {
            name:        "Vec3".into(),
            namespace:   Namespace::default(),
            fixed:       true,
            fields:      vec![],
            minalign:    4,
            bytesize:    12,
            doc_comment: vec![],
            generated:   false,
        }],
    };
    assert_eq!(schema.inline_size(&TypeRef::Enum(0)), Some(1));
    assert_eq!(schema.inline_size(&TypeRef::Struct(0)), Some(12));
    assert_eq!(schema.inline_alignment(&TypeRef::Struct(0)), Some(4));
    assert_eq!(schema.inline_size(&TypeRef::String), Some(4));
    assert_eq!(schema.inline_size(&TypeRef::Struct(7)), None);
}

#[test]
fn field_defaults_when_loading_json() {
    let field: FieldDef = serde_json::from_str(
        r#"{ "name": "hp", "type": { "scalar": "short" }, "offset": 2 }"#,
    )
    .unwrap();
    assert_eq!(field.ty, TypeRef::Scalar(ScalarType::Short));
    assert_eq!(field.default, "0");
    assert_eq!(field.padding, 0);
    assert!(!field.deprecated);
}

#[test]
fn scalar_type_names_follow_the_schema_language() {
    assert_eq!(serde_json::to_string(&ScalarType::UByte).unwrap(), "\"ubyte\"");
    assert_eq!(serde_json::to_string(&ScalarType::ULong).unwrap(), "\"ulong\"");
    let ty: ScalarType = serde_json::from_str("\"ushort\"").unwrap();
    assert_eq!(ty, ScalarType::UShort);
}

#[test]
fn ulong_enum_values_load_exactly() {
    let def: EnumDef = serde_json::from_str(
        r#"{
            "name": "Flags",
            "underlying": "ulong",
            "values": [
                { "name": "Low", "value": 1 },
                { "name": "High", "value": 9223372036854775808 },
                { "name": "All", "value": 18446744073709551615 }
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(def.underlying, ScalarType::ULong);
    assert_eq!(def.values[1].value, 1i128 << 63);
    assert_eq!(def.values[2].value, u64::MAX as i128);
}
