use std::fmt;

use crate::schema::ScalarType;

/// A dynamically typed scalar.
///
/// Default constants arrive as schema literals (`"0"`, `"-1.5"`, `"true"`);
/// parsing them into a `ScalarValue` is what lets the emitter render a
/// type-correct literal and lets the runtime write the exact wire bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Byte(i8),
    UByte(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
}

/// A literal that could not be read as the requested scalar type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralError {
    pub literal: String,
    pub ty:      ScalarType,
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} is not a valid {:?} literal", self.literal, self.ty)
    }
}

impl std::error::Error for LiteralError {}

impl ScalarValue {
    /// Parses a schema literal. Booleans accept `0`/`1` as well as `false`/`true`.
    pub fn parse(literal: &str, ty: ScalarType) -> Result<ScalarValue, LiteralError> {
        let text = literal.trim();
        let err = || LiteralError { literal: literal.to_string(), ty };
        let value = match ty {
            ScalarType::Bool => match text {
                "0" | "false" => ScalarValue::Bool(false),
                "1" | "true" => ScalarValue::Bool(true),
                _ => return Err(err()),
            },
            ScalarType::Byte => ScalarValue::Byte(text.parse().map_err(|_| err())?),
            ScalarType::UByte => ScalarValue::UByte(text.parse().map_err(|_| err())?),
            ScalarType::Short => ScalarValue::Short(text.parse().map_err(|_| err())?),
            ScalarType::UShort => ScalarValue::UShort(text.parse().map_err(|_| err())?),
            ScalarType::Int => ScalarValue::Int(text.parse().map_err(|_| err())?),
            ScalarType::UInt => ScalarValue::UInt(text.parse().map_err(|_| err())?),
            ScalarType::Long => ScalarValue::Long(text.parse().map_err(|_| err())?),
            ScalarType::ULong => ScalarValue::ULong(text.parse().map_err(|_| err())?),
            ScalarType::Float => ScalarValue::Float(text.parse().map_err(|_| err())?),
            ScalarType::Double => ScalarValue::Double(text.parse().map_err(|_| err())?),
        };
        Ok(value)
    }

    pub fn scalar_type(&self) -> ScalarType {
        match self {
            ScalarValue::Bool(_) => ScalarType::Bool,
            ScalarValue::Byte(_) => ScalarType::Byte,
            ScalarValue::UByte(_) => ScalarType::UByte,
            ScalarValue::Short(_) => ScalarType::Short,
            ScalarValue::UShort(_) => ScalarType::UShort,
            ScalarValue::Int(_) => ScalarType::Int,
            ScalarValue::UInt(_) => ScalarType::UInt,
            ScalarValue::Long(_) => ScalarType::Long,
            ScalarValue::ULong(_) => ScalarType::ULong,
            ScalarValue::Float(_) => ScalarType::Float,
            ScalarValue::Double(_) => ScalarType::Double,
        }
    }

    pub fn size(&self) -> usize {
        self.scalar_type().size()
    }

    /// Little-endian wire bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match *self {
            ScalarValue::Bool(v) => vec![v as u8],
            ScalarValue::Byte(v) => v.to_le_bytes().to_vec(),
            ScalarValue::UByte(v) => vec![v],
            ScalarValue::Short(v) => v.to_le_bytes().to_vec(),
            ScalarValue::UShort(v) => v.to_le_bytes().to_vec(),
            ScalarValue::Int(v) => v.to_le_bytes().to_vec(),
            ScalarValue::UInt(v) => v.to_le_bytes().to_vec(),
            ScalarValue::Long(v) => v.to_le_bytes().to_vec(),
            ScalarValue::ULong(v) => v.to_le_bytes().to_vec(),
            ScalarValue::Float(v) => v.to_le_bytes().to_vec(),
            ScalarValue::Double(v) => v.to_le_bytes().to_vec(),
        }
    }

    /// Decodes `ty.size()` bytes from the front of `bytes`. Returns `None` if
    /// the slice is too short.
    pub fn from_le_bytes(bytes: &[u8], ty: ScalarType) -> Option<ScalarValue> {
        let b = bytes.get(..ty.size())?;
        let value = match ty {
            ScalarType::Bool => ScalarValue::Bool(b[0] != 0),
            ScalarType::Byte => ScalarValue::Byte(b[0] as i8),
            ScalarType::UByte => ScalarValue::UByte(b[0]),
            ScalarType::Short => ScalarValue::Short(i16::from_le_bytes([b[0], b[1]])),
            ScalarType::UShort => ScalarValue::UShort(u16::from_le_bytes([b[0], b[1]])),
            ScalarType::Int => ScalarValue::Int(i32::from_le_bytes(b.try_into().ok()?)),
            ScalarType::UInt => ScalarValue::UInt(u32::from_le_bytes(b.try_into().ok()?)),
            ScalarType::Long => ScalarValue::Long(i64::from_le_bytes(b.try_into().ok()?)),
            ScalarType::ULong => ScalarValue::ULong(u64::from_le_bytes(b.try_into().ok()?)),
            ScalarType::Float => ScalarValue::Float(f32::from_le_bytes(b.try_into().ok()?)),
            ScalarType::Double => ScalarValue::Double(f64::from_le_bytes(b.try_into().ok()?)),
        };
        Some(value)
    }
}

#[test]
fn parse_bool_literals() {
    assert_eq!(ScalarValue::parse("0", ScalarType::Bool), Ok(ScalarValue::Bool(false)));
    assert_eq!(ScalarValue::parse("1", ScalarType::Bool), Ok(ScalarValue::Bool(true)));
    assert_eq!(ScalarValue::parse("true", ScalarType::Bool), Ok(ScalarValue::Bool(true)));
    assert!(ScalarValue::parse("2", ScalarType::Bool).is_err());
}

#[test]
fn parse_numeric_literals() {
    assert_eq!(ScalarValue::parse("-3", ScalarType::Byte), Ok(ScalarValue::Byte(-3)));
    assert_eq!(ScalarValue::parse(" 150 ", ScalarType::UShort), Ok(ScalarValue::UShort(150)));
    assert_eq!(ScalarValue::parse("1.5", ScalarType::Float), Ok(ScalarValue::Float(1.5)));
    assert!(ScalarValue::parse("300", ScalarType::UByte).is_err());
    assert!(ScalarValue::parse("1.5", ScalarType::Int).is_err());
    match ScalarValue::parse("nan", ScalarType::Double) {
        Ok(ScalarValue::Double(v)) => assert!(v.is_nan()),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn le_bytes_round_trip() {
    let values = [
        ScalarValue::Bool(true),
        ScalarValue::Short(-2),
        ScalarValue::UInt(0xdead_beef),
        ScalarValue::Double(-0.25),
    ];
    for v in values {
        let bytes = v.to_le_bytes();
        assert_eq!(bytes.len(), v.size());
        assert_eq!(ScalarValue::from_le_bytes(&bytes, v.scalar_type()), Some(v));
    }
    assert_eq!(ScalarValue::Short(0x0102).to_le_bytes(), vec![0x02, 0x01]);
    assert_eq!(ScalarValue::from_le_bytes(&[1], ScalarType::Int), None);
}
