//! Typed value storage and conversions.
//!
//! A value is a flat sequence of scalars from one family: a non-array node of
//! type `3u8` holds three scalars, an array of two `3u8` elements holds six.
//! Strings and binary blobs are their own variants. The scalar layouts here
//! are the single source of truth for both wire directions and for the XML
//! text forms.

use std::io;
use std::net::Ipv4Addr;

use crate::types::{self, NodeType, ScalarKind};
use crate::{Error, Result};

/// A node value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    S8(Vec<i8>),
    U8(Vec<u8>),
    S16(Vec<i16>),
    U16(Vec<u16>),
    S32(Vec<i32>),
    U32(Vec<u32>),
    S64(Vec<i64>),
    U64(Vec<u64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Bool(Vec<bool>),
    Ip4(Vec<Ipv4Addr>),
    Time(Vec<u32>),
    Str(String),
    Bin(Vec<u8>),
}

impl Value {
    /// Number of scalars held (byte length for Str and Bin).
    pub(crate) fn scalar_len(&self) -> usize {
        match self {
            Value::S8(v) => v.len(),
            Value::U8(v) => v.len(),
            Value::S16(v) => v.len(),
            Value::U16(v) => v.len(),
            Value::S32(v) => v.len(),
            Value::U32(v) => v.len(),
            Value::S64(v) => v.len(),
            Value::U64(v) => v.len(),
            Value::Float(v) => v.len(),
            Value::Double(v) => v.len(),
            Value::Bool(v) => v.len(),
            Value::Ip4(v) => v.len(),
            Value::Time(v) => v.len(),
            Value::Str(s) => s.len(),
            Value::Bin(b) => b.len(),
        }
    }

    /// Decode a flat run of big-endian scalars.
    pub(crate) fn decode_scalars(kind: ScalarKind, data: &[u8]) -> Result<Value> {
        Ok(match kind {
            ScalarKind::S8 => Value::S8(data.iter().map(|&b| b as i8).collect()),
            ScalarKind::U8 => Value::U8(data.to_vec()),
            ScalarKind::S16 => Value::S16(
                data.chunks_exact(2).map(|c| i16::from_be_bytes([c[0], c[1]])).collect(),
            ),
            ScalarKind::U16 => Value::U16(
                data.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect(),
            ),
            ScalarKind::S32 => Value::S32(
                data.chunks_exact(4)
                    .map(|c| i32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
            ScalarKind::U32 => Value::U32(
                data.chunks_exact(4)
                    .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
            ScalarKind::S64 => Value::S64(
                data.chunks_exact(8)
                    .map(|c| i64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                    .collect(),
            ),
            ScalarKind::U64 => Value::U64(
                data.chunks_exact(8)
                    .map(|c| u64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                    .collect(),
            ),
            ScalarKind::Float => Value::Float(
                data.chunks_exact(4)
                    .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
            ScalarKind::Double => Value::Double(
                data.chunks_exact(8)
                    .map(|c| f64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                    .collect(),
            ),
            ScalarKind::Time => Value::Time(
                data.chunks_exact(4)
                    .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
            ScalarKind::Ip4 => Value::Ip4(
                data.chunks_exact(4).map(|c| Ipv4Addr::new(c[0], c[1], c[2], c[3])).collect(),
            ),
            ScalarKind::Bool => {
                let mut out = Vec::with_capacity(data.len());
                for &b in data {
                    out.push(match b {
                        0 => false,
                        1 => true,
                        _ => return Err(Error::InvalidBoolByte),
                    });
                }
                Value::Bool(out)
            }
        })
    }

    /// Encode the scalars big-endian into `out`, which must hold exactly
    /// `scalar_len() * scalar_size` bytes. Str and Bin values are written by
    /// the codecs themselves (length prefix, encoding, termination).
    pub(crate) fn encode_scalars(&self, out: &mut [u8]) {
        match self {
            Value::S8(v) => {
                for (i, &x) in v.iter().enumerate() {
                    out[i] = x as u8;
                }
            }
            Value::U8(v) => out[..v.len()].copy_from_slice(v),
            Value::S16(v) => {
                for (i, &x) in v.iter().enumerate() {
                    out[i * 2..i * 2 + 2].copy_from_slice(&x.to_be_bytes());
                }
            }
            Value::U16(v) => {
                for (i, &x) in v.iter().enumerate() {
                    out[i * 2..i * 2 + 2].copy_from_slice(&x.to_be_bytes());
                }
            }
            Value::S32(v) => {
                for (i, &x) in v.iter().enumerate() {
                    out[i * 4..i * 4 + 4].copy_from_slice(&x.to_be_bytes());
                }
            }
            Value::U32(v) | Value::Time(v) => {
                for (i, &x) in v.iter().enumerate() {
                    out[i * 4..i * 4 + 4].copy_from_slice(&x.to_be_bytes());
                }
            }
            Value::S64(v) => {
                for (i, &x) in v.iter().enumerate() {
                    out[i * 8..i * 8 + 8].copy_from_slice(&x.to_be_bytes());
                }
            }
            Value::U64(v) => {
                for (i, &x) in v.iter().enumerate() {
                    out[i * 8..i * 8 + 8].copy_from_slice(&x.to_be_bytes());
                }
            }
            Value::Float(v) => {
                for (i, &x) in v.iter().enumerate() {
                    out[i * 4..i * 4 + 4].copy_from_slice(&x.to_be_bytes());
                }
            }
            Value::Double(v) => {
                for (i, &x) in v.iter().enumerate() {
                    out[i * 8..i * 8 + 8].copy_from_slice(&x.to_be_bytes());
                }
            }
            Value::Bool(v) => {
                for (i, &x) in v.iter().enumerate() {
                    out[i] = x as u8;
                }
            }
            Value::Ip4(v) => {
                for (i, &x) in v.iter().enumerate() {
                    out[i * 4..i * 4 + 4].copy_from_slice(&x.octets());
                }
            }
            Value::Str(_) | Value::Bin(_) => {}
        }
    }

    /// Parse one scalar per token.
    pub(crate) fn parse_scalars(kind: ScalarKind, tokens: &[&str]) -> Result<Value> {
        Ok(match kind {
            ScalarKind::S8 => {
                Value::S8(tokens.iter().map(|t| t.parse()).collect::<std::result::Result<_, _>>()?)
            }
            ScalarKind::U8 => {
                Value::U8(tokens.iter().map(|t| t.parse()).collect::<std::result::Result<_, _>>()?)
            }
            ScalarKind::S16 => {
                Value::S16(tokens.iter().map(|t| t.parse()).collect::<std::result::Result<_, _>>()?)
            }
            ScalarKind::U16 => {
                Value::U16(tokens.iter().map(|t| t.parse()).collect::<std::result::Result<_, _>>()?)
            }
            ScalarKind::S32 => {
                Value::S32(tokens.iter().map(|t| t.parse()).collect::<std::result::Result<_, _>>()?)
            }
            ScalarKind::U32 => {
                Value::U32(tokens.iter().map(|t| t.parse()).collect::<std::result::Result<_, _>>()?)
            }
            ScalarKind::S64 => {
                Value::S64(tokens.iter().map(|t| t.parse()).collect::<std::result::Result<_, _>>()?)
            }
            ScalarKind::U64 => {
                Value::U64(tokens.iter().map(|t| t.parse()).collect::<std::result::Result<_, _>>()?)
            }
            ScalarKind::Time => {
                Value::Time(tokens.iter().map(|t| t.parse()).collect::<std::result::Result<_, _>>()?)
            }
            ScalarKind::Float => {
                Value::Float(tokens.iter().map(|t| t.parse()).collect::<std::result::Result<_, _>>()?)
            }
            ScalarKind::Double => {
                Value::Double(tokens.iter().map(|t| t.parse()).collect::<std::result::Result<_, _>>()?)
            }
            ScalarKind::Bool => {
                let mut out = Vec::with_capacity(tokens.len());
                for t in tokens {
                    out.push(match *t {
                        "1" => true,
                        "0" => false,
                        _ => return Err(Error::InvalidBoolString),
                    });
                }
                Value::Bool(out)
            }
            ScalarKind::Ip4 => {
                let mut out = Vec::with_capacity(tokens.len());
                for t in tokens {
                    out.push(t.parse::<Ipv4Addr>().map_err(|_| Error::InvalidIpAddress)?);
                }
                Value::Ip4(out)
            }
        })
    }

    /// Write the space-separated text form of a scalar value. Bools print as
    /// `1`/`0`, addresses as dotted quads, floats with default formatting.
    pub(crate) fn write_xml<W: io::Write>(&self, wr: &mut W) -> io::Result<()> {
        macro_rules! join {
            ($v:expr) => {
                for (i, x) in $v.iter().enumerate() {
                    if i > 0 {
                        wr.write_all(b" ")?;
                    }
                    write!(wr, "{}", x)?;
                }
            };
        }
        match self {
            Value::S8(v) => join!(v),
            Value::U8(v) => join!(v),
            Value::S16(v) => join!(v),
            Value::U16(v) => join!(v),
            Value::S32(v) => join!(v),
            Value::U32(v) => join!(v),
            Value::S64(v) => join!(v),
            Value::U64(v) => join!(v),
            Value::Float(v) => join!(v),
            Value::Double(v) => join!(v),
            Value::Time(v) => join!(v),
            Value::Ip4(v) => join!(v),
            Value::Bool(v) => {
                for (i, &x) in v.iter().enumerate() {
                    if i > 0 {
                        wr.write_all(b" ")?;
                    }
                    wr.write_all(if x { b"1" } else { b"0" })?;
                }
            }
            Value::Str(_) | Value::Bin(_) => {}
        }
        Ok(())
    }
}

/// The value of a `bin` node, distinct from an array of `u8`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinValue(pub Vec<u8>);

/// The value of a `time` node, distinct from `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeValue(pub u32);

/// Conversion from a native Rust shape to a typed node value.
///
/// This is the third registry lookup: the implementing type selects the node
/// type, whether the value is an array, and the stored scalars. Only shapes
/// with a corresponding node type implement it, so invalid combinations
/// (arrays of strings, 16-byte addresses) are unrepresentable.
pub trait IntoValue {
    /// Convert into `(node type, is_array, value)`.
    fn into_value(self) -> (&'static NodeType, bool, Value);
}

macro_rules! scalar_values {
    ($($ty:ty => $nt:ident, $variant:ident;)*) => {$(
        impl IntoValue for $ty {
            fn into_value(self) -> (&'static NodeType, bool, Value) {
                (&types::$nt, false, Value::$variant(vec![self]))
            }
        }

        impl IntoValue for Vec<$ty> {
            fn into_value(self) -> (&'static NodeType, bool, Value) {
                (&types::$nt, true, Value::$variant(self))
            }
        }
    )*};
}

scalar_values! {
    i8 => S8, S8;
    u8 => U8, U8;
    i16 => S16, S16;
    u16 => U16, U16;
    i32 => S32, S32;
    u32 => U32, U32;
    i64 => S64, S64;
    u64 => U64, U64;
    f32 => FLOAT, Float;
    f64 => DOUBLE, Double;
    bool => BOOL, Bool;
    Ipv4Addr => IP4, Ip4;
}

macro_rules! tuple_values {
    ($($ty:ty, $n:literal => $nt:ident, $variant:ident;)*) => {$(
        impl IntoValue for [$ty; $n] {
            fn into_value(self) -> (&'static NodeType, bool, Value) {
                (&types::$nt, false, Value::$variant(self.to_vec()))
            }
        }

        impl IntoValue for Vec<[$ty; $n]> {
            fn into_value(self) -> (&'static NodeType, bool, Value) {
                let flat = self.into_iter().flatten().collect();
                (&types::$nt, true, Value::$variant(flat))
            }
        }
    )*};
}

tuple_values! {
    i8, 2 => VEC2_S8, S8;
    u8, 2 => VEC2_U8, U8;
    i16, 2 => VEC2_S16, S16;
    u16, 2 => VEC2_U16, U16;
    i32, 2 => VEC2_S32, S32;
    u32, 2 => VEC2_U32, U32;
    i64, 2 => VEC2_S64, S64;
    u64, 2 => VEC2_U64, U64;
    f32, 2 => VEC2_FLOAT, Float;
    f64, 2 => VEC2_DOUBLE, Double;
    bool, 2 => VEC2_BOOL, Bool;
    i8, 3 => VEC3_S8, S8;
    u8, 3 => VEC3_U8, U8;
    i16, 3 => VEC3_S16, S16;
    u16, 3 => VEC3_U16, U16;
    i32, 3 => VEC3_S32, S32;
    u32, 3 => VEC3_U32, U32;
    i64, 3 => VEC3_S64, S64;
    u64, 3 => VEC3_U64, U64;
    f32, 3 => VEC3_FLOAT, Float;
    f64, 3 => VEC3_DOUBLE, Double;
    bool, 3 => VEC3_BOOL, Bool;
    i8, 4 => VEC4_S8, S8;
    u8, 4 => VEC4_U8, U8;
    i16, 4 => VEC4_S16, S16;
    u16, 4 => VEC4_U16, U16;
    i32, 4 => VEC4_S32, S32;
    u32, 4 => VEC4_U32, U32;
    i64, 4 => VEC4_S64, S64;
    u64, 4 => VEC4_U64, U64;
    f32, 4 => VEC4_FLOAT, Float;
    f64, 4 => VEC4_DOUBLE, Double;
    bool, 4 => VEC4_BOOL, Bool;
    i8, 16 => VEC16_S8, S8;
    u8, 16 => VEC16_U8, U8;
    i16, 8 => VEC8_S16, S16;
    u16, 8 => VEC8_U16, U16;
    bool, 16 => VEC16_BOOL, Bool;
}

impl IntoValue for TimeValue {
    fn into_value(self) -> (&'static NodeType, bool, Value) {
        (&types::TIME, false, Value::Time(vec![self.0]))
    }
}

impl IntoValue for Vec<TimeValue> {
    fn into_value(self) -> (&'static NodeType, bool, Value) {
        (&types::TIME, true, Value::Time(self.into_iter().map(|t| t.0).collect()))
    }
}

impl IntoValue for BinValue {
    fn into_value(self) -> (&'static NodeType, bool, Value) {
        (&types::BIN, false, Value::Bin(self.0))
    }
}

impl IntoValue for String {
    fn into_value(self) -> (&'static NodeType, bool, Value) {
        (&types::STR, false, Value::Str(self))
    }
}

impl IntoValue for &str {
    fn into_value(self) -> (&'static NodeType, bool, Value) {
        (&types::STR, false, Value::Str(self.to_owned()))
    }
}
