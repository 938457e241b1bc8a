//! The closed node-type registry.
//!
//! Every node carries one of these descriptors. Ids are assigned densely from
//! 1; ids 46 and 47 are unassigned, and 46 (`attribute`), 254 (`traverse up`),
//! and 255 (`end`) double as control opcodes in the binary metadata stream.

/// Scalar families a typed value can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    S8,
    U8,
    S16,
    U16,
    S32,
    U32,
    S64,
    U64,
    Ip4,
    Time,
    Float,
    Double,
    Bool,
}

impl ScalarKind {
    /// Size of one scalar in bytes.
    pub const fn size(self) -> usize {
        match self {
            ScalarKind::S8 | ScalarKind::U8 | ScalarKind::Bool => 1,
            ScalarKind::S16 | ScalarKind::U16 => 2,
            ScalarKind::S32 | ScalarKind::U32 => 4,
            ScalarKind::S64 | ScalarKind::U64 => 8,
            ScalarKind::Ip4 | ScalarKind::Time => 4,
            ScalarKind::Float => 4,
            ScalarKind::Double => 8,
        }
    }
}

/// How a node type stores its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeKind {
    /// Interior node: no value, only children.
    Void,
    /// Length-prefixed, encoded, NUL-terminated text.
    Str,
    /// Length-prefixed opaque bytes.
    Bin,
    /// Fixed-width scalar or tuple of one scalar family.
    Scalar(ScalarKind),
}

/// Immutable descriptor of a node type.
#[derive(Debug)]
pub struct NodeType {
    id: u8,
    names: &'static [&'static str],
    size: usize,
    count: usize,
    kind: TypeKind,
}

impl NodeType {
    /// The numeric id used on the binary wire.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// The canonical name, as written to `__type` attributes.
    pub fn name(&self) -> &'static str {
        self.names[0]
    }

    /// All accepted names, canonical first.
    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    /// Element size in bytes (the full tuple for vector types).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of scalars per element.
    pub fn count(&self) -> usize {
        self.count
    }

    pub(crate) fn kind(&self) -> TypeKind {
        self.kind
    }
}

impl PartialEq for NodeType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NodeType {}

macro_rules! node_type {
    ($name:ident, $id:expr, $names:expr, $size:expr, $count:expr, $kind:expr) => {
        #[doc = concat!("Node type id ", stringify!($id), ".")]
        pub static $name: NodeType =
            NodeType { id: $id, names: $names, size: $size, count: $count, kind: $kind };
    };
}

use TypeKind::Scalar;

node_type!(VOID, 1, &["void"], 0, 0, TypeKind::Void);
node_type!(S8, 2, &["s8"], 1, 1, Scalar(ScalarKind::S8));
node_type!(U8, 3, &["u8"], 1, 1, Scalar(ScalarKind::U8));
node_type!(S16, 4, &["s16"], 2, 1, Scalar(ScalarKind::S16));
node_type!(U16, 5, &["u16"], 2, 1, Scalar(ScalarKind::U16));
node_type!(S32, 6, &["s32"], 4, 1, Scalar(ScalarKind::S32));
node_type!(U32, 7, &["u32"], 4, 1, Scalar(ScalarKind::U32));
node_type!(S64, 8, &["s64"], 8, 1, Scalar(ScalarKind::S64));
node_type!(U64, 9, &["u64"], 8, 1, Scalar(ScalarKind::U64));
node_type!(BIN, 10, &["bin", "binary"], 1, 1, TypeKind::Bin);
node_type!(STR, 11, &["str", "string"], 1, 1, TypeKind::Str);
node_type!(IP4, 12, &["ip4"], 4, 1, Scalar(ScalarKind::Ip4));
node_type!(TIME, 13, &["time"], 4, 1, Scalar(ScalarKind::Time));
node_type!(FLOAT, 14, &["float", "f"], 4, 1, Scalar(ScalarKind::Float));
node_type!(DOUBLE, 15, &["double", "d"], 8, 1, Scalar(ScalarKind::Double));

node_type!(VEC2_S8, 16, &["2s8"], 2, 2, Scalar(ScalarKind::S8));
node_type!(VEC2_U8, 17, &["2u8"], 2, 2, Scalar(ScalarKind::U8));
node_type!(VEC2_S16, 18, &["2s16"], 4, 2, Scalar(ScalarKind::S16));
node_type!(VEC2_U16, 19, &["2u16"], 4, 2, Scalar(ScalarKind::U16));
node_type!(VEC2_S32, 20, &["2s32"], 8, 2, Scalar(ScalarKind::S32));
node_type!(VEC2_U32, 21, &["2u32"], 8, 2, Scalar(ScalarKind::U32));
node_type!(VEC2_S64, 22, &["vs64", "2s64"], 16, 2, Scalar(ScalarKind::S64));
node_type!(VEC2_U64, 23, &["vu64", "2u64"], 16, 2, Scalar(ScalarKind::U64));
node_type!(VEC2_FLOAT, 24, &["2f"], 8, 2, Scalar(ScalarKind::Float));
node_type!(VEC2_DOUBLE, 25, &["vd", "2d"], 16, 2, Scalar(ScalarKind::Double));

node_type!(VEC3_S8, 26, &["3s8"], 3, 3, Scalar(ScalarKind::S8));
node_type!(VEC3_U8, 27, &["3u8"], 3, 3, Scalar(ScalarKind::U8));
node_type!(VEC3_S16, 28, &["3s16"], 6, 3, Scalar(ScalarKind::S16));
node_type!(VEC3_U16, 29, &["3u16"], 6, 3, Scalar(ScalarKind::U16));
node_type!(VEC3_S32, 30, &["3s32"], 12, 3, Scalar(ScalarKind::S32));
node_type!(VEC3_U32, 31, &["3u32"], 12, 3, Scalar(ScalarKind::U32));
node_type!(VEC3_S64, 32, &["3s64"], 24, 3, Scalar(ScalarKind::S64));
node_type!(VEC3_U64, 33, &["3u64"], 24, 3, Scalar(ScalarKind::U64));
node_type!(VEC3_FLOAT, 34, &["3f"], 12, 3, Scalar(ScalarKind::Float));
node_type!(VEC3_DOUBLE, 35, &["3d"], 24, 3, Scalar(ScalarKind::Double));

node_type!(VEC4_S8, 36, &["4s8"], 4, 4, Scalar(ScalarKind::S8));
node_type!(VEC4_U8, 37, &["4u8"], 4, 4, Scalar(ScalarKind::U8));
node_type!(VEC4_S16, 38, &["4s16"], 8, 4, Scalar(ScalarKind::S16));
node_type!(VEC4_U16, 39, &["4u16"], 8, 4, Scalar(ScalarKind::U16));
node_type!(VEC4_S32, 40, &["vs32", "4s32"], 16, 4, Scalar(ScalarKind::S32));
node_type!(VEC4_U32, 41, &["vu32", "4u32"], 16, 4, Scalar(ScalarKind::U32));
node_type!(VEC4_S64, 42, &["4s64"], 32, 4, Scalar(ScalarKind::S64));
node_type!(VEC4_U64, 43, &["4u64"], 32, 4, Scalar(ScalarKind::U64));
node_type!(VEC4_FLOAT, 44, &["vf", "4f"], 16, 4, Scalar(ScalarKind::Float));
node_type!(VEC4_DOUBLE, 45, &["4d"], 32, 4, Scalar(ScalarKind::Double));

node_type!(VEC16_S8, 48, &["vs8", "16s8"], 16, 16, Scalar(ScalarKind::S8));
node_type!(VEC16_U8, 49, &["vu8", "16s8"], 16, 16, Scalar(ScalarKind::U8));
node_type!(VEC8_S16, 50, &["vs16", "8s16"], 16, 8, Scalar(ScalarKind::S16));
node_type!(VEC8_U16, 51, &["vu16", "8u16"], 16, 8, Scalar(ScalarKind::U16));

node_type!(BOOL, 52, &["bool", "b"], 1, 1, Scalar(ScalarKind::Bool));
node_type!(VEC2_BOOL, 53, &["2b"], 2, 2, Scalar(ScalarKind::Bool));
node_type!(VEC3_BOOL, 54, &["3b"], 3, 3, Scalar(ScalarKind::Bool));
node_type!(VEC4_BOOL, 55, &["4b"], 4, 4, Scalar(ScalarKind::Bool));
node_type!(VEC16_BOOL, 56, &["vb", "16b"], 16, 16, Scalar(ScalarKind::Bool));

static ALL: &[&NodeType] = &[
    &VOID,
    &S8,
    &U8,
    &S16,
    &U16,
    &S32,
    &U32,
    &S64,
    &U64,
    &BIN,
    &STR,
    &IP4,
    &TIME,
    &FLOAT,
    &DOUBLE,
    &VEC2_S8,
    &VEC2_U8,
    &VEC2_S16,
    &VEC2_U16,
    &VEC2_S32,
    &VEC2_U32,
    &VEC2_S64,
    &VEC2_U64,
    &VEC2_FLOAT,
    &VEC2_DOUBLE,
    &VEC3_S8,
    &VEC3_U8,
    &VEC3_S16,
    &VEC3_U16,
    &VEC3_S32,
    &VEC3_U32,
    &VEC3_S64,
    &VEC3_U64,
    &VEC3_FLOAT,
    &VEC3_DOUBLE,
    &VEC4_S8,
    &VEC4_U8,
    &VEC4_S16,
    &VEC4_U16,
    &VEC4_S32,
    &VEC4_U32,
    &VEC4_S64,
    &VEC4_U64,
    &VEC4_FLOAT,
    &VEC4_DOUBLE,
    &VEC16_S8,
    &VEC16_U8,
    &VEC8_S16,
    &VEC8_U16,
    &BOOL,
    &VEC2_BOOL,
    &VEC3_BOOL,
    &VEC4_BOOL,
    &VEC16_BOOL,
];

/// Look up a node type by its binary id.
pub fn by_id(id: u8) -> Option<&'static NodeType> {
    ALL.iter().copied().find(|t| t.id == id)
}

/// Look up a node type by any of its names.
///
/// `16s8` is an alias of both 16-wide byte vectors; the scan runs highest id
/// first so the unsigned one (id 49) wins, the same answer a name table
/// filled in ascending id order gives.
pub fn by_name(name: &str) -> Option<&'static NodeType> {
    ALL.iter().rev().copied().find(|t| t.names.contains(&name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_id() {
        assert_eq!(by_id(1), Some(&VOID));
        assert_eq!(by_id(7), Some(&U32));
        assert_eq!(by_id(56), Some(&VEC16_BOOL));
        // reserved / control ids are not node types
        assert_eq!(by_id(0), None);
        assert_eq!(by_id(46), None);
        assert_eq!(by_id(47), None);
        assert_eq!(by_id(254), None);
        assert_eq!(by_id(255), None);
    }

    #[test]
    fn test_by_name_aliases() {
        assert_eq!(by_name("u32"), Some(&U32));
        assert_eq!(by_name("binary"), Some(&BIN));
        assert_eq!(by_name("string"), Some(&STR));
        assert_eq!(by_name("f"), Some(&FLOAT));
        assert_eq!(by_name("vd"), Some(&VEC2_DOUBLE));
        assert_eq!(by_name("vs32"), Some(&VEC4_S32));
        assert_eq!(by_name("vu64"), Some(&VEC2_U64));
        assert_eq!(by_name("vb"), Some(&VEC16_BOOL));
        // "16s8" is carried by ids 48 and 49; the unsigned type wins
        assert_eq!(by_name("vs8"), Some(&VEC16_S8));
        assert_eq!(by_name("16s8"), Some(&VEC16_U8));
        assert_eq!(by_name("bogus"), None);
    }

    #[test]
    fn test_sizes_are_consistent() {
        for t in ALL {
            if let TypeKind::Scalar(kind) = t.kind() {
                assert_eq!(t.size(), t.count() * kind.size(), "{}", t.name());
            }
        }
    }

    #[test]
    fn test_ids_are_unique() {
        for (i, a) in ALL.iter().enumerate() {
            for b in &ALL[i + 1..] {
                assert_ne!(a.id(), b.id());
            }
        }
    }
}
