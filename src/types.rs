//! The Solidity type model: a sum type covering every shape the ABI can
//! describe, plus the dynamic/static classification that drives the
//! head/tail layout in [`crate::encode`] and [`crate::decode`].

use std::fmt;

use itertools::Itertools;
use serde::Deserialize as _;

/// A single Solidity type, as it appears inside a function signature or a
/// JSON ABI `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// `uintN`, N in 8..=256, a multiple of 8.
    Uint(usize),
    /// `intN`, N in 8..=256, a multiple of 8.
    Int(usize),
    /// `address`. Encoded identically to `Uint(160)`.
    Address,
    /// `bool`.
    Bool,
    /// `function`, a 24-byte opaque external function pointer
    /// (20-byte address + 4-byte selector).
    Function,
    /// `string`, dynamic, UTF-8.
    String,
    /// `bytes`, dynamic, arbitrary.
    Bytes,
    /// `bytesN`, N in 1..=32, fixed-length.
    FixedBytes(usize),
    /// `fixedMxN`. Parsed but never marshalled (see crate-level docs).
    Fixed(usize, usize),
    /// `ufixedMxN`. Parsed but never marshalled.
    UFixed(usize, usize),
    /// `T[N]`, a fixed-length array of N elements of type T.
    FixedArray(Box<ParamType>, usize),
    /// `T[]`, a dynamic-length array of elements of type T.
    Array(Box<ParamType>),
    /// `(T1,T2,...)`, an ordered, possibly empty, list of component types.
    Tuple(Vec<ParamType>),
}

impl ParamType {
    /// Whether this type's encoded length depends on the value (the head/tail
    /// split applies to it).
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::String | Self::Bytes | Self::Array(_) => true,
            Self::FixedArray(elem, len) => *len > 0 && elem.is_dynamic(),
            Self::Tuple(elems) => elems.iter().any(Self::is_dynamic),
            Self::Uint(_)
            | Self::Int(_)
            | Self::Address
            | Self::Bool
            | Self::Function
            | Self::FixedBytes(_)
            | Self::Fixed(_, _)
            | Self::UFixed(_, _) => false,
        }
    }

    /// Number of 32-byte head words this type occupies when it is static.
    /// Meaningless (and never consulted) for dynamic types, which occupy
    /// exactly one head word: an offset.
    pub fn head_words(&self) -> usize {
        match self {
            Self::FixedArray(elem, len) => elem.head_words() * len,
            Self::Tuple(elems) => elems.iter().map(Self::head_words).sum(),
            _ => 1,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(bits) => write!(f, "uint{bits}"),
            Self::Int(bits) => write!(f, "int{bits}"),
            Self::Address => write!(f, "address"),
            Self::Bool => write!(f, "bool"),
            Self::Function => write!(f, "function"),
            Self::String => write!(f, "string"),
            Self::Bytes => write!(f, "bytes"),
            Self::FixedBytes(n) => write!(f, "bytes{n}"),
            Self::Fixed(m, n) => write!(f, "fixed{m}x{n}"),
            Self::UFixed(m, n) => write!(f, "ufixed{m}x{n}"),
            Self::FixedArray(elem, len) => write!(f, "{elem}[{len}]"),
            Self::Array(elem) => write!(f, "{elem}[]"),
            Self::Tuple(elems) => write!(f, "({})", elems.iter().join(",")),
        }
    }
}

impl serde::Serialize for ParamType {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ParamType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        crate::signature::parse_type(&s).map_err(serde::de::Error::custom)
    }
}
