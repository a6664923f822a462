//! Aggregated error type for this crate.

use crate::types::ParamType;

/// Crate-local `Result` alias, following the convention of the error module
/// this crate's structure is modeled on.
pub type Result<T> = std::result::Result<T, AbiError>;

/// Everything that can go wrong parsing a signature, encoding a value, or
/// decoding a byte string against a type.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// A textual signature or type string could not be parsed.
    #[error("failed to parse `{source}` at byte {position}: {reason}")]
    ParseError { source: String, position: usize, reason: String },

    /// A numeric value does not fit in the declared `uintN`/`intN` width.
    #[error("value `{value}` overflows {ty}")]
    TypeOverflow { ty: String, value: String },

    /// The runtime shape of a token does not match the type it's being
    /// encoded/decoded against (e.g. a non-boolean `Token` against `Bool`).
    #[error("expected a value shaped like {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// `encode_packed` was asked to encode a type packed mode can't express
    /// unambiguously (a tuple, or an array of dynamic elements).
    #[error("{ty} cannot be represented in packed encoding")]
    UnsupportedInPackedMode { ty: String },

    /// The decoder ran past the end of the input buffer.
    #[error("truncated input: need {need} bytes at offset {at}, buffer is shorter")]
    TruncatedInput { at: usize, need: usize },

    /// A `bool` slot held a byte other than `0` or `1`.
    #[error("invalid boolean word, last byte was {byte:#04x}")]
    InvalidBoolean { byte: u8 },

    /// No selector in the provided list matched the requested method id.
    #[error("no selector matches method id {method_id:#010x}")]
    NoSelectorMatch { method_id: u32 },

    /// A type descriptor did not resemble any known Solidity shape.
    #[error("unsupported or unrecognized type descriptor: {descriptor}")]
    UnsupportedType { descriptor: String },
}

impl AbiError {
    pub(crate) fn parse(source: impl Into<String>, position: usize, reason: impl Into<String>) -> Self {
        Self::ParseError { source: source.into(), position, reason: reason.into() }
    }

    pub(crate) fn overflow(ty: &ParamType, value: impl std::fmt::Display) -> Self {
        Self::TypeOverflow { ty: ty.to_string(), value: value.to_string() }
    }

    pub(crate) fn shape(expected: &ParamType, actual: impl Into<String>) -> Self {
        Self::ShapeMismatch { expected: expected.to_string(), actual: actual.into() }
    }
}
