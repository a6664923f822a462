//! Runtime values: the other half of the (value, type) pairs the encoder and
//! decoder operate on. A [`Token`] is the language's own in-memory
//! representation of a Solidity value, independent of how it arrived
//! (literal construction, JSON, or decoding a byte string).

use alloy_primitives::{Address, Signed, U256};
use std::fmt;

use crate::types::ParamType;

/// 256-bit signed integer, matching `int256`'s storage width regardless of
/// the declared `intN` size — narrower widths are range-checked at encode
/// time, not at the type level.
pub type I256 = Signed<256, 4>;

/// A decoded or to-be-encoded Solidity value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `uintN`. Always stored widened to 256 bits; the declared width is
    /// only consulted for range-checking at encode time.
    Uint(U256),
    /// `intN`, two's-complement, widened to 256 bits.
    Int(I256),
    /// `address`.
    Address(Address),
    /// `bool`.
    Bool(bool),
    /// `function`: 20-byte address followed by 4-byte selector.
    Function([u8; 24]),
    /// `string`.
    String(String),
    /// `bytes`.
    Bytes(Vec<u8>),
    /// `bytesN`. The vector's length is the declared `N`.
    FixedBytes(Vec<u8>),
    /// `T[N]`.
    FixedArray(Vec<Token>),
    /// `T[]`.
    Array(Vec<Token>),
    /// `(T1,T2,...)`.
    Tuple(Vec<Token>),
}

impl Token {
    /// True if this token's runtime shape is a valid inhabitant of `ty`.
    /// Encoders call this before marshalling so that a shape mismatch
    /// surfaces as [`crate::error::AbiError::ShapeMismatch`] rather than as a
    /// panic or, worse, silently wrong bytes.
    pub fn matches(&self, ty: &ParamType) -> bool {
        match (self, ty) {
            (Self::Uint(_), ParamType::Uint(_)) => true,
            (Self::Uint(_), ParamType::Address) => true,
            (Self::Address(_), ParamType::Address) => true,
            (Self::Int(_), ParamType::Int(_)) => true,
            (Self::Bool(_), ParamType::Bool) => true,
            (Self::Function(_), ParamType::Function) => true,
            (Self::String(_), ParamType::String) => true,
            (Self::Bytes(_), ParamType::Bytes) => true,
            (Self::FixedBytes(b), ParamType::FixedBytes(n)) => b.len() <= *n,
            (Self::Uint(_), ParamType::FixedBytes(_)) => true,
            (Self::FixedArray(items), ParamType::FixedArray(elem, n)) => {
                items.len() == *n && items.iter().all(|t| t.matches(elem))
            }
            (Self::Array(items), ParamType::Array(elem)) => items.iter().all(|t| t.matches(elem)),
            (Self::Tuple(items), ParamType::Tuple(elems)) => {
                items.len() == elems.len() && items.iter().zip(elems).all(|(t, e)| t.matches(e))
            }
            _ => false,
        }
    }

    /// Whether this token's shape makes it dynamic for encoding purposes,
    /// independent of any declared [`ParamType`] (used when a caller hasn't
    /// paired the token with its type yet, e.g. pretty printing).
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::String(_) | Self::Bytes(_) | Self::Array(_) => true,
            Self::FixedArray(items) => items.iter().any(Token::is_dynamic),
            Self::Tuple(items) => items.iter().any(Token::is_dynamic),
            _ => false,
        }
    }

    /// Convenience constructor for small non-negative integers.
    pub fn uint(value: impl Into<U256>) -> Self {
        Self::Uint(value.into())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Address(a) => write!(f, "{a}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Function(bytes) => write!(f, "{}", alloy_primitives::hex::encode_prefixed(bytes)),
            Self::String(s) => write!(f, "{s}"),
            Self::Bytes(b) | Self::FixedBytes(b) => write!(f, "{}", alloy_primitives::hex::encode_prefixed(b)),
            Self::FixedArray(items) | Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Helper used by [`crate::encode`] to turn small Rust integers into the
/// `U256` that backs [`Token::Uint`] without every call site writing
/// `U256::from(..)`.
pub(crate) fn minimal_be_bytes(value: &U256) -> Vec<u8> {
    let bytes = value.to_be_bytes::<32>();
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(32);
    bytes[first_nonzero..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_basic_shapes() {
        assert!(Token::Uint(U256::from(1u8)).matches(&ParamType::Uint(8)));
        assert!(!Token::Bool(true).matches(&ParamType::Uint(8)));
        assert!(Token::FixedBytes(vec![0u8; 32]).matches(&ParamType::FixedBytes(32)));
        // `bytesN` accepts any byte string of length <= n; it is right-padded
        // at encode time rather than required to already be n bytes long.
        assert!(Token::FixedBytes(vec![0u8; 31]).matches(&ParamType::FixedBytes(32)));
        assert!(!Token::FixedBytes(vec![0u8; 33]).matches(&ParamType::FixedBytes(32)));
        assert!(Token::Uint(U256::from(1u8)).matches(&ParamType::FixedBytes(32)));
    }

    #[test]
    fn matches_nested_shapes() {
        let ty = ParamType::Tuple(vec![ParamType::Bool, ParamType::Array(Box::new(ParamType::Uint(8)))]);
        let ok = Token::Tuple(vec![
            Token::Bool(true),
            Token::Array(vec![Token::Uint(U256::from(1u8)), Token::Uint(U256::from(2u8))]),
        ]);
        assert!(ok.matches(&ty));

        let bad = Token::Tuple(vec![Token::Bool(true), Token::Array(vec![Token::Bool(false)])]);
        assert!(!bad.matches(&ty));
    }
}
