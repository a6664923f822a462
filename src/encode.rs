//! The standard and packed ABI encoders.
//!
//! The standard encoder is the classic two-pass head/tail algorithm: a
//! first pass decides which slots are static (and can be written directly
//! into the head) and which are dynamic (get a placeholder offset word in
//! the head, with their real bytes appended to a tail blob); a second pass
//! rewrites each placeholder once the tail's layout — and therefore every
//! offset — is known. [`encode_seq`] is that algorithm; everything else in
//! this module either produces head/tail-eligible bytes for one value or
//! recurses into [`encode_seq`] for a nested sequence (tuple, array).

use alloy_primitives::U256;

use crate::error::{AbiError, Result};
use crate::token::{minimal_be_bytes, Token};
use crate::types::ParamType;

const WORD: usize = 32;

/// Encodes `tokens` against `types` using the standard ABI head/tail
/// layout, as used for calldata and return data.
pub fn encode(tokens: &[Token], types: &[ParamType]) -> Result<Vec<u8>> {
    check_arity(tokens, types)?;
    let pairs: Vec<(&Token, &ParamType)> = tokens.iter().zip(types).collect();
    encode_seq(&pairs)
}

/// Encodes `tokens` against `types` using `encodePacked` semantics: no
/// offsets, no length-word framing for fixed-size elements, everything
/// concatenated tightly at each value's minimal byte width.
///
/// Tuples are always rejected (nesting one inside a packed blob is
/// ambiguous to decode and disallowed by the same rule Solidity's own
/// `abi.encodePacked` follows), as are arrays whose element type is
/// itself dynamic or a tuple. Arrays of plain value types are fine.
pub fn encode_packed(tokens: &[Token], types: &[ParamType]) -> Result<Vec<u8>> {
    check_arity(tokens, types)?;
    let mut out = Vec::new();
    for (token, ty) in tokens.iter().zip(types) {
        if !token.matches(ty) {
            return Err(AbiError::shape(ty, token.to_string()));
        }
        out.extend(pack_value(token, ty)?);
    }
    Ok(out)
}

fn check_arity(tokens: &[Token], types: &[ParamType]) -> Result<()> {
    if tokens.len() != types.len() {
        return Err(AbiError::ShapeMismatch {
            expected: format!("{} value(s)", types.len()),
            actual: format!("{} value(s)", tokens.len()),
        });
    }
    Ok(())
}

/// Encodes a sequence of (token, type) pairs — a top-level argument list,
/// a tuple's components, or an array's elements — applying the head/tail
/// split across exactly this sequence.
pub(crate) fn encode_seq(pairs: &[(&Token, &ParamType)]) -> Result<Vec<u8>> {
    for (token, ty) in pairs {
        if !token.matches(ty) {
            return Err(AbiError::shape(ty, token.to_string()));
        }
    }

    let mut heads = Vec::with_capacity(pairs.len());
    let mut tails = Vec::with_capacity(pairs.len());
    for (token, ty) in pairs {
        if ty.is_dynamic() {
            heads.push(None);
            tails.push(encode_dynamic(token, ty)?);
        } else {
            heads.push(Some(encode_static(token, ty)?));
            tails.push(Vec::new());
        }
    }

    let head_len: usize = pairs.iter().map(|(_, ty)| if ty.is_dynamic() { WORD } else { ty.head_words() * WORD }).sum();

    let mut head_out = Vec::with_capacity(head_len);
    let mut tail_out = Vec::with_capacity(tails.iter().map(Vec::len).sum());
    let mut offset = head_len;
    for (head, tail) in heads.into_iter().zip(tails) {
        match head {
            Some(bytes) => head_out.extend(bytes),
            None => {
                head_out.extend(word_from_u64(offset as u64));
                offset += tail.len();
                tail_out.extend(tail);
            }
        }
    }

    head_out.extend(tail_out);
    Ok(head_out)
}

fn encode_static(token: &Token, ty: &ParamType) -> Result<Vec<u8>> {
    match ty {
        ParamType::Uint(bits) => encode_uint_word(token, *bits, ty),
        ParamType::Int(bits) => encode_int_word(token, *bits, ty),
        ParamType::Address => encode_address_word(token, ty),
        ParamType::Bool => encode_bool_word(token, ty),
        ParamType::Function => encode_function_word(token, ty),
        ParamType::FixedBytes(n) => encode_fixed_bytes_word(token, *n, ty),
        ParamType::Fixed(_, _) | ParamType::UFixed(_, _) => {
            Err(AbiError::UnsupportedType { descriptor: ty.to_string() })
        }
        ParamType::FixedArray(elem, len) => {
            let items = expect_array(token, ty)?;
            if items.len() != *len {
                return Err(AbiError::shape(ty, token.to_string()));
            }
            let mut out = Vec::with_capacity(elem.head_words() * len * WORD);
            for item in items {
                out.extend(encode_static(item, elem)?);
            }
            Ok(out)
        }
        ParamType::Tuple(elems) => {
            let items = expect_tuple(token, ty)?;
            let mut out = Vec::new();
            for (item, elem_ty) in items.iter().zip(elems) {
                out.extend(encode_static(item, elem_ty)?);
            }
            Ok(out)
        }
        ParamType::String | ParamType::Bytes | ParamType::Array(_) => {
            unreachable!("dynamic types are routed through encode_dynamic")
        }
    }
}

fn encode_dynamic(token: &Token, ty: &ParamType) -> Result<Vec<u8>> {
    match ty {
        ParamType::String => {
            let s = expect_string(token, ty)?;
            Ok(encode_length_prefixed(s.as_bytes()))
        }
        ParamType::Bytes => {
            let b = expect_bytes(token, ty)?;
            Ok(encode_length_prefixed(b))
        }
        ParamType::Array(elem) => {
            let items = expect_array(token, ty)?;
            let mut out = word_from_u64(items.len() as u64).to_vec();
            let pairs: Vec<(&Token, &ParamType)> = items.iter().map(|t| (t, elem.as_ref())).collect();
            out.extend(encode_seq(&pairs)?);
            Ok(out)
        }
        ParamType::FixedArray(elem, len) => {
            let items = expect_array(token, ty)?;
            if items.len() != *len {
                return Err(AbiError::shape(ty, token.to_string()));
            }
            let pairs: Vec<(&Token, &ParamType)> = items.iter().map(|t| (t, elem.as_ref())).collect();
            encode_seq(&pairs)
        }
        ParamType::Tuple(elems) => {
            let items = expect_tuple(token, ty)?;
            let pairs: Vec<(&Token, &ParamType)> = items.iter().zip(elems).collect();
            encode_seq(&pairs)
        }
        _ => unreachable!("static types are routed through encode_static"),
    }
}

fn encode_length_prefixed(data: &[u8]) -> Vec<u8> {
    let mut out = word_from_u64(data.len() as u64).to_vec();
    out.extend_from_slice(data);
    let pad = (WORD - (data.len() % WORD)) % WORD;
    out.extend(std::iter::repeat(0u8).take(pad));
    out
}

fn word_from_u64(n: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&n.to_be_bytes());
    word
}

fn encode_uint_word(token: &Token, bits: usize, ty: &ParamType) -> Result<Vec<u8>> {
    let value = expect_uint(token, ty)?;
    check_uint_range(value, bits, ty)?;
    Ok(value.to_be_bytes::<WORD>().to_vec())
}

fn encode_int_word(token: &Token, bits: usize, ty: &ParamType) -> Result<Vec<u8>> {
    let value = match token {
        Token::Int(v) => v,
        _ => return Err(AbiError::shape(ty, token.to_string())),
    };
    check_int_range(value, bits, ty)?;
    Ok(value.to_be_bytes::<WORD>().to_vec())
}

fn encode_address_word(token: &Token, ty: &ParamType) -> Result<Vec<u8>> {
    match token {
        Token::Address(addr) => {
            let mut word = [0u8; WORD];
            word[12..].copy_from_slice(addr.as_slice());
            Ok(word.to_vec())
        }
        Token::Uint(v) => {
            check_uint_range(v, 160, ty)?;
            Ok(v.to_be_bytes::<WORD>().to_vec())
        }
        _ => Err(AbiError::shape(ty, token.to_string())),
    }
}

fn encode_bool_word(token: &Token, ty: &ParamType) -> Result<Vec<u8>> {
    match token {
        Token::Bool(b) => {
            let mut word = [0u8; WORD];
            word[WORD - 1] = u8::from(*b);
            Ok(word.to_vec())
        }
        _ => Err(AbiError::shape(ty, token.to_string())),
    }
}

fn encode_function_word(token: &Token, ty: &ParamType) -> Result<Vec<u8>> {
    match token {
        Token::Function(bytes) => {
            let mut word = [0u8; WORD];
            word[..24].copy_from_slice(bytes);
            Ok(word.to_vec())
        }
        _ => Err(AbiError::shape(ty, token.to_string())),
    }
}

/// `bytesN` accepts a byte string of length `<= n` (right-padded to the
/// word) or an integer, converted to its minimal big-endian representation
/// and placed the same way.
fn encode_fixed_bytes_word(token: &Token, n: usize, ty: &ParamType) -> Result<Vec<u8>> {
    let bytes = match token {
        Token::FixedBytes(b) if b.len() <= n => b.clone(),
        Token::Uint(v) => {
            let minimal = minimal_be_bytes(v);
            if minimal.len() > n {
                return Err(AbiError::overflow(ty, v));
            }
            minimal
        }
        _ => return Err(AbiError::shape(ty, token.to_string())),
    };
    let mut word = [0u8; WORD];
    word[..bytes.len()].copy_from_slice(&bytes);
    Ok(word.to_vec())
}

fn expect_uint<'a>(token: &'a Token, ty: &ParamType) -> Result<&'a U256> {
    match token {
        Token::Uint(v) => Ok(v),
        _ => Err(AbiError::shape(ty, token.to_string())),
    }
}

fn expect_string<'a>(token: &'a Token, ty: &ParamType) -> Result<&'a str> {
    match token {
        Token::String(s) => Ok(s.as_str()),
        _ => Err(AbiError::shape(ty, token.to_string())),
    }
}

fn expect_bytes<'a>(token: &'a Token, ty: &ParamType) -> Result<&'a [u8]> {
    match token {
        Token::Bytes(b) => Ok(b.as_slice()),
        _ => Err(AbiError::shape(ty, token.to_string())),
    }
}

fn expect_array<'a>(token: &'a Token, ty: &ParamType) -> Result<&'a [Token]> {
    match token {
        Token::Array(items) | Token::FixedArray(items) => Ok(items.as_slice()),
        _ => Err(AbiError::shape(ty, token.to_string())),
    }
}

fn expect_tuple<'a>(token: &'a Token, ty: &ParamType) -> Result<&'a [Token]> {
    match token {
        Token::Tuple(items) => Ok(items.as_slice()),
        _ => Err(AbiError::shape(ty, token.to_string())),
    }
}

pub(crate) fn check_uint_range(value: &U256, bits: usize, ty: &ParamType) -> Result<()> {
    if bits >= 256 {
        return Ok(());
    }
    let bound = U256::from(1u8) << bits;
    if *value < bound {
        Ok(())
    } else {
        Err(AbiError::overflow(ty, value))
    }
}

pub(crate) fn check_int_range(value: &crate::token::I256, bits: usize, ty: &ParamType) -> Result<()> {
    if bits >= 256 {
        return Ok(());
    }
    // Per spec: the valid range is [-2^(b-1)+1, 2^(b-1)-1], an exclusive
    // lower bound that refuses the minimum two's-complement value. So the
    // magnitude check is strict on both sides, not just the positive one.
    let bound = U256::from(1u8) << (bits - 1);
    let magnitude = value.unsigned_abs();
    if magnitude < bound {
        Ok(())
    } else {
        Err(AbiError::overflow(ty, value))
    }
}

/// Whether `ty` may appear as the element type of an array in packed mode:
/// anything that isn't itself dynamic (so its packed width is fixed and
/// unambiguous) and isn't a tuple.
fn packable_array_element(ty: &ParamType) -> bool {
    !ty.is_dynamic() && !matches!(ty, ParamType::Tuple(_))
}

fn pack_value(token: &Token, ty: &ParamType) -> Result<Vec<u8>> {
    match ty {
        ParamType::Tuple(_) => Err(AbiError::UnsupportedInPackedMode { ty: ty.to_string() }),
        ParamType::Array(elem) | ParamType::FixedArray(elem, _) => {
            if !packable_array_element(elem) {
                return Err(AbiError::UnsupportedInPackedMode { ty: ty.to_string() });
            }
            let items = expect_array(token, ty)?;
            let mut out = Vec::new();
            for item in items {
                out.extend(pack_value(item, elem)?);
            }
            Ok(out)
        }
        _ => pack_primitive(token, ty),
    }
}

fn pack_primitive(token: &Token, ty: &ParamType) -> Result<Vec<u8>> {
    match ty {
        ParamType::Uint(bits) => {
            let value = expect_uint(token, ty)?;
            check_uint_range(value, *bits, ty)?;
            let word = value.to_be_bytes::<WORD>();
            Ok(word[WORD - bits / 8..].to_vec())
        }
        ParamType::Int(bits) => {
            let value = match token {
                Token::Int(v) => v,
                _ => return Err(AbiError::shape(ty, token.to_string())),
            };
            check_int_range(value, *bits, ty)?;
            let word = value.to_be_bytes::<WORD>();
            Ok(word[WORD - bits / 8..].to_vec())
        }
        ParamType::Address => match token {
            Token::Address(addr) => Ok(addr.as_slice().to_vec()),
            Token::Uint(v) => {
                check_uint_range(v, 160, ty)?;
                Ok(v.to_be_bytes::<WORD>()[12..].to_vec())
            }
            _ => Err(AbiError::shape(ty, token.to_string())),
        },
        ParamType::Bool => match token {
            Token::Bool(b) => Ok(vec![u8::from(*b)]),
            _ => Err(AbiError::shape(ty, token.to_string())),
        },
        ParamType::Function => match token {
            Token::Function(b) => Ok(b.to_vec()),
            _ => Err(AbiError::shape(ty, token.to_string())),
        },
        ParamType::FixedBytes(n) => match token {
            Token::FixedBytes(b) if b.len() <= *n => {
                let mut out = vec![0u8; *n];
                out[..b.len()].copy_from_slice(b);
                Ok(out)
            }
            Token::Uint(v) => {
                let minimal = minimal_be_bytes(v);
                if minimal.len() > *n {
                    return Err(AbiError::overflow(ty, v));
                }
                let mut out = vec![0u8; *n];
                out[..minimal.len()].copy_from_slice(&minimal);
                Ok(out)
            }
            _ => Err(AbiError::shape(ty, token.to_string())),
        },
        ParamType::String => Ok(expect_string(token, ty)?.as_bytes().to_vec()),
        ParamType::Bytes => Ok(expect_bytes(token, ty)?.to_vec()),
        ParamType::Fixed(_, _) | ParamType::UFixed(_, _) => {
            Err(AbiError::UnsupportedType { descriptor: ty.to_string() })
        }
        ParamType::Array(_) | ParamType::FixedArray(_, _) | ParamType::Tuple(_) => {
            unreachable!("containers are routed through pack_value")
        }
    }
}
