//! The standard ABI decoder: the mirror image of [`crate::encode`]'s
//! head/tail layout. Each dynamic slot's head word is an offset, read
//! relative to the start of the sequence it belongs to (`base`) rather
//! than the start of the whole buffer — nested tuples and arrays each
//! introduce their own `base` for exactly this reason.

use alloy_primitives::{Address, U256};

use crate::encode::{check_int_range, check_uint_range};
use crate::error::{AbiError, Result};
use crate::token::{Token, I256};
use crate::types::ParamType;

const WORD: usize = 32;

/// Decodes `data` against `types` using the standard ABI head/tail layout.
pub fn decode(data: &[u8], types: &[ParamType]) -> Result<Vec<Token>> {
    decode_seq(data, 0, types)
}

fn decode_seq(data: &[u8], base: usize, types: &[ParamType]) -> Result<Vec<Token>> {
    let mut head_cursor = base;
    let mut tokens = Vec::with_capacity(types.len());
    for ty in types {
        if ty.is_dynamic() {
            let offset = read_usize(data, head_cursor)?;
            head_cursor += WORD;
            let tail_pos = base
                .checked_add(offset)
                .ok_or(AbiError::TruncatedInput { at: head_cursor, need: offset })?;
            tokens.push(decode_dynamic(data, tail_pos, ty)?);
        } else {
            let (token, consumed) = decode_static(data, head_cursor, ty)?;
            head_cursor += consumed;
            tokens.push(token);
        }
    }
    Ok(tokens)
}

fn decode_static(data: &[u8], at: usize, ty: &ParamType) -> Result<(Token, usize)> {
    match ty {
        ParamType::Uint(bits) => {
            let word = read_word(data, at)?;
            let value = U256::from_be_bytes(word);
            check_uint_range(&value, *bits, ty)?;
            Ok((Token::Uint(value), WORD))
        }
        ParamType::Int(bits) => {
            let word = read_word(data, at)?;
            let value = I256::from_be_bytes::<WORD>(word);
            check_int_range(&value, *bits, ty)?;
            Ok((Token::Int(value), WORD))
        }
        ParamType::Address => {
            let word = read_word(data, at)?;
            Ok((Token::Address(Address::from_slice(&word[12..])), WORD))
        }
        ParamType::Bool => {
            let word = read_word(data, at)?;
            let last = word[WORD - 1];
            if word[..WORD - 1].iter().any(|&b| b != 0) || !matches!(last, 0 | 1) {
                return Err(AbiError::InvalidBoolean { byte: last });
            }
            Ok((Token::Bool(last == 1), WORD))
        }
        ParamType::Function => {
            let word = read_word(data, at)?;
            let mut bytes = [0u8; 24];
            bytes.copy_from_slice(&word[..24]);
            Ok((Token::Function(bytes), WORD))
        }
        ParamType::FixedBytes(n) => {
            let word = read_word(data, at)?;
            Ok((Token::FixedBytes(word[..*n].to_vec()), WORD))
        }
        ParamType::Fixed(_, _) | ParamType::UFixed(_, _) => {
            Err(AbiError::UnsupportedType { descriptor: ty.to_string() })
        }
        ParamType::FixedArray(elem, len) => {
            let types: Vec<ParamType> = std::iter::repeat((**elem).clone()).take(*len).collect();
            let items = decode_seq(data, at, &types)?;
            Ok((Token::FixedArray(items), ty.head_words() * WORD))
        }
        ParamType::Tuple(elems) => {
            let items = decode_seq(data, at, elems)?;
            Ok((Token::Tuple(items), ty.head_words() * WORD))
        }
        ParamType::String | ParamType::Bytes | ParamType::Array(_) => {
            unreachable!("dynamic types are routed through decode_dynamic")
        }
    }
}

fn decode_dynamic(data: &[u8], at: usize, ty: &ParamType) -> Result<Token> {
    match ty {
        ParamType::String => {
            let len = read_usize(data, at)?;
            let bytes = read_bytes(data, at + WORD, len)?;
            let s = String::from_utf8(bytes.to_vec()).map_err(|_| AbiError::shape(ty, "invalid utf-8 bytes"))?;
            Ok(Token::String(s))
        }
        ParamType::Bytes => {
            let len = read_usize(data, at)?;
            let bytes = read_bytes(data, at + WORD, len)?;
            Ok(Token::Bytes(bytes.to_vec()))
        }
        ParamType::Array(elem) => {
            let len = read_usize(data, at)?;
            let types: Vec<ParamType> = std::iter::repeat((**elem).clone()).take(len).collect();
            let items = decode_seq(data, at + WORD, &types)?;
            Ok(Token::Array(items))
        }
        ParamType::FixedArray(elem, len) => {
            let types: Vec<ParamType> = std::iter::repeat((**elem).clone()).take(*len).collect();
            let items = decode_seq(data, at, &types)?;
            Ok(Token::FixedArray(items))
        }
        ParamType::Tuple(elems) => {
            let items = decode_seq(data, at, elems)?;
            Ok(Token::Tuple(items))
        }
        _ => unreachable!("static types are routed through decode_static"),
    }
}

fn read_word(data: &[u8], at: usize) -> Result<[u8; WORD]> {
    let end = at.checked_add(WORD).ok_or(AbiError::TruncatedInput { at, need: WORD })?;
    if end > data.len() {
        return Err(AbiError::TruncatedInput { at, need: WORD });
    }
    let mut word = [0u8; WORD];
    word.copy_from_slice(&data[at..end]);
    Ok(word)
}

fn read_bytes<'a>(data: &'a [u8], at: usize, len: usize) -> Result<&'a [u8]> {
    let end = at.checked_add(len).ok_or(AbiError::TruncatedInput { at, need: len })?;
    if end > data.len() {
        return Err(AbiError::TruncatedInput { at, need: len });
    }
    Ok(&data[at..end])
}

fn read_usize(data: &[u8], at: usize) -> Result<usize> {
    let word = read_word(data, at)?;
    let value = U256::from_be_bytes(word);
    usize::try_from(value).map_err(|_| AbiError::TruncatedInput { at, need: usize::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{encode, encode_packed};

    #[test]
    fn round_trips_simple_uint() {
        let tokens = [Token::Uint(U256::from(42u8))];
        let types = [ParamType::Uint(256)];
        let bytes = encode(&tokens, &types).unwrap();
        let decoded = decode(&bytes, &types).unwrap();
        assert_eq!(decoded, tokens);
    }

    #[test]
    fn round_trips_dynamic_string() {
        let tokens = [Token::String("hello, ABI".to_owned())];
        let types = [ParamType::String];
        let bytes = encode(&tokens, &types).unwrap();
        assert_eq!(decode(&bytes, &types).unwrap(), tokens);
    }

    #[test]
    fn round_trips_array_of_arrays() {
        let ty = ParamType::Array(Box::new(ParamType::Array(Box::new(ParamType::Uint(256)))));
        let token = Token::Array(vec![
            Token::Array(vec![Token::uint(1u8), Token::uint(2u8)]),
            Token::Array(vec![Token::uint(3u8)]),
        ]);
        let bytes = encode(std::slice::from_ref(&token), std::slice::from_ref(&ty)).unwrap();
        let decoded = decode(&bytes, std::slice::from_ref(&ty)).unwrap();
        assert_eq!(decoded, vec![token]);
    }

    #[test]
    fn round_trips_mixed_tuple() {
        let ty = ParamType::Tuple(vec![
            ParamType::Bool,
            ParamType::Array(Box::new(ParamType::Uint(256))),
            ParamType::String,
        ]);
        let token = Token::Tuple(vec![
            Token::Bool(true),
            Token::Array(vec![Token::uint(1u8), Token::uint(2u8), Token::uint(3u8)]),
            Token::String("tail".to_owned()),
        ]);
        let bytes = encode(std::slice::from_ref(&token), std::slice::from_ref(&ty)).unwrap();
        let decoded = decode(&bytes, std::slice::from_ref(&ty)).unwrap();
        assert_eq!(decoded, vec![token]);
    }

    #[test]
    fn rejects_malformed_bool() {
        let mut bytes = vec![0u8; 32];
        bytes[31] = 2;
        let err = decode(&bytes, &[ParamType::Bool]).unwrap_err();
        assert!(matches!(err, AbiError::InvalidBoolean { byte: 2 }));
    }

    #[test]
    fn rejects_truncated_input() {
        let bytes = vec![0u8; 10];
        let err = decode(&bytes, &[ParamType::Uint(256)]).unwrap_err();
        assert!(matches!(err, AbiError::TruncatedInput { .. }));
    }

    #[test]
    fn rejects_invalid_utf8_string() {
        // length = 1, payload byte 0xff is not valid UTF-8.
        let mut bytes = vec![0u8; 64];
        bytes[31] = 1;
        bytes[32] = 0xff;
        let err = decode(&bytes, &[ParamType::String]).unwrap_err();
        assert!(matches!(err, AbiError::ShapeMismatch { .. }));
    }

    #[test]
    fn packed_mode_has_no_inverse() {
        // encode_packed deliberately has no matching decode entrypoint;
        // this only asserts the packed bytes are shorter than the
        // standard encoding would be, which is the entire point of packed mode.
        let tokens = [Token::uint(1u8)];
        let types = [ParamType::Uint(8)];
        let packed = encode_packed(&tokens, &types).unwrap();
        let standard = encode(&tokens, &types).unwrap();
        assert!(packed.len() < standard.len());
    }
}
