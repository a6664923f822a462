//! Lexer and recursive-descent parser for textual Solidity signatures
//! (`transfer(address,uint256)`) and single type strings (`uint256[2][]`).
//!
//! ```text
//! Selector  := Ident '(' TypeList? ')'
//! TypeList  := Type (',' Type)*
//! Type      := Base Suffix*
//! Base      := 'uint' Digits? | 'int' Digits? | 'address' | 'bool'
//!            | 'string' | 'bytes' Digits? | 'function'
//!            | 'fixed' Digits 'x' Digits | 'ufixed' Digits 'x' Digits
//!            | 'enum'
//!            | '(' TypeList? ')'
//! Suffix    := '[' Digits? ']'
//! Ident     := [A-Za-z_][A-Za-z0-9_]*
//! ```

use crate::error::{AbiError, Result};
use crate::types::ParamType;

/// The name and input types parsed out of a textual function/event
/// signature. Carries no id — callers that need one hash the canonical
/// signature themselves (see [`crate::selector`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSignature {
    pub name: String,
    pub inputs: Vec<ParamType>,
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, bytes: src.as_bytes(), pos: 0 }
    }

    fn err(&self, reason: impl Into<String>) -> AbiError {
        AbiError::parse(self.src, self.pos, reason)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect_byte(&mut self, b: u8) -> Result<()> {
        self.skip_ws();
        if self.peek() == Some(b) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.err(format!("expected '{}'", b as char)))
        }
    }

    fn parse_ident(&mut self) -> Result<&'a str> {
        self.skip_ws();
        let start = self.pos;
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.pos += 1,
            _ => return Err(self.err("expected an identifier")),
        }
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        Ok(&self.src[start..self.pos])
    }

    fn parse_digits(&mut self) -> Option<usize> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            None
        } else {
            self.src[start..self.pos].parse().ok()
        }
    }

    /// Parses a full `name(type,type,...)` signature.
    fn parse_selector(&mut self) -> Result<ParsedSignature> {
        let name = self.parse_ident()?.to_owned();
        let inputs = self.parse_type_list_parenthesized()?;
        self.skip_ws();
        if self.pos != self.bytes.len() {
            return Err(self.err("unexpected trailing input"));
        }
        Ok(ParsedSignature { name, inputs })
    }

    /// Parses `(` TypeList? `)`.
    fn parse_type_list_parenthesized(&mut self) -> Result<Vec<ParamType>> {
        self.expect_byte(b'(')?;
        self.skip_ws();
        let mut types = Vec::new();
        if self.peek() != Some(b')') {
            loop {
                types.push(self.parse_type()?);
                self.skip_ws();
                match self.peek() {
                    Some(b',') => {
                        self.pos += 1;
                    }
                    _ => break,
                }
            }
        }
        self.expect_byte(b')')?;
        Ok(types)
    }

    /// Parses a single type including any trailing `[]`/`[N]` suffixes.
    fn parse_type(&mut self) -> Result<ParamType> {
        self.skip_ws();
        let mut ty = if self.peek() == Some(b'(') {
            ParamType::Tuple(self.parse_type_list_parenthesized()?)
        } else {
            self.parse_base()?
        };

        loop {
            self.skip_ws();
            if self.peek() != Some(b'[') {
                break;
            }
            self.pos += 1;
            let len = self.parse_digits();
            self.expect_byte(b']')?;
            ty = match len {
                Some(n) => ParamType::FixedArray(Box::new(ty), n),
                None => ParamType::Array(Box::new(ty)),
            };
        }
        Ok(ty)
    }

    fn parse_base(&mut self) -> Result<ParamType> {
        let start = self.pos;
        let ident = self.parse_ident()?;
        match ident {
            "address" => Ok(ParamType::Address),
            "bool" => Ok(ParamType::Bool),
            "string" => Ok(ParamType::String),
            "function" => Ok(ParamType::Function),
            // `enum` never appears with a size suffix in a bare signature;
            // it normalizes straight to uint8.
            "enum" => Ok(ParamType::Uint(8)),
            "bytes" => {
                let digits_start = self.pos;
                match self.parse_digits() {
                    None => Ok(ParamType::Bytes),
                    Some(n) => {
                        if n == 0 || n > 32 {
                            self.pos = digits_start;
                            return Err(self.err(format!("bytesN size {n} out of range 1..=32")));
                        }
                        Ok(ParamType::FixedBytes(n))
                    }
                }
            }
            "uint" => self.parse_sized_int(start, false),
            "int" => self.parse_sized_int(start, true),
            "fixed" => self.parse_fixed(false),
            "ufixed" => self.parse_fixed(true),
            other => {
                self.pos = start;
                Err(self.err(format!("unrecognized base type '{other}'")))
            }
        }
    }

    fn parse_sized_int(&mut self, base_start: usize, signed: bool) -> Result<ParamType> {
        let digits_start = self.pos;
        match self.parse_digits() {
            None => Ok(if signed { ParamType::Int(256) } else { ParamType::Uint(256) }),
            Some(bits) => {
                if bits == 0 || bits > 256 || bits % 8 != 0 {
                    self.pos = base_start;
                    return Err(self.err(format!("integer size {bits} is not a multiple of 8 in 8..=256")));
                }
                let _ = digits_start;
                Ok(if signed { ParamType::Int(bits) } else { ParamType::Uint(bits) })
            }
        }
    }

    fn parse_fixed(&mut self, unsigned: bool) -> Result<ParamType> {
        self.skip_ws();
        let has_m = matches!(self.peek(), Some(b) if b.is_ascii_digit());
        if !has_m {
            // bare `fixed`/`ufixed` defaults to 128x18.
            return Ok(if unsigned { ParamType::UFixed(128, 18) } else { ParamType::Fixed(128, 18) });
        }
        let m = self.parse_digits().ok_or_else(|| self.err("expected fixed-point integer bits"))?;
        self.expect_byte(b'x')?;
        let n = self.parse_digits().ok_or_else(|| self.err("expected fixed-point fractional digits"))?;
        Ok(if unsigned { ParamType::UFixed(m, n) } else { ParamType::Fixed(m, n) })
    }
}

/// Parses a textual function/event/error signature, e.g.
/// `transfer(address,uint256)`.
pub fn parse_signature(sig: &str) -> Result<ParsedSignature> {
    Parser::new(sig).parse_selector()
}

/// Parses a single type string, e.g. `uint256[2][]` or `(bool,bytes32)`.
pub fn parse_type(ty: &str) -> Result<ParamType> {
    let mut parser = Parser::new(ty);
    let parsed = parser.parse_type()?;
    parser.skip_ws();
    if parser.pos != parser.bytes.len() {
        return Err(parser.err("unexpected trailing input"));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_types() {
        assert_eq!(parse_type("uint256").unwrap(), ParamType::Uint(256));
        assert_eq!(parse_type("uint").unwrap(), ParamType::Uint(256));
        assert_eq!(parse_type("int8").unwrap(), ParamType::Int(8));
        assert_eq!(parse_type("address").unwrap(), ParamType::Address);
        assert_eq!(parse_type("bool").unwrap(), ParamType::Bool);
        assert_eq!(parse_type("string").unwrap(), ParamType::String);
        assert_eq!(parse_type("bytes").unwrap(), ParamType::Bytes);
        assert_eq!(parse_type("bytes32").unwrap(), ParamType::FixedBytes(32));
        assert_eq!(parse_type("function").unwrap(), ParamType::Function);
        assert_eq!(parse_type("enum").unwrap(), ParamType::Uint(8));
    }

    #[test]
    fn parses_fixed_defaults() {
        assert_eq!(parse_type("fixed").unwrap(), ParamType::Fixed(128, 18));
        assert_eq!(parse_type("ufixed").unwrap(), ParamType::UFixed(128, 18));
        assert_eq!(parse_type("fixed64x8").unwrap(), ParamType::Fixed(64, 8));
    }

    #[test]
    fn rejects_bad_sizes() {
        assert!(parse_type("uint7").is_err());
        assert!(parse_type("uint257").is_err());
        assert!(parse_type("bytes0").is_err());
        assert!(parse_type("bytes33").is_err());
    }

    #[test]
    fn parses_arrays() {
        assert_eq!(parse_type("uint256[]").unwrap(), ParamType::Array(Box::new(ParamType::Uint(256))));
        assert_eq!(parse_type("uint256[2]").unwrap(), ParamType::FixedArray(Box::new(ParamType::Uint(256)), 2));
        assert_eq!(
            parse_type("uint256[2][]").unwrap(),
            ParamType::Array(Box::new(ParamType::FixedArray(Box::new(ParamType::Uint(256)), 2)))
        );
    }

    #[test]
    fn parses_tuples() {
        assert_eq!(parse_type("()").unwrap(), ParamType::Tuple(vec![]));
        assert_eq!(
            parse_type("(bool,uint256)").unwrap(),
            ParamType::Tuple(vec![ParamType::Bool, ParamType::Uint(256)])
        );
        assert_eq!(
            parse_type("(bool,(uint256,string))").unwrap(),
            ParamType::Tuple(vec![
                ParamType::Bool,
                ParamType::Tuple(vec![ParamType::Uint(256), ParamType::String])
            ])
        );
    }

    #[test]
    fn parses_full_signature() {
        let parsed = parse_signature("transfer(address,uint256)").unwrap();
        assert_eq!(parsed.name, "transfer");
        assert_eq!(parsed.inputs, vec![ParamType::Address, ParamType::Uint(256)]);

        let empty = parse_signature("kill()").unwrap();
        assert_eq!(empty.name, "kill");
        assert!(empty.inputs.is_empty());
    }

    #[test]
    fn tolerates_whitespace() {
        let parsed = parse_signature("transfer(address, uint256)").unwrap();
        assert_eq!(parsed.inputs, vec![ParamType::Address, ParamType::Uint(256)]);
    }

    #[test]
    fn rejects_unbalanced_parens() {
        assert!(parse_signature("foo(bool,uint256))").is_err());
        assert!(parse_signature("foo(bool,uint256").is_err());
    }

    #[test]
    fn idempotent_canonical_form() {
        for sig in ["transfer(address,uint256)", "foo((bool,uint256)[2],bytes32)", "bar()"] {
            let parsed = parse_signature(sig).unwrap();
            let canonical = format!(
                "{}({})",
                parsed.name,
                parsed.inputs.iter().map(ParamType::to_string).collect::<Vec<_>>().join(",")
            );
            let reparsed = parse_signature(&canonical).unwrap();
            assert_eq!(parsed, reparsed);
        }
    }
}
