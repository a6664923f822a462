//! Ethereum contract ABI: parsing Solidity type signatures and JSON ABI
//! documents, and encoding/decoding values against the standard and
//! packed calldata layouts.
//!
//! ```
//! use ethabi_rs::{encode, ParamType, Token};
//!
//! let bytes = encode(
//!     &[Token::Uint(alloy_primitives::U256::from(69u8))],
//!     &[ParamType::Uint(256)],
//! ).unwrap();
//! assert_eq!(bytes.len(), 32);
//! ```

pub mod decode;
pub mod dispatch;
pub mod encode;
pub mod error;
pub mod keccak;
pub mod selector;
pub mod signature;
pub mod spec;
pub mod token;
pub mod types;

pub use decode::decode;
pub use dispatch::{decode_event, find_and_decode, find_by_method_id, find_event};
pub use encode::{encode, encode_packed};
pub use error::{AbiError, Result};
pub use keccak::hash256;
pub use selector::{Selector, SelectorKind, StateMutability};
pub use signature::{parse_signature, parse_type, ParsedSignature};
pub use spec::parse_abi;
pub use token::{Token, I256};
pub use types::ParamType;
