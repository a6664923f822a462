//! The unified selector record: one shape for functions, constructors,
//! fallbacks, receives, events, and errors, per the single data model the
//! spec-parser and dispatch layers both build on.

use itertools::Itertools;
use serde::{Deserialize as _, Serialize as _};
use serde_json::Value;

use crate::keccak::hash256;
use crate::types::ParamType;

/// What kind of ABI entry a [`Selector`] was built from. Fallback and
/// receive carry no name, inputs, outputs, or id; they exist only so a
/// contract's ABI can record that one (or both) is present and its state
/// mutability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    Function,
    Constructor,
    Fallback,
    Receive,
    Event,
    Error,
}

/// Mirrors Solidity's `stateMutability`. Only meaningful for `Function`,
/// `Constructor`, `Fallback`, and `Receive`; events and errors leave it at
/// `NonPayable` without consulting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    NonPayable,
    Payable,
}

/// One entry of a contract ABI: a function, constructor, fallback, receive,
/// event, or custom error.
///
/// Inputs and outputs are stored as parallel vectors (types alongside
/// names) rather than a `Vec<Param>` of paired structs, matching the
/// spec's own unified record layout. Elements with no declared name carry
/// an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub kind: SelectorKind,
    pub name: String,
    pub inputs: Vec<ParamType>,
    pub input_names: Vec<String>,
    pub outputs: Vec<ParamType>,
    pub output_names: Vec<String>,
    /// For events only: parallel to `inputs`, whether that input is
    /// `indexed`. Empty for every other kind.
    pub indexed: Vec<bool>,
    pub state_mutability: StateMutability,
    /// Events declared `anonymous` omit topic0 and are never matched by
    /// [`crate::dispatch::find_event`].
    pub anonymous: bool,
}

impl Selector {
    /// The canonical signature string this selector hashes to:
    /// `name(type1,type2,...)`. Constructors conventionally use the empty
    /// name `constructor` is not part of the canonical signature itself in
    /// most tooling, but this crate follows the spec and keeps whatever
    /// name was supplied (usually empty for constructors).
    pub fn canonical_signature(&self) -> String {
        format!("{}({})", self.name, self.inputs.iter().join(","))
    }

    /// The 4-byte method id (functions, constructors, errors) or 32-byte
    /// event topic0 (events), derived by hashing the *canonical* signature
    /// — never the original source text, which may use non-canonical
    /// spellings like `uint` in place of `uint256`.
    ///
    /// Returns `None` for `Fallback`/`Receive`, and for anonymous events
    /// (which never populate topic0).
    pub fn id(&self) -> Option<Vec<u8>> {
        match self.kind {
            SelectorKind::Fallback | SelectorKind::Receive => None,
            SelectorKind::Event if self.anonymous => None,
            SelectorKind::Event => {
                let digest = hash256(self.canonical_signature().as_bytes());
                Some(digest.to_vec())
            }
            SelectorKind::Function | SelectorKind::Constructor | SelectorKind::Error => {
                let digest = hash256(self.canonical_signature().as_bytes());
                Some(digest[..4].to_vec())
            }
        }
    }

    /// The 4-byte method id as a fixed array, for callers matching against
    /// raw calldata prefixes. `None` whenever [`Selector::id`] is `None`, or
    /// for events (whose id is 32 bytes; use [`Selector::id`] instead).
    pub fn method_id(&self) -> Option<[u8; 4]> {
        match self.kind {
            SelectorKind::Event => None,
            _ => {
                let id = self.id()?;
                let mut out = [0u8; 4];
                out.copy_from_slice(&id[..4]);
                Some(out)
            }
        }
    }
}

impl serde::Serialize for SelectorKind {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(match self {
            Self::Function => "function",
            Self::Constructor => "constructor",
            Self::Fallback => "fallback",
            Self::Receive => "receive",
            Self::Event => "event",
            Self::Error => "error",
        })
    }
}

impl<'de> serde::Deserialize<'de> for SelectorKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "function" => Ok(Self::Function),
            "constructor" => Ok(Self::Constructor),
            "fallback" => Ok(Self::Fallback),
            "receive" => Ok(Self::Receive),
            "event" => Ok(Self::Event),
            "error" => Ok(Self::Error),
            other => Err(serde::de::Error::custom(format!("unrecognized selector kind `{other}`"))),
        }
    }
}

impl serde::Serialize for StateMutability {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(match self {
            Self::Pure => "pure",
            Self::View => "view",
            Self::NonPayable => "nonpayable",
            Self::Payable => "payable",
        })
    }
}

impl<'de> serde::Deserialize<'de> for StateMutability {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "pure" => Ok(Self::Pure),
            "view" => Ok(Self::View),
            "nonpayable" => Ok(Self::NonPayable),
            "payable" => Ok(Self::Payable),
            other => Err(serde::de::Error::custom(format!("unrecognized state mutability `{other}`"))),
        }
    }
}

/// Renders `ty` as a JSON ABI `type` descriptor plus, for any tuple
/// reachable through array nesting, the `components` array describing its
/// fields. The inverse of [`crate::spec::parse_json_param_type`].
///
/// Component objects carry empty names: the type model (per [`ParamType`])
/// never retains a tuple field's declared name past parsing, so a
/// `Selector` serialized and re-deserialized through this impl round-trips
/// every type shape but not nested field names — only the outermost
/// `input_names`/`output_names` survive.
fn describe_type(ty: &ParamType) -> (String, Option<Vec<Value>>) {
    match ty {
        ParamType::Tuple(elems) => {
            let components = elems.iter().map(|elem| param_value(elem, "", None)).collect();
            ("tuple".to_owned(), Some(components))
        }
        ParamType::Array(elem) => {
            let (inner, components) = describe_type(elem);
            (format!("{inner}[]"), components)
        }
        ParamType::FixedArray(elem, len) => {
            let (inner, components) = describe_type(elem);
            (format!("{inner}[{len}]"), components)
        }
        other => (other.to_string(), None),
    }
}

fn param_value(ty: &ParamType, name: &str, indexed: Option<bool>) -> Value {
    let (descriptor, components) = describe_type(ty);
    let mut obj = serde_json::Map::new();
    obj.insert("name".to_owned(), Value::String(name.to_owned()));
    obj.insert("type".to_owned(), Value::String(descriptor));
    if let Some(components) = components {
        obj.insert("components".to_owned(), Value::Array(components));
    }
    if let Some(indexed) = indexed {
        obj.insert("indexed".to_owned(), Value::Bool(indexed));
    }
    Value::Object(obj)
}

impl serde::Serialize for Selector {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut obj = serde_json::Map::new();
        let type_str = match self.kind {
            SelectorKind::Function => "function",
            SelectorKind::Constructor => "constructor",
            SelectorKind::Fallback => "fallback",
            SelectorKind::Receive => "receive",
            SelectorKind::Event => "event",
            SelectorKind::Error => "error",
        };
        obj.insert("type".to_owned(), Value::String(type_str.to_owned()));
        if !matches!(self.kind, SelectorKind::Fallback | SelectorKind::Receive | SelectorKind::Constructor) {
            obj.insert("name".to_owned(), Value::String(self.name.clone()));
        }

        let indexed = |i: usize| matches!(self.kind, SelectorKind::Event).then(|| self.indexed[i]);
        let inputs: Vec<Value> = self
            .inputs
            .iter()
            .zip(&self.input_names)
            .enumerate()
            .map(|(i, (ty, name))| param_value(ty, name, indexed(i)))
            .collect();
        obj.insert("inputs".to_owned(), Value::Array(inputs));

        if matches!(self.kind, SelectorKind::Function) {
            let outputs: Vec<Value> = self
                .outputs
                .iter()
                .zip(&self.output_names)
                .map(|(ty, name)| param_value(ty, name, None))
                .collect();
            obj.insert("outputs".to_owned(), Value::Array(outputs));
        }

        if matches!(self.kind, SelectorKind::Event) {
            obj.insert("anonymous".to_owned(), Value::Bool(self.anonymous));
        }

        if matches!(
            self.kind,
            SelectorKind::Function | SelectorKind::Constructor | SelectorKind::Fallback | SelectorKind::Receive
        ) {
            obj.insert("stateMutability".to_owned(), Value::String(self.state_mutability.to_string()));
        }

        Value::Object(obj).serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Selector {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        crate::spec::parse_single_abi_entry(&value, 0)
            .ok_or_else(|| serde::de::Error::custom("ABI entry was skipped: non-standard type or unrecognized `type` field"))
    }
}

impl std::fmt::Display for StateMutability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pure => "pure",
            Self::View => "view",
            Self::NonPayable => "nonpayable",
            Self::Payable => "payable",
        })
    }
}
