//! Ingests JSON ABI documents (the array of objects solc and Etherscan both
//! emit) into [`Selector`]s.
//!
//! Unlike [`crate::signature`], which is strict (a malformed signature is
//! always an error), this module is deliberately permissive at the
//! document level: one entry it doesn't understand is logged and skipped
//! rather than failing the whole document, since real-world ABI files
//! accumulate quirks (legacy `constant`/`payable` flags, unknown future
//! `type` values) that shouldn't block ingestion of the entries around them.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::selector::{Selector, SelectorKind, StateMutability};
use crate::signature::parse_type;
use crate::types::ParamType;

#[derive(Debug, Clone, Deserialize)]
struct JsonParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    components: Option<Vec<JsonParam>>,
    #[serde(default)]
    indexed: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct JsonEntry {
    #[serde(rename = "type")]
    entry_type: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<JsonParam>,
    #[serde(default)]
    outputs: Vec<JsonParam>,
    #[serde(default)]
    anonymous: bool,
    #[serde(rename = "stateMutability")]
    state_mutability: Option<String>,
    /// Pre-0.6.0 solc legacy flag, superseded by `stateMutability` but still
    /// seen in the wild.
    #[serde(default)]
    constant: Option<bool>,
    /// Same vintage as `constant`.
    #[serde(default)]
    payable: Option<bool>,
}

/// Parses every recognized entry out of a JSON ABI document (a top-level
/// array, or an object with an `"abi"` array field, as Etherscan serves).
///
/// Entries of type `"event"` are only included when `include_events` is
/// set; most callers encoding/decoding calldata don't need them and
/// skipping the conversion avoids needless work on large ABIs.
pub fn parse_abi(tree: &Value, include_events: bool) -> Result<Vec<Selector>> {
    let entries = match tree {
        Value::Array(entries) => entries.as_slice(),
        Value::Object(map) => match map.get("abi") {
            Some(Value::Array(entries)) => entries.as_slice(),
            _ => {
                tracing::warn!("JSON ABI document has no top-level array and no `abi` field; skipping");
                &[]
            }
        },
        _ => {
            tracing::warn!("JSON ABI document is neither an array nor an object; skipping");
            &[]
        }
    };

    let mut out = Vec::with_capacity(entries.len());
    for (index, raw) in entries.iter().enumerate() {
        match parse_single_abi_entry(raw, index) {
            Some(selector) if selector.kind == SelectorKind::Event && !include_events => continue,
            Some(selector) => out.push(selector),
            None => continue,
        }
    }
    Ok(out)
}

/// Parses one already-split-out JSON ABI entry into a [`Selector`], applying
/// the same warn-and-skip rules [`parse_abi`] applies per element: `None`
/// means the entry was skipped (and a `tracing::warn!` already explains
/// why), not that something irrecoverable happened. Shared with
/// [`Selector`]'s [`serde::Deserialize`] impl so a lone ABI entry
/// deserializes through the identical path a whole document's entries do.
pub(crate) fn parse_single_abi_entry(raw: &Value, index: usize) -> Option<Selector> {
    let entry: JsonEntry = match serde_json::from_value(raw.clone()) {
        Ok(entry) => entry,
        Err(e) => {
            tracing::warn!(index, error = %e, "skipping malformed ABI entry");
            return None;
        }
    };

    let kind = match entry.entry_type.as_deref().unwrap_or("function") {
        "function" => SelectorKind::Function,
        "constructor" => SelectorKind::Constructor,
        "fallback" => SelectorKind::Fallback,
        "receive" => SelectorKind::Receive,
        "error" => SelectorKind::Error,
        "event" => SelectorKind::Event,
        other => {
            tracing::warn!(index, r#type = other, "skipping ABI entry with unrecognized `type`");
            return None;
        }
    };

    let (inputs, input_names) = convert_params(&entry.inputs, index, "input")?;
    let (outputs, output_names) = match kind {
        SelectorKind::Function => convert_params(&entry.outputs, index, "output")?,
        _ => (Vec::new(), Vec::new()),
    };

    let indexed = match kind {
        SelectorKind::Event => entry.inputs.iter().map(|p| p.indexed).collect(),
        _ => Vec::new(),
    };

    let state_mutability = resolve_state_mutability(&entry);

    Some(Selector {
        kind,
        name: entry.name,
        inputs,
        input_names,
        outputs,
        output_names,
        indexed,
        state_mutability,
        anonymous: entry.anonymous,
    })
}

fn resolve_state_mutability(entry: &JsonEntry) -> StateMutability {
    if let Some(raw) = entry.state_mutability.as_deref() {
        return match raw {
            "pure" => StateMutability::Pure,
            "view" => StateMutability::View,
            "nonpayable" => StateMutability::NonPayable,
            "payable" => StateMutability::Payable,
            other => {
                tracing::warn!(state_mutability = other, "unrecognized stateMutability, defaulting to nonpayable");
                StateMutability::NonPayable
            }
        };
    }
    if entry.payable == Some(true) {
        return StateMutability::Payable;
    }
    if entry.constant == Some(true) {
        return StateMutability::View;
    }
    StateMutability::NonPayable
}

/// Converts a parameter list, substituting parsed `components` into the
/// innermost `tuple` placeholder of each `type` string. Returns `None` (after
/// logging) if any parameter fails the type sanity gate, signalling the
/// caller to skip the whole entry rather than emit a partially-typed
/// selector.
fn convert_params(params: &[JsonParam], entry_index: usize, side: &str) -> Option<(Vec<ParamType>, Vec<String>)> {
    let mut types = Vec::with_capacity(params.len());
    let mut names = Vec::with_capacity(params.len());
    for param in params {
        match parse_json_param_type(param) {
            Ok(ty) if is_standard(&ty) => {
                types.push(ty);
                names.push(param.name.clone());
            }
            Ok(ty) => {
                tracing::warn!(
                    index = entry_index,
                    side,
                    param = param.name,
                    descriptor = %ty,
                    "skipping ABI entry: non-standard leaf type in {side}"
                );
                return None;
            }
            Err(e) => {
                tracing::warn!(index = entry_index, side, param = param.name, error = %e, "skipping ABI entry");
                return None;
            }
        }
    }
    Some((types, names))
}

/// Parses one JSON ABI parameter's `type` string, rewriting any `tuple`
/// placeholder (bare, or array-suffixed: `tuple[]`, `tuple[2]`, `tuple[2][]`)
/// with a [`ParamType::Tuple`] built from `components`.
fn parse_json_param_type(param: &JsonParam) -> Result<ParamType> {
    let (base, suffixes) = split_array_suffixes(&param.ty);
    if base == "tuple" {
        let components = param.components.as_deref().unwrap_or(&[]);
        let mut fields = Vec::with_capacity(components.len());
        for component in components {
            fields.push(parse_json_param_type(component)?);
        }
        apply_array_suffixes(ParamType::Tuple(fields), suffixes)
    } else {
        parse_type(&param.ty)
    }
}

/// Splits `uint256[2][]` into (`"uint256"`, `"[2][]"`), or `tuple[]` into
/// (`"tuple"`, `"[]"`).
fn split_array_suffixes(ty: &str) -> (&str, &str) {
    match ty.find('[') {
        Some(idx) => (&ty[..idx], &ty[idx..]),
        None => (ty, ""),
    }
}

fn apply_array_suffixes(mut ty: ParamType, suffixes: &str) -> Result<ParamType> {
    let mut rest = suffixes;
    let mut stack = Vec::new();
    while !rest.is_empty() {
        let close = rest.find(']').ok_or_else(|| {
            crate::error::AbiError::parse(suffixes, suffixes.len() - rest.len(), "unterminated `[`")
        })?;
        let inner = &rest[1..close];
        stack.push(if inner.is_empty() { None } else { inner.parse::<usize>().ok() });
        rest = &rest[close + 1..];
    }
    for len in stack {
        ty = match len {
            Some(n) => ParamType::FixedArray(Box::new(ty), n),
            None => ParamType::Array(Box::new(ty)),
        };
    }
    Ok(ty)
}

/// The type sanity gate: `fixedMxN`/`ufixedMxN` parse successfully (so
/// [`crate::signature`] can round-trip them) but this crate never
/// marshals them, so an ABI entry that uses one anywhere in its shape is
/// treated as non-standard and skipped rather than accepted and later
/// failing obscurely at encode time.
fn is_standard(ty: &ParamType) -> bool {
    match ty {
        ParamType::Fixed(_, _) | ParamType::UFixed(_, _) => false,
        ParamType::FixedArray(elem, _) | ParamType::Array(elem) => is_standard(elem),
        ParamType::Tuple(elems) => elems.iter().all(is_standard),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Captures `tracing::warn!` output to stdout for the tests below that
    /// exercise the warn-and-skip path, mirroring how the teacher's own
    /// integration tests wire up logging. `try_init` rather than `init`
    /// since more than one test in this binary may call it.
    #[track_caller]
    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[test]
    fn parses_simple_function() {
        let abi = json!([{
            "type": "function",
            "name": "transfer",
            "inputs": [
                {"name": "to", "type": "address"},
                {"name": "amount", "type": "uint256"}
            ],
            "outputs": [{"name": "", "type": "bool"}],
            "stateMutability": "nonpayable"
        }]);
        let selectors = parse_abi(&abi, false).unwrap();
        assert_eq!(selectors.len(), 1);
        let sel = &selectors[0];
        assert_eq!(sel.kind, SelectorKind::Function);
        assert_eq!(sel.inputs, vec![ParamType::Address, ParamType::Uint(256)]);
        assert_eq!(sel.outputs, vec![ParamType::Bool]);
        assert_eq!(sel.state_mutability, StateMutability::NonPayable);
    }

    #[test]
    fn rewrites_nested_tuple_components() {
        let abi = json!([{
            "type": "function",
            "name": "deposit",
            "inputs": [{
                "name": "order",
                "type": "tuple",
                "components": [
                    {"name": "maker", "type": "address"},
                    {"name": "amounts", "type": "uint256[]"}
                ]
            }],
            "outputs": []
        }]);
        let selectors = parse_abi(&abi, false).unwrap();
        assert_eq!(
            selectors[0].inputs,
            vec![ParamType::Tuple(vec![ParamType::Address, ParamType::Array(Box::new(ParamType::Uint(256)))])]
        );
    }

    #[test]
    fn rewrites_tuple_array_components() {
        let abi = json!([{
            "type": "function",
            "name": "batch",
            "inputs": [{
                "name": "orders",
                "type": "tuple[]",
                "components": [{"name": "id", "type": "uint256"}]
            }],
            "outputs": []
        }]);
        let selectors = parse_abi(&abi, false).unwrap();
        assert_eq!(
            selectors[0].inputs,
            vec![ParamType::Array(Box::new(ParamType::Tuple(vec![ParamType::Uint(256)])))]
        );
    }

    #[test]
    fn rewrites_multidimensional_tuple_array_components() {
        // tuple[2][] is a dynamic array of fixed-size-2 arrays of tuples:
        // the innermost tuple placeholder is substituted, then the array
        // suffixes are reapplied outside-in in the order they were written.
        let abi = json!([{
            "type": "function",
            "name": "batchGrid",
            "inputs": [{
                "name": "grid",
                "type": "tuple[2][]",
                "components": [{"name": "id", "type": "uint256"}]
            }],
            "outputs": []
        }]);
        let selectors = parse_abi(&abi, false).unwrap();
        let expected = ParamType::Array(Box::new(ParamType::FixedArray(
            Box::new(ParamType::Tuple(vec![ParamType::Uint(256)])),
            2,
        )));
        assert_eq!(selectors[0].inputs, vec![expected]);
    }

    #[test]
    fn skips_nonstandard_leaf_type() {
        init_tracing();
        let abi = json!([
            {
                "type": "function",
                "name": "bad",
                "inputs": [{"name": "x", "type": "ufixed128x18"}],
                "outputs": []
            },
            {
                "type": "function",
                "name": "good",
                "inputs": [{"name": "x", "type": "uint256"}],
                "outputs": []
            }
        ]);
        let selectors = parse_abi(&abi, false).unwrap();
        assert_eq!(selectors.len(), 1);
        assert_eq!(selectors[0].name, "good");
    }

    #[test]
    fn includes_events_only_when_requested() {
        let abi = json!([{
            "type": "event",
            "name": "Transfer",
            "anonymous": false,
            "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}
            ]
        }]);
        assert!(parse_abi(&abi, false).unwrap().is_empty());
        let selectors = parse_abi(&abi, true).unwrap();
        assert_eq!(selectors.len(), 1);
        assert_eq!(selectors[0].indexed, vec![true, false]);
    }

    #[test]
    fn legacy_constant_and_payable_flags() {
        let abi = json!([
            {"type": "function", "name": "a", "inputs": [], "outputs": [], "constant": true},
            {"type": "function", "name": "b", "inputs": [], "outputs": [], "payable": true}
        ]);
        let selectors = parse_abi(&abi, false).unwrap();
        assert_eq!(selectors[0].state_mutability, StateMutability::View);
        assert_eq!(selectors[1].state_mutability, StateMutability::Payable);
    }

    #[test]
    fn fallback_and_receive_entries() {
        let abi = json!([
            {"type": "fallback", "stateMutability": "nonpayable"},
            {"type": "receive", "stateMutability": "payable"}
        ]);
        let selectors = parse_abi(&abi, false).unwrap();
        assert_eq!(selectors[0].kind, SelectorKind::Fallback);
        assert_eq!(selectors[1].kind, SelectorKind::Receive);
        assert_eq!(selectors[1].state_mutability, StateMutability::Payable);
    }
}
