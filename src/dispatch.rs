//! Selector lookup and end-to-end calldata/log decoding built on top of
//! [`crate::encode`]/[`crate::decode`] and a slice of [`Selector`]s (as
//! produced by [`crate::spec::parse_abi`]).

use crate::error::{AbiError, Result};
use crate::selector::{Selector, SelectorKind};
use crate::token::Token;
use crate::types::ParamType;

/// Finds the function whose 4-byte method id matches `method_id`.
/// Constructors, fallback, receive, events, and errors are never returned
/// even if their id happens to collide, since calldata dispatch only
/// ever targets a function.
pub fn find_by_method_id(selectors: &[Selector], method_id: [u8; 4]) -> Option<&Selector> {
    selectors
        .iter()
        .find(|s| matches!(s.kind, SelectorKind::Function) && s.method_id() == Some(method_id))
}

/// Finds the event matching a log's `topic0` and number of indexed
/// parameters.
///
/// `topic0` alone isn't always enough: two event declarations with the
/// same name and parameter types but a different set of `indexed`
/// modifiers hash to the *same* topic0 (indexing doesn't affect the
/// canonical signature), yet decode their topics/data differently. The
/// indexed parameter count — read off the log itself as `topics.len()`
/// minus one — disambiguates between them. Anonymous events are never
/// matched, since they never populate topic0.
pub fn find_event<'a>(selectors: &'a [Selector], topic0: &[u8], indexed_count: usize) -> Option<&'a Selector> {
    selectors.iter().find(|s| {
        matches!(s.kind, SelectorKind::Event)
            && !s.anonymous
            && s.id().as_deref() == Some(topic0)
            && s.indexed.iter().filter(|&&i| i).count() == indexed_count
    })
}

/// Looks up the function matching `calldata`'s leading 4 bytes and
/// decodes the remainder against its inputs.
pub fn find_and_decode<'a>(selectors: &'a [Selector], calldata: &[u8]) -> Result<(&'a Selector, Vec<Token>)> {
    if calldata.len() < 4 {
        return Err(AbiError::TruncatedInput { at: 0, need: 4 });
    }
    let mut method_id = [0u8; 4];
    method_id.copy_from_slice(&calldata[..4]);
    let selector = find_by_method_id(selectors, method_id)
        .ok_or(AbiError::NoSelectorMatch { method_id: u32::from_be_bytes(method_id) })?;
    let values = crate::decode::decode(&calldata[4..], &selector.inputs)?;
    Ok((selector, values))
}

/// Reconstructs an event's input values from its log topics and data,
/// in the original input declaration order (not grouped
/// indexed-then-unindexed, which is how the values are physically laid
/// out on the log).
///
/// `topics` includes topic0 unless `selector.anonymous`. Indexed
/// parameters of a reference type (`string`, `bytes`, any array, any
/// tuple) are represented on the log only by `keccak256` of their ABI
/// encoding — that hash is opaque and not reversible, so it comes back as
/// a 32-byte [`Token::FixedBytes`] rather than the original value.
pub fn decode_event(selector: &Selector, topics: &[[u8; 32]], data: &[u8]) -> Result<Vec<Token>> {
    let mut topics = topics.iter();
    if !selector.anonymous {
        topics.next();
    }

    let unindexed_types: Vec<ParamType> = selector
        .inputs
        .iter()
        .zip(&selector.indexed)
        .filter_map(|(ty, indexed)| (!indexed).then(|| ty.clone()))
        .collect();
    let mut unindexed = crate::decode::decode(data, &unindexed_types)?.into_iter();

    let mut out = Vec::with_capacity(selector.inputs.len());
    for (ty, indexed) in selector.inputs.iter().zip(&selector.indexed) {
        if *indexed {
            let topic = topics.next().ok_or(AbiError::TruncatedInput { at: 0, need: 32 })?;
            if is_reference_type(ty) {
                out.push(Token::FixedBytes(topic.to_vec()));
            } else {
                let mut decoded = crate::decode::decode(topic, std::slice::from_ref(ty))?;
                out.push(decoded.remove(0));
            }
        } else {
            out.push(unindexed.next().ok_or(AbiError::TruncatedInput { at: 0, need: 32 })?);
        }
    }
    Ok(out)
}

/// Solidity's indexed-event rule, distinct from ABI dynamism: any
/// reference type (arrays, tuples, `string`, `bytes`) is hashed when
/// indexed — including a fixed-size array or tuple whose own ABI
/// encoding is static — because a topic is a single 32-byte slot and
/// can't hold an unbounded or multi-word value directly.
fn is_reference_type(ty: &ParamType) -> bool {
    matches!(
        ty,
        ParamType::String | ParamType::Bytes | ParamType::Array(_) | ParamType::FixedArray(_, _) | ParamType::Tuple(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;
    use crate::keccak::hash256;
    use crate::selector::StateMutability;
    use alloy_primitives::U256;

    fn function(name: &str, inputs: Vec<ParamType>) -> Selector {
        Selector {
            kind: SelectorKind::Function,
            name: name.to_owned(),
            inputs,
            input_names: vec![],
            outputs: vec![],
            output_names: vec![],
            indexed: vec![],
            state_mutability: StateMutability::NonPayable,
            anonymous: false,
        }
    }

    #[test]
    fn finds_function_by_method_id() {
        let selectors = vec![function("baz", vec![ParamType::Uint(256), ParamType::Address])];
        let method_id = selectors[0].method_id().unwrap();
        assert!(find_by_method_id(&selectors, method_id).is_some());
        assert!(find_by_method_id(&selectors, [0, 0, 0, 0]).is_none());
    }

    #[test]
    fn decodes_calldata_end_to_end() {
        let selector = function("transfer", vec![ParamType::Address, ParamType::Uint(256)]);
        let args =
            [Token::Address(alloy_primitives::Address::ZERO), Token::Uint(U256::from(1000u32))];
        let mut calldata = selector.method_id().unwrap().to_vec();
        calldata.extend(encode(&args, &selector.inputs).unwrap());

        let (found, values) = find_and_decode(std::slice::from_ref(&selector), &calldata).unwrap();
        assert_eq!(found.name, "transfer");
        assert_eq!(values, args);
    }

    #[test]
    fn disambiguates_events_by_indexed_count() {
        let mut a = function("Transfer", vec![ParamType::Address, ParamType::Uint(256)]);
        a.kind = SelectorKind::Event;
        a.indexed = vec![true, false];

        let mut b = a.clone();
        b.indexed = vec![true, true];

        let selectors = vec![a.clone(), b.clone()];
        let topic0 = a.id().unwrap();
        assert_eq!(find_event(&selectors, &topic0, 1).unwrap().indexed, vec![true, false]);
        assert_eq!(find_event(&selectors, &topic0, 2).unwrap().indexed, vec![true, true]);
    }

    #[test]
    fn decode_event_hashes_indexed_reference_types() {
        let mut selector = function("Posted", vec![ParamType::String, ParamType::Uint(256)]);
        selector.kind = SelectorKind::Event;
        selector.indexed = vec![true, false];

        let topic0 = hash256(selector.canonical_signature().as_bytes());
        let indexed_hash = hash256(b"hello");
        let data = encode(&[Token::Uint(U256::from(7u8))], &[ParamType::Uint(256)]).unwrap();

        let values = decode_event(&selector, &[topic0, indexed_hash], &data).unwrap();
        assert_eq!(values[0], Token::FixedBytes(indexed_hash.to_vec()));
        assert_eq!(values[1], Token::Uint(U256::from(7u8)));
    }

    #[test]
    fn decode_event_keeps_original_input_order() {
        let mut selector =
            function("Mixed", vec![ParamType::Bool, ParamType::Uint(256), ParamType::Address]);
        selector.kind = SelectorKind::Event;
        selector.indexed = vec![true, false, true];

        let topic0 = hash256(selector.canonical_signature().as_bytes());
        let bool_topic = {
            let mut w = [0u8; 32];
            w[31] = 1;
            w
        };
        let addr = alloy_primitives::Address::repeat_byte(0xab);
        let addr_topic = {
            let mut w = [0u8; 32];
            w[12..].copy_from_slice(addr.as_slice());
            w
        };
        let data = encode(&[Token::Uint(U256::from(99u8))], &[ParamType::Uint(256)]).unwrap();

        let values = decode_event(&selector, &[topic0, bool_topic, addr_topic], &data).unwrap();
        assert_eq!(values, vec![Token::Bool(true), Token::Uint(U256::from(99u8)), Token::Address(addr)]);
    }
}
