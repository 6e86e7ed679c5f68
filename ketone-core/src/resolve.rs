//! Key-type resolution for nested maps found in generic slots.
//!
//! YAML does not record the integer width of a key, and a mapping sitting in
//! an [`AnyValue`] slot has no static key type to decode into. The resolver
//! tries each candidate in [`KEY_TYPE_PRIORITY`] with a trial decode and keeps
//! the first one that succeeds. Integer candidates come first so a bare `1`
//! never lands in a string-keyed map; `String` comes last and takes the text
//! of any scalar key, so a mapping with at least one non-integer key still
//! resolves.
//!
//! Every key is checked before any value is decoded. A rejected candidate
//! therefore never recurses into nested values, and resolution stays linear
//! in the size of the document.

use std::fmt;
use std::hash::Hash;

use serde::de::{DeserializeOwned, Error as _};
use serde_yaml::Value;
use tracing::trace;

use crate::any::{AnyMap, AnyValue};
use crate::codec::{CodecError, NodeKind};
use crate::map::OrderedMap;

/// A key type the resolver can pick for a nested map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Isize,
    I32,
    I64,
    Usize,
    U32,
    U64,
    String,
}

/// Candidate key types, in the order they are tried.
pub const KEY_TYPE_PRIORITY: [KeyType; 7] = [
    KeyType::Isize,
    KeyType::I32,
    KeyType::I64,
    KeyType::Usize,
    KeyType::U32,
    KeyType::U64,
    KeyType::String,
];

type Attempt = fn(&Value) -> Result<AnyMap, CodecError>;

type KeyDecoder<K> = fn(&Value) -> Result<K, serde_yaml::Error>;

impl KeyType {
    pub fn name(self) -> &'static str {
        match self {
            KeyType::Isize => "isize",
            KeyType::I32 => "i32",
            KeyType::I64 => "i64",
            KeyType::Usize => "usize",
            KeyType::U32 => "u32",
            KeyType::U64 => "u64",
            KeyType::String => "string",
        }
    }

    /// Decodes `node` into a fresh map keyed by this type.
    pub fn attempt(self, node: &Value) -> Result<AnyMap, CodecError> {
        let attempt: Attempt = match self {
            KeyType::Isize => |node| attempt_with(node, typed_key::<isize>),
            KeyType::I32 => |node| attempt_with(node, typed_key::<i32>),
            KeyType::I64 => |node| attempt_with(node, typed_key::<i64>),
            KeyType::Usize => |node| attempt_with(node, typed_key::<usize>),
            KeyType::U32 => |node| attempt_with(node, typed_key::<u32>),
            KeyType::U64 => |node| attempt_with(node, typed_key::<u64>),
            KeyType::String => |node| attempt_with(node, text_key),
        };
        attempt(node)
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn attempt_with<K>(node: &Value, decode_key: KeyDecoder<K>) -> Result<AnyMap, CodecError>
where
    K: Hash + Eq,
    AnyMap: From<OrderedMap<K, AnyValue>>,
{
    let Value::Mapping(mapping) = node else {
        return Err(CodecError::NotAMapping(NodeKind::of(node)));
    };

    let keys = mapping
        .iter()
        .enumerate()
        .map(|(index, (key, _))| {
            decode_key(key).map_err(|source| CodecError::Key { index, source })
        })
        .collect::<Result<Vec<K>, _>>()?;

    let mut map = OrderedMap::with_capacity(keys.len());
    for (key, (_, value)) in keys.into_iter().zip(mapping.iter()) {
        map.set(key, AnyValue::from_node(value.clone()));
    }
    Ok(map.into())
}

fn typed_key<K: DeserializeOwned>(node: &Value) -> Result<K, serde_yaml::Error> {
    K::deserialize(node)
}

/// Takes the YAML text of a scalar key.
fn text_key(node: &Value) -> Result<String, serde_yaml::Error> {
    match node {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Tagged(tagged) => text_key(&tagged.value),
        other => Err(serde_yaml::Error::custom(format!(
            "expected a scalar key, found {}",
            NodeKind::of(other)
        ))),
    }
}

/// Rebuilds a nested map, picking the first key type that decodes `node`.
///
/// Fails with [`CodecError::UnresolvedKeyType`] when no candidate fits,
/// including when `node` is not a mapping at all.
pub fn resolve_nested_map(node: &Value) -> Result<AnyMap, CodecError> {
    for key_type in KEY_TYPE_PRIORITY {
        match key_type.attempt(node) {
            Ok(map) => {
                trace!(%key_type, entries = map.len(), "resolved nested map");
                return Ok(map);
            }
            Err(err) => trace!(%key_type, %err, "key type rejected"),
        }
    }
    Err(CodecError::UnresolvedKeyType)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn parse(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn priority_ends_with_string() {
        assert_eq!(KEY_TYPE_PRIORITY[0], KeyType::Isize);
        assert_eq!(KEY_TYPE_PRIORITY.last(), Some(&KeyType::String));
    }

    #[test]
    fn bare_integers_pick_first_candidate() {
        let map = resolve_nested_map(&parse("1: a\n2: b\n")).unwrap();
        assert_eq!(map.key_type(), KeyType::Isize);
    }

    #[test]
    fn negative_keys_skip_unsigned() {
        assert!(KeyType::Usize.attempt(&parse("-1: a")).is_err());
        assert!(KeyType::I32.attempt(&parse("-1: a")).is_ok());
    }

    #[test]
    fn wide_keys_skip_narrow_candidates() {
        let node = parse("4294967296: x");
        assert!(KeyType::I32.attempt(&node).is_err());
        assert!(KeyType::U32.attempt(&node).is_err());
        assert_eq!(KeyType::I64.attempt(&node).unwrap().key_type(), KeyType::I64);
    }

    #[test]
    fn keys_beyond_i64_resolve_unsigned() {
        let node = parse("18446744073709551615: max");
        let map = resolve_nested_map(&node).unwrap();
        assert!(matches!(map.key_type(), KeyType::Usize | KeyType::U64));
    }

    #[test]
    fn quoted_integers_resolve_as_string() {
        let map = resolve_nested_map(&parse("'1': a\n'2': b\n")).unwrap();
        assert_eq!(map.key_type(), KeyType::String);
    }

    #[test]
    fn non_integer_scalars_resolve_as_text() {
        let AnyMap::String(map) = resolve_nested_map(&parse("{1: a, b: c}")).unwrap() else {
            panic!("expected string keys");
        };
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["1", "b"]);

        let AnyMap::String(map) = resolve_nested_map(&parse("true: on\n1.5: x\n")).unwrap()
        else {
            panic!("expected string keys");
        };
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["true", "1.5"]);
    }

    #[test]
    fn unresolvable_keys() {
        let err = resolve_nested_map(&parse("~: a")).unwrap_err();
        assert!(matches!(err, CodecError::UnresolvedKeyType));

        let err = resolve_nested_map(&parse("? [1, 2]\n: a\n")).unwrap_err();
        assert!(matches!(err, CodecError::UnresolvedKeyType));

        let err = resolve_nested_map(&parse("[1, 2]")).unwrap_err();
        assert!(matches!(err, CodecError::UnresolvedKeyType));
    }

    #[test]
    fn attempt_keeps_document_order() {
        let map = KeyType::String.attempt(&parse("z: 1\na: 2\nm: 3\n")).unwrap();
        let AnyMap::String(map) = map else {
            panic!("expected string keys");
        };
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn rejected_candidates_skip_nested_values() {
        // Each level has an integer key and a text key, so every integer
        // candidate is rejected before the string candidate wins.
        let depth = 12;
        let mut node = Value::from(0);
        for _ in 0..depth {
            let mut mapping = serde_yaml::Mapping::new();
            mapping.insert(Value::from(1), node);
            mapping.insert(Value::from("b"), Value::from(0));
            node = Value::Mapping(mapping);
        }

        let started = Instant::now();
        let mut current = resolve_nested_map(&node).unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));

        let mut levels = 1;
        while let AnyMap::String(map) = current {
            match map.get("1") {
                Some(AnyValue::Map(inner)) => {
                    current = inner.clone();
                    levels += 1;
                }
                _ => break,
            }
        }
        assert_eq!(levels, depth);
    }
}
