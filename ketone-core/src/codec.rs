//! Conversion between [`OrderedMap`] and YAML document nodes.
//!
//! Encoding walks the map from oldest to newest entry and hands every key and
//! value to `serde_yaml`'s own value conversion, so scalar rendering (integer
//! versus string keys, floats, nested structures) is whatever the document
//! layer would produce for that type. Decoding consumes mapping pairs in
//! document order and upserts them, so the document order becomes the map's
//! insertion order.

use std::fmt;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::map::OrderedMap;

/// Text form of the node an absent map encodes to.
pub const NULL_TOKEN: &str = "null";

/// The kind of a YAML node, used when reporting structural mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Null,
    Bool,
    Number,
    String,
    Sequence,
    Mapping,
    Tagged,
}

impl NodeKind {
    pub fn of(node: &Value) -> Self {
        match node {
            Value::Null => NodeKind::Null,
            Value::Bool(_) => NodeKind::Bool,
            Value::Number(_) => NodeKind::Number,
            Value::String(_) => NodeKind::String,
            Value::Sequence(_) => NodeKind::Sequence,
            Value::Mapping(_) => NodeKind::Mapping,
            Value::Tagged(_) => NodeKind::Tagged,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Null => NULL_TOKEN,
            NodeKind::Bool => "bool",
            NodeKind::Number => "number",
            NodeKind::String => "string",
            NodeKind::Sequence => "sequence",
            NodeKind::Mapping => "mapping",
            NodeKind::Tagged => "tagged value",
        };
        f.write_str(name)
    }
}

/// Error type for encoding and decoding ordered maps.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("expected a YAML mapping, found {0}")]
    NotAMapping(NodeKind),
    #[error("cannot decode key of pair {index}: {source}")]
    Key {
        index: usize,
        source: serde_yaml::Error,
    },
    #[error("cannot decode value of pair {index}: {source}")]
    Value {
        index: usize,
        source: serde_yaml::Error,
    },
    #[error("cannot encode entry {index}: {source}")]
    Encode {
        index: usize,
        source: serde_yaml::Error,
    },
    #[error("cannot resolve the key type of a nested map")]
    UnresolvedKeyType,
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Decoding options.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Only touch the target map once every pair has decoded.
    ///
    /// When false, pairs are inserted as they decode and a failing pair
    /// leaves the ones before it in the map.
    pub atomic: bool,
}

/// Encodes a map into a YAML mapping node.
///
/// An absent map becomes a null scalar, an empty map becomes an empty mapping.
pub fn encode<K, V>(map: Option<&OrderedMap<K, V>>) -> Result<Value, CodecError>
where
    K: Serialize,
    V: Serialize,
{
    let Some(map) = map else {
        return Ok(Value::Null);
    };

    let mut mapping = Mapping::with_capacity(map.len());
    for (index, (key, value)) in map.iter().enumerate() {
        let key =
            serde_yaml::to_value(key).map_err(|source| CodecError::Encode { index, source })?;
        let value =
            serde_yaml::to_value(value).map_err(|source| CodecError::Encode { index, source })?;
        mapping.insert(key, value);
    }

    Ok(Value::Mapping(mapping))
}

/// Decodes a mapping node into `map`, inserting pairs in document order.
pub fn decode<K, V>(node: &Value, map: &mut OrderedMap<K, V>) -> Result<(), CodecError>
where
    K: DeserializeOwned + Hash + Eq,
    V: DeserializeOwned,
{
    decode_with(node, map, &DecodeOptions::default())
}

/// Decodes a mapping node into `map` using the given options.
pub fn decode_with<K, V>(
    node: &Value,
    map: &mut OrderedMap<K, V>,
    options: &DecodeOptions,
) -> Result<(), CodecError>
where
    K: DeserializeOwned + Hash + Eq,
    V: DeserializeOwned,
{
    let Value::Mapping(mapping) = node else {
        return Err(CodecError::NotAMapping(NodeKind::of(node)));
    };

    if options.atomic {
        let staged = mapping
            .iter()
            .enumerate()
            .map(|(index, (key, value))| decode_pair(index, key, value))
            .collect::<Result<Vec<(K, V)>, _>>()?;
        map.reserve(staged.len());
        map.extend(staged);
        return Ok(());
    }

    map.reserve(mapping.len());
    for (index, (key, value)) in mapping.iter().enumerate() {
        let (key, value) = decode_pair(index, key, value).inspect_err(|err| {
            debug!(%err, inserted = index, "decode aborted, earlier pairs kept");
        })?;
        map.set(key, value);
    }

    Ok(())
}

fn decode_pair<K, V>(index: usize, key: &Value, value: &Value) -> Result<(K, V), CodecError>
where
    K: DeserializeOwned,
    V: DeserializeOwned,
{
    let key = K::deserialize(key).map_err(|source| CodecError::Key { index, source })?;
    let value = V::deserialize(value).map_err(|source| CodecError::Value { index, source })?;
    Ok((key, value))
}

/// Renders a map as YAML text.
pub fn to_yaml_string<K, V>(map: &OrderedMap<K, V>) -> Result<String, CodecError>
where
    K: Serialize,
    V: Serialize,
{
    let node = encode(Some(map))?;
    Ok(serde_yaml::to_string(&node)?)
}

/// Parses YAML text into a map.
pub fn from_yaml_str<K, V>(text: &str) -> Result<OrderedMap<K, V>, CodecError>
where
    K: DeserializeOwned + Hash + Eq,
    V: DeserializeOwned,
{
    let node: Value = serde_yaml::from_str(text)?;
    OrderedMap::from_node(&node)
}

impl<K: Serialize, V: Serialize> OrderedMap<K, V> {
    /// Encodes this map into a YAML mapping node.
    pub fn to_node(&self) -> Result<Value, CodecError> {
        encode(Some(self))
    }
}

impl<K, V> OrderedMap<K, V>
where
    K: DeserializeOwned + Hash + Eq,
    V: DeserializeOwned,
{
    /// Builds a new map from a YAML mapping node.
    pub fn from_node(node: &Value) -> Result<Self, CodecError> {
        let mut map = OrderedMap::new();
        decode(node, &mut map)?;
        Ok(map)
    }

    /// Upserts every pair of a YAML mapping node into this map.
    pub fn decode_node(&mut self, node: &Value) -> Result<(), CodecError> {
        decode(node, self)
    }
}

impl<K: Serialize, V: Serialize> Serialize for OrderedMap<K, V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_node()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de, K, V> Deserialize<'de> for OrderedMap<K, V>
where
    K: DeserializeOwned + Hash + Eq,
    V: DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Buffer into a node first; the generic slot needs to re-read it.
        let node = Value::deserialize(deserializer)?;
        OrderedMap::from_node(&node).map_err(serde::de::Error::custom)
    }
}
