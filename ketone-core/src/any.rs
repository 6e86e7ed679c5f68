use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::{Number, Value};
use tracing::debug;

use crate::map::OrderedMap;
use crate::resolve::{resolve_nested_map, KeyType};

/// A value slot whose type is only known once the document has been read.
///
/// Decoding a node into `AnyValue` picks the variant from the node itself:
/// - a null node becomes [`AnyValue::Null`], the default value
/// - scalars become the matching typed scalar
/// - a mapping becomes an [`AnyMap`] whose key type is found by trial decode,
///   or stays [`AnyValue::Native`] when no candidate key type fits
/// - sequences and tagged nodes stay [`AnyValue::Native`]
///
/// Encoding matches on the variant and writes the natural YAML form for it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnyValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Map(AnyMap),
    /// Node kept as the document layer produced it.
    Native(Value),
}

impl AnyValue {
    /// Classifies a node into a variant, resolving nested maps.
    pub fn from_node(node: Value) -> Self {
        match node {
            Value::Null => AnyValue::Null,
            Value::Bool(b) => AnyValue::Bool(b),
            Value::Number(n) => AnyValue::from_number(n),
            Value::String(s) => AnyValue::String(s),
            Value::Mapping(_) => match resolve_nested_map(&node) {
                Ok(map) => AnyValue::Map(map),
                Err(err) => {
                    debug!(%err, "keeping mapping as a native node");
                    AnyValue::Native(node)
                }
            },
            Value::Sequence(_) | Value::Tagged(_) => AnyValue::Native(node),
        }
    }

    fn from_number(n: Number) -> Self {
        if let Some(i) = n.as_i64() {
            AnyValue::Int(i)
        } else if let Some(u) = n.as_u64() {
            AnyValue::UInt(u)
        } else if let Some(f) = n.as_f64() {
            AnyValue::Float(f)
        } else {
            AnyValue::Native(Value::Number(n))
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AnyValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AnyValue::Int(i) => Some(*i),
            AnyValue::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            AnyValue::Int(i) => u64::try_from(*i).ok(),
            AnyValue::UInt(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AnyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&AnyMap> {
        match self {
            AnyValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_native(&self) -> Option<&Value> {
        match self {
            AnyValue::Native(v) => Some(v),
            _ => None,
        }
    }
}

impl Serialize for AnyValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            AnyValue::Null => serializer.serialize_unit(),
            AnyValue::Bool(b) => serializer.serialize_bool(*b),
            AnyValue::Int(i) => serializer.serialize_i64(*i),
            AnyValue::UInt(u) => serializer.serialize_u64(*u),
            AnyValue::Float(f) => serializer.serialize_f64(*f),
            AnyValue::String(s) => serializer.serialize_str(s),
            AnyValue::Map(m) => m.serialize(serializer),
            AnyValue::Native(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for AnyValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let node = Value::deserialize(deserializer)?;
        Ok(AnyValue::from_node(node))
    }
}

impl From<Value> for AnyValue {
    fn from(node: Value) -> Self {
        AnyValue::from_node(node)
    }
}

impl From<bool> for AnyValue {
    fn from(b: bool) -> Self {
        AnyValue::Bool(b)
    }
}

impl From<i32> for AnyValue {
    fn from(i: i32) -> Self {
        AnyValue::Int(i.into())
    }
}

impl From<i64> for AnyValue {
    fn from(i: i64) -> Self {
        AnyValue::Int(i)
    }
}

impl From<u64> for AnyValue {
    fn from(u: u64) -> Self {
        AnyValue::UInt(u)
    }
}

impl From<f64> for AnyValue {
    fn from(f: f64) -> Self {
        AnyValue::Float(f)
    }
}

impl From<&str> for AnyValue {
    fn from(s: &str) -> Self {
        AnyValue::String(s.to_string())
    }
}

impl From<String> for AnyValue {
    fn from(s: String) -> Self {
        AnyValue::String(s)
    }
}

impl From<AnyMap> for AnyValue {
    fn from(m: AnyMap) -> Self {
        AnyValue::Map(m)
    }
}

/// A nested ordered map held in a generic slot, tagged with its key type.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyMap {
    Isize(OrderedMap<isize, AnyValue>),
    I32(OrderedMap<i32, AnyValue>),
    I64(OrderedMap<i64, AnyValue>),
    Usize(OrderedMap<usize, AnyValue>),
    U32(OrderedMap<u32, AnyValue>),
    U64(OrderedMap<u64, AnyValue>),
    String(OrderedMap<String, AnyValue>),
}

/// Applies the same expression to whichever map an `AnyMap` holds.
macro_rules! with_map {
    ($any:expr, $map:ident => $body:expr) => {
        match $any {
            AnyMap::Isize($map) => $body,
            AnyMap::I32($map) => $body,
            AnyMap::I64($map) => $body,
            AnyMap::Usize($map) => $body,
            AnyMap::U32($map) => $body,
            AnyMap::U64($map) => $body,
            AnyMap::String($map) => $body,
        }
    };
}

impl AnyMap {
    pub fn key_type(&self) -> KeyType {
        match self {
            AnyMap::Isize(_) => KeyType::Isize,
            AnyMap::I32(_) => KeyType::I32,
            AnyMap::I64(_) => KeyType::I64,
            AnyMap::Usize(_) => KeyType::Usize,
            AnyMap::U32(_) => KeyType::U32,
            AnyMap::U64(_) => KeyType::U64,
            AnyMap::String(_) => KeyType::String,
        }
    }

    pub fn len(&self) -> usize {
        with_map!(self, m => m.len())
    }

    pub fn is_empty(&self) -> bool {
        with_map!(self, m => m.is_empty())
    }
}

impl Serialize for AnyMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        with_map!(self, m => m.serialize(serializer))
    }
}

macro_rules! any_map_from {
    ($($key:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<OrderedMap<$key, AnyValue>> for AnyMap {
                fn from(map: OrderedMap<$key, AnyValue>) -> Self {
                    AnyMap::$variant(map)
                }
            }

            impl From<OrderedMap<$key, AnyValue>> for AnyValue {
                fn from(map: OrderedMap<$key, AnyValue>) -> Self {
                    AnyValue::Map(AnyMap::$variant(map))
                }
            }
        )*
    };
}

any_map_from! {
    isize => Isize,
    i32 => I32,
    i64 => I64,
    usize => Usize,
    u32 => U32,
    u64 => U64,
    String => String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn any(text: &str) -> AnyValue {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn null_node_is_default() {
        assert_eq!(any("null"), AnyValue::default());
        assert_eq!(any("~"), AnyValue::Null);
    }

    #[test]
    fn quoted_null_stays_a_string() {
        assert_eq!(any("'null'"), AnyValue::String("null".to_string()));
    }

    #[test]
    fn scalars_are_typed() {
        assert_eq!(any("true"), AnyValue::Bool(true));
        assert_eq!(any("-7"), AnyValue::Int(-7));
        assert_eq!(any("18446744073709551615"), AnyValue::UInt(u64::MAX));
        assert_eq!(any("1.5"), AnyValue::Float(1.5));
        assert_eq!(any("hello"), AnyValue::String("hello".to_string()));
    }

    #[test]
    fn sequences_stay_native() {
        let value = any("[1, two]");
        let native = value.as_native().unwrap();
        assert_eq!(native.as_sequence().map(Vec::len), Some(2));
    }

    #[test]
    fn mixed_scalar_keys_resolve_as_text() {
        let AnyValue::Map(AnyMap::String(map)) = any("{1: a, b: c}") else {
            panic!("expected a string-keyed map");
        };
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["1", "b"]);
    }

    #[test]
    fn null_keys_fall_back_to_native() {
        let value = any("{~: a}");
        assert!(matches!(value, AnyValue::Native(Value::Mapping(_))));
    }

    #[test]
    fn numeric_accessors_cross_sign() {
        assert_eq!(AnyValue::Int(5).as_u64(), Some(5));
        assert_eq!(AnyValue::Int(-5).as_u64(), None);
        assert_eq!(AnyValue::UInt(u64::MAX).as_i64(), None);
    }

    #[test]
    fn any_map_reports_key_type() {
        let map: AnyMap = OrderedMap::<u32, AnyValue>::new().into();
        assert_eq!(map.key_type(), KeyType::U32);
        assert!(map.is_empty());

        let map: AnyMap = OrderedMap::from([("a".to_string(), AnyValue::from(1))]).into();
        assert_eq!(map.key_type(), KeyType::String);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn encode_matches_on_variant() {
        let map = OrderedMap::from([
            ("n".to_string(), AnyValue::Null),
            ("i".to_string(), AnyValue::from(3)),
            ("s".to_string(), AnyValue::from("x")),
        ]);
        let text = serde_yaml::to_string(&AnyValue::from(map)).unwrap();
        assert_eq!(text, "n: null\ni: 3\ns: x\n");
    }
}
