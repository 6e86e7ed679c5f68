//! Ketone is an insertion-ordered map with a YAML node codec.
//!
//! Core concepts:
//! - **OrderedMap**: A keyed container that iterates in first-insertion order
//! - **Codec**: Encodes a map into a YAML mapping node and decodes it back,
//!   keeping pair order in both directions
//! - **AnyValue**: A value slot typed at decode time (scalar, nested map, or
//!   native node)
//! - **Resolver**: Recovers the key type of nested maps in `AnyValue` slots by
//!   trial decode
//!
//! # Example
//!
//! ```
//! use ketone_core::{AnyMap, AnyValue, KeyType, OrderedMap};
//!
//! let text = "name: demo\nports:\n  80: http\n  443: https\n";
//! let config: OrderedMap<String, AnyValue> = serde_yaml::from_str(text).unwrap();
//!
//! let ports = config.get("ports").and_then(AnyValue::as_map).unwrap();
//! assert_eq!(ports.key_type(), KeyType::Isize);
//!
//! // Writing it back keeps the document order.
//! assert_eq!(serde_yaml::to_string(&config).unwrap(), text);
//! ```
//!
//! # Decoding Failures
//!
//! By default a failing pair aborts the decode but leaves the pairs decoded
//! before it in the target map. Use [`DecodeOptions::atomic`] with
//! [`decode_with`] to stage pairs and only write them once all succeed.

mod any;
mod codec;
mod map;
mod resolve;

pub use any::{AnyMap, AnyValue};
pub use codec::{
    decode, decode_with, encode, from_yaml_str, to_yaml_string, CodecError, DecodeOptions,
    NodeKind, NULL_TOKEN,
};
pub use map::{MissingKey, OrderedMap};
pub use resolve::{resolve_nested_map, KeyType, KEY_TYPE_PRIORITY};
