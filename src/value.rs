//! # Claim Values
//!
//! [`Value`] is the format-neutral sum type a disclosable claim's content is
//! expressed in: JSON claim values (SD-JWT) and CBOR claim values (SD-CWT)
//! both narrow to it, so the lattice and redaction algorithms never need to
//! know which wire codec produced a leaf. It mirrors the "one shape, several
//! wire representations" pattern the credential data model uses for
//! properties that may be a bare string or a full object.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};

/// A format-neutral claim value.
///
/// Map keys are kept in insertion order via a `Vec` of pairs rather than a
/// `HashMap`, since SD-CWT maps are integer-keyed and SD-JWT objects are
/// string-keyed; callers supply the key representation as a `Value::String`
/// either way and are responsible for format-specific key validation (see
/// [`crate::grouping`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// JSON/CBOR null.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// A byte string (CBOR only; SD-JWT values never take this variant).
    Bytes(Vec<u8>),
    /// An ordered array of values.
    Array(Vec<Value>),
    /// An ordered map of string-keyed values.
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Structural equality as used by property P3 (value preservation):
    /// `Float` compares by bit pattern so `NaN` is reflexively equal, instead
    /// of using `PartialEq`'s IEEE-754 semantics.
    #[must_use]
    pub fn canonically_equal(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Array(a), Self::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.canonically_equal(y))
            }
            (Self::Map(a), Self::Map(b)) => {
                let mut a_sorted: Vec<_> = a.iter().collect();
                let mut b_sorted: Vec<_> = b.iter().collect();
                a_sorted.sort_by(|x, y| x.0.cmp(&y.0));
                b_sorted.sort_by(|x, y| x.0.cmp(&y.0));
                a_sorted.len() == b_sorted.len()
                    && a_sorted
                        .iter()
                        .zip(b_sorted.iter())
                        .all(|(x, y)| x.0 == y.0 && x.1.canonically_equal(&y.1))
            }
            _ => self == other,
        }
    }

    /// Converts to `serde_json::Value`, the SD-JWT wire representation.
    /// Byte strings are not representable in JSON and are rejected by
    /// callers before this conversion is reached (SD-JWT claim trees never
    /// contain `Value::Bytes`).
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => {
                serde_json::Number::from_f64(*f).map_or(serde_json::Value::Null, Into::into)
            }
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Bytes(bytes) => {
                serde_json::Value::String(Base64UrlUnpadded::encode_string(bytes))
            }
            Self::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Self::Map(entries) => serde_json::Value::Object(
                entries.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Converts from `serde_json::Value`.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => {
                n.as_i64().map_or_else(|| Self::Float(n.as_f64().unwrap_or_default()), Self::Int)
            }
            serde_json::Value::String(s) => Self::String(s.clone()),
            serde_json::Value::Array(items) => {
                Self::Array(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.iter().map(|(k, v)| (k.clone(), Value::from_json(v))).collect())
            }
        }
    }

    /// Converts to a `ciborium::Value`, the SD-CWT wire representation.
    #[must_use]
    pub fn to_cbor(&self) -> ciborium::Value {
        match self {
            Self::Null => ciborium::Value::Null,
            Self::Bool(b) => ciborium::Value::Bool(*b),
            Self::Int(i) => ciborium::Value::Integer((*i).into()),
            Self::Float(f) => ciborium::Value::Float(*f),
            Self::String(s) => ciborium::Value::Text(s.clone()),
            Self::Bytes(bytes) => ciborium::Value::Bytes(bytes.clone()),
            Self::Array(items) => ciborium::Value::Array(items.iter().map(Value::to_cbor).collect()),
            Self::Map(entries) => ciborium::Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (ciborium::Value::Text(k.clone()), v.to_cbor()))
                    .collect(),
            ),
        }
    }

    /// Converts from a `ciborium::Value`. Map keys that are not text or
    /// integers are rendered via their debug form; callers that need
    /// round-trip fidelity for arbitrary CBOR key types should handle maps
    /// directly rather than going through `Value`.
    #[must_use]
    pub fn from_cbor(value: &ciborium::Value) -> Self {
        match value {
            ciborium::Value::Null => Self::Null,
            ciborium::Value::Bool(b) => Self::Bool(*b),
            ciborium::Value::Integer(i) => Self::Int(i128::from(*i) as i64),
            ciborium::Value::Float(f) => Self::Float(*f),
            ciborium::Value::Text(s) => Self::String(s.clone()),
            ciborium::Value::Bytes(bytes) => Self::Bytes(bytes.clone()),
            ciborium::Value::Array(items) => Self::Array(items.iter().map(Value::from_cbor).collect()),
            ciborium::Value::Map(entries) => Self::Map(
                entries
                    .iter()
                    .map(|(k, v)| (cbor_key_to_string(k), Value::from_cbor(v)))
                    .collect(),
            ),
            _ => Self::Null,
        }
    }
}

fn cbor_key_to_string(key: &ciborium::Value) -> String {
    match key {
        ciborium::Value::Text(s) => s.clone(),
        ciborium::Value::Integer(i) => i128::from(*i).to_string(),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_preserves_structure() {
        let json = serde_json::json!({"a": 1, "b": [true, null, "x"]});
        let value = Value::from_json(&json);
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn canonical_equality_ignores_map_order() {
        let a = Value::Map(vec![("x".into(), Value::Int(1)), ("y".into(), Value::Int(2))]);
        let b = Value::Map(vec![("y".into(), Value::Int(2)), ("x".into(), Value::Int(1))]);
        assert!(a.canonically_equal(&b));
    }

    #[test]
    fn cbor_round_trip_preserves_scalars() {
        let value = Value::Map(vec![
            ("flag".into(), Value::Bool(true)),
            ("name".into(), Value::String("ABCD-123456".into())),
        ]);
        let cbor = value.to_cbor();
        let back = Value::from_cbor(&cbor);
        assert!(value.canonically_equal(&back));
    }
}
