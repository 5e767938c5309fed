//! Serde adapter for rates that may be infinite.
//!
//! JSON has no infinity, so `f64::INFINITY` is written as the string `"inf"`.
//! Use with `#[serde(with = "veritas_signals::serde_rate")]`.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serializer};

pub const INFINITY_TOKEN: &str = "inf";

pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_infinite() && value.is_sign_positive() {
        serializer.serialize_str(INFINITY_TOKEN)
    } else {
        serializer.serialize_f64(*value)
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Number(n) => Ok(n),
        Repr::Text(t) if t == INFINITY_TOKEN => Ok(f64::INFINITY),
        Repr::Text(t) => Err(de::Error::custom(format!("invalid rate: {:?}", t))),
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Rate {
        #[serde(with = "crate::serde_rate")]
        value: f64,
    }

    #[test]
    fn infinity_is_a_string() {
        let json = serde_json::to_string(&Rate { value: f64::INFINITY }).unwrap();
        assert_eq!(json, r#"{"value":"inf"}"#);
        let back: Rate = serde_json::from_str(&json).unwrap();
        assert!(back.value.is_infinite());
    }

    #[test]
    fn finite_values_stay_numeric() {
        let json = serde_json::to_string(&Rate { value: 2.5 }).unwrap();
        assert_eq!(json, r#"{"value":2.5}"#);
        let back: Rate = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value, 2.5);
    }

    #[test]
    fn other_strings_are_rejected() {
        assert!(serde_json::from_str::<Rate>(r#"{"value":"lots"}"#).is_err());
    }
}
