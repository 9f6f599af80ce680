//! Monetary amounts.
//!
//! The backend renders decimal fields as strings (`"1500.00"`) but computed
//! balances and summary totals as JSON numbers, so both shapes are accepted.

use serde::de;

pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserializer.deserialize_any(AmountVisitor)
}

pub fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct OptionalAmountVisitor;

    impl<'de> de::Visitor<'de> for OptionalAmountVisitor {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("an optional amount")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserialize_amount(deserializer).map(Some)
        }
    }

    deserializer.deserialize_option(OptionalAmountVisitor)
}

struct AmountVisitor;

impl<'de> de::Visitor<'de> for AmountVisitor {
    type Value = f64;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a decimal string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.trim()
            .parse::<f64>()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
        Ok(v)
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
        Ok(v as f64)
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
        Ok(v as f64)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "super::deserialize_amount")]
        value: f64,
        #[serde(default, deserialize_with = "super::deserialize_optional_amount")]
        maybe: Option<f64>,
    }

    #[test]
    fn test_amount_accepts_string_and_number() {
        let h: Holder = serde_json::from_str(r#"{"value":"1500.50"}"#).unwrap();
        assert_eq!(h.value, 1500.5);
        assert_eq!(h.maybe, None);

        let h: Holder = serde_json::from_str(r#"{"value":42,"maybe":"-3.25"}"#).unwrap();
        assert_eq!(h.value, 42.0);
        assert_eq!(h.maybe, Some(-3.25));

        let h: Holder = serde_json::from_str(r#"{"value":0.1,"maybe":null}"#).unwrap();
        assert_eq!(h.maybe, None);
    }

    #[test]
    fn test_amount_rejects_garbage() {
        assert!(serde_json::from_str::<Holder>(r#"{"value":"abc"}"#).is_err());
    }
}
