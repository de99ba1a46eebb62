//! Поля запросов, которые можно явно сбросить в `null`

use serde::{Deserialize, Deserializer};

/// `Some(None)` при явном `null`, `None` при отсутствии поля.
/// Используется вместе с `#[serde(default)]`.
pub fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_nullable")]
        value: Option<Option<i64>>,
    }

    #[test]
    fn test_missing_null_and_value() {
        let p: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(p.value, None);

        let p: Patch = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(p.value, Some(None));

        let p: Patch = serde_json::from_str(r#"{"value": 5}"#).unwrap();
        assert_eq!(p.value, Some(Some(5)));
    }
}
