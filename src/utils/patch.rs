use serde::{Deserialize, Deserializer};

/// Tells an absent field apart from an explicit `null`.
///
/// Use with `#[serde(default, deserialize_with = "...")]` on an
/// `Option<Option<T>>`: a missing key stays `None`, `null` becomes
/// `Some(None)` and a value becomes `Some(Some(value))`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::serde::json::serde_json;

    #[derive(Deserialize, Debug)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        body: Option<Option<String>>,
    }

    #[test]
    fn absent_null_and_value() {
        let p: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(p.body, None);

        let p: Patch = serde_json::from_str(r#"{"body": null}"#).unwrap();
        assert_eq!(p.body, Some(None));

        let p: Patch = serde_json::from_str(r#"{"body": "text"}"#).unwrap();
        assert_eq!(p.body, Some(Some("text".to_string())));
    }
}
