//! Forgiving deserializers for snapshots written by older builds.
//!
//! Older writers could leave `null` where a list, a list entry, or a whole
//! section was expected. These read such values as their defaults.

use serde::{Deserialize, Deserializer};

/// Read `null` as `T::default()`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read a list, dropping `null` entries. A `null` list reads as empty.
pub fn vec_skip_nulls<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Doc {
        #[serde(default, deserialize_with = "vec_skip_nulls")]
        items: Vec<u32>,
        #[serde(default, deserialize_with = "null_as_default")]
        label: String,
    }

    #[test]
    fn test_nulls_read_as_defaults() {
        let doc: Doc = serde_json::from_str(r#"{"items": [1, null, 3, null], "label": null}"#).unwrap();
        assert_eq!(doc.items, vec![1, 3]);
        assert_eq!(doc.label, "");

        let doc: Doc = serde_json::from_str(r#"{"items": null}"#).unwrap();
        assert!(doc.items.is_empty());
    }

    #[test]
    fn test_wrong_types_still_fail() {
        assert!(serde_json::from_str::<Doc>(r#"{"items": [1, "two"]}"#).is_err());
        assert!(serde_json::from_str::<Doc>(r#"{"items": 5}"#).is_err());
    }
}
