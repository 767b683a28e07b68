use serde::{Deserialize, Deserializer};

/// Record key as stored by the bookkeeping server (a UUID). Older exports
/// carry numeric keys; both deserialize to text.
pub type RecordId = String;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
}

pub fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<RecordId, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s.trim().to_string(),
        RawId::Integer(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Row {
        #[serde(deserialize_with = "deserialize_id")]
        id: RecordId,
    }

    #[test]
    fn accepts_uuid_and_integer_keys() {
        let row: Row = serde_json::from_str(r#"{"id": "9b1c2d3e-0000-4000-8000-000000000001"}"#).unwrap();
        assert_eq!(row.id, "9b1c2d3e-0000-4000-8000-000000000001");

        let row: Row = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(row.id, "42");
    }

    #[test]
    fn rejects_other_types() {
        assert!(serde_json::from_str::<Row>(r#"{"id": [1]}"#).is_err());
        assert!(serde_json::from_str::<Row>(r#"{"id": null}"#).is_err());
    }
}
