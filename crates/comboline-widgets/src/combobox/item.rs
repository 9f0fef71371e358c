use serde::{Deserialize, Deserializer, Serialize};

/// A selectable entry.
///
/// Ids are unique within a collection. JSON ids may be strings or numbers;
/// numbers are kept as their decimal text so `{"id": 1}` and `{"id": "1"}`
/// name the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Identifier, submitted as the companion field's value.
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    /// Display name, written into the field on selection.
    pub name: String,
    /// Secondary description shown next to the name.
    #[serde(default)]
    pub descr: String,
    /// Optional icon text rendered before the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Item {
    /// Create an item without an icon.
    pub fn new(id: impl Into<String>, name: impl Into<String>, descr: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            descr: descr.into(),
            icon: None,
        }
    }

    /// Attach an icon.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Uint(u64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Uint(n) => n.to_string(),
        RawId::Float(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_agree() {
        let items: Vec<Item> = serde_json::from_str(
            r#"[{"id": 1, "name": "Rome", "descr": "RM"},
                {"id": "2", "name": "Turin", "descr": "TO", "icon": "car"}]"#,
        )
        .unwrap();
        assert_eq!(items[0], Item::new("1", "Rome", "RM"));
        assert_eq!(items[1], Item::new("2", "Turin", "TO").with_icon("car"));
    }

    #[test]
    fn descr_defaults_to_empty() {
        let item: Item = serde_json::from_str(r#"{"id": "x", "name": "Nowhere"}"#).unwrap();
        assert_eq!(item.descr, "");
        assert_eq!(item.icon, None);
    }

    #[test]
    fn missing_name_is_an_error() {
        assert!(serde_json::from_str::<Item>(r#"{"id": 3}"#).is_err());
    }
}
