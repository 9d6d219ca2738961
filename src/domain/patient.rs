use serde::{Deserialize, Deserializer, Serialize};

use super::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(
        deserialize_with = "super::lenient_id",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "edad", deserialize_with = "lenient_age", default)]
    pub age: u32,
    #[serde(alias = "telefono", default)]
    pub phone: String,
    #[serde(
        rename = "imageUri",
        alias = "imagen",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub image_uri: Option<String>,
}

impl Patient {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        age: u32,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age,
            phone: phone.into(),
            image_uri: None,
        }
    }
}

impl Entity for Patient {
    fn id(&self) -> &str {
        &self.id
    }
}

// Form inputs submit the age as text.
fn lenient_age<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAge {
        Number(u32),
        Text(String),
    }

    match RawAge::deserialize(deserializer)? {
        RawAge::Number(n) => Ok(n),
        RawAge::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
