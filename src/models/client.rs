use serde::{Deserialize, Serialize};

/// Client model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub segment: String,
    #[serde(default)]
    pub created_ts: i64,
    #[serde(default)]
    pub updated_ts: i64,
}

impl Client {
    pub fn new(id: &str, name: &str, ts: i64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            email: String::new(),
            phone: String::new(),
            segment: String::new(),
            created_ts: ts,
            updated_ts: ts,
        }
    }
}
