use serde::{Deserialize, Serialize};

/// Deal model
///
/// `stage` holds whatever the persistence layer stored. It may be empty, a
/// record identifier written into the wrong field, or a label from a retired
/// schema; normalization decides what it maps to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub probability: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_close_ts: Option<i64>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_ts: i64,
    #[serde(default)]
    pub updated_ts: i64,
}

impl Deal {
    /// Create a deal with the given id, stage and value, stamped at `ts`
    pub fn new(id: &str, stage: &str, value: f64, ts: i64) -> Self {
        Self {
            id: id.to_string(),
            title: String::new(),
            client_id: None,
            stage: stage.to_string(),
            value,
            probability: 0,
            expected_close_ts: None,
            notes: String::new(),
            created_ts: ts,
            updated_ts: ts,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Title for display; falls back to the id when the record has none
    pub fn label(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.id
        } else {
            &self.title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deal_defaults_from_sparse_json() {
        let deal: Deal = serde_json::from_str(r#"{"id":"d1"}"#).unwrap();
        assert_eq!(deal.id, "d1");
        assert_eq!(deal.stage, "");
        assert_eq!(deal.value, 0.0);
        assert!(deal.client_id.is_none());
    }

    #[test]
    fn test_deal_label() {
        let deal = Deal::new("d1", "lead", 10.0, 0);
        assert_eq!(deal.label(), "d1");
        assert_eq!(deal.with_title("Website").label(), "Website");
    }
}
