use serde::{Deserialize, Serialize};

/// Quote status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteItem {
    #[serde(default)]
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl QuoteItem {
    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// Quote model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default)]
    pub items: Vec<QuoteItem>,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub status: QuoteStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until_ts: Option<i64>,
    #[serde(default)]
    pub created_ts: i64,
    #[serde(default)]
    pub updated_ts: i64,
}

impl Quote {
    pub fn new(id: &str, title: &str, status: QuoteStatus, ts: i64) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            client_id: None,
            items: Vec::new(),
            total: 0.0,
            status,
            valid_until_ts: None,
            created_ts: ts,
            updated_ts: ts,
        }
    }

    /// Append a line item and refresh the total
    pub fn add_item(&mut self, description: &str, quantity: f64, unit_price: f64) {
        self.items.push(QuoteItem {
            description: description.to_string(),
            quantity,
            unit_price,
        });
        self.total = self.items_total();
    }

    pub fn items_total(&self) -> f64 {
        self.items.iter().map(QuoteItem::line_total).sum()
    }

    /// Sent quote whose validity date has passed
    pub fn is_expired(&self, now_ts: i64) -> bool {
        match self.valid_until_ts {
            Some(valid_until) => self.status == QuoteStatus::Sent && valid_until < now_ts,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_status_conversion() {
        assert_eq!(serde_json::from_str::<QuoteStatus>("\"sent\"").unwrap(), QuoteStatus::Sent);
        assert!(serde_json::from_str::<QuoteStatus>("\"pending\"").is_err());
    }

    #[test]
    fn test_quote_totals() {
        let mut quote = Quote::new("q1", "Website", QuoteStatus::Draft, 0);
        quote.add_item("Design", 2.0, 150.0);
        quote.add_item("Hosting", 12.0, 10.0);
        assert_eq!(quote.total, 420.0);
        assert_eq!(quote.items_total(), 420.0);
    }

    #[test]
    fn test_only_sent_quotes_expire() {
        let mut quote = Quote::new("q1", "Website", QuoteStatus::Sent, 0);
        quote.valid_until_ts = Some(100);
        assert!(quote.is_expired(200));
        assert!(!quote.is_expired(100));

        quote.status = QuoteStatus::Accepted;
        assert!(!quote.is_expired(200));
    }
}
