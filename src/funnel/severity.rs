use serde::Serialize;

/// Alert severity shared by stale deals, overdue tasks and expired quotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Day counts above which an alert escalates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityTiers {
    pub medium_after_days: i64,
    pub high_after_days: i64,
}

impl SeverityTiers {
    pub const STALE_DEAL: SeverityTiers = SeverityTiers { medium_after_days: 5, high_after_days: 7 };
    pub const OVERDUE_TASK: SeverityTiers = SeverityTiers { medium_after_days: 3, high_after_days: 7 };
    pub const EXPIRED_QUOTE: SeverityTiers = SeverityTiers { medium_after_days: 7, high_after_days: 14 };

    pub fn classify(&self, days: i64) -> Severity {
        if days > self.high_after_days {
            Severity::High
        } else if days > self.medium_after_days {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}
