// Alerts for overdue tasks, expired quotes and stale deals

use crate::funnel::stale::{find_stale_deals, StaleConfig, SECS_PER_DAY};
use crate::funnel::{Severity, SeverityTiers};
use crate::models::Dataset;
use crate::registry::StageRegistry;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OverdueTask,
    ExpiredQuote,
    StaleDeal,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::OverdueTask => "overdue_task",
            NotificationKind::ExpiredQuote => "expired_quote",
            NotificationKind::StaleDeal => "stale_deal",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            NotificationKind::OverdueTask => "task",
            NotificationKind::ExpiredQuote => "quote",
            NotificationKind::StaleDeal => "deal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub entity_id: String,
    pub severity: Severity,
    pub days: i64,
}

impl Notification {
    fn new(kind: NotificationKind, entity_id: &str, title: &str, message: String, days: i64, severity: Severity) -> Self {
        Self {
            id: format!("{}-{}", kind.prefix(), entity_id),
            kind,
            title: title.to_string(),
            message,
            entity_id: entity_id.to_string(),
            severity,
            days,
        }
    }
}

fn plural_days(days: i64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", days)
    }
}

fn whole_days(since_ts: i64, now_ts: i64) -> i64 {
    now_ts.saturating_sub(since_ts).max(0) / SECS_PER_DAY
}

/// Build every alert for the dataset as of `now_ts`, most severe first.
/// Within a severity, tasks come before quotes before deals.
pub fn build_notifications(
    registry: &StageRegistry,
    data: &Dataset,
    now_ts: i64,
    stale: &StaleConfig,
) -> Vec<Notification> {
    let mut notifications = Vec::new();

    for task in data.tasks.iter().filter(|t| t.is_overdue(now_ts)) {
        let days = whole_days(task.due_ts.unwrap_or(now_ts), now_ts);
        notifications.push(Notification::new(
            NotificationKind::OverdueTask,
            &task.id,
            "Overdue task",
            format!("\"{}\" is {} overdue", task.title, plural_days(days)),
            days,
            SeverityTiers::OVERDUE_TASK.classify(days),
        ));
    }

    for quote in data.quotes.iter().filter(|q| q.is_expired(now_ts)) {
        let days = whole_days(quote.valid_until_ts.unwrap_or(now_ts), now_ts);
        notifications.push(Notification::new(
            NotificationKind::ExpiredQuote,
            &quote.id,
            "Expired quote",
            format!("Quote \"{}\" expired {} ago", quote.title, plural_days(days)),
            days,
            SeverityTiers::EXPIRED_QUOTE.classify(days),
        ));
    }

    for deal in find_stale_deals(registry, &data.deals, now_ts, stale) {
        let days = deal.staleness.elapsed_days;
        notifications.push(Notification::new(
            NotificationKind::StaleDeal,
            &deal.deal_id,
            "Stale deal",
            format!("\"{}\" has not been updated for {}", deal.title, plural_days(days)),
            days,
            deal.staleness.severity,
        ));
    }

    // Stable: keeps the per-kind ordering inside each severity
    notifications.sort_by(|a, b| b.severity.cmp(&a.severity));
    log::debug!("Built {} notification(s)", notifications.len());
    notifications
}
