// Period report: revenue, activity and conversion for a trailing window

use crate::funnel::normalize::normalize;
use crate::funnel::stale::SECS_PER_DAY;
use crate::models::{Dataset, QuoteStatus, StageKind};
use crate::registry::StageRegistry;
use anyhow::Result;
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

const MONTHLY_BUCKETS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum Period {
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Week => "7d",
            Period::Month => "30d",
            Period::Quarter => "90d",
            Period::Year => "1y",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim() {
            "7d" => Ok(Period::Week),
            "30d" => Ok(Period::Month),
            "90d" => Ok(Period::Quarter),
            "1y" | "365d" => Ok(Period::Year),
            other => anyhow::bail!("Invalid period: '{}'. Expected one of 7d, 30d, 90d, 1y.", other),
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            Period::Week => 7,
            Period::Month => 30,
            Period::Quarter => 90,
            Period::Year => 365,
        }
    }

    pub fn secs(&self) -> i64 {
        self.days() * SECS_PER_DAY
    }
}

/// Percentage change from `previous` to `current`.
/// With no previous value, any positive current value counts as +100%.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    (current - previous) * 100.0 / previous
}

fn ratio_percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    /// `YYYY-MM`
    pub month: String,
    pub revenue: f64,
    pub deals: usize,
    pub quotes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    pub period: Period,
    pub window_start_ts: i64,
    pub window_end_ts: i64,
    pub revenue: f64,
    pub previous_revenue: f64,
    pub revenue_change: f64,
    pub new_clients: usize,
    pub active_deals: usize,
    pub won_deals: usize,
    pub task_completion_rate: f64,
    pub quote_conversion_rate: f64,
    pub total_quotes: usize,
    pub accepted_quotes: usize,
    pub monthly_revenue: Vec<MonthlyRevenue>,
}

impl PeriodReport {
    /// Compute the report for the window ending at `now_ts`.
    ///
    /// Records are assigned to a window by `created_ts`. Deal stages are
    /// normalized first, so corrupted deals count as open entry-stage deals.
    pub fn compute(registry: &StageRegistry, data: &Dataset, period: Period, now_ts: i64) -> Self {
        let start = now_ts - period.secs();
        let previous_start = start - period.secs();
        let in_window = |ts: i64| ts >= start && ts <= now_ts;
        let in_previous = |ts: i64| ts >= previous_start && ts < start;

        let kind_of = |stage: &str| {
            let id = normalize(registry, stage);
            registry.get_stage(id).map(|s| s.kind).unwrap_or_default()
        };

        let revenue_in = |window: &dyn Fn(i64) -> bool| -> f64 {
            let deals: f64 = data
                .deals
                .iter()
                .filter(|d| window(d.created_ts) && kind_of(&d.stage) == StageKind::Won)
                .map(|d| d.value)
                .sum();
            let quotes: f64 = data
                .quotes
                .iter()
                .filter(|q| window(q.created_ts) && q.status == QuoteStatus::Accepted)
                .map(|q| q.total)
                .sum();
            deals + quotes
        };

        let revenue = revenue_in(&in_window);
        let previous_revenue = revenue_in(&in_previous);

        let window_deals: Vec<_> = data.deals.iter().filter(|d| in_window(d.created_ts)).collect();
        let active_deals = window_deals.iter().filter(|d| !kind_of(&d.stage).is_terminal()).count();
        let won_deals = window_deals
            .iter()
            .filter(|d| kind_of(&d.stage) == StageKind::Won)
            .count();

        let window_tasks: Vec<_> = data.tasks.iter().filter(|t| in_window(t.created_ts)).collect();
        let completed_tasks = window_tasks.iter().filter(|t| t.completed).count();

        let window_quotes: Vec<_> = data.quotes.iter().filter(|q| in_window(q.created_ts)).collect();
        let accepted_quotes = window_quotes
            .iter()
            .filter(|q| q.status == QuoteStatus::Accepted)
            .count();
        let sent_or_accepted = window_quotes
            .iter()
            .filter(|q| matches!(q.status, QuoteStatus::Sent | QuoteStatus::Accepted))
            .count();

        PeriodReport {
            period,
            window_start_ts: start,
            window_end_ts: now_ts,
            revenue,
            previous_revenue,
            revenue_change: percentage_change(revenue, previous_revenue),
            new_clients: data.clients.iter().filter(|c| in_window(c.created_ts)).count(),
            active_deals,
            won_deals,
            task_completion_rate: ratio_percent(completed_tasks, window_tasks.len()),
            quote_conversion_rate: ratio_percent(accepted_quotes, sent_or_accepted),
            total_quotes: window_quotes.len(),
            accepted_quotes,
            monthly_revenue: monthly_revenue(registry, data),
        }
    }
}

fn month_key(ts: i64) -> Option<String> {
    let dt: DateTime<Utc> = DateTime::from_timestamp(ts, 0)?;
    Some(format!("{:04}-{:02}", dt.year(), dt.month()))
}

/// Won-deal and accepted-quote revenue per calendar month (UTC), last
/// twelve months with activity, oldest first
pub fn monthly_revenue(registry: &StageRegistry, data: &Dataset) -> Vec<MonthlyRevenue> {
    let mut entries: Vec<(i64, f64, bool)> = Vec::new();
    for deal in &data.deals {
        let won = registry
            .get_stage(normalize(registry, &deal.stage))
            .map(|s| s.is_terminal_won())
            .unwrap_or(false);
        if won {
            entries.push((deal.created_ts, deal.value, true));
        }
    }
    for quote in data.quotes.iter().filter(|q| q.status == QuoteStatus::Accepted) {
        entries.push((quote.created_ts, quote.total, false));
    }

    let mut buckets: BTreeMap<String, MonthlyRevenue> = BTreeMap::new();
    for (ts, amount, is_deal) in entries {
        let Some(month) = month_key(ts) else { continue };
        let slot = buckets.entry(month.clone()).or_insert_with(|| MonthlyRevenue {
            month,
            revenue: 0.0,
            deals: 0,
            quotes: 0,
        });
        slot.revenue += amount;
        if is_deal {
            slot.deals += 1;
        } else {
            slot.quotes += 1;
        }
    }

    let months: Vec<MonthlyRevenue> = buckets.into_values().collect();
    let skip = months.len().saturating_sub(MONTHLY_BUCKETS);
    months.into_iter().skip(skip).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Client, Deal, Quote, Task};

    // 2025-10-09T08:53:20Z
    const NOW: i64 = 1_760_000_000;
    const DAY: i64 = SECS_PER_DAY;

    #[test]
    fn test_period_parse() {
        assert_eq!(Period::parse("7d").unwrap(), Period::Week);
        assert_eq!(Period::parse("30d").unwrap(), Period::Month);
        assert_eq!(Period::parse("1y").unwrap(), Period::Year);
        assert!(Period::parse("2w").is_err());
        assert_eq!(Period::Quarter.days(), 90);
    }

    #[test]
    fn test_percentage_change() {
        assert_eq!(percentage_change(150.0, 100.0), 50.0);
        assert_eq!(percentage_change(50.0, 100.0), -50.0);
        assert_eq!(percentage_change(10.0, 0.0), 100.0);
        assert_eq!(percentage_change(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_compute_report() {
        let registry = StageRegistry::builtin();
        let mut accepted = Quote::new("q1", "Hosting", QuoteStatus::Accepted, NOW - 5 * DAY);
        accepted.total = 300.0;
        let sent = Quote::new("q2", "Audit", QuoteStatus::Sent, NOW - 6 * DAY);
        let old_draft = Quote::new("q3", "Old", QuoteStatus::Draft, NOW - 100 * DAY);

        let mut done_task = Task::new("t1", "Call", NOW - DAY);
        done_task.completed = true;

        let data = Dataset {
            clients: vec![
                Client::new("c1", "Acme", NOW - 2 * DAY),
                Client::new("c2", "Globex", NOW - 45 * DAY),
            ],
            deals: vec![
                Deal::new("d1", "closed-won", 1_000.0, NOW - 10 * DAY),
                Deal::new("d2", "proposal", 800.0, NOW - 3 * DAY),
                Deal::new("d3", "", 200.0, NOW - 3 * DAY),
                Deal::new("d4", "closed-lost", 200.0, NOW - 3 * DAY),
                Deal::new("d5", "closed-won", 500.0, NOW - 40 * DAY),
            ],
            tasks: vec![done_task, Task::new("t2", "Email", NOW - DAY)],
            quotes: vec![accepted, sent, old_draft],
        };

        let report = PeriodReport::compute(registry, &data, Period::Month, NOW);
        assert_eq!(report.revenue, 1_300.0);
        assert_eq!(report.previous_revenue, 500.0);
        assert_eq!(report.revenue_change, 160.0);
        assert_eq!(report.new_clients, 1);
        assert_eq!(report.active_deals, 2);
        assert_eq!(report.won_deals, 1);
        assert_eq!(report.task_completion_rate, 50.0);
        assert_eq!(report.quote_conversion_rate, 50.0);
        assert_eq!(report.total_quotes, 2);
        assert_eq!(report.accepted_quotes, 1);
        assert_eq!(report.window_start_ts, NOW - 30 * DAY);
    }

    #[test]
    fn test_monthly_revenue_buckets() {
        let registry = StageRegistry::builtin();
        let mut quote = Quote::new("q1", "Hosting", QuoteStatus::Accepted, NOW);
        quote.total = 50.0;
        let data = Dataset {
            deals: vec![
                Deal::new("d1", "closed-won", 100.0, NOW),
                Deal::new("d2", "closed-won", 200.0, NOW - 40 * DAY),
                Deal::new("d3", "proposal", 999.0, NOW),
            ],
            quotes: vec![quote],
            ..Dataset::default()
        };

        let months = monthly_revenue(registry, &data);
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month, "2025-08");
        assert_eq!(months[0].revenue, 200.0);
        assert_eq!(months[1].month, "2025-10");
        assert_eq!(months[1].revenue, 150.0);
        assert_eq!(months[1].deals, 1);
        assert_eq!(months[1].quotes, 1);
    }

    #[test]
    fn test_monthly_revenue_keeps_last_twelve() {
        let registry = StageRegistry::builtin();
        let deals = (0..15)
            .map(|i| Deal::new(&format!("d{}", i), "closed-won", 10.0, NOW - i * 31 * DAY))
            .collect();
        let data = Dataset {
            deals,
            ..Dataset::default()
        };
        let months = monthly_revenue(registry, &data);
        assert_eq!(months.len(), 12);
        assert_eq!(months.last().unwrap().month, "2025-10");
    }
}
