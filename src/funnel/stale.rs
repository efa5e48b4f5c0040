// Stale-deal detection
//
// "now" always comes from the caller; nothing here reads a clock.

use crate::funnel::normalize::normalize;
use crate::funnel::severity::{Severity, SeverityTiers};
use crate::models::Deal;
use crate::registry::StageRegistry;
use serde::Serialize;

pub const SECS_PER_DAY: i64 = 86_400;

/// Default threshold: two days without an update
pub const DEFAULT_STALE_THRESHOLD_SECS: i64 = 2 * SECS_PER_DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleConfig {
    pub threshold_secs: i64,
    pub tiers: SeverityTiers,
}

impl Default for StaleConfig {
    fn default() -> Self {
        Self {
            threshold_secs: DEFAULT_STALE_THRESHOLD_SECS,
            tiers: SeverityTiers::STALE_DEAL,
        }
    }
}

impl StaleConfig {
    pub fn with_threshold_secs(threshold_secs: i64) -> Self {
        Self {
            threshold_secs,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Staleness {
    pub is_stale: bool,
    /// Whole days since the last update
    pub elapsed_days: i64,
    pub severity: Severity,
}

impl Staleness {
    fn fresh() -> Self {
        Self {
            is_stale: false,
            elapsed_days: 0,
            severity: Severity::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaleDeal {
    pub deal_id: String,
    pub title: String,
    pub stage: String,
    pub value: f64,
    pub updated_ts: i64,
    #[serde(flatten)]
    pub staleness: Staleness,
}

/// Assess one deal's stage and last update against `now_ts`.
///
/// Terminal stages are never stale. An update exactly `threshold_secs` old
/// is stale. A timestamp in the future counts as fresh.
pub fn assess_staleness(
    registry: &StageRegistry,
    stage: &str,
    updated_ts: i64,
    now_ts: i64,
    config: &StaleConfig,
) -> Staleness {
    let stage_id = normalize(registry, stage);
    let terminal = registry
        .get_stage(stage_id)
        .map(|s| s.is_terminal())
        .unwrap_or(false);
    if terminal {
        return Staleness::fresh();
    }

    let elapsed_secs = now_ts.saturating_sub(updated_ts);
    if elapsed_secs < 0 {
        return Staleness::fresh();
    }

    let elapsed_days = elapsed_secs / SECS_PER_DAY;
    Staleness {
        is_stale: elapsed_secs >= config.threshold_secs,
        elapsed_days,
        severity: config.tiers.classify(elapsed_days),
    }
}

/// All stale deals, most severe first, then longest idle
pub fn find_stale_deals(
    registry: &StageRegistry,
    deals: &[Deal],
    now_ts: i64,
    config: &StaleConfig,
) -> Vec<StaleDeal> {
    let mut stale: Vec<StaleDeal> = deals
        .iter()
        .filter_map(|deal| {
            let staleness = assess_staleness(registry, &deal.stage, deal.updated_ts, now_ts, config);
            staleness.is_stale.then(|| StaleDeal {
                deal_id: deal.id.clone(),
                title: deal.label().to_string(),
                stage: normalize(registry, &deal.stage).to_string(),
                value: deal.value,
                updated_ts: deal.updated_ts,
                staleness,
            })
        })
        .collect();

    stale.sort_by(|a, b| {
        b.staleness
            .severity
            .cmp(&a.staleness.severity)
            .then(a.updated_ts.cmp(&b.updated_ts))
    });
    stale
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_760_000_000;

    #[test]
    fn test_threshold_boundary() {
        let registry = StageRegistry::builtin();
        let config = StaleConfig::default();

        let at_threshold = assess_staleness(registry, "proposal", NOW - 2 * SECS_PER_DAY, NOW, &config);
        assert!(at_threshold.is_stale);
        assert_eq!(at_threshold.elapsed_days, 2);
        assert_eq!(at_threshold.severity, Severity::Low);

        let just_before = assess_staleness(registry, "proposal", NOW - 2 * SECS_PER_DAY + 1, NOW, &config);
        assert!(!just_before.is_stale);
        assert_eq!(just_before.elapsed_days, 1);
    }

    #[test]
    fn test_terminal_stages_never_stale() {
        let registry = StageRegistry::builtin();
        let config = StaleConfig::default();
        let long_ago = NOW - 365 * SECS_PER_DAY;

        assert!(!assess_staleness(registry, "closed-won", long_ago, NOW, &config).is_stale);
        assert!(!assess_staleness(registry, "closed-lost", long_ago, NOW, &config).is_stale);
        assert!(assess_staleness(registry, "negotiation", long_ago, NOW, &config).is_stale);
    }

    #[test]
    fn test_severity_buckets() {
        let registry = StageRegistry::builtin();
        let config = StaleConfig::default();
        let days_ago = |d: i64| NOW - d * SECS_PER_DAY;

        assert_eq!(assess_staleness(registry, "lead", days_ago(5), NOW, &config).severity, Severity::Low);
        assert_eq!(assess_staleness(registry, "lead", days_ago(6), NOW, &config).severity, Severity::Medium);
        assert_eq!(assess_staleness(registry, "lead", days_ago(7), NOW, &config).severity, Severity::Medium);
        assert_eq!(assess_staleness(registry, "lead", days_ago(8), NOW, &config).severity, Severity::High);
    }

    #[test]
    fn test_custom_threshold() {
        let registry = StageRegistry::builtin();
        let config = StaleConfig::with_threshold_secs(12 * 3600);
        assert!(assess_staleness(registry, "lead", NOW - 12 * 3600, NOW, &config).is_stale);
        assert!(!assess_staleness(registry, "lead", NOW - 12 * 3600 + 1, NOW, &config).is_stale);
    }

    #[test]
    fn test_future_update_is_fresh() {
        let registry = StageRegistry::builtin();
        let staleness = assess_staleness(registry, "lead", NOW + 3600, NOW, &StaleConfig::default());
        assert!(!staleness.is_stale);
        assert_eq!(staleness.elapsed_days, 0);
    }

    #[test]
    fn test_corrupted_stage_treated_as_initial() {
        let registry = StageRegistry::builtin();
        let staleness = assess_staleness(registry, "", NOW - 3 * SECS_PER_DAY, NOW, &StaleConfig::default());
        assert!(staleness.is_stale);
    }

    #[test]
    fn test_find_stale_deals_ordering() {
        let registry = StageRegistry::builtin();
        let mut deals = vec![
            Deal::new("fresh", "lead", 10.0, NOW - 3600),
            Deal::new("low", "qualified", 10.0, NOW - 3 * SECS_PER_DAY),
            Deal::new("high", "proposal", 10.0, NOW - 10 * SECS_PER_DAY),
            Deal::new("won", "closed-won", 10.0, NOW - 30 * SECS_PER_DAY),
            Deal::new("medium", "negotiation", 10.0, NOW - 6 * SECS_PER_DAY),
            Deal::new("older-low", "lead", 10.0, NOW - 4 * SECS_PER_DAY),
        ];
        deals[1].stage = "xyz123".to_string();

        let stale = find_stale_deals(registry, &deals, NOW, &StaleConfig::default());
        let ids: Vec<&str> = stale.iter().map(|s| s.deal_id.as_str()).collect();
        assert_eq!(ids, vec!["high", "medium", "older-low", "low"]);
        assert_eq!(stale[3].stage, "lead");
    }
}
