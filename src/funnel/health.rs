// Funnel health: distribution and conversion insights over normalized deals

use crate::funnel::normalize::normalize;
use crate::funnel::snapshot::conversion_rate;
use crate::models::Deal;
use crate::registry::StageRegistry;
use serde::Serialize;

const BALANCED_MAX_INITIAL_SHARE: f64 = 50.0;
const BALANCED_MIN_MIDDLE_SHARE: f64 = 20.0;
const BOTTLENECK_MIN_SHARE: f64 = 40.0;
const BOTTLENECK_MIN_DEALS: usize = 3;
const TOP_HEAVY_MIN_SHARE: f64 = 70.0;
const TOP_HEAVY_MIN_OPEN_DEALS: usize = 5;
const CONVERSION_MIN_SAMPLE: usize = 10;
const STRONG_CONVERSION_RATE: f64 = 20.0;
const WEAK_CONVERSION_RATE: f64 = 10.0;

/// How open deals are spread across the open stages
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionInsight {
    /// Deals are moving: few sit at the entry, the closing stage is fed
    Balanced { closing_stage: String, closing_count: usize },
    /// One later open stage holds too large a share of open deals
    Bottleneck { stage: String, share: f64, count: usize },
    /// Most open deals have not left the entry stage
    TopHeavy { stage: String, share: f64 },
}

/// Entry-to-won conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversionInsight {
    Strong { rate: f64, sample: usize },
    Weak { rate: f64, sample: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct FunnelHealth {
    pub open_deals: usize,
    pub distribution: Option<DistributionInsight>,
    pub conversion: Option<ConversionInsight>,
}

fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Evaluate the funnel shape. Insights are only produced when the data
/// supports them; both fields are `None` for an empty or tiny pipeline.
pub fn assess_health(registry: &StageRegistry, deals: &[Deal]) -> FunnelHealth {
    let mut counts = vec![0usize; registry.len()];
    for deal in deals {
        if let Some(position) = registry.position(normalize(registry, &deal.stage)) {
            counts[position] += 1;
        }
    }

    let stages = registry.list_stages();
    let open: Vec<(usize, &str)> = stages
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.is_terminal())
        .map(|(i, s)| (i, s.id.as_str()))
        .collect();
    let open_total: usize = open.iter().map(|&(i, _)| counts[i]).sum();

    FunnelHealth {
        open_deals: open_total,
        distribution: distribution_insight(&open, &counts, open_total),
        conversion: conversion_insight(registry, &counts),
    }
}

fn distribution_insight(
    open: &[(usize, &str)],
    counts: &[usize],
    open_total: usize,
) -> Option<DistributionInsight> {
    let &(initial, initial_id) = open.first()?;
    let initial_share = share(counts[initial], open_total);

    if open.len() >= 3 {
        let &(closing, closing_id) = open.last()?;
        let middle = &open[1..open.len() - 1];
        let middle_fed = middle
            .iter()
            .any(|&(i, _)| share(counts[i], open_total) > BALANCED_MIN_MIDDLE_SHARE);
        if initial_share < BALANCED_MAX_INITIAL_SHARE && middle_fed && counts[closing] > 0 {
            return Some(DistributionInsight::Balanced {
                closing_stage: closing_id.to_string(),
                closing_count: counts[closing],
            });
        }
    }

    let bottleneck = open[1..]
        .iter()
        .filter(|&&(i, _)| {
            counts[i] > BOTTLENECK_MIN_DEALS && share(counts[i], open_total) > BOTTLENECK_MIN_SHARE
        })
        .max_by_key(|&&(i, _)| counts[i]);
    if let Some(&(i, id)) = bottleneck {
        return Some(DistributionInsight::Bottleneck {
            stage: id.to_string(),
            share: share(counts[i], open_total),
            count: counts[i],
        });
    }

    if initial_share > TOP_HEAVY_MIN_SHARE && open_total > TOP_HEAVY_MIN_OPEN_DEALS {
        return Some(DistributionInsight::TopHeavy {
            stage: initial_id.to_string(),
            share: initial_share,
        });
    }

    None
}

fn conversion_insight(registry: &StageRegistry, counts: &[usize]) -> Option<ConversionInsight> {
    let entered = counts[0];
    let won: usize = registry
        .list_stages()
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_terminal_won())
        .map(|(i, _)| counts[i])
        .sum();

    let sample = entered + won;
    if sample < CONVERSION_MIN_SAMPLE {
        return None;
    }

    let rate = conversion_rate(won, sample);
    if rate >= STRONG_CONVERSION_RATE {
        Some(ConversionInsight::Strong { rate, sample })
    } else if rate < WEAK_CONVERSION_RATE {
        Some(ConversionInsight::Weak { rate, sample })
    } else {
        None
    }
}
