// Pipeline snapshot: per-stage counts, values and stage-to-stage conversion

use crate::funnel::normalize::normalize;
use crate::models::{Deal, StageKind};
use crate::registry::StageRegistry;
use serde::Serialize;

/// Which stages a snapshot reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotMode {
    /// Stages holding at least one deal (dashboard view)
    #[default]
    ActiveOnly,
    /// Every registry stage, empty ones included (audit view)
    FullRegistry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageMetrics {
    pub stage_id: String,
    pub display_name: String,
    pub order: u32,
    pub kind: StageKind,
    pub count: usize,
    pub total_value: f64,
    /// Percentage of the previous stage's count, in [0, 100]
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSnapshot {
    pub stages: Vec<StageMetrics>,
    pub total_deals: usize,
    pub total_value: f64,
    pub open_deals: usize,
    pub open_value: f64,
    pub won_deals: usize,
    pub won_value: f64,
    /// Won deals as a percentage of all deals
    pub win_rate: f64,
}

impl PipelineSnapshot {
    pub fn stage(&self, id: &str) -> Option<&StageMetrics> {
        self.stages.iter().find(|s| s.stage_id == id)
    }

    pub fn conversion_rates(&self) -> Vec<f64> {
        self.stages.iter().map(|s| s.conversion_rate).collect()
    }
}

/// Conversion from a stage with `previous` deals into one with `current`.
/// Clamped to [0, 100]: stages can hold more deals than the one before them.
pub fn conversion_rate(current: usize, previous: usize) -> f64 {
    if previous == 0 {
        return 0.0;
    }
    (current as f64 * 100.0 / previous as f64).min(100.0)
}

/// Recompute the pipeline from the current deal collection.
///
/// Deals are grouped by normalized stage, so every deal lands in exactly one
/// registry stage. Conversion rates always follow full registry order; the
/// mode only decides which stages are reported.
pub fn compute_snapshot(
    registry: &StageRegistry,
    deals: &[Deal],
    mode: SnapshotMode,
) -> PipelineSnapshot {
    let stages = registry.list_stages();
    let mut counts = vec![0usize; stages.len()];
    let mut values = vec![0.0f64; stages.len()];

    for deal in deals {
        let stage_id = normalize(registry, &deal.stage);
        if let Some(position) = registry.position(stage_id) {
            counts[position] += 1;
            values[position] += deal.value;
        }
    }

    let mut metrics = Vec::with_capacity(stages.len());
    for (position, stage) in stages.iter().enumerate() {
        let rate = if position == 0 {
            100.0
        } else {
            conversion_rate(counts[position], counts[position - 1])
        };
        metrics.push(StageMetrics {
            stage_id: stage.id.clone(),
            display_name: stage.display_name.clone(),
            order: stage.order,
            kind: stage.kind,
            count: counts[position],
            total_value: values[position],
            conversion_rate: rate,
        });
    }

    let sum_where = |pred: fn(StageKind) -> bool| -> (usize, f64) {
        metrics
            .iter()
            .filter(|m| pred(m.kind))
            .fold((0, 0.0), |(n, v), m| (n + m.count, v + m.total_value))
    };
    let (open_deals, open_value) = sum_where(|k| !k.is_terminal());
    let (won_deals, won_value) = sum_where(|k| k == StageKind::Won);
    let total_deals = counts.iter().sum::<usize>();
    let total_value = values.iter().sum::<f64>();
    let win_rate = if total_deals > 0 {
        won_deals as f64 * 100.0 / total_deals as f64
    } else {
        0.0
    };

    if mode == SnapshotMode::ActiveOnly {
        metrics.retain(|m| m.count > 0);
    }

    PipelineSnapshot {
        stages: metrics,
        total_deals,
        total_value,
        open_deals,
        open_value,
        won_deals,
        won_value,
        win_rate,
    }
}
