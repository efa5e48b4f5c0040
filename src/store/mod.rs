// JSON data file: the persistence collaborator for the CLI
//
// The pipeline core never touches this; only CLI commands load and save.

use crate::funnel::{NormalizationResult, StageMove};
use crate::models::{Dataset, Deal};
use anyhow::{Context, Result};
use std::path::Path;

pub struct DataFile;

impl DataFile {
    /// Load a dataset. A missing file is an empty dataset.
    pub fn load(path: &Path) -> Result<Dataset> {
        if !path.exists() {
            log::debug!("Data file {} does not exist, starting empty", path.display());
            return Ok(Dataset::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file: {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Dataset::default());
        }
        let data: Dataset = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse data file: {}", path.display()))?;
        log::debug!(
            "Loaded {} deals, {} tasks, {} quotes, {} clients from {}",
            data.deals.len(),
            data.tasks.len(),
            data.quotes.len(),
            data.clients.len(),
            path.display()
        );
        Ok(data)
    }

    /// Write the dataset, creating parent directories if needed.
    /// Goes through a temporary file so a failed write keeps the old data.
    pub fn save(path: &Path, data: &Dataset) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(data).context("Failed to serialize data")?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write data file: {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace data file: {}", path.display()))?;
        Ok(())
    }
}

/// Write normalized stages back onto the matching deals.
/// Returns how many deals were updated.
///
/// A correction only applies to the deal it was computed from: the one at
/// its recorded position, or else the first deal with the same id that still
/// holds the raw stage.
pub fn apply_corrections(data: &mut Dataset, corrections: &[NormalizationResult], now_ts: i64) -> usize {
    let mut applied = 0;
    for correction in corrections.iter().filter(|c| c.was_corrected) {
        let matches = |deal: &Deal| deal.id == correction.deal_id && deal.stage == correction.raw_stage;
        let target = match correction.position {
            Some(position) => data.deals.get_mut(position).filter(|deal| matches(deal)),
            None => data.deals.iter_mut().find(|deal| matches(deal)),
        };
        let Some(deal) = target else {
            log::warn!(
                "Skipping correction for deal {}: stage is no longer '{}'",
                correction.deal_id,
                correction.raw_stage
            );
            continue;
        };
        log::info!(
            "Correcting deal {} stage '{}' -> '{}'",
            deal.id,
            correction.raw_stage,
            correction.normalized_stage
        );
        deal.stage = correction.normalized_stage.clone();
        deal.updated_ts = now_ts;
        applied += 1;
    }
    applied
}

/// Commit an accepted stage move
pub fn apply_move(data: &mut Dataset, stage_move: &StageMove, now_ts: i64) -> Result<()> {
    let deal = data
        .find_deal_mut(&stage_move.deal_id)
        .with_context(|| format!("Deal '{}' not found", stage_move.deal_id))?;
    deal.stage = stage_move.to_stage.clone();
    deal.updated_ts = now_ts;
    log::info!(
        "Moved deal {} from '{}' to '{}'",
        stage_move.deal_id,
        stage_move.from_stage,
        stage_move.to_stage
    );
    Ok(())
}
