// Stage normalization: map stage values of unknown provenance onto the registry

use crate::models::Deal;
use crate::registry::StageRegistry;
use serde::Serialize;

/// Why a raw stage value was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptionCause {
    /// Blank or whitespace-only value
    Empty,
    /// Looks like a persistence-layer record id written into the stage field
    ForeignIdentifier,
    /// Anything else: stale labels, typos, retired schema values
    UnknownLabel,
}

impl CorruptionCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorruptionCause::Empty => "empty",
            CorruptionCause::ForeignIdentifier => "foreign_identifier",
            CorruptionCause::UnknownLabel => "unknown_label",
        }
    }

    /// Classify a value already known not to be a registry id
    pub fn classify(raw: &str) -> Self {
        if raw.trim().is_empty() {
            CorruptionCause::Empty
        } else if raw.len() > 10 && raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            CorruptionCause::ForeignIdentifier
        } else {
            CorruptionCause::UnknownLabel
        }
    }
}

/// Outcome of normalizing one deal's stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizationResult {
    pub deal_id: String,
    pub raw_stage: String,
    pub normalized_stage: String,
    pub was_corrected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<CorruptionCause>,
    /// Index of the deal in the collection it was normalized from.
    /// Ids are not guaranteed unique in stored data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

/// Map a raw stage value onto a registry id.
///
/// Registry ids come back unchanged. Every other value resets to the initial
/// stage; nothing in a corrupted value says where the deal really was.
pub fn normalize<'r>(registry: &'r StageRegistry, raw_stage: &str) -> &'r str {
    match registry.get_stage(raw_stage) {
        Some(stage) => &stage.id,
        None => &registry.initial_stage().id,
    }
}

/// Normalize a single deal without touching it
pub fn normalize_deal(registry: &StageRegistry, deal: &Deal) -> NormalizationResult {
    let normalized = normalize(registry, &deal.stage);
    let was_corrected = normalized != deal.stage;
    NormalizationResult {
        deal_id: deal.id.clone(),
        raw_stage: deal.stage.clone(),
        normalized_stage: normalized.to_string(),
        was_corrected,
        cause: was_corrected.then(|| CorruptionCause::classify(&deal.stage)),
        position: None,
    }
}

/// Normalize every deal in a collection.
///
/// Returns the sanitized deals, in input order with only `stage` rewritten,
/// and the correction log: one entry per deal whose stage changed. Nothing is
/// written back; the caller decides whether to persist the log.
pub fn normalize_collection(
    registry: &StageRegistry,
    deals: &[Deal],
) -> (Vec<Deal>, Vec<NormalizationResult>) {
    let mut sanitized = Vec::with_capacity(deals.len());
    let mut corrections = Vec::new();

    for (position, deal) in deals.iter().enumerate() {
        let mut result = normalize_deal(registry, deal);
        result.position = Some(position);
        let mut clean = deal.clone();
        if result.was_corrected {
            clean.stage = result.normalized_stage.clone();
            corrections.push(result);
        }
        sanitized.push(clean);
    }

    if !corrections.is_empty() {
        log::debug!(
            "Normalized {} deals, {} stage value(s) reset to '{}'",
            deals.len(),
            corrections.len(),
            registry.initial_stage().id
        );
    }

    (sanitized, corrections)
}
