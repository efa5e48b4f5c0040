//! Sales-funnel core: stage normalization, move validation, pipeline
//! snapshots, stale-deal detection and funnel health.
//!
//! Everything here is synchronous and free of I/O. Functions borrow the
//! registry and the deal collection and return derived values; callers own
//! persistence and decide whether to write anything back.

pub mod normalize;
pub mod transition;
pub mod snapshot;
pub mod severity;
pub mod stale;
pub mod health;

pub use normalize::{normalize, normalize_collection, normalize_deal, CorruptionCause, NormalizationResult};
pub use transition::{validate_transition, MoveDirection, RejectReason, StageMove, TransitionDecision};
pub use snapshot::{compute_snapshot, PipelineSnapshot, SnapshotMode, StageMetrics};
pub use severity::{Severity, SeverityTiers};
pub use stale::{assess_staleness, find_stale_deals, StaleConfig, StaleDeal, Staleness};
pub use health::{assess_health, ConversionInsight, DistributionInsight, FunnelHealth};
