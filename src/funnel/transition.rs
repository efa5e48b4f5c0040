// Stage move validation for drag-and-drop reassignment

use crate::registry::StageRegistry;
use serde::Serialize;
use thiserror::Error;

/// Why a stage move was refused
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "stage", rename_all = "snake_case")]
pub enum RejectReason {
    #[error("Unknown stage: '{0}'")]
    UnknownStage(String),

    /// Source and target coincide. Not a failure, the write can be skipped.
    #[error("Deal is already in that stage")]
    NoOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Forward,
    Backward,
    /// The current stage is not a registry member (legacy data)
    FromUnknown,
}

impl MoveDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveDirection::Forward => "forward",
            MoveDirection::Backward => "backward",
            MoveDirection::FromUnknown => "from unknown stage",
        }
    }
}

/// An accepted move, ready for the caller to persist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageMove {
    pub deal_id: String,
    pub from_stage: String,
    pub to_stage: String,
    pub direction: MoveDirection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionDecision {
    Accept(StageMove),
    Reject(RejectReason),
}

impl TransitionDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, TransitionDecision::Accept(_))
    }

    pub fn into_result(self) -> Result<StageMove, RejectReason> {
        match self {
            TransitionDecision::Accept(stage_move) => Ok(stage_move),
            TransitionDecision::Reject(reason) => Err(reason),
        }
    }
}

/// Gate a stage move before it is committed.
///
/// Only the target must be a registry stage. Moves in either direction are
/// accepted: deals regress in real pipelines, e.g. negotiation back to
/// qualified.
pub fn validate_transition(
    registry: &StageRegistry,
    deal_id: &str,
    from_stage: &str,
    to_stage: &str,
) -> TransitionDecision {
    let Some(to_position) = registry.position(to_stage) else {
        return TransitionDecision::Reject(RejectReason::UnknownStage(to_stage.to_string()));
    };
    if from_stage == to_stage {
        return TransitionDecision::Reject(RejectReason::NoOp);
    }

    let direction = match registry.position(from_stage) {
        Some(from_position) if to_position > from_position => MoveDirection::Forward,
        Some(_) => MoveDirection::Backward,
        None => MoveDirection::FromUnknown,
    };

    TransitionDecision::Accept(StageMove {
        deal_id: deal_id.to_string(),
        from_stage: from_stage.to_string(),
        to_stage: to_stage.to_string(),
        direction,
    })
}
