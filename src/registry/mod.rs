// Stage registry: the ordered catalog of valid pipeline stages

use crate::models::{StageDefinition, StageKind};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// Reasons a stage catalog cannot be used as a registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Stage registry is empty")]
    Empty,

    #[error("Stage at order {0} has an empty id")]
    EmptyId(u32),

    #[error("Duplicate stage id: '{0}'")]
    DuplicateId(String),

    #[error("Stage orders must be contiguous from 0: expected {expected}, found {found} ('{id}')")]
    NonContiguousOrder { id: String, expected: u32, found: u32 },

    #[error("Initial stage '{0}' cannot be a terminal stage")]
    TerminalInitialStage(String),

    #[error("Stage registry has no terminal won stage")]
    MissingWonStage,

    #[error("Stage registry has no terminal lost stage")]
    MissingLostStage,
}

/// Immutable, validated stage catalog.
///
/// Built once at startup and shared by reference. Stages are kept sorted by
/// `order`, so a stage's order is also its index.
#[derive(Debug, Clone)]
pub struct StageRegistry {
    stages: Vec<StageDefinition>,
    index: HashMap<String, usize>,
}

impl StageRegistry {
    /// Build a registry, checking every catalog invariant
    pub fn new(mut stages: Vec<StageDefinition>) -> std::result::Result<Self, RegistryError> {
        if stages.is_empty() {
            return Err(RegistryError::Empty);
        }

        stages.sort_by_key(|s| s.order);

        let mut index = HashMap::with_capacity(stages.len());
        for (position, stage) in stages.iter().enumerate() {
            if stage.id.trim().is_empty() {
                return Err(RegistryError::EmptyId(stage.order));
            }
            if stage.order != position as u32 {
                return Err(RegistryError::NonContiguousOrder {
                    id: stage.id.clone(),
                    expected: position as u32,
                    found: stage.order,
                });
            }
            if index.insert(stage.id.clone(), position).is_some() {
                return Err(RegistryError::DuplicateId(stage.id.clone()));
            }
        }

        if stages[0].is_terminal() {
            return Err(RegistryError::TerminalInitialStage(stages[0].id.clone()));
        }
        if !stages.iter().any(|s| s.is_terminal_won()) {
            return Err(RegistryError::MissingWonStage);
        }
        if !stages.iter().any(|s| s.is_terminal_lost()) {
            return Err(RegistryError::MissingLostStage);
        }

        Ok(Self { stages, index })
    }

    /// Process-wide registry with the default sales funnel
    pub fn builtin() -> &'static StageRegistry {
        static BUILTIN: OnceLock<StageRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            StageRegistry::new(default_stages())
                .unwrap_or_else(|e| panic!("built-in stage catalog is invalid: {}", e))
        })
    }

    /// Load a custom catalog from a JSON array of stage definitions
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stage registry: {}", path.display()))?;
        let stages: Vec<StageDefinition> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse stage registry: {}", path.display()))?;
        let registry = Self::new(stages)
            .with_context(|| format!("Invalid stage registry: {}", path.display()))?;
        log::debug!("Loaded {} stages from {}", registry.len(), path.display());
        Ok(registry)
    }

    /// All stages in pipeline order
    pub fn list_stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    pub fn is_valid_stage(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Look up a stage by id. `None` means the value needs normalization.
    pub fn get_stage(&self, id: &str) -> Option<&StageDefinition> {
        self.index.get(id).map(|&i| &self.stages[i])
    }

    /// Pipeline position (equal to `order`) of a stage id
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// The order-0 stage, target of every normalization reset
    pub fn initial_stage(&self) -> &StageDefinition {
        &self.stages[0]
    }

    /// Non-terminal stages in pipeline order
    pub fn open_stages(&self) -> impl Iterator<Item = &StageDefinition> {
        self.stages.iter().filter(|s| !s.is_terminal())
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

/// The default six-stage sales funnel
pub fn default_stages() -> Vec<StageDefinition> {
    vec![
        StageDefinition::new("lead", "Lead", 0, StageKind::Open)
            .with_description("Initial contact")
            .with_color("gray"),
        StageDefinition::new("qualified", "Qualified", 1, StageKind::Open)
            .with_description("Qualified lead")
            .with_color("blue"),
        StageDefinition::new("proposal", "Proposal", 2, StageKind::Open)
            .with_description("Proposal sent")
            .with_color("yellow"),
        StageDefinition::new("negotiation", "Negotiation", 3, StageKind::Open)
            .with_description("Under negotiation")
            .with_color("orange"),
        StageDefinition::new("closed-won", "Closed - Won", 4, StageKind::Won)
            .with_description("Sale made")
            .with_color("green"),
        StageDefinition::new("closed-lost", "Closed - Lost", 5, StageKind::Lost)
            .with_description("Sale lost")
            .with_color("red"),
    ]
}
