use serde::{Deserialize, Serialize};

/// Pipeline exit classification for a stage.
///
/// Won and lost are mutually exclusive; a stage that is neither is `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    #[default]
    Open,
    Won,
    Lost,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Open => "open",
            StageKind::Won => "won",
            StageKind::Lost => "lost",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StageKind::Won | StageKind::Lost)
    }
}

/// One entry of the stage registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDefinition {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub order: u32,
    #[serde(default)]
    pub kind: StageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl StageDefinition {
    pub fn new(id: &str, display_name: &str, order: u32, kind: StageKind) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            order,
            kind,
            description: None,
            color: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn is_terminal_won(&self) -> bool {
        self.kind == StageKind::Won
    }

    pub fn is_terminal_lost(&self) -> bool {
        self.kind == StageKind::Lost
    }

    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }
}
