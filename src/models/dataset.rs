use super::{Client, Deal, Quote, Task};
use serde::{Deserialize, Serialize};

/// Everything the CRM hands the pipeline tools in one load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Dataset {
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub deals: Vec<Deal>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub quotes: Vec<Quote>,
}

impl Dataset {
    pub fn find_deal(&self, id: &str) -> Option<&Deal> {
        self.deals.iter().find(|d| d.id == id)
    }

    pub fn find_deal_mut(&mut self, id: &str) -> Option<&mut Deal> {
        self.deals.iter_mut().find(|d| d.id == id)
    }
}
