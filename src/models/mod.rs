// Core data models for LeadConverter
// These structs represent the domain entities

pub mod stage;
pub mod deal;
pub mod task;
pub mod quote;
pub mod client;
pub mod dataset;

pub use stage::*;
pub use deal::*;
pub use task::*;
pub use quote::*;
pub use client::*;
pub use dataset::*;
