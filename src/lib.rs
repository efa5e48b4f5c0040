//! LeadConverter - sales funnel core for a small CRM
//!
//! This library provides:
//! - The stage registry: the ordered catalog of pipeline stages
//! - Stage normalization, move validation and pipeline snapshots
//! - Stale-deal detection, notifications and funnel health insights
//! - Period reports over deals, tasks and quotes
//! - A JSON data file and the `leadconverter` CLI on top
//!
//! # Example
//!
//! ```
//! use leadconverter::funnel::{compute_snapshot, normalize, SnapshotMode};
//! use leadconverter::models::Deal;
//! use leadconverter::registry::StageRegistry;
//!
//! let registry = StageRegistry::builtin();
//! assert_eq!(normalize(registry, "a1b2c3d4e5f6g7"), "lead");
//!
//! let deals = vec![Deal::new("d1", "lead", 100.0, 0)];
//! let snapshot = compute_snapshot(registry, &deals, SnapshotMode::ActiveOnly);
//! assert_eq!(snapshot.total_deals, 1);
//! ```

pub mod models;
pub mod registry;
pub mod funnel;
pub mod notify;
pub mod report;
pub mod config;
pub mod store;
pub mod cli;
pub mod utils;
