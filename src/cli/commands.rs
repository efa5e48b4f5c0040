use clap::{Parser, Subcommand};
use crate::cli::error::{validate_deal_id, UserError};
use crate::cli::output::{
    format_corrections, format_health, format_notifications, format_report, format_snapshot,
    format_stage_list, format_stale_deals, get_terminal_width,
};
use crate::config::Config;
use crate::funnel::{
    assess_health, compute_snapshot, find_stale_deals, normalize_collection, validate_transition,
    RejectReason, SnapshotMode, StaleConfig, TransitionDecision,
};
use crate::models::Dataset;
use crate::notify::build_notifications;
use crate::registry::StageRegistry;
use crate::report::{Period, PeriodReport};
use crate::store::{apply_corrections, apply_move, DataFile};
use crate::utils::{parse_date_expr, parse_duration};
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "leadconverter")]
#[command(about = "LeadConverter - sales funnel stage registry, normalization and pipeline reporting")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Data file to use instead of data.location from the rc file
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the pipeline stages
    Stages {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Check deal stages and report the ones that need correction
    Normalize {
        /// Write corrected stages back to the data file
        #[arg(long)]
        apply: bool,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Move a deal to another stage
    Move {
        /// Deal ID
        deal_id: String,
        /// Target stage ID
        stage: String,
        /// Validate only, do not save
        #[arg(long)]
        dry_run: bool,
    },
    /// Show per-stage counts, values and conversion rates
    Snapshot {
        /// Include empty stages
        #[arg(long)]
        full: bool,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// List deals without a recent update
    Stale {
        /// Reference time (e.g. "2026-01-10", "2026-01-10T14:30", Unix seconds)
        #[arg(long)]
        now: Option<String>,
        /// Staleness threshold (e.g. "2d", "36h")
        #[arg(long)]
        threshold: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show alerts for overdue tasks, expired quotes and stale deals
    Notifications {
        /// Reference time
        #[arg(long)]
        now: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show funnel distribution and conversion insights
    Health {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show the period report
    Report {
        /// Period: 7d, 30d, 90d or 1y
        #[arg(long, default_value = "30d")]
        period: String,
        /// Reference time
        #[arg(long)]
        now: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Everything a command needs, resolved once per invocation
struct Session {
    config: Config,
    registry: StageRegistry,
    data_path: PathBuf,
}

impl Session {
    fn load(data_override: Option<PathBuf>) -> Result<Self> {
        let config = Config::load()?;
        let registry = config.registry()?;
        let data_path = data_override.unwrap_or_else(|| config.data_path.clone());
        Ok(Self { config, registry, data_path })
    }

    fn dataset(&self) -> Result<Dataset> {
        DataFile::load(&self.data_path)
    }
}

fn resolve_now(now: Option<&str>) -> Result<i64> {
    match now {
        Some(expr) => parse_date_expr(expr).map_err(|e| UserError::new(e.to_string()).into()),
        None => Ok(chrono::Utc::now().timestamp()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let session = Session::load(cli.data)?;

    match cli.command {
        Commands::Stages { json } => handle_stages(&session, json),
        Commands::Normalize { apply, json } => handle_normalize(&session, apply, json),
        Commands::Move { deal_id, stage, dry_run } => handle_move(&session, &deal_id, &stage, dry_run),
        Commands::Snapshot { full, json } => handle_snapshot(&session, full, json),
        Commands::Stale { now, threshold, json } => {
            handle_stale(&session, now.as_deref(), threshold.as_deref(), json)
        }
        Commands::Notifications { now, json } => handle_notifications(&session, now.as_deref(), json),
        Commands::Health { json } => handle_health(&session, json),
        Commands::Report { period, now, json } => handle_report(&session, &period, now.as_deref(), json),
    }
}

fn handle_stages(session: &Session, json: bool) -> Result<()> {
    if json {
        return print_json(&session.registry.list_stages());
    }
    print!("{}", format_stage_list(&session.registry));
    Ok(())
}

fn handle_normalize(session: &Session, apply: bool, json: bool) -> Result<()> {
    let mut data = session.dataset()?;
    let (sanitized, corrections) = normalize_collection(&session.registry, &data.deals);

    for c in &corrections {
        log::warn!(
            "Deal {} has invalid stage '{}', normalized to '{}'",
            c.deal_id,
            c.raw_stage,
            c.normalized_stage
        );
    }

    let write_back = (apply || session.config.apply_corrections) && !corrections.is_empty();
    let applied = if write_back {
        let now = chrono::Utc::now().timestamp();
        let applied = apply_corrections(&mut data, &corrections, now);
        DataFile::save(&session.data_path, &data)
            .with_context(|| format!("Failed to write corrections for {} deal(s)", applied))?;
        applied
    } else {
        0
    };

    if json {
        return print_json(&serde_json::json!({
            "deals": sanitized,
            "corrections": corrections,
            "applied": applied,
        }));
    }

    print!("{}", format_corrections(sanitized.len(), &corrections));
    if write_back {
        println!("Wrote {} correction(s) to {}.", applied, session.data_path.display());
    } else if !corrections.is_empty() {
        println!("Not written. Re-run with --apply to save the corrections.");
    }
    Ok(())
}

fn handle_move(session: &Session, deal_id: &str, stage: &str, dry_run: bool) -> Result<()> {
    validate_deal_id(deal_id)?;
    let mut data = session.dataset()?;
    let from_stage = data
        .find_deal(deal_id)
        .map(|d| d.stage.clone())
        .ok_or_else(|| UserError::new(format!("Deal '{}' not found", deal_id)))?;

    let stage_move = match validate_transition(&session.registry, deal_id, &from_stage, stage) {
        TransitionDecision::Accept(stage_move) => stage_move,
        TransitionDecision::Reject(RejectReason::NoOp) => {
            println!("Deal {} is already in stage '{}'. Nothing to do.", deal_id, stage);
            return Ok(());
        }
        TransitionDecision::Reject(reason @ RejectReason::UnknownStage(_)) => {
            let valid: Vec<&str> = session.registry.list_stages().iter().map(|s| s.id.as_str()).collect();
            return Err(UserError::new(format!("{}. Valid stages: {}", reason, valid.join(", "))).into());
        }
    };

    if dry_run {
        println!(
            "Move allowed: deal {} '{}' -> '{}' ({}). Not saved (dry run).",
            deal_id,
            stage_move.from_stage,
            stage_move.to_stage,
            stage_move.direction.as_str()
        );
        return Ok(());
    }

    apply_move(&mut data, &stage_move, chrono::Utc::now().timestamp())?;
    DataFile::save(&session.data_path, &data)?;
    println!(
        "Moved deal {} '{}' -> '{}' ({}).",
        deal_id,
        stage_move.from_stage,
        stage_move.to_stage,
        stage_move.direction.as_str()
    );
    Ok(())
}

fn handle_snapshot(session: &Session, full: bool, json: bool) -> Result<()> {
    let data = session.dataset()?;
    let mode = if full { SnapshotMode::FullRegistry } else { SnapshotMode::ActiveOnly };
    let snapshot = compute_snapshot(&session.registry, &data.deals, mode);
    if json {
        return print_json(&snapshot);
    }
    print!("{}", format_snapshot(&snapshot, get_terminal_width()));
    Ok(())
}

fn handle_stale(session: &Session, now: Option<&str>, threshold: Option<&str>, json: bool) -> Result<()> {
    let now_ts = resolve_now(now)?;
    let config = match threshold {
        Some(expr) => StaleConfig::with_threshold_secs(
            parse_duration(expr).map_err(|e| UserError::new(format!("Invalid threshold: {}", e)))?,
        ),
        None => session.config.stale,
    };
    let data = session.dataset()?;
    let stale = find_stale_deals(&session.registry, &data.deals, now_ts, &config);
    if json {
        return print_json(&stale);
    }
    print!("{}", format_stale_deals(&stale));
    Ok(())
}

fn handle_notifications(session: &Session, now: Option<&str>, json: bool) -> Result<()> {
    let now_ts = resolve_now(now)?;
    let data = session.dataset()?;
    let notifications = build_notifications(&session.registry, &data, now_ts, &session.config.stale);
    if json {
        return print_json(&notifications);
    }
    print!("{}", format_notifications(&notifications));
    Ok(())
}

fn handle_health(session: &Session, json: bool) -> Result<()> {
    let data = session.dataset()?;
    let health = assess_health(&session.registry, &data.deals);
    if json {
        return print_json(&health);
    }
    print!("{}", format_health(&health, &session.registry));
    Ok(())
}

fn handle_report(session: &Session, period: &str, now: Option<&str>, json: bool) -> Result<()> {
    let period = Period::parse(period).map_err(|e| UserError::new(e.to_string()))?;
    let now_ts = resolve_now(now)?;
    let data = session.dataset()?;
    let report = PeriodReport::compute(&session.registry, &data, period, now_ts);
    if json {
        return print_json(&report);
    }
    print!("{}", format_report(&report));
    Ok(())
}
