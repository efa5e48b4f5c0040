// Plain-text rendering for CLI commands

use crate::funnel::{
    ConversionInsight, DistributionInsight, FunnelHealth, NormalizationResult, PipelineSnapshot,
    StaleDeal,
};
use crate::notify::Notification;
use crate::registry::StageRegistry;
use crate::report::PeriodReport;
use crate::utils::format_date;

const MIN_BAR_WIDTH: usize = 10;
const MAX_BAR_WIDTH: usize = 40;

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate, with fallback to the COLUMNS environment
/// variable and a sensible default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

/// Format a money amount with thousands separators and two decimals
pub fn format_money(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{}{}.{:02}", if negative { "-" } else { "" }, grouped, cents % 100)
}

/// Format a percentage with one decimal
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values.map(|v| v.chars().count()).max().unwrap_or(0).max(header.len())
}

pub fn format_stage_list(registry: &StageRegistry) -> String {
    let stages = registry.list_stages();
    let id_w = column_width("Id", stages.iter().map(|s| s.id.as_str()));
    let name_w = column_width("Name", stages.iter().map(|s| s.display_name.as_str()));

    let mut out = String::new();
    out.push_str(&format!("Order  {}  {}  Kind\n", pad("Id", id_w), pad("Name", name_w)));
    for stage in stages {
        out.push_str(&format!(
            "{}  {}  {}  {}\n",
            pad(&stage.order.to_string(), 5),
            pad(&stage.id, id_w),
            pad(&stage.display_name, name_w),
            stage.kind.as_str()
        ));
    }
    out
}

pub fn format_corrections(total: usize, corrections: &[NormalizationResult]) -> String {
    if corrections.is_empty() {
        return format!("All {} deal stage(s) are valid.\n", total);
    }

    let id_w = column_width("Deal", corrections.iter().map(|c| c.deal_id.as_str()));
    let mut out = format!("{} of {} deal stage(s) need correction:\n", corrections.len(), total);
    out.push_str(&format!("{}  Raw stage -> Normalized  Cause\n", pad("Deal", id_w)));
    for c in corrections {
        out.push_str(&format!(
            "{}  '{}' -> {}  {}\n",
            pad(&c.deal_id, id_w),
            c.raw_stage,
            c.normalized_stage,
            c.cause.map(|cause| cause.as_str()).unwrap_or("-")
        ));
    }
    out
}

fn bar(count: usize, max_count: usize, width: usize) -> String {
    if max_count == 0 || count == 0 {
        return String::new();
    }
    let filled = ((count as f64 / max_count as f64) * width as f64).round().max(1.0) as usize;
    "#".repeat(filled.min(width))
}

pub fn format_snapshot(snapshot: &PipelineSnapshot, terminal_width: usize) -> String {
    if snapshot.stages.is_empty() {
        return "No deals in the pipeline.\n".to_string();
    }

    let name_w = column_width("Stage", snapshot.stages.iter().map(|s| s.display_name.as_str()));
    let values: Vec<String> = snapshot.stages.iter().map(|s| format_money(s.total_value)).collect();
    let value_w = column_width("Value", values.iter().map(String::as_str));
    let fixed = name_w + 2 + 5 + 2 + value_w + 2 + 7 + 2;
    let bar_w = terminal_width.saturating_sub(fixed).clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH);
    let max_count = snapshot.stages.iter().map(|s| s.count).max().unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!(
        "{}  Deals  {}  Conv.\n",
        pad("Stage", name_w),
        pad("Value", value_w)
    ));
    for (stage, value) in snapshot.stages.iter().zip(&values) {
        out.push_str(
            format!(
                "{}  {:>5}  {:>value_w$}  {:>6}  {}",
                pad(&stage.display_name, name_w),
                stage.count,
                value,
                format_percent(stage.conversion_rate),
                bar(stage.count, max_count, bar_w),
                value_w = value_w
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out.push_str(&format!(
        "\nTotal: {} deal(s), {}; open {} ({}); won {} ({}); win rate {}\n",
        snapshot.total_deals,
        format_money(snapshot.total_value),
        snapshot.open_deals,
        format_money(snapshot.open_value),
        snapshot.won_deals,
        format_money(snapshot.won_value),
        format_percent(snapshot.win_rate)
    ));
    out
}

pub fn format_stale_deals(stale: &[StaleDeal]) -> String {
    if stale.is_empty() {
        return "No stale deals.\n".to_string();
    }
    let id_w = column_width("Deal", stale.iter().map(|s| s.deal_id.as_str()));
    let stage_w = column_width("Stage", stale.iter().map(|s| s.stage.as_str()));

    let mut out = format!(
        "{}  {}  Days  Severity  Last update  Title\n",
        pad("Deal", id_w),
        pad("Stage", stage_w)
    );
    for deal in stale {
        out.push_str(&format!(
            "{}  {}  {:>4}  {}  {}   {}\n",
            pad(&deal.deal_id, id_w),
            pad(&deal.stage, stage_w),
            deal.staleness.elapsed_days,
            pad(deal.staleness.severity.as_str(), 8),
            format_date(deal.updated_ts),
            deal.title
        ));
    }
    out
}

pub fn format_notifications(notifications: &[Notification]) -> String {
    if notifications.is_empty() {
        return "No notifications.\n".to_string();
    }
    let mut out = String::new();
    for n in notifications {
        out.push_str(&format!(
            "[{}] {}: {}\n",
            pad(n.severity.as_str(), 6),
            n.title,
            n.message
        ));
    }
    out
}

pub fn format_health(health: &FunnelHealth, registry: &StageRegistry) -> String {
    let name = |id: &str| {
        registry
            .get_stage(id)
            .map(|s| s.display_name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    let mut out = format!("Open deals: {}\n", health.open_deals);
    match &health.distribution {
        Some(DistributionInsight::Balanced { closing_stage, closing_count }) => out.push_str(&format!(
            "Balanced funnel: {} deal(s) in {}. Keep qualifying and following up.\n",
            closing_count,
            name(closing_stage)
        )),
        Some(DistributionInsight::Bottleneck { stage, share, count }) => out.push_str(&format!(
            "Bottleneck in {}: {} deal(s), {} of open deals. Follow up more often.\n",
            name(stage),
            count,
            format_percent(*share)
        )),
        Some(DistributionInsight::TopHeavy { stage, share }) => out.push_str(&format!(
            "Unbalanced funnel: {} of open deals are still in {}. Qualify prospects faster.\n",
            format_percent(*share),
            name(stage)
        )),
        None => out.push_str("No distribution insight.\n"),
    }
    match &health.conversion {
        Some(ConversionInsight::Strong { rate, sample }) => out.push_str(&format!(
            "Strong conversion: {} of {} entry/won deals closed.\n",
            format_percent(*rate),
            sample
        )),
        Some(ConversionInsight::Weak { rate, sample }) => out.push_str(&format!(
            "Weak conversion: only {} of {} entry/won deals closed.\n",
            format_percent(*rate),
            sample
        )),
        None => out.push_str("No conversion insight.\n"),
    }
    out
}

pub fn format_report(report: &PeriodReport) -> String {
    let mut out = format!(
        "Report for the last {} ({} to {})\n",
        report.period.as_str(),
        format_date(report.window_start_ts),
        format_date(report.window_end_ts)
    );
    out.push_str(&format!(
        "  Revenue:          {} ({:+.1}% vs previous {})\n",
        format_money(report.revenue),
        report.revenue_change,
        format_money(report.previous_revenue)
    ));
    out.push_str(&format!("  New clients:      {}\n", report.new_clients));
    out.push_str(&format!("  Active deals:     {}\n", report.active_deals));
    out.push_str(&format!("  Won deals:        {}\n", report.won_deals));
    out.push_str(&format!("  Task completion:  {}\n", format_percent(report.task_completion_rate)));
    out.push_str(&format!(
        "  Quote conversion: {} ({} of {} quotes accepted)\n",
        format_percent(report.quote_conversion_rate),
        report.accepted_quotes,
        report.total_quotes
    ));
    if !report.monthly_revenue.is_empty() {
        out.push_str("\nMonthly revenue:\n");
        for month in &report.monthly_revenue {
            out.push_str(&format!(
                "  {}  {:>14}  {} deal(s), {} quote(s)\n",
                month.month,
                format_money(month.revenue),
                month.deals,
                month.quotes
            ));
        }
    }
    out
}
