//! Terminal rendering for the review queue.
//!
//! Queue listings are one row per objection; single results and statistics
//! are printed as vertical cards with a fixed-width label column.

use chrono::Local;
use mojaz_core::{AnalysisResult, AutoRejectReport, Objection, QueueStats};

const DESCRIPTION_WIDTH: usize = 40;

// ── Public API ──

/// Print a table of objections, one row each.
pub fn print_queue(title: &str, items: &[&Objection]) {
    println!("=== {title} ({}) ===", items.len());
    if items.is_empty() {
        println!("  (empty)");
        println!();
        return;
    }
    println!(
        "  {:<8} {:<8} {:<10} {:<16} {}",
        "case", "priority", "status", "filed", "description"
    );
    for obj in items {
        println!("  {}", queue_row(obj));
    }
    println!();
}

/// Print a single objection as a vertical card.
pub fn print_objection_card(obj: &Objection) {
    println!("=== {} ===", obj.id());
    println!("  {:<14} {}", "case", obj.case_number());
    println!("  {:<14} {}", "violation", obj.violation_type());
    println!("  {:<14} {}", "priority", obj.priority());
    println!("  {:<14} {}", "status", status_label(obj));
    println!("  {:<14} {}", "filed", filed_at(obj));
    if let Some(plate) = obj.plate_number() {
        println!("  {:<14} {}", "plate", plate);
    }
    if let Some(location) = obj.location() {
        println!("  {:<14} {}", "location", location);
    }
    if !obj.evidence().is_empty() {
        println!("  {:<14} {}", "evidence", obj.evidence().join(", "));
    }
    println!("  {:<14} {}", "description", obj.description());
    println!();
}

/// Print a classification result.
pub fn print_analysis(result: &AnalysisResult) {
    for line in analysis_lines(result) {
        println!("  {line}");
    }
    println!();
}

pub fn print_stats(stats: &QueueStats) {
    println!("=== Queue ===");
    println!("  {:<14} {}", "filed today", stats.total_today);
    println!("  {:<14} {}", "high priority", stats.high_priority);
    println!("  {:<14} {}/{}", "resolved", stats.resolved, stats.total);
    println!("  {:<14} {}%", "completion", stats.completion_percent);
}

pub fn print_auto_reject(report: &AutoRejectReport) {
    println!(
        "Auto-rejected {} low-priority objection(s) in {:.3}s",
        report.count,
        report.elapsed.as_secs_f64()
    );
    for id in &report.rejected_ids {
        println!("  {id}");
    }
}

// ── Formatting ──

fn queue_row(obj: &Objection) -> String {
    format!(
        "{:<8} {:<8} {:<10} {:<16} {}",
        obj.case_number(),
        obj.priority().as_str(),
        status_label(obj),
        filed_at(obj),
        truncate(obj.description(), DESCRIPTION_WIDTH),
    )
}

fn analysis_lines(result: &AnalysisResult) -> Vec<String> {
    let mut lines = vec![
        format!("{:<14} {}", "priority", result.priority),
        format!("{:<14} {:.2}", "confidence", result.confidence),
        format!(
            "{:<14} {}",
            "evidence",
            if result.has_evidence { "yes" } else { "no" }
        ),
        format!("{:<14} {}", "reasoning", result.reasoning),
    ];
    if let Some(image) = &result.image_analysis {
        lines.push(format!(
            "{:<14} {}/25 ({})",
            "image score",
            image.bonus_score.value(),
            image.match_quality.as_str()
        ));
    }
    lines
}

fn status_label(obj: &Objection) -> &'static str {
    match obj.resolution() {
        None => "pending",
        Some(r) => r.as_str(),
    }
}

fn filed_at(obj: &Objection) -> String {
    obj.timestamp()
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// Shorten to `max` characters, marking the cut with an ellipsis.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
