//! HTML fragment rendering for the dashboard panels.
//!
//! Every function here is pure: records in, HTML string out. A fragment
//! always reflects exactly the records it was given; nothing is cached.

use crate::banner::Banner;
use crate::models::{
    HistoryEntry, Idea, IdeaState, LatestReport, Order, OrderState, SystemRunResult,
};
use crate::reports::StoredReport;

/// Shown in place of a missing value or an empty list.
pub const PLACEHOLDER: &str = "–";

const LIST_ITEM_CLASS: &str = "border-b border-gray-700/50 pb-1";
const SEP: &str = " • ";

/// Escape text for use in HTML element content and attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn or_placeholder(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => PLACEHOLDER,
    }
}

fn number_or_placeholder(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
}

// ─────────────────────────────────────────────────────────
// Compact lists
// ─────────────────────────────────────────────────────────

/// One `<li>` per line in input order, or a single placeholder item.
pub fn render_list(lines: &[String]) -> String {
    if lines.is_empty() {
        return format!(r#"<li class="text-gray-500">{PLACEHOLDER}</li>"#);
    }
    lines
        .iter()
        .map(|line| format!(r#"<li class="{LIST_ITEM_CLASS}">{}</li>"#, escape(line)))
        .collect()
}

pub fn idea_line(idea: &Idea) -> String {
    format!(
        "{}{SEP}{}/{}{SEP}{}",
        idea.id,
        or_placeholder(idea.asset.as_deref()),
        or_placeholder(idea.chain.as_deref()),
        or_placeholder(Some(idea.state.as_str())),
    )
}

pub fn order_line(order: &Order) -> String {
    let mut line = format!(
        "{}{SEP}{}/{}{SEP}{}",
        order.id,
        or_placeholder(order.asset.as_deref()),
        or_placeholder(order.chain.as_deref()),
        or_placeholder(Some(order.state.as_str())),
    );
    if let Some(txid) = order.txid.as_deref().filter(|t| !t.is_empty()) {
        line.push_str(&format!("{SEP}tx={txid}"));
    }
    line
}

pub fn history_line(entry: &HistoryEntry) -> String {
    let mut line = format!(
        "{}{SEP}{}{SEP}{}",
        or_placeholder(Some(&entry.ts)),
        or_placeholder(Some(&entry.actor)),
        or_placeholder(Some(&entry.event)),
    );
    if let Some(reference) = entry.reference.as_deref().filter(|r| !r.is_empty()) {
        line.push_str(SEP);
        line.push_str(reference);
    }
    line
}

// ─────────────────────────────────────────────────────────
// Tables
// ─────────────────────────────────────────────────────────

/// The transition button offered for an idea, as `(trigger, label)`.
pub fn idea_action(state: &IdeaState) -> Option<(&'static str, &'static str)> {
    match state {
        IdeaState::New => Some(("to-analysis", "Zu Analyse")),
        IdeaState::NeedsReview => Some(("schedule", "Einplanen")),
        _ => None,
    }
}

pub fn order_action(state: &OrderState) -> Option<(&'static str, &'static str)> {
    match state {
        OrderState::New => Some(("execute", "Ausführen")),
        _ => None,
    }
}

fn action_button(trigger: &str, label: &str, id: &str) -> String {
    format!(
        r#"<button class="btn" data-action="{trigger}" data-id="{}">{label}</button>"#,
        escape(id)
    )
}

fn empty_row(colspan: u8, text: &str) -> String {
    format!(r#"<tr><td colspan="{colspan}" class="sub">{text}</td></tr>"#)
}

pub fn render_ideas_table(ideas: &[Idea]) -> String {
    if ideas.is_empty() {
        return empty_row(5, "Keine Ideen vorhanden");
    }
    ideas
        .iter()
        .map(|idea| {
            let action = idea_action(&idea.state)
                .map(|(trigger, label)| action_button(trigger, label, &idea.id))
                .unwrap_or_default();
            format!(
                r#"<tr data-idea-id="{id}"><td>{id}</td><td>{chain}</td><td>{budget}</td><td>{state}</td><td>{action}</td></tr>"#,
                id = escape(&idea.id),
                chain = escape(or_placeholder(idea.chain.as_deref())),
                budget = number_or_placeholder(idea.budget_or_amount()),
                state = escape(or_placeholder(Some(idea.state.as_str()))),
            )
        })
        .collect()
}

pub fn render_orders_table(orders: &[Order]) -> String {
    if orders.is_empty() {
        return empty_row(6, "Keine Aufträge vorhanden");
    }
    orders
        .iter()
        .map(|order| {
            let action = order_action(&order.state)
                .map(|(trigger, label)| action_button(trigger, label, &order.id))
                .unwrap_or_default();
            format!(
                r#"<tr data-order-id="{id}"><td>{id}</td><td>{idea}</td><td>{chain}</td><td>{amount}</td><td>{state}</td><td>{action}</td></tr>"#,
                id = escape(&order.id),
                idea = escape(or_placeholder(order.idea_id.as_deref())),
                chain = escape(or_placeholder(order.chain.as_deref())),
                amount = number_or_placeholder(order.amount),
                state = escape(or_placeholder(Some(order.state.as_str()))),
            )
        })
        .collect()
}

pub fn render_history(entries: &[HistoryEntry]) -> String {
    let lines: Vec<String> = entries.iter().map(history_line).collect();
    render_list(&lines)
}

pub fn render_reports_list(reports: &[StoredReport]) -> String {
    let lines: Vec<String> = reports
        .iter()
        .map(|r| {
            let verdict = if r.success { "OK" } else { "FEHLER" };
            format!(
                "#{}{SEP}{}{SEP}{}{SEP}{verdict}{SEP}{}ms",
                r.id, r.created_at, r.name, r.response_time_ms
            )
        })
        .collect();
    render_list(&lines)
}

pub fn render_banner(banner: &Banner) -> String {
    let hidden = if banner.is_hidden() { " hidden" } else { "" };
    format!(
        r#"<div id="summary" class="banner{hidden}">{}</div>"#,
        escape(banner.text())
    )
}

// ─────────────────────────────────────────────────────────
// Plain-text panels
// ─────────────────────────────────────────────────────────

pub fn system_run_text(run: &SystemRunResult) -> String {
    format!(
        "Report: {}\n\nSchritte:\n- {}",
        run.report_path,
        run.steps.join("\n- ")
    )
}

pub fn latest_report_text(report: &LatestReport) -> String {
    match (report.found, report.content.as_deref()) {
        (true, Some(content)) => content.to_string(),
        (true, None) => String::new(),
        (false, _) => "Kein Report gefunden.".to_string(),
    }
}
