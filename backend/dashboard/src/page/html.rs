//! Dashboard HTML body
//!
//! Panels are filled from the current snapshot so the first paint needs no
//! extra round trips; later updates replace them fragment by fragment.

use crate::dashboard::Snapshot;
use crate::render::{self, escape, PLACEHOLDER};

/// Test links offered on the page, as `(label, test type)`.
pub const TEST_LINKS: &[(&str, &str)] = &[
    ("Wallet Balance", "wallet_balance"),
    ("Wallet Status", "wallet_status"),
    ("Wallet Network", "wallet_network"),
    ("Wallet Health", "wallet_health"),
    ("Wallet Airdrop", "wallet_airdrop"),
    ("Agent Status", "agent_status"),
    ("Ideas List", "ideas_list"),
    ("Ideas Generate", "ideas_generate"),
    ("Strategies List", "strategies_list"),
    ("Strategy Execute", "strategy_execute"),
    ("Trades History", "trades_history"),
    ("Trade Execute", "trade_execute"),
    ("System Health", "system_health"),
    ("Bundle-Funktionstest", "bundle"),
];

/// Numbered backend test cases, run through `GET /api/v1/tests/run?case=N`.
pub const TEST_CASES: std::ops::RangeInclusive<u32> = 1..=5;

fn test_case_buttons() -> String {
    TEST_CASES
        .map(|case| format!(r#"<button class="btn" data-test-case="{case}">Test {case}</button>"#))
        .collect()
}

fn test_links() -> String {
    TEST_LINKS
        .iter()
        .map(|(label, test_type)| {
            format!(r##"<a class="test-link" href="#" data-test-type="{test_type}">{label}</a>"##)
        })
        .collect()
}

fn text_or_placeholder(text: Option<&str>) -> String {
    escape(text.unwrap_or(PLACEHOLDER))
}

pub fn render_body(snapshot: &Snapshot) -> String {
    let refreshed = snapshot
        .refreshed_at
        .map_or_else(|| "Noch nicht geladen".to_string(), |t| t.to_rfc3339());

    format!(
        r#"
    <div class="container">
        <header>
            <div>
                <h1>sepAI Trading Dashboard</h1>
                <span class="sub" id="refreshTime">{refreshed}</span>
            </div>
            <div class="header-controls">
                <button class="btn" id="btn-balance">Wallet</button>
                <button class="btn" id="btn-last-report">Letzter Report</button>
                <button class="btn" id="btn-audit">Audit</button>
                <button class="btn btn-primary" id="btn-system">System-Lauf</button>
            </div>
        </header>

        {banner}

        <div class="grid">
            <div class="card">
                <div class="card-title">Wallet</div>
                <div class="card-value" id="wallet-balance">{balance}</div>
            </div>

            <div class="card">
                <div class="card-title">Neue Idee</div>
                <form class="inline" onsubmit="return false">
                    <select name="chain" id="idea-chain">
                        <option value="solana">solana</option>
                        <option value="ethereum">ethereum</option>
                    </select>
                    <input name="budget" id="idea-budget" placeholder="Budget">
                    <input name="description" id="idea-description" placeholder="Beschreibung">
                    <button class="btn btn-primary" id="btn-idea">Anlegen</button>
                </form>
                <form class="inline" onsubmit="return false">
                    <input name="asset" placeholder="SOL">
                    <button class="btn" id="btn-generate">Generieren</button>
                </form>
            </div>

            <div class="card wide">
                <div class="card-title">Ideen</div>
                <table>
                    <thead><tr><th>ID</th><th>Chain</th><th>Budget</th><th>Status</th><th></th></tr></thead>
                    <tbody id="tbl-ideas">{ideas}</tbody>
                </table>
            </div>

            <div class="card wide">
                <div class="card-title">Aufträge</div>
                <table>
                    <thead><tr><th>ID</th><th>Idee</th><th>Chain</th><th>Betrag</th><th>Status</th><th></th></tr></thead>
                    <tbody id="tbl-orders">{orders}</tbody>
                </table>
            </div>

            <div class="card">
                <div class="card-title">Verlauf</div>
                <ul id="history">{history}</ul>
            </div>

            <div class="card">
                <div class="card-title">Report</div>
                <pre id="report-content">{report_content}</pre>
            </div>

            <div class="card wide">
                <div class="card-title">Tests</div>
                <div>{test_links}</div>
                <p>{test_cases}<button class="btn" id="btn-bundle-test">Bundle-Test (Kurzfassung)</button></p>
                <pre id="testNavResult">{test_log}</pre>
            </div>

            <div class="card wide">
                <div class="card-title">Reports</div>
                <ul id="reports">{reports}</ul>
            </div>
        </div>
    </div>
"#,
        banner = render::render_banner(&snapshot.banner),
        balance = text_or_placeholder(snapshot.balance.as_deref()),
        ideas = render::render_ideas_table(&snapshot.ideas),
        orders = render::render_orders_table(&snapshot.orders),
        history = render::render_history(&snapshot.history),
        report_content = text_or_placeholder(snapshot.report_content.as_deref()),
        test_links = test_links(),
        test_cases = test_case_buttons(),
        test_log = text_or_placeholder(snapshot.test_log.as_deref()),
        reports = render::render_reports_list(&snapshot.reports),
    )
}
