//! The single server-rendered dashboard page.
//!
//! - `html.rs`: page structure, filled from the current [`Snapshot`]
//! - `css.rs`: styling
//! - `js.rs`: click delegation and fragment reloads

mod css;
mod html;
mod js;

use crate::dashboard::Snapshot;

/// Generate the complete dashboard HTML page.
pub fn dashboard_page(snapshot: &Snapshot, poll_interval_secs: u64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="de">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>sepAI Trading Dashboard</title>
    <style>
{css}
    </style>
</head>
<body data-poll-ms="{poll_ms}">
{html}
    <script>
{js}
    </script>
</body>
</html>"#,
        css = css::STYLES,
        html = html::render_body(snapshot),
        js = js::SCRIPT,
        poll_ms = poll_interval_secs.saturating_mul(1000),
    )
}
