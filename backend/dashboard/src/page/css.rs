//! Dashboard CSS styles

pub const STYLES: &str = r"
:root {
    --page: #f4f6f8;
    --panel: #ffffff;
    --line: #dde3ea;
    --ink: #1f2933;
    --muted: #6b7785;
    --accent: #2563eb;
    --danger: #b42318;
    --danger-bg: #fdecea;
}

*, *::before, *::after { box-sizing: border-box; }

body {
    margin: 0;
    padding: 24px 32px;
    font: 14px/1.45 system-ui, sans-serif;
    background: var(--page);
    color: var(--ink);
}

.container { max-width: 1280px; margin-inline: auto; }

header {
    display: flex;
    flex-wrap: wrap;
    gap: 16px;
    align-items: flex-end;
    justify-content: space-between;
    margin-bottom: 20px;
}
header h1 { margin: 0 0 4px; font-size: 22px; }
.sub { color: var(--muted); font-size: 12px; }
.header-controls { display: flex; flex-wrap: wrap; gap: 8px; }

.banner {
    margin-bottom: 16px;
    padding: 8px 12px;
    border-left: 4px solid var(--danger);
    background: var(--danger-bg);
    color: var(--danger);
    white-space: pre-wrap;
}
.hidden { display: none; }

.btn {
    font: inherit;
    padding: 5px 12px;
    border: 1px solid var(--line);
    border-radius: 4px;
    background: var(--panel);
    color: var(--ink);
    cursor: pointer;
}
.btn:hover { border-color: var(--accent); }
.btn:disabled { cursor: progress; opacity: 0.5; }
.btn-primary { background: var(--accent); border-color: var(--accent); color: #fff; }
button[data-test-case] { margin-right: 6px; }

.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }
.wide { grid-column: span 2; }
@media (max-width: 800px) {
    .grid { grid-template-columns: 1fr; }
    .wide { grid-column: auto; }
}

.card { padding: 16px; background: var(--panel); border: 1px solid var(--line); border-radius: 6px; }
.card-title { margin-bottom: 10px; font-weight: 600; color: var(--muted); }
.card-value { font-size: 24px; font-variant-numeric: tabular-nums; }

table { width: 100%; border-collapse: collapse; }
th { font-weight: 600; color: var(--muted); }
th, td { padding: 5px 6px; text-align: left; border-top: 1px solid var(--line); }
td:last-child { text-align: right; }

ul { margin: 0; padding-left: 18px; }
.text-gray-500 { color: var(--muted); list-style: none; }

pre {
    margin: 8px 0 0;
    padding: 10px;
    min-height: 48px;
    max-height: 320px;
    overflow: auto;
    white-space: pre-wrap;
    background: var(--page);
    font-size: 12px;
}

form.inline { display: flex; flex-wrap: wrap; gap: 6px; margin-bottom: 10px; }
form.inline input, form.inline select {
    font: inherit;
    padding: 4px 6px;
    border: 1px solid var(--line);
    border-radius: 4px;
}

.test-link { display: inline-block; margin: 0 14px 6px 0; color: var(--accent); text-decoration: none; }
.test-link.is-active { font-weight: 600; text-decoration: underline; }
";
