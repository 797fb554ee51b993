//! Dashboard JavaScript
//!
//! The page holds no state of its own: every click is posted to
//! `/actions/{trigger}` and the panels named in the reply are re-fetched as
//! server-rendered fragments.

pub const SCRIPT: &str = r#"
const PANELS = {
    ideas: 'tbl-ideas',
    orders: 'tbl-orders',
    history: 'history',
    reports: 'reports',
    balance: 'wallet-balance',
    report_content: 'report-content',
    test_log: 'testNavResult'
};

async function reloadPanel(panel) {
    const target = panel === 'banner' ? 'summary' : PANELS[panel];
    const el = document.getElementById(target);
    if (!el) return;
    try {
        const res = await fetch('/fragments/' + panel);
        if (!res.ok) return;
        const html = await res.text();
        if (panel === 'banner') {
            el.outerHTML = html;
        } else {
            el.innerHTML = html;
        }
    } catch (e) {
        console.error('Fragment reload failed:', panel, e);
    }
}

async function reloadPanels(panels) {
    for (const panel of panels) {
        await reloadPanel(panel);
    }
    await reloadPanel('banner');
}

function fieldsFor(el) {
    const fields = {};
    if (el.dataset.id) fields.id = el.dataset.id;
    if (el.classList.contains('test-link')) {
        fields.name = el.textContent.trim();
        if (el.dataset.testType) fields.test_type = el.dataset.testType;
    }
    if (el.dataset.testCase) fields.case = el.dataset.testCase;
    const form = el.closest('form');
    if (form) {
        for (const [key, value] of new FormData(form).entries()) {
            fields[key] = value;
        }
    }
    return fields;
}

function triggerOf(el) {
    if (el.dataset.action) return el.dataset.action;
    if (el.classList.contains('test-link')) return 'test-link';
    if (el.dataset.testCase) return 'test-case';
    if (el.id && el.id.startsWith('btn-')) return el.id;
    return null;
}

async function post(el) {
    const trigger = triggerOf(el);
    if (!trigger) return;

    if (el.classList.contains('test-link')) {
        document.querySelectorAll('.test-link').forEach(it => it.classList.remove('is-active'));
        el.classList.add('is-active');
        const log = document.getElementById('testNavResult');
        if (log) log.textContent = 'Starte ' + el.textContent.trim() + '…';
    }

    el.disabled = true;
    try {
        const res = await fetch('/actions/' + trigger, {
            method: 'POST',
            headers: { 'Content-Type': 'application/x-www-form-urlencoded' },
            body: new URLSearchParams(fieldsFor(el))
        });
        const data = await res.json().catch(() => ({}));
        await reloadPanels(data.refreshed || []);
    } catch (e) {
        console.error('Action failed:', trigger, e);
    } finally {
        el.disabled = false;
    }
}

document.addEventListener('click', (ev) => {
    const el = ev.target.closest('[data-action], .test-link, [data-test-case], [id^="btn-"]');
    if (!el) return;
    ev.preventDefault();
    post(el);
});

const pollMs = parseInt(document.body.dataset.pollMs || '10000', 10);
setInterval(() => reloadPanels(['ideas', 'orders', 'history', 'reports']), pollMs);
"#;
