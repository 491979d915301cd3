//! Dashboard page handler.
//!
//! One static page; all state lives behind the JSON API and is fetched
//! client-side. Served inline so the binary is self-contained.

use axum::response::Html;

pub async fn page() -> Html<&'static str> {
    Html(PAGE)
}

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>tracectrl</title>
<style>
  * { margin: 0; padding: 0; box-sizing: border-box; }
  body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #0f1117; color: #e0e0e0; padding: 24px; max-width: 1100px; margin: 0 auto; }
  h1 { color: #58a6ff; margin-bottom: 4px; }
  .meta { color: #8b949e; font-size: 0.85em; margin-bottom: 20px; }
  button { background: #238636; color: #fff; border: 0; border-radius: 6px; padding: 8px 16px; cursor: pointer; font-size: 0.9em; }
  button.secondary { background: #21262d; border: 1px solid #30363d; }
  button:disabled { opacity: 0.5; cursor: default; }
  .bar { display: flex; gap: 12px; align-items: center; margin-bottom: 20px; flex-wrap: wrap; }
  table { width: 100%; border-collapse: collapse; margin-bottom: 24px; }
  th { background: #161b22; color: #8b949e; text-align: left; padding: 8px 12px; font-size: 0.85em; text-transform: uppercase; border-bottom: 1px solid #30363d; }
  td { padding: 8px 12px; border-bottom: 1px solid #21262d; font-size: 0.9em; vertical-align: middle; }
  tr:hover { background: #161b22; }
  .logo { width: 24px; height: 24px; border-radius: 4px; vertical-align: middle; margin-right: 8px; }
  .tag { background: #1f6feb33; color: #58a6ff; border-radius: 10px; padding: 2px 8px; font-size: 0.8em; }
  .ok { color: #3fb950; }
  .fail { color: #f85149; }
  .warn { color: #d29922; margin: 8px 0; }
  #preview { white-space: pre-wrap; background: #161b22; border: 1px solid #30363d; border-radius: 8px; padding: 16px; font-size: 0.85em; display: none; margin-bottom: 24px; }
</style>
</head>
<body>
<h1>tracectrl</h1>
<p class="meta">Find the companies that hold your data. Make them answer for it.</p>

<div id="signin" style="display:none">
  <a href="/auth/login"><button>Sign in with Google</button></a>
</div>

<div id="app" style="display:none">
  <div class="bar">
    <span id="who"></span>
    <button id="scan">Scan inbox</button>
    <button id="send" class="secondary">Send selected requests</button>
    <button id="logout" class="secondary">Sign out</button>
    <span id="status"></span>
  </div>
  <div id="warnings"></div>
  <table>
    <thead><tr><th>Company</th><th>Interaction</th><th>GDPR contact</th><th>Access</th><th>Erase</th><th>Modify</th><th></th></tr></thead>
    <tbody id="rows"><tr><td colspan="7">Scan your inbox to get started.</td></tr></tbody>
  </table>
  <div id="preview"></div>
  <h3 style="margin-bottom:8px">Send log</h3>
  <table>
    <thead><tr><th>Company</th><th>Request</th><th>When</th><th>Status</th></tr></thead>
    <tbody id="log"><tr><td colspan="4">Nothing sent yet.</td></tr></tbody>
  </table>
</div>

<script>
const contacts = {};
let candidates = [];

async function api(path, opts) {
  const res = await fetch(path, Object.assign({headers: {'Content-Type': 'application/json'}}, opts));
  if (res.status === 401) { show(false); throw new Error('not signed in'); }
  const body = await res.json();
  if (!res.ok) throw new Error(body.error || res.statusText);
  return body;
}

function show(signedIn) {
  document.getElementById('signin').style.display = signedIn ? 'none' : 'block';
  document.getElementById('app').style.display = signedIn ? 'block' : 'none';
}

function status(text) { document.getElementById('status').textContent = text; }

function render() {
  const rows = document.getElementById('rows');
  if (!candidates.length) {
    rows.innerHTML = '<tr><td colspan="7">No companies detected.</td></tr>';
    return;
  }
  rows.innerHTML = candidates.map(c => {
    const contact = contacts[c.domain];
    const logo = c.logo_url ? `<img class="logo" src="${c.logo_url}" alt="">` : '';
    const contactCell = contact === undefined
      ? `<button class="secondary" onclick="discover('${c.domain}')">Discover</button>`
      : (contact ? contact.gdpr_email : '<span class="fail">not found</span>');
    const boxes = ['access','erase','modify'].map(t =>
      `<td><input type="checkbox" ${contact ? '' : 'disabled'} onchange="select_('${c.domain}','${t}',this.checked)"></td>`
    ).join('');
    const previewBtn = contact
      ? `<button class="secondary" onclick="preview('${c.domain}','access')">Preview</button>` : '';
    return `<tr><td>${logo}${c.name}</td><td><span class="tag">${c.interaction_type}</span></td>` +
           `<td>${contactCell}</td>${boxes}<td>${previewBtn}</td></tr>`;
  }).join('');
}

function renderLog(entries) {
  const log = document.getElementById('log');
  if (!entries.length) return;
  log.innerHTML = entries.map(e => {
    const ok = e.status.status === 'sent';
    const detail = ok ? 'sent' : `failed: ${e.status.reason}`;
    return `<tr><td>${e.company_domain}</td><td>${e.request_type}</td>` +
           `<td>${new Date(e.sent_at).toLocaleString()}</td>` +
           `<td class="${ok ? 'ok' : 'fail'}">${detail}</td></tr>`;
  }).join('');
}

async function discover(domain) {
  status(`Looking up ${domain}...`);
  try {
    const body = await api('/api/contacts/discover', {method: 'POST', body: JSON.stringify({domain})});
    contacts[domain] = body.found ? body.contact : null;
  } catch (e) {
    contacts[domain] = null;
  }
  status('');
  render();
}

async function select_(domain, request_type, selected) {
  await api('/api/selections', {method: 'POST', body: JSON.stringify({domain, request_type, selected})});
}

async function preview(domain, request_type) {
  const body = await api(`/api/requests/preview?domain=${domain}&request_type=${request_type}`);
  const el = document.getElementById('preview');
  el.style.display = 'block';
  el.textContent = `To: ${body.to}\nSubject: ${body.subject}\n\n${body.body}`;
}

document.getElementById('scan').onclick = async () => {
  status('Scanning... this can take a minute.');
  document.getElementById('scan').disabled = true;
  try {
    const body = await api('/api/scan', {method: 'POST', body: JSON.stringify({})});
    candidates = body.candidates;
    const warnings = document.getElementById('warnings');
    warnings.innerHTML = body.skipped
      ? `<p class="warn">${body.skipped} message(s) were skipped.</p>` : '';
    status(`${body.emails_scanned} emails scanned.`);
    render();
  } catch (e) {
    status(e.message);
  }
  document.getElementById('scan').disabled = false;
};

document.getElementById('send').onclick = async () => {
  status('Sending...');
  try {
    const body = await api('/api/requests/send', {method: 'POST'});
    status(`${body.sent} sent, ${body.failed} failed.`);
    const log = await api('/api/requests/log');
    renderLog(log.log);
  } catch (e) {
    status(e.message);
  }
};

document.getElementById('logout').onclick = async () => {
  await fetch('/auth/logout', {method: 'POST'});
  location.reload();
};

(async () => {
  try {
    const body = await api('/api/me');
    document.getElementById('who').textContent = body.profile.email;
    show(true);
    const log = await api('/api/requests/log');
    renderLog(log.log);
  } catch (e) {
    show(false);
  }
})();
</script>
</body>
</html>
"#;
