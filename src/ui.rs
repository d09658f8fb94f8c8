use crate::events::{Dispatcher, EventKind, Handled, UiEvent};
use crate::models::{Category, ExpenseRecord, TotalEntry, View};
use html_escape::encode_quoted_attribute;
use std::fmt::Write;
use tracing::{debug, info, warn};

pub const DELETE_ACTION: &str = "delete";

/// One `<li>` per record, in list order, tagged with the record id.
pub fn render_rows(records: &[ExpenseRecord]) -> String {
    let mut html = String::new();
    for record in records {
        let _ = write!(
            html,
            r#"<li class="expense" data-id="{id}"><span class="desc">{description}</span><span class="tag">{category}</span><span class="amount">{amount:.2}</span><button class="btn-delete" type="button" data-action="{DELETE_ACTION}" aria-label="Delete">&times;</button></li>"#,
            id = record.id,
            description = encode_quoted_attribute(&record.description),
            category = encode_quoted_attribute(record.category.as_str()),
            amount = record.amount,
        );
    }
    html
}

pub fn render_legend(totals: &[TotalEntry]) -> String {
    let mut html = String::new();
    for entry in totals {
        let _ = write!(
            html,
            r#"<li><span class="swatch" style="background:{color}"></span>{category}<span class="amount">{total:.2}</span></li>"#,
            color = entry.color,
            category = encode_quoted_attribute(entry.category.as_str()),
            total = entry.total,
        );
    }
    html
}

/// Subscribes the delegated list handler: a click on a delete control
/// removes the enclosing row's record and re-renders.
pub fn register(dispatcher: &mut Dispatcher) {
    dispatcher.subscribe(EventKind::Click, |tracker, event| {
        let UiEvent::Click(target) = event else {
            return Ok(Handled::Ignored);
        };
        if target.action.as_deref() != Some(DELETE_ACTION) {
            return Ok(Handled::Ignored);
        }
        let Some(id) = target
            .row_id
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
        else {
            warn!(row_id = ?target.row_id, "delete clicked outside a row");
            return Ok(Handled::Ignored);
        };

        let removed = match tracker.store_mut().remove(id) {
            Ok(false) => {
                debug!(id, "no expense to delete");
                return Ok(Handled::Ignored);
            }
            Ok(true) => Ok(()),
            Err(err) => Err(err),
        };
        // The row is gone from memory even when the write failed.
        tracker.render();
        removed?;
        info!(id, "deleted expense");
        Ok(Handled::Changed)
    });
}

pub fn render_index(view: &View, categories: &[Category]) -> String {
    let options = categories
        .iter()
        .map(|category| {
            let label = encode_quoted_attribute(category.as_str());
            format!(r#"<option value="{label}">{label}</option>"#)
        })
        .collect::<String>();

    fill(
        INDEX_HTML,
        &[
            ("STYLE", STYLE),
            ("CATEGORY_OPTIONS", &options),
            ("ROWS", &view.rows_html),
            ("LEGEND", &view.legend_html),
            ("CHART", &view.chart_svg),
            ("COUNT", &view.count.to_string()),
        ],
    )
}

pub fn render_series(svg: Option<&str>) -> String {
    let body = svg.unwrap_or(r#"<p class="hint">The series has not been loaded.</p>"#);
    fill(SERIES_HTML, &[("STYLE", STYLE), ("CHART", body)])
}

/// Substitutes `{{KEY}}` placeholders in one pass, so inserted values are
/// never scanned for placeholders themselves.
fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let slot = after.find("}}").and_then(|end| {
            let key = &after[..end];
            slots
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, end))
        });
        match slot {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

const STYLE: &str = r#"
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    .subtitle, .hint {
      margin: 0;
      color: #5f5c57;
    }

    .card {
      background: white;
      border-radius: 20px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    form {
      display: grid;
      grid-template-columns: 2fr 1fr 1fr auto;
      gap: 12px;
    }

    input, select {
      font: inherit;
      padding: 12px 14px;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 20px;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    .columns {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(280px, 1fr));
      gap: 16px;
    }

    ul {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 8px;
    }

    .expense {
      display: grid;
      grid-template-columns: 1fr auto auto auto;
      align-items: center;
      gap: 10px;
    }

    .tag {
      font-size: 0.8rem;
      color: #8b857d;
      text-transform: uppercase;
      letter-spacing: 0.08em;
    }

    .amount {
      font-weight: 600;
      color: var(--accent-2);
      margin-left: auto;
    }

    .btn-delete {
      padding: 4px 10px;
      background: var(--accent-2);
    }

    .legend li {
      display: flex;
      gap: 8px;
      align-items: center;
    }

    .swatch {
      width: 12px;
      height: 12px;
      border-radius: 50%;
      display: inline-block;
    }

    .chart-label, .chart-title {
      fill: #7a746d;
      font-size: 11px;
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .status {
      min-height: 1.2em;
      color: #6b645d;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }

    @media (max-width: 600px) {
      .app {
        padding: 28px 22px;
      }
      form {
        grid-template-columns: 1fr;
      }
    }
"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Expense Tracker</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Expense Tracker</h1>
      <p class="subtitle">Log what you spend and see where it goes. <a href="/series">Temperature series</a></p>
    </header>

    <form id="expense-form" class="card" method="post" action="/expenses">
      <input name="description" id="description" placeholder="Description" />
      <input name="amount" id="amount" type="number" step="0.01" min="0" placeholder="Amount" />
      <select name="category" id="category">
        <option value="">Category</option>
        {{CATEGORY_OPTIONS}}
      </select>
      <button type="submit">Add</button>
    </form>

    <section class="columns">
      <div class="card">
        <h2>Expenses (<span id="count">{{COUNT}}</span>)</h2>
        <ul id="expense-list">{{ROWS}}</ul>
      </div>
      <div class="card">
        <h2>By category</h2>
        <div id="chart">{{CHART}}</div>
        <ul id="legend" class="legend">{{LEGEND}}</ul>
      </div>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const form = document.getElementById('expense-form');
    const list = document.getElementById('expense-list');
    const chartEl = document.getElementById('chart');
    const legendEl = document.getElementById('legend');
    const countEl = document.getElementById('count');
    const statusEl = document.getElementById('status');

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const applyView = (view) => {
      list.innerHTML = view.rows_html;
      legendEl.innerHTML = view.legend_html;
      chartEl.innerHTML = view.chart_svg;
      countEl.textContent = view.count;
    };

    const post = async (url, body) => {
      const res = await fetch(url, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body)
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      applyView(await res.json());
    };

    form.addEventListener('submit', (event) => {
      event.preventDefault();
      const body = {
        description: form.description.value,
        amount: form.amount.value,
        category: form.category.value
      };
      post('/api/expenses', body)
        .then(() => {
          form.reset();
          setStatus('Saved', 'ok');
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    list.addEventListener('click', (event) => {
      const control = event.target.closest('[data-action]');
      if (!control || !list.contains(control)) {
        return;
      }
      const row = control.closest('[data-id]');
      post('/api/list/click', {
        action: control.dataset.action,
        row_id: row ? row.dataset.id : null
      }).catch((err) => setStatus(err.message, 'error'));
    });
  </script>
</body>
</html>
"#;

const SERIES_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Global Temperature Anomaly</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Global Temperature Anomaly</h1>
      <p class="subtitle">Deviation from the 1951-1980 average. <a href="/">Expenses</a></p>
    </header>
    <div class="card">{{CHART}}</div>
  </main>
</body>
</html>
"#;
