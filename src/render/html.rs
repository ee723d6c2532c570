use crate::model::ReportData;
use crate::render::Plotter;

/// Self-contained HTML page: report data embedded as JSON, drawn on a canvas
/// with one y-axis per metric (first metric left, second right).
pub struct HtmlPlotter;

impl Plotter for HtmlPlotter {
    fn render(&self, data: &ReportData) -> anyhow::Result<String> {
        render_html_report(data)
    }
}

/// Render the chart page.
///
/// Important: we avoid `format!()` because the HTML contains many `{}` from JS
/// template literals (e.g., `${x}`), which would conflict with Rust formatting.
pub fn render_html_report(data: &ReportData) -> anyhow::Result<String> {
    // `</` would end the script element early if an entity name contained it.
    let json = serde_json::to_string(data)?.replace("</", "<\\/");

    const TEMPLATE: &str = r##"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>turbostat profile</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  main { padding: 12px 16px; }

  .summary { display: flex; gap: 16px; flex-wrap: wrap; font-size: 14px; color: #333; }
  .pill { padding: 4px 8px; border: 1px solid #ddd; border-radius: 999px; background: #fafafa; }
  .muted { color: #777; font-size: 12px; }

  canvas { width: 100%; height: 420px; border: 1px solid #eee; }

  table { border-collapse: collapse; margin-top: 12px; }
  th, td { border-bottom: 1px solid #eee; padding: 6px 8px; text-align: left; font-size: 14px; }
  th { background: white; border-bottom: 1px solid #ddd; }
  .num { text-align: right; font-variant-numeric: tabular-nums; }
</style>
</head>
<body>
<header>
  <h2 id="title"></h2>
  <div class="summary" id="summary"></div>
</header>

<main>
  <canvas id="chart"></canvas>
  <div class="muted" id="legend"></div>

  <table>
    <thead>
      <tr>
        <th>metric</th>
        <th class="num">count</th>
        <th class="num">mean</th>
        <th class="num">median</th>
        <th class="num">min</th>
        <th class="num">max</th>
        <th class="num">std dev</th>
      </tr>
    </thead>
    <tbody id="statsBody"></tbody>
  </table>
</main>

<script>
// Embedded report data (JSON object literal). Missing slices are null.
const DATA = __DATA__;
const COLORS = ["#1f77b4", "#d62728", "#2ca02c"];

function fmt(x) {
  return x === null || x === undefined ? "–" : (Math.round(x * 100) / 100).toFixed(2);
}

function escapeHtml(s) {
  return String(s)
    .replaceAll("&", "&amp;")
    .replaceAll("<", "&lt;")
    .replaceAll(">", "&gt;")
    .replaceAll('"', "&quot;")
    .replaceAll("'", "&#39;");
}

function renderSummary() {
  document.getElementById("title").textContent = DATA.title;
  document.getElementById("summary").innerHTML = `
    <span class="pill">slices: <b>${DATA.slices}</b></span>
    <span class="pill">missing: <b>${DATA.missing_slices}</b></span>
    <span class="pill">slice: <b>${DATA.time_slice_duration}</b> s</span>
    <span class="pill">entity: <b>${escapeHtml(DATA.entity)}</b></span>
  `;
}

function renderStats() {
  const body = document.getElementById("statsBody");
  body.innerHTML = "";
  for (const m of DATA.metrics) {
    const s = m.summary || {};
    const tr = document.createElement("tr");
    tr.innerHTML = `
      <td>${escapeHtml(m.name)} (${escapeHtml(m.unit)})</td>
      <td class="num">${s.count ?? 0}</td>
      <td class="num">${fmt(s.mean)}</td>
      <td class="num">${fmt(s.median)}</td>
      <td class="num">${fmt(s.min)}</td>
      <td class="num">${fmt(s.max)}</td>
      <td class="num">${fmt(s.std_dev)}</td>
    `;
    body.appendChild(tr);
  }
}

function axisRange(m) {
  if (m.unit === "%") return [0, 100];
  const vals = m.values.filter(v => v !== null);
  if (!vals.length) return [0, 1];
  const lo = Math.min(...vals), hi = Math.max(...vals);
  return lo === hi ? [lo - 1, hi + 1] : [lo, hi];
}

function renderChart() {
  const canvas = document.getElementById("chart");
  const ratio = window.devicePixelRatio || 1;
  canvas.width = canvas.clientWidth * ratio;
  canvas.height = canvas.clientHeight * ratio;
  const ctx = canvas.getContext("2d");
  ctx.scale(ratio, ratio);

  const w = canvas.clientWidth, h = canvas.clientHeight;
  const pad = { left: 60, right: 60, top: 16, bottom: 36 };
  const plotW = w - pad.left - pad.right, plotH = h - pad.top - pad.bottom;
  const tMax = DATA.times.length ? DATA.times[DATA.times.length - 1] : 1;
  const xOf = t => pad.left + (tMax > 0 ? t / tMax : 0) * plotW;

  ctx.strokeStyle = "#ccc";
  ctx.strokeRect(pad.left, pad.top, plotW, plotH);
  ctx.fillStyle = "#333";
  ctx.font = "12px system-ui";
  ctx.textAlign = "center";
  ctx.fillText("Time (s)", pad.left + plotW / 2, h - 8);
  ctx.fillText("0", pad.left, pad.top + plotH + 14);
  ctx.fillText(String(tMax), pad.left + plotW, pad.top + plotH + 14);

  const legend = [];
  DATA.metrics.forEach((m, i) => {
    const color = COLORS[i % COLORS.length];
    const [lo, hi] = axisRange(m);
    const yOf = v => pad.top + plotH - ((v - lo) / (hi - lo)) * plotH;
    const axisX = i === 0 ? pad.left - 6 : pad.left + plotW + 6;

    ctx.fillStyle = color;
    ctx.textAlign = i === 0 ? "right" : "left";
    ctx.fillText(fmt(hi), axisX, pad.top + 10);
    ctx.fillText(fmt(lo), axisX, pad.top + plotH);

    // Null breaks the line so missing slices show as gaps.
    ctx.strokeStyle = color;
    ctx.beginPath();
    let pen = false;
    m.values.forEach((v, k) => {
      if (v === null) { pen = false; return; }
      const x = xOf(DATA.times[k]), y = yOf(v);
      if (pen) ctx.lineTo(x, y); else ctx.moveTo(x, y);
      pen = true;
      ctx.fillRect(x - 2, y - 2, 4, 4);
    });
    ctx.stroke();

    legend.push(`<span style="color:${color}">■</span> ${escapeHtml(m.name)} (${escapeHtml(m.unit)})`);
  });
  document.getElementById("legend").innerHTML = legend.join(" &nbsp; ");
}

renderSummary();
renderStats();
renderChart();
window.addEventListener("resize", renderChart);
</script>
</body>
</html>
"##;

    Ok(TEMPLATE.replace("__DATA__", &json))
}
