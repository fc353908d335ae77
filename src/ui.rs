use crate::departments::DepartmentOption;

pub fn render_index(options: &[DepartmentOption]) -> String {
    let options_html: String = options
        .iter()
        .map(|option| {
            format!(
                r#"<option value="{}">{}</option>"#,
                escape_html(option.value),
                escape_html(&option.label)
            )
        })
        .collect::<Vec<_>>()
        .join("\n          ");
    INDEX_HTML.replace("{{OPTIONS}}", &options_html)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>USA Gov. Analytics</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef2f6;
      --bg-2: #c9d8e6;
      --ink: #1f2a36;
      --accent: #b8322a;
      --accent-2: #1f4e79;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(31, 78, 121, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e3ebf3 60%, #f4f7fa 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 24px 18px 48px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
      margin-bottom: 24px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(1.6rem, 3vw, 2.4rem);
      margin: 0;
    }

    header a {
      color: var(--accent-2);
      font-weight: 600;
      text-decoration: none;
    }

    select {
      min-width: 220px;
      padding: 10px 14px;
      border-radius: 999px;
      border: 1px solid rgba(31, 78, 121, 0.2);
      font: inherit;
      background: white;
    }

    .layout {
      display: grid;
      grid-template-columns: minmax(280px, 3fr) 7fr;
      gap: 20px;
      animation: rise 600ms ease;
    }

    .block {
      display: grid;
      gap: 20px;
      align-content: start;
    }

    .row {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(260px, 1fr));
      gap: 20px;
    }

    .card {
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 22px;
      box-shadow: var(--shadow);
      padding: 20px;
      display: grid;
      gap: 12px;
      align-content: start;
    }

    .card h2 {
      margin: 0;
      font-size: 1.1rem;
    }

    .section-title {
      margin: 4px 0 0;
      font-size: 1.3rem;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #6b7785;
    }

    .stat .value {
      font-size: 2.2rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .tabs {
      display: flex;
      flex-wrap: wrap;
      gap: 6px;
      padding: 6px;
      background: rgba(31, 78, 121, 0.08);
      border-radius: 18px;
    }

    .tab {
      appearance: none;
      background: transparent;
      border: none;
      border-radius: 999px;
      padding: 8px 14px;
      font: inherit;
      font-size: 0.85rem;
      font-weight: 600;
      color: #5d6977;
      cursor: pointer;
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 16px rgba(31, 78, 121, 0.12);
    }

    svg {
      width: 100%;
      display: block;
    }

    svg text {
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
    }

    .bar {
      fill: var(--accent-2);
    }

    .bar.vertical {
      fill: var(--accent);
    }

    .chart-grid {
      stroke: rgba(31, 78, 121, 0.12);
    }

    .chart-label {
      fill: #5f6b78;
      font-size: 11px;
    }

    .land {
      fill: #d9d9d9;
      stroke: white;
    }

    .marker {
      stroke: rgb(40, 40, 40);
      stroke-width: 0.5;
      fill-opacity: 0.75;
    }

    .legend {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      font-size: 0.8rem;
      color: #5f6b78;
    }

    .legend i {
      display: inline-block;
      width: 10px;
      height: 10px;
      border-radius: 50%;
      margin-right: 6px;
    }

    .panel-error {
      color: #c63b2b;
      font-size: 0.9rem;
      min-height: 1.2em;
    }

    .status {
      font-size: 0.9rem;
      color: #5f6b78;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(18px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }

    @media (max-width: 900px) {
      .layout {
        grid-template-columns: 1fr;
      }
    }
  </style>
</head>
<body>
  <header>
    <h1>USA Government Website Analytics</h1>
    <select id="gov-agency" aria-label="Select a Department...">
          {{OPTIONS}}
    </select>
    <span id="status" class="status"></span>
    <a href="https://usa.gov">USA.Gov</a>
  </header>

  <main class="layout">
    <section class="card">
      <h2>Most Popular</h2>
      <div class="tabs" role="tablist">
        <button class="tab active" data-tab="top_domains_7_days" role="tab" aria-selected="true">Top Domains (Past Week)</button>
        <button class="tab" data-tab="top_domains_30_days" role="tab" aria-selected="false">Top Domains (Past Month)</button>
        <button class="tab" data-tab="top_pages" role="tab" aria-selected="false">Top Pages (Now)</button>
      </div>
      <div id="popular-error" class="panel-error"></div>
      <svg id="popular-chart" viewBox="0 0 360 620" role="img" aria-label="Most popular"></svg>
    </section>

    <section class="block">
      <div class="row">
        <div class="card stat">
          <span id="people-live-label" class="label">people on all sites right now</span>
          <span id="people-live" class="value">--</span>
        </div>
        <div class="card stat">
          <span id="visits-month-label" class="label">total visits (past month)</span>
          <span id="visits-month" class="value">--</span>
        </div>
      </div>

      <h2 class="section-title">Traffic Breakdown</h2>

      <div class="row">
        <div class="card">
          <h2>Visits Today</h2>
          <div id="visits-today-error" class="panel-error"></div>
          <svg id="visits-today" viewBox="0 0 480 240" role="img" aria-label="Visits today"></svg>
        </div>
        <div class="card">
          <h2>Location of Visitors</h2>
          <div id="visitor-locations-error" class="panel-error"></div>
          <svg id="visitor-locations" viewBox="0 0 480 240" role="img" aria-label="Location of visitors"></svg>
          <div id="visitor-legend" class="legend"></div>
        </div>
      </div>

      <div class="card">
        <h2>Top Downloads (Yesterday)</h2>
        <div id="top-downloads-error" class="panel-error"></div>
        <svg id="top-downloads" viewBox="0 0 720 484" role="img" aria-label="Top downloads"></svg>
      </div>
    </section>
  </main>

  <script>
    const selectEl = document.getElementById('gov-agency');
    const statusEl = document.getElementById('status');
    const tabs = Array.from(document.querySelectorAll('.tab'));
    const svgNs = 'http://www.w3.org/2000/svg';
    const markerColors = ['#1f4e79', '#2d7a4b', '#d98b2b', '#b8322a', '#6a3d9a'];
    let dashboard = null;
    let activeTab = 'top_domains_7_days';
    let requestSeq = 0;

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const escapeText = (text) => String(text)
      .replace(/&/g, '&amp;')
      .replace(/</g, '&lt;')
      .replace(/>/g, '&gt;');

    const formatAxisValue = (value) => {
      if (value >= 1000000) {
        return `${Math.round(value / 100000) / 10}M`;
      }
      if (value >= 1000) {
        return `${Math.round(value / 100) / 10}k`;
      }
      return Math.round(value).toString();
    };

    const setPanelError = (id, panel) => {
      const el = document.getElementById(id);
      if (el) {
        el.textContent = panel.status === 'error' ? `Unable to load: ${panel.message}` : '';
      }
    };

    const clearChart = (svg) => {
      svg.innerHTML = '';
    };

    const renderHorizontalBars = (svg, series) => {
      const [, , width, height] = svg.getAttribute('viewBox').split(' ').map(Number);
      if (!series.labels.length) {
        svg.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data</text>';
        return;
      }
      const labelWidth = Math.min(220, width * 0.45);
      const rowHeight = height / series.labels.length;
      const maxLog = Math.max(...series.values.map((v) => Math.log10(v + 1)), 1);
      const scale = (value) => (Math.log10(value + 1) / maxLog) * (width - labelWidth - 48);
      svg.innerHTML = series.labels
        .map((label, index) => {
          const value = series.values[index];
          const y = index * rowHeight;
          const barHeight = Math.max(rowHeight - 6, 2);
          return `
            <text class="chart-label" x="${labelWidth - 8}" y="${y + rowHeight / 2 + 4}" text-anchor="end">${escapeText(label)}</text>
            <rect class="bar" x="${labelWidth}" y="${y + 3}" width="${scale(value).toFixed(2)}" height="${barHeight}" rx="4" />
            <text class="chart-label" x="${labelWidth + scale(value) + 6}" y="${y + rowHeight / 2 + 4}">${formatAxisValue(value)}</text>`;
        })
        .join('');
    };

    const renderVerticalBars = (svg, series) => {
      const [, , width, height] = svg.getAttribute('viewBox').split(' ').map(Number);
      if (!series.labels.length) {
        svg.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data yet</text>';
        return;
      }
      const paddingX = 40;
      const paddingY = 28;
      const top = 12;
      const max = Math.max(...series.values, 1);
      const slot = (width - paddingX * 2) / series.labels.length;
      const y = (value) => height - paddingY - (value / max) * (height - top - paddingY);
      let grid = '';
      for (let i = 0; i <= 4; i += 1) {
        const value = (max * i) / 4;
        grid += `<line class="chart-grid" x1="${paddingX}" y1="${y(value)}" x2="${width - paddingX}" y2="${y(value)}" />`;
        grid += `<text class="chart-label" x="${paddingX - 6}" y="${y(value) + 4}" text-anchor="end">${formatAxisValue(value)}</text>`;
      }
      const labelEvery = series.labels.length > 12 ? 3 : 1;
      const bars = series.values
        .map((value, index) => {
          const x = paddingX + index * slot;
          const label = index % labelEvery === 0
            ? `<text class="chart-label" x="${x + slot / 2}" y="${height - paddingY + 16}" text-anchor="middle">${escapeText(series.labels[index])}</text>`
            : '';
          return `<rect class="bar vertical" x="${x + 2}" y="${y(value)}" width="${Math.max(slot - 4, 1)}" height="${height - paddingY - y(value)}" rx="3" />${label}`;
        })
        .join('');
      svg.innerHTML = `${grid}${bars}`;
    };

    const renderMap = (svg, figure) => {
      const [, , width, height] = svg.getAttribute('viewBox').split(' ').map(Number);
      const bounds = { west: -125, east: -66, south: 24, north: 50 };
      const project = (lon, lat) => [
        ((lon - bounds.west) / (bounds.east - bounds.west)) * width,
        ((bounds.north - lat) / (bounds.north - bounds.south)) * height
      ];
      let markers = '';
      figure.series.forEach((series, index) => {
        series.points.forEach((point) => {
          if (point.lon < bounds.west || point.lon > bounds.east || point.lat < bounds.south || point.lat > bounds.north) {
            return;
          }
          const [x, y] = project(point.lon, point.lat);
          const radius = Math.max(Math.sqrt(point.size), 1.5);
          markers += `<circle class="marker" cx="${x.toFixed(1)}" cy="${y.toFixed(1)}" r="${radius.toFixed(1)}" fill="${markerColors[index % markerColors.length]}"><title>${escapeText(point.text.replace(/<br>/g, '\n'))}</title></circle>`;
        });
      });
      svg.innerHTML = `<rect class="land" x="0" y="0" width="${width}" height="${height}" rx="12" />${markers}`;
      document.getElementById('visitor-legend').innerHTML = figure.series
        .map((series, index) => `<span><i style="background:${markerColors[index % markerColors.length]}"></i>${escapeText(series.name)}</span>`)
        .join('');
    };

    const departmentLabel = (dept) => {
      const option = Array.from(selectEl.options).find((opt) => opt.value === dept);
      if (!option || dept === 'live') {
        return 'all';
      }
      return option.textContent;
    };

    const renderCard = (valueId, labelId, panel, fallbackLabel) => {
      const valueEl = document.getElementById(valueId);
      const labelEl = document.getElementById(labelId);
      if (panel.status === 'ok') {
        valueEl.textContent = panel.data.value;
        valueEl.title = '';
        labelEl.textContent = panel.data.label;
      } else {
        valueEl.textContent = 'Unavailable';
        valueEl.title = panel.message;
        labelEl.textContent = fallbackLabel;
      }
    };

    const renderChart = (chartId, errorId, panel, render) => {
      const svg = document.getElementById(chartId);
      setPanelError(errorId, panel);
      if (panel.status === 'ok') {
        render(svg, panel.data);
      } else {
        clearChart(svg);
      }
    };

    const renderPopular = () => {
      if (!dashboard) {
        return;
      }
      renderChart('popular-chart', 'popular-error', dashboard[activeTab], renderHorizontalBars);
    };

    const renderDashboard = () => {
      const people = `people on ${departmentLabel(dashboard.department)} sites right now`;
      renderCard('people-live', 'people-live-label', dashboard.active_users, people);
      renderCard('visits-month', 'visits-month-label', dashboard.monthly_visits, 'total visits (past month)');
      renderChart('visits-today', 'visits-today-error', dashboard.visits_today, renderVerticalBars);
      renderChart('visitor-locations', 'visitor-locations-error', dashboard.visitor_locations, renderMap);
      renderChart('top-downloads', 'top-downloads-error', dashboard.top_downloads, renderHorizontalBars);
      renderPopular();
    };

    const setActiveTab = (tab) => {
      activeTab = tab;
      tabs.forEach((button) => {
        const isActive = button.dataset.tab === tab;
        button.classList.toggle('active', isActive);
        button.setAttribute('aria-selected', String(isActive));
      });
      renderPopular();
    };

    const loadDashboard = async (dept) => {
      const seq = ++requestSeq;
      setStatus('Loading...', 'info');
      const res = await fetch(`/api/${encodeURIComponent(dept)}/dashboard`);
      if (seq !== requestSeq) {
        return;
      }
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Unable to load dashboard');
      }
      const body = await res.json();
      if (seq !== requestSeq) {
        return;
      }
      dashboard = body;
      renderDashboard();
      setStatus('', '');
    };

    tabs.forEach((button) => {
      button.addEventListener('click', () => setActiveTab(button.dataset.tab));
    });

    selectEl.addEventListener('change', () => {
      loadDashboard(selectEl.value || 'live').catch((err) => setStatus(err.message, 'error'));
    });

    loadDashboard(selectEl.value || 'live').catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;
