use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::chart::ChartSpec;

pub mod call;
pub mod history;
pub mod referral;
pub mod users;

pub const EMPTY_LIST: &str = "موردی ثبت نشده است";

const CHART_JS: &str = "https://cdn.jsdelivr.net/npm/chart.js";

const TAB_SCRIPT: &str = r#"(function () {
  const specs = JSON.parse(document.getElementById('chart-data').textContent);
  const live = [];
  function showTab(id) {
    while (live.length) live.pop().destroy();
    document.querySelectorAll('[data-tab]').forEach(function (section) {
      section.hidden = section.dataset.tab !== id;
    });
    document.querySelectorAll('[data-show]').forEach(function (button) {
      button.classList.toggle('active', button.dataset.show === id);
    });
    (specs[id] || []).forEach(function (chart) {
      const canvas = document.getElementById(chart.canvas);
      if (canvas) live.push(new Chart(canvas, chart.config));
    });
  }
  document.querySelectorAll('[data-show]').forEach(function (button) {
    button.addEventListener('click', function () { showTab(button.dataset.show); });
  });
  const first = document.querySelector('[data-show]');
  if (first) showTab(first.dataset.show);
})();"#;

/// One tab of a rendered page together with the charts it owns.
#[derive(Debug, Clone)]
pub struct TabSection {
    pub id: String,
    pub title: String,
    pub body: String,
    pub charts: Vec<ChartSpec>,
}

pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Whole numbers without decimals, everything else as-is.
pub fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

pub fn card(title: &str, body: &str) -> String {
    format!(
        "<div class=\"glass-card rounded-2xl p-6 mb-6\"><h3 class=\"text-xl font-bold mb-4\">{}</h3>{}</div>",
        html_escape(title),
        body
    )
}

pub fn stat(label: &str, value: &str, class: &str) -> String {
    format!(
        "<div class=\"stat-card text-center\"><div class=\"text-3xl font-bold {}\">{}</div><div class=\"text-sm text-gray-600\">{}</div></div>",
        class,
        html_escape(value),
        html_escape(label)
    )
}

pub fn row(label: &str, value: &str) -> String {
    format!(
        "<div class=\"flex justify-between py-1\"><span class=\"text-gray-600\">{}</span><span class=\"font-semibold\">{}</span></div>",
        html_escape(label),
        html_escape(value)
    )
}

pub fn list_items(items: &[String]) -> String {
    if items.is_empty() {
        return format!("<p class=\"text-gray-500\">{EMPTY_LIST}</p>");
    }
    let mut output = String::from("<ul>");
    for item in items {
        let _ = write!(output, "<li>{}</li>", html_escape(item));
    }
    output.push_str("</ul>");
    output
}

pub fn canvas(id: &str) -> String {
    format!(
        "<div class=\"chart-box\" style=\"height:320px\"><canvas id=\"{}\"></canvas></div>",
        html_escape(id)
    )
}

pub fn empty_state(message: &str) -> String {
    format!(
        "<div class=\"text-center text-gray-500 py-8\">{}</div>",
        html_escape(message)
    )
}

fn chart_data(sections: &[TabSection]) -> String {
    let mut by_tab = Map::new();
    for section in sections {
        let charts: Vec<Value> = section
            .charts
            .iter()
            .map(|chart| serde_json::json!({"canvas": chart.canvas_id, "config": chart.config()}))
            .collect();
        by_tab.insert(section.id.clone(), Value::Array(charts));
    }
    // Keeps the JSON from closing the surrounding script element.
    Value::Object(by_tab).to_string().replace("</", "<\\/")
}

/// Standalone right-to-left page with a tab strip, one section per tab.
pub fn document(title: &str, sections: &[TabSection]) -> String {
    document_with_header(title, "", sections)
}

/// Like [`document`], with `header` shown above the tab strip on every tab.
pub fn document_with_header(title: &str, header: &str, sections: &[TabSection]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "<!DOCTYPE html>");
    let _ = writeln!(output, "<html lang=\"fa\" dir=\"rtl\">");
    let _ = writeln!(output, "<head>");
    let _ = writeln!(output, "<meta charset=\"utf-8\">");
    let _ = writeln!(output, "<title>{}</title>", html_escape(title));
    let _ = writeln!(output, "<script src=\"{CHART_JS}\"></script>");
    let _ = writeln!(output, "</head>");
    let _ = writeln!(output, "<body>");
    let _ = writeln!(output, "<h1>{}</h1>", html_escape(title));
    if !header.is_empty() {
        let _ = writeln!(output, "<header>{header}</header>");
    }

    if sections.len() > 1 {
        let _ = writeln!(output, "<nav class=\"tabs\">");
        for section in sections {
            let _ = writeln!(
                output,
                "<button class=\"tab-btn\" data-show=\"{}\">{}</button>",
                html_escape(&section.id),
                html_escape(&section.title)
            );
        }
        let _ = writeln!(output, "</nav>");
    }

    for section in sections {
        let _ = writeln!(output, "<section data-tab=\"{}\">", html_escape(&section.id));
        let _ = writeln!(output, "{}", section.body);
        let _ = writeln!(output, "</section>");
    }

    let _ = writeln!(
        output,
        "<script id=\"chart-data\" type=\"application/json\">{}</script>",
        chart_data(sections)
    );
    if sections.len() == 1 {
        let _ = writeln!(
            output,
            "<button hidden data-show=\"{}\"></button>",
            html_escape(&sections[0].id)
        );
    }
    let _ = writeln!(output, "<script>{TAB_SCRIPT}</script>");
    let _ = writeln!(output, "</body>");
    let _ = writeln!(output, "</html>");
    output
}

pub fn write_document(path: &Path, html: &str) -> Result<()> {
    std::fs::write(path, html).with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartKind, Dataset};

    fn sample_sections() -> Vec<TabSection> {
        vec![
            TabSection {
                id: "overview".to_string(),
                title: "نمای کلی".to_string(),
                body: canvas("overview-chart"),
                charts: vec![ChartSpec::new("overview-chart", ChartKind::Bar, vec!["a".to_string()])
                    .dataset(Dataset::new("</script>", vec![1.0]))],
            },
            TabSection {
                id: "details".to_string(),
                title: "جزئیات".to_string(),
                body: list_items(&[]),
                charts: Vec::new(),
            },
        ]
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html_escape("<b>\"علی\" & 'سارا'</b>"),
            "&lt;b&gt;&quot;علی&quot; &amp; &#39;سارا&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn numbers_drop_needless_decimals() {
        assert_eq!(fmt_num(7.0), "7");
        assert_eq!(fmt_num(7.5), "7.5");
        assert_eq!(fmt_num(0.0), "0");
    }

    #[test]
    fn document_is_rtl_with_tabs_and_chart_data() {
        let html = document("گزارش", &sample_sections());
        assert!(html.contains("dir=\"rtl\""));
        assert!(html.contains("data-show=\"overview\""));
        assert!(html.contains("data-tab=\"details\""));
        assert!(html.contains("\"overview-chart\""));
        assert!(html.contains("live.pop().destroy()"));
        assert!(!html.contains("\"</script>\""));
        assert!(html.contains(EMPTY_LIST));
    }

    #[test]
    fn writes_document_to_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.html");
        write_document(&path, "<html></html>").expect("written");
        assert_eq!(std::fs::read_to_string(&path).expect("readable"), "<html></html>");
    }
}
