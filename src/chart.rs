use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Radar,
    Bar,
    Doughnut,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub background_color: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    pub fill: bool,
}

impl Dataset {
    pub fn new(label: impl Into<String>, data: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            data,
            background_color: Vec::new(),
            border_color: None,
            fill: false,
        }
    }

    pub fn colors(mut self, colors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.background_color = colors.into_iter().map(Into::into).collect();
        self
    }

    pub fn border(mut self, color: impl Into<String>) -> Self {
        self.border_color = Some(color.into());
        self
    }

    pub fn filled(mut self) -> Self {
        self.fill = true;
        self
    }
}

/// A chart bound to the canvas it is drawn on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub canvas_id: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub max: Option<f64>,
}

impl ChartSpec {
    pub fn new(canvas_id: impl Into<String>, kind: ChartKind, labels: Vec<String>) -> Self {
        Self {
            canvas_id: canvas_id.into(),
            kind,
            labels,
            datasets: Vec::new(),
            max: None,
        }
    }

    pub fn dataset(mut self, dataset: Dataset) -> Self {
        self.datasets.push(dataset);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Chart.js configuration object for this chart.
    pub fn config(&self) -> Value {
        let scale = match self.max {
            Some(max) => json!({"beginAtZero": true, "max": max}),
            None => json!({"beginAtZero": true}),
        };
        let scales = match self.kind {
            ChartKind::Radar => json!({"r": scale}),
            ChartKind::Bar | ChartKind::Line => json!({"y": scale}),
            ChartKind::Doughnut => json!({}),
        };
        json!({
            "type": self.kind,
            "data": {
                "labels": self.labels,
                "datasets": self.datasets,
            },
            "options": {
                "responsive": true,
                "maintainAspectRatio": false,
                "scales": scales,
                "plugins": {"legend": {"position": "bottom", "rtl": true}},
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChartHandle(Uuid);

#[derive(Debug, Clone)]
struct LiveChart {
    handle: ChartHandle,
    spec: ChartSpec,
}

/// Owns every live chart instance. New charts are only created after the
/// previous set has been disposed.
#[derive(Debug, Default)]
pub struct ChartRegistry {
    live: Vec<LiveChart>,
    disposed: usize,
}

impl ChartRegistry {
    pub fn create(&mut self, spec: ChartSpec) -> ChartHandle {
        if let Some(index) = self
            .live
            .iter()
            .position(|chart| chart.spec.canvas_id == spec.canvas_id)
        {
            let stale = self.live.remove(index);
            self.disposed += 1;
            log::debug!("disposed chart on reused canvas {}", stale.spec.canvas_id);
        }
        let handle = ChartHandle(Uuid::new_v4());
        self.live.push(LiveChart { handle, spec });
        handle
    }

    pub fn dispose_all(&mut self) -> Vec<ChartHandle> {
        self.disposed += self.live.len();
        self.live.drain(..).map(|chart| chart.handle).collect()
    }

    /// Disposes every live chart, then creates `specs`. Returns the new handles.
    pub fn replace(&mut self, specs: Vec<ChartSpec>) -> Vec<ChartHandle> {
        let disposed = self.dispose_all();
        if !disposed.is_empty() {
            log::debug!("disposed {} charts", disposed.len());
        }
        specs.into_iter().map(|spec| self.create(spec)).collect()
    }

    pub fn live(&self) -> Vec<&ChartSpec> {
        self.live.iter().map(|chart| &chart.spec).collect()
    }

    #[cfg(test)]
    pub fn is_live(&self, handle: ChartHandle) -> bool {
        self.live.iter().any(|chart| chart.handle == handle)
    }

    pub fn disposed_count(&self) -> usize {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_spec(canvas: &str) -> ChartSpec {
        ChartSpec::new(canvas, ChartKind::Bar, vec!["a".to_string(), "b".to_string()])
            .dataset(Dataset::new("calls", vec![1.0, 2.0]).colors(["#667eea", "#764ba2"]))
    }

    #[test]
    fn config_matches_chart_js_shape() {
        let config = sample_spec("statsChart").max(10.0).config();
        assert_eq!(config["type"], "bar");
        assert_eq!(config["data"]["datasets"][0]["backgroundColor"][1], "#764ba2");
        assert_eq!(config["options"]["scales"]["y"]["max"], 10.0);
        assert!(config["data"]["datasets"][0].get("borderColor").is_none());
    }

    #[test]
    fn replace_disposes_before_creating() {
        let mut registry = ChartRegistry::default();
        let first = registry.replace(vec![sample_spec("a"), sample_spec("b")]);
        let second = registry.replace(vec![sample_spec("c")]);
        assert_eq!(registry.live().len(), 1);
        assert_eq!(registry.disposed_count(), 2);
        assert!(first.iter().all(|handle| !registry.is_live(*handle)));
        assert!(registry.is_live(second[0]));
    }

    #[test]
    fn reused_canvas_never_holds_two_charts() {
        let mut registry = ChartRegistry::default();
        let old = registry.create(sample_spec("radar"));
        let new = registry.create(sample_spec("radar"));
        assert_eq!(registry.live().len(), 1);
        assert!(!registry.is_live(old));
        assert!(registry.is_live(new));
        assert_eq!(registry.dispose_all(), vec![new]);
        assert!(registry.live().is_empty());
    }
}
