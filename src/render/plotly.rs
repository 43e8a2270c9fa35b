// Interactive web back end: a standalone HTML page around a plotly.js figure

use super::{check_backend, write_artifact, RenderedArtifact, Renderer};
use crate::config::{AxisOptions, Backend, PlotLayout};
use crate::ir::{PlotRequest, RenderRecord};
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const FONT_FAMILY: &str = "Computer Modern";

#[derive(Debug, Clone, Default)]
pub struct PlotlyRenderer {
    remove_cloud_button: bool,
}

impl PlotlyRenderer {
    pub fn new(remove_cloud_button: bool) -> Self {
        Self { remove_cloud_button }
    }
}

impl Renderer for PlotlyRenderer {
    fn backend(&self) -> Backend {
        Backend::Plotly
    }

    fn render(&self, request: PlotRequest, output_name: &str) -> Result<RenderedArtifact> {
        check_backend(self.backend(), &request)?;
        let html = to_html(&request, self.remove_cloud_button)?;
        write_artifact(self.backend(), output_name, "html", html.as_bytes())
    }
}

/// One scatter3d trace per record
pub fn trace(record: &RenderRecord) -> Value {
    json!({
        "type": "scatter3d",
        "mode": "markers",
        "opacity": 0.5,
        "name": record.label,
        "x": record.x,
        "y": record.y,
        "z": record.z,
        "marker": {
            "size": record.sizes,
            "color": record.color,
            "symbol": vec![record.symbol.plotly_name(); record.len()],
        },
    })
}

fn axis(options: &AxisOptions, title: &str) -> Value {
    let mut axis = Map::new();
    axis.insert(
        "title".to_string(),
        json!({"text": title, "font": {"family": FONT_FAMILY, "size": 18, "color": "grey"}}),
    );
    if options.range.iter().any(Option::is_some) {
        axis.insert("range".to_string(), json!(options.range));
    }
    Value::Object(axis)
}

pub fn layout(layout: &PlotLayout) -> Value {
    let [x_title, y_title, z_title] = layout.axis_titles();
    json!({
        "title": {
            "text": layout.title.clone().unwrap_or_default(),
            "font": {"family": FONT_FAMILY, "size": 18, "color": "black"},
        },
        "scene": {
            "xaxis": axis(&layout.x, x_title),
            "yaxis": axis(&layout.y, y_title),
            "zaxis": axis(&layout.z, z_title),
        },
        "legend": {"xanchor": "center", "yanchor": "top", "x": 0.7},
    })
}

/// The `{data, layout}` figure; non-finite numbers serialize as null
pub fn figure(request: &PlotRequest) -> Value {
    let data: Vec<Value> = request.records.iter().map(trace).collect();
    json!({
        "data": data,
        "layout": layout(&request.layout),
    })
}

/// plotly.js page config
pub fn page_config(remove_cloud_button: bool) -> Value {
    let mut config = json!({"showLink": false, "displaylogo": false});
    if remove_cloud_button {
        config["modeBarButtonsToRemove"] = json!(["sendDataToCloud"]);
    }
    config
}

/// Keep JSON from closing the surrounding script element
fn script_safe(json: String) -> String {
    json.replace("</", "<\\/")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn to_html(request: &PlotRequest, remove_cloud_button: bool) -> Result<String> {
    let figure = serde_json::to_string(&figure(request)).context("Failed to serialize plotly figure")?;
    let config = serde_json::to_string(&page_config(remove_cloud_button)).context("Failed to serialize plotly config")?;
    let title = request.layout.title.as_deref().unwrap_or("scatter3d");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{src}"></script>
</head>
<body>
<div id="scatter3d" style="width:100%;height:100vh;"></div>
<script>
var figure = {figure};
Plotly.newPlot("scatter3d", figure.data, figure.layout, {config});
</script>
</body>
</html>
"#,
        title = escape_html(title),
        src = PLOTLY_JS,
        figure = script_safe(figure),
        config = config,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarkerSymbol;

    fn make_request() -> PlotRequest {
        let mut layout = PlotLayout::default();
        layout.title = Some("</script><b>".to_string());
        layout.z.range = [Some(-1.0), None];
        let mut request = PlotRequest::new(Backend::Plotly, layout);
        request.records.push(RenderRecord {
            dataset: "sinc".to_string(),
            label: "sinc(r)".to_string(),
            x: vec![0.0, 1.0],
            y: vec![0.0, 0.0],
            z: vec![1.0, 0.84],
            sizes: vec![19.0, f64::NAN],
            color: "#e41a1c".to_string(),
            symbol: MarkerSymbol::Diamond,
        });
        request
    }

    #[test]
    fn test_trace_fields() {
        let request = make_request();
        let trace = trace(&request.records[0]);
        assert_eq!(trace["type"], "scatter3d");
        assert_eq!(trace["mode"], "markers");
        assert_eq!(trace["opacity"], 0.5);
        assert_eq!(trace["name"], "sinc(r)");
        assert_eq!(trace["marker"]["symbol"], json!(["diamond", "diamond"]));
        assert_eq!(trace["marker"]["size"][0], 19.0);
        assert!(trace["marker"]["size"][1].is_null());
    }

    #[test]
    fn test_layout_axes() {
        let layout = layout(&make_request().layout);
        assert_eq!(layout["scene"]["xaxis"]["title"]["text"], "X");
        assert!(layout["scene"]["xaxis"].get("range").is_none());
        assert_eq!(layout["scene"]["zaxis"]["range"], json!([-1.0, null]));
        assert_eq!(layout["legend"]["x"], 0.7);
    }

    #[test]
    fn test_page_config() {
        assert!(page_config(false).get("modeBarButtonsToRemove").is_none());
        assert_eq!(page_config(true)["modeBarButtonsToRemove"], json!(["sendDataToCloud"]));
        assert_eq!(page_config(true)["showLink"], false);
    }

    #[test]
    fn test_html_is_escaped() {
        let html = to_html(&make_request(), true).unwrap();
        assert!(html.contains("Plotly.newPlot"));
        assert!(html.contains("<title>&lt;/script&gt;&lt;b&gt;</title>"));
        // the title inside the figure JSON must not terminate the script
        assert_eq!(html.matches("</script>").count(), 2);
        assert!(html.contains("sendDataToCloud"));
    }

    #[test]
    fn test_render_writes_html() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("example");
        let artifact = PlotlyRenderer::new(false)
            .render(make_request(), output.to_str().unwrap())
            .unwrap();
        assert_eq!(artifact.backend, Backend::Plotly);
        assert_eq!(artifact.path, dir.path().join("example.html"));
        let contents = std::fs::read_to_string(&artifact.path).unwrap();
        assert!(contents.contains("\"scatter3d\""));
    }
}
