// Rendering back ends

pub mod plotly;

use crate::config::{Backend, OutputOptions};
use crate::graph;
use crate::ir::PlotRequest;
use crate::RenderOptions;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// What a renderer wrote
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedArtifact {
    pub backend: Backend,
    pub path: PathBuf,
    pub bytes: usize,
}

/// A rendering target. Takes ownership of the request, so each request is
/// rendered exactly once.
pub trait Renderer {
    fn backend(&self) -> Backend;

    /// Render to `<output_name>.<ext>`
    fn render(&self, request: PlotRequest, output_name: &str) -> Result<RenderedArtifact>;
}

/// Renderer for `backend`, set up from the output options
pub fn renderer_for(backend: Backend, options: &OutputOptions) -> Box<dyn Renderer> {
    match backend {
        Backend::Plotly => Box::new(plotly::PlotlyRenderer::new(options.remove_cloud_button)),
        Backend::Matplotlib => Box::new(StaticImageRenderer::new(options.image.clone())),
    }
}

fn check_backend(renderer: Backend, request: &PlotRequest) -> Result<()> {
    if renderer != request.backend {
        anyhow::bail!(
            "{} renderer cannot draw a request assembled for {}",
            renderer,
            request.backend
        );
    }
    Ok(())
}

fn write_artifact(backend: Backend, output_name: &str, extension: &str, contents: &[u8]) -> Result<RenderedArtifact> {
    let path = PathBuf::from(format!("{}.{}", output_name, extension));
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write '{}'", path.display()))?;
    tracing::info!(backend = %backend, path = %path.display(), bytes = contents.len(), "wrote plot");
    Ok(RenderedArtifact {
        backend,
        path,
        bytes: contents.len(),
    })
}

/// Static PNG/SVG images drawn with plotters
#[derive(Debug, Clone, Default)]
pub struct StaticImageRenderer {
    options: RenderOptions,
}

impl StaticImageRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

impl Renderer for StaticImageRenderer {
    fn backend(&self) -> Backend {
        Backend::Matplotlib
    }

    fn render(&self, request: PlotRequest, output_name: &str) -> Result<RenderedArtifact> {
        check_backend(self.backend(), &request)?;
        let bytes = graph::render_request(&request, &self.options).context("Failed to render static image")?;
        write_artifact(self.backend(), output_name, self.options.format.extension(), &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotLayout;

    #[test]
    fn test_renderer_for_backend() {
        let options = OutputOptions::default();
        for backend in Backend::ALL {
            assert_eq!(renderer_for(backend, &options).backend(), backend);
        }
    }

    #[test]
    fn test_backend_mismatch() {
        let request = PlotRequest::new(Backend::Plotly, PlotLayout::default());
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out");
        let result = StaticImageRenderer::default().render(request, output.to_str().unwrap());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cannot draw"));
    }

    #[test]
    fn test_static_render_writes_png() {
        let request = PlotRequest::new(Backend::Matplotlib, PlotLayout::default());
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("empty");
        let artifact = StaticImageRenderer::default()
            .render(request, output.to_str().unwrap())
            .unwrap();
        assert_eq!(artifact.path, dir.path().join("empty.png"));
        assert_eq!(std::fs::metadata(&artifact.path).unwrap().len() as usize, artifact.bytes);
    }
}
