// Pipeline driver: load -> preprocess -> assemble -> render

use crate::assemble::ScatterAssembler;
use crate::config::{OutputOptions, ScatterConfig};
use crate::csv_reader;
use crate::data::Dataset;
use crate::ir::{Assembly, AssemblyWarning};
use crate::render::{renderer_for, RenderedArtifact};
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Outcome of a full run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub artifacts: Vec<RenderedArtifact>,
    /// Datasets skipped or drawn with fallback sizes
    pub warnings: Vec<AssemblyWarning>,
}

/// Load, preprocess, assemble and render everything the configuration asks for
pub fn run(config: &ScatterConfig) -> Result<RunSummary> {
    let datasets = load_datasets(config)?;
    let assembler = ScatterAssembler::configure(datasets, config.assembly_config())
        .context("Invalid plot configuration")?;
    let assembly = assembler.assemble();
    render_assembly(assembly, &config.output)
}

/// Read every configured source, in configuration order
pub fn load_datasets(config: &ScatterConfig) -> Result<Vec<Dataset>> {
    let mut datasets = Vec::with_capacity(config.datasets.len());
    for source in &config.datasets {
        let mut dataset = csv_reader::read_dataset_file(&source.name, &source.path)
            .with_context(|| format!("Failed to load dataset '{}'", source.name))?;
        preprocess(&mut dataset, config);
        info!(dataset = %source.name, rows = dataset.len(), "loaded dataset");
        datasets.push(dataset);
    }
    Ok(datasets)
}

/// Column merges, then duplicate removal by the coordinate columns
pub fn preprocess(dataset: &mut Dataset, config: &ScatterConfig) {
    for merge in &config.combine_columns {
        dataset.merge_columns(&merge.merged, &merge.columns, merge.keep_originals);
    }

    if config.drop_duplicates {
        let before = dataset.len();
        let columns = &config.columns;
        dataset.drop_duplicate_rows(&[columns.x.as_str(), columns.y.as_str(), columns.z.as_str()]);
        if dataset.len() < before {
            debug!(dataset = dataset.name(), removed = before - dataset.len(), "dropped duplicate rows");
        }
    }
}

/// Hand each plot request to its back end's renderer
pub fn render_assembly(assembly: Assembly, output: &OutputOptions) -> Result<RunSummary> {
    let mut artifacts = Vec::with_capacity(assembly.requests.len());
    for (backend, request) in assembly.requests {
        let renderer = renderer_for(backend, output);
        let artifact = renderer
            .render(request, &output.name)
            .with_context(|| format!("Failed to render {} plot", backend))?;
        artifacts.push(artifact);
    }

    Ok(RunSummary {
        artifacts,
        warnings: assembly.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Backend;
    use std::fs;
    use std::path::Path;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    fn make_config(dir: &Path, extra: &str) -> ScatterConfig {
        let output = dir.join("out");
        let json = format!(
            r#"{{
                "datasets": [
                    {{"name": "sinc", "path": "sinc.csv", "label": "sinc(r)", "color": "red"}},
                    {{"name": "flat", "path": "flat.csv"}},
                    {{"name": "sphere", "path": "sphere.csv", "symbols": {{"matplotlib": "d"}}}}
                ],
                "columns": {{"x": "X", "y": "Y", "z": "Z", "size": "inv_dist"}},
                "output": {{"name": {output}}}
                {extra}
            }}"#,
            output = serde_json::to_string(output.to_str().unwrap()).unwrap(),
            extra = extra,
        );
        let mut config = ScatterConfig::from_json_str(&json).unwrap();
        config.resolve_paths(dir);
        config
    }

    fn write_fixtures(dir: &Path) {
        write_file(dir, "sinc.csv", "X,Y,Z,inv_dist\n0,0,1,10\n1,0,0.84,1\n1,0,0.84,1\n2,0,0.5,3\n");
        write_file(dir, "flat.csv", "X,Y\n0,0\n");
        write_file(dir, "sphere.csv", "X,Y,Z\n1,0,0\n0,1,0\n0,0,1\n");
    }

    #[test]
    fn test_preprocess_drops_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        write_fixtures(dir.path());
        let config = make_config(dir.path(), "");
        let datasets = load_datasets(&config).unwrap();
        assert_eq!(datasets[0].len(), 3);
        assert_eq!(datasets[1].len(), 1);
    }

    #[test]
    fn test_preprocess_keeps_duplicates_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        write_fixtures(dir.path());
        let config = make_config(dir.path(), r#", "drop_duplicates": false"#);
        let datasets = load_datasets(&config).unwrap();
        assert_eq!(datasets[0].len(), 4);
    }

    #[test]
    fn test_preprocess_merges_columns() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "sinc.csv", "X,Y,Z1,Z2\n0,0,1,\n1,0,,2\n");
        write_file(dir.path(), "flat.csv", "X,Y\n0,0\n");
        write_file(dir.path(), "sphere.csv", "X,Y,Z\n1,0,0\n");
        let config = make_config(
            dir.path(),
            r#", "combine_columns": [{"merged": "Z", "columns": ["Z1", "Z2"]}]"#,
        );
        let datasets = load_datasets(&config).unwrap();
        assert_eq!(datasets[0].numeric_column("Z").unwrap(), vec![1.0, 2.0]);
        assert!(!datasets[0].has_column("Z1"));
    }

    #[test]
    fn test_run_writes_both_backends() {
        let dir = tempfile::tempdir().unwrap();
        write_fixtures(dir.path());
        let config = make_config(dir.path(), "");

        let summary = run(&config).unwrap();
        assert_eq!(summary.artifacts.len(), 2);
        assert_eq!(summary.artifacts[0].backend, Backend::Plotly);
        assert!(dir.path().join("out.html").exists());
        assert!(dir.path().join("out.png").exists());

        assert_eq!(summary.warnings.len(), 1);
        assert_eq!(summary.warnings[0].dataset(), "flat");
    }

    #[test]
    fn test_run_missing_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = make_config(dir.path(), "");
        let result = run(&config);
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("Failed to load dataset 'sinc'"));
    }

    #[test]
    fn test_run_no_backends() {
        let dir = tempfile::tempdir().unwrap();
        write_fixtures(dir.path());
        let config = make_config(dir.path(), r#", "backends": []"#);
        let result = run(&config);
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("at least one back end"));
    }
}
