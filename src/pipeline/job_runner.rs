// ジョブ単位: 抽出結果読込 -> 可視化 -> 出力PDF書込

use std::path::PathBuf;

use tracing::info;

use crate::model::{Document, ElementClass};
use crate::visualizer::DocumentVisualizer;

/// Configuration for a single job.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub input_path: PathBuf,
    pub elements_path: PathBuf,
    pub output_path: PathBuf,
    pub classes: Vec<ElementClass>,
    pub compress_streams: bool,
}

/// Result of processing a single job.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub pages: usize,
    pub bytes_written: usize,
}

/// Run a single visualization job.
///
/// The extraction results are read from `elements_path`; their PDF path is
/// replaced by `input_path` so jobs can annotate copies of the source PDF.
pub fn run_job(config: &JobConfig) -> crate::error::Result<JobResult> {
    let mut doc = Document::from_file(&config.elements_path)?;
    doc.path = config.input_path.clone();

    let visualizer = DocumentVisualizer::new().with_compression(config.compress_streams);
    let pdf_bytes = visualizer.visualize(&doc, config.classes.iter().copied())?;
    std::fs::write(&config.output_path, &pdf_bytes)?;

    info!(
        input = %config.input_path.display(),
        output = %config.output_path.display(),
        bytes = pdf_bytes.len(),
        "job finished"
    );

    Ok(JobResult {
        input_path: config.input_path.clone(),
        output_path: config.output_path.clone(),
        pages: doc.pages.len(),
        bytes_written: pdf_bytes.len(),
    })
}
