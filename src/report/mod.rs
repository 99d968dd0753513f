pub mod types;

pub use types::{Hotspot, Summary};

use crate::github::RepoSlug;
use crate::scan::{AggregatedDocument, ScanOutcome};
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write document: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Write the aggregated document as a flat JSON object in one shot.
#[instrument(skip(document), fields(files = document.len()))]
pub fn write_document(document: &AggregatedDocument, path: &Path) -> Result<(), ReportError> {
    let json = serde_json::to_string(document)?;
    debug!(bytes = json.len(), "writing document");
    std::fs::write(path, json)?;
    Ok(())
}

/// Build the terminal summary, keeping the `top` most touched files.
pub fn build_summary(repo: &RepoSlug, outcome: &ScanOutcome, top: usize) -> Summary {
    Summary {
        repository: repo.to_string(),
        termination: outcome.termination,
        pages_fetched: outcome.pages_fetched,
        pulls_matched: outcome.pulls_matched,
        files_pulled: outcome.files.len(),
        files_touched: outcome.document.len(),
        hotspots: hotspots(&outcome.document, top),
    }
}

/// Files ranked by number of pull requests, ties broken by filename.
fn hotspots(document: &AggregatedDocument, top: usize) -> Vec<Hotspot> {
    let mut ranked: Vec<Hotspot> = document
        .iter()
        .map(|(filename, titles)| Hotspot {
            filename: filename.clone(),
            pulls: titles.len(),
        })
        .collect();
    ranked.sort_by(|a, b| b.pulls.cmp(&a.pulls).then_with(|| a.filename.cmp(&b.filename)));
    ranked.truncate(top);
    ranked
}

pub fn greet(login: &str) {
    println!("{} {}!", "Hello".green().bold(), login);
}

/// Print the summary to stdout with colors.
///
/// owner/repo: 12 pull requests matched (3 pages, reached retention cutoff)
/// Files touched: 40 (57 records)
///
/// ═══ Hotspots ═══
///   5  src/main.rs
pub fn print_summary(summary: &Summary, output: &Path) {
    println!();
    println!(
        "{}: {} pull requests matched ({} pages, {})",
        summary.repository.bold(),
        summary.pulls_matched,
        summary.pages_fetched,
        summary.termination.to_string().yellow()
    );
    println!(
        "Files touched: {} ({} records)",
        summary.files_touched, summary.files_pulled
    );
    println!();

    if summary.hotspots.is_empty() {
        println!("  No files touched.");
    } else {
        println!("═══ Hotspots ═══");
        for hotspot in &summary.hotspots {
            println!("  {:>4}  {}", hotspot.pulls.to_string().red().bold(), hotspot.filename);
        }
    }
    println!();
    println!(
        "{} {}",
        "JSON file has been saved:".green(),
        output.display()
    );
}
