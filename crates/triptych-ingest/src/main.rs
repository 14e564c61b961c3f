//! Triptych ingest - extract plain text from HTML documentation trees.

mod extract;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "triptych-ingest")]
#[command(about = "Extract plain text from HTML documentation for the FAQ index")]
struct Cli {
    /// Directory (or single file) containing HTML documentation
    docs_dir: String,

    /// Output JSON file
    #[arg(short, long, default_value = "processed_docs.json")]
    output: String,
}

/// Output batch in the shape `POST /documents` accepts.
#[derive(Serialize)]
struct DocumentBatch {
    documents: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let docs_dir = Path::new(&cli.docs_dir);
    if !docs_dir.exists() {
        bail!("Path does not exist: {}", docs_dir.display());
    }

    let files = collect_html_files(docs_dir)?;
    if files.is_empty() {
        bail!("No .html files found under: {}", docs_dir.display());
    }

    println!(
        "{} Processing {} pages from {}...",
        "→".blue(),
        files.len().to_string().cyan(),
        docs_dir.display()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut documents = Vec::new();
    for file in &files {
        match std::fs::read_to_string(file) {
            Ok(html) => {
                let text = extract::extract_text(&html);
                // Pages that are all chrome reduce to nothing; skip them
                if !text.trim().is_empty() {
                    documents.push(text);
                }
            }
            Err(e) => {
                pb.println(format!(
                    "{} Error processing {}: {}",
                    "✗".red(),
                    file.display(),
                    e
                ));
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");

    let batch = DocumentBatch { documents };
    let json = serde_json::to_string_pretty(&batch)?;
    std::fs::write(&cli.output, json)
        .with_context(|| format!("Failed to write: {}", cli.output))?;

    println!();
    println!("{} Extraction complete!", "✓".green().bold());
    println!("  Pages: {}", files.len().to_string().cyan());
    println!(
        "  Documents: {}",
        batch.documents.len().to_string().cyan()
    );
    println!("  Output: {}", cli.output.cyan());

    Ok(())
}

fn collect_html_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if path.is_file() {
        files.push(path.to_path_buf());
    } else {
        for entry in walkdir(path)? {
            let ext = entry.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext.eq_ignore_ascii_case("html") {
                files.push(entry);
            }
        }
    }

    Ok(files)
}

fn walkdir(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            files.extend(walkdir(&path)?);
        } else {
            files.push(path);
        }
    }

    Ok(files)
}
