//! Snapshot Source
//!
//! Trait definition for per-market snapshot streams plus the NDJSON file
//! source used by the batch tool. A source is finite and single-pass; the
//! reducer never re-scans or assumes random access. The outer market
//! sequence is a lazy walk over input files (one file per market).

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::histdata::model::MarketBook;
use crate::histdata::normalize::{BookNormalizer, SourceStats};

/// Trait for per-market snapshot streams consumed by the scanner.
pub trait SnapshotSource {
    /// Get the next snapshot from the stream, in arrival order.
    fn next_book(&mut self) -> Option<MarketBook>;

    /// Source identifier for logging/diagnostics.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// A source backed by an in-memory vector of snapshots.
pub struct VecSource {
    books: std::vec::IntoIter<MarketBook>,
    name: String,
}

impl VecSource {
    pub fn new(name: impl Into<String>, books: Vec<MarketBook>) -> Self {
        Self {
            books: books.into_iter(),
            name: name.into(),
        }
    }
}

impl SnapshotSource for VecSource {
    fn next_book(&mut self) -> Option<MarketBook> {
        self.books.next()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Iterator adapter for SnapshotSource.
pub struct SourceIterator<'a, S: SnapshotSource + ?Sized> {
    source: &'a mut S,
}

impl<'a, S: SnapshotSource + ?Sized> Iterator for SourceIterator<'a, S> {
    type Item = MarketBook;

    fn next(&mut self) -> Option<Self::Item> {
        self.source.next_book()
    }
}

/// Extension trait to get an iterator from a source.
pub trait SnapshotSourceExt: SnapshotSource {
    fn iter(&mut self) -> SourceIterator<'_, Self> {
        SourceIterator { source: self }
    }
}

impl<T: SnapshotSource + ?Sized> SnapshotSourceExt for T {}

/// Lazy NDJSON stream over one market file: one JSON market book per line.
/// Malformed lines are counted by the normalizer and skipped.
pub struct NdjsonSnapshotStream {
    lines: Lines<BufReader<File>>,
    normalizer: BookNormalizer,
    name: String,
}

impl NdjsonSnapshotStream {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open market file: {}", path.display()))?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            normalizer: BookNormalizer::new(),
            name: path.display().to_string(),
        })
    }

    /// Integrity counters accumulated so far.
    pub fn stats(&self) -> &SourceStats {
        self.normalizer.stats()
    }
}

impl SnapshotSource for NdjsonSnapshotStream {
    fn next_book(&mut self) -> Option<MarketBook> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                // Read failure mid-file ends the stream; the scanner treats
                // a truncated sequence as incomplete data, not an error.
                Err(_) => return None,
            };
            if line.trim().is_empty() {
                continue;
            }
            if let Some(book) = self.normalizer.normalize_line(&line) {
                return Some(book);
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Expand input paths into the ordered list of market files.
///
/// Files are taken as-is; directories are walked recursively for `.json` /
/// `.ndjson` entries. The result is sorted so that repeated runs over the
/// same inputs emit rows in the same order.
pub fn market_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            collect_dir(input, &mut files)
                .with_context(|| format!("Failed to walk directory: {}", input.display()))?;
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            anyhow::bail!("Input path not found: {}", input.display());
        }
    }
    files.sort();
    files.dedup();
    debug!(count = files.len(), "Resolved market files");
    Ok(files)
}

fn collect_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_dir(&path, files)?;
        } else if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("json") | Some("ndjson")
        ) {
            files.push(path);
        }
    }
    Ok(())
}
