//! Page text sources.
//!
//! PDF decoding happens elsewhere; these hand over already-extracted text,
//! one UTF-8 block per page, in reading order.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Page separator emitted by `pdftotext` and friends.
pub const PAGE_BREAK: char = '\u{0c}';

/// Anything that can produce the ordered page texts of one document.
pub trait PageSource: Send + Sync {
    fn pages(&self) -> Result<Vec<String>>;
}

/// Pages already held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPages {
    pages: Vec<String>,
}

impl InMemoryPages {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    /// Split one text blob into pages on form feeds.
    pub fn from_text(text: &str) -> Self {
        Self::new(split_pages(text))
    }
}

impl PageSource for InMemoryPages {
    fn pages(&self) -> Result<Vec<String>> {
        if self.pages.iter().all(|p| p.trim().is_empty()) {
            return Err(IngestError::ExtractionFailed(
                "document contains no text".to_string(),
            ));
        }
        Ok(self.pages.clone())
    }
}

/// A text file produced by an external PDF-to-text step.
#[derive(Debug, Clone)]
pub struct TextFileSource {
    path: PathBuf,
}

impl TextFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl PageSource for TextFileSource {
    fn pages(&self) -> Result<Vec<String>> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            IngestError::ExtractionFailed(format!("reading {}: {e}", self.path.display()))
        })?;
        InMemoryPages::from_text(&text).pages()
    }
}

pub fn split_pages(text: &str) -> Vec<String> {
    text.split(PAGE_BREAK).map(str::to_string).collect()
}
