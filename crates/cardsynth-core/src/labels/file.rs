//! Whole label files: one normalized box per line

use super::boxes::NormalizedBox;
use super::codec::{decode_line, encode_line};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Parsed contents of a label file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelFile {
    pub boxes: Vec<NormalizedBox>,
}

impl LabelFile {
    pub fn new(boxes: Vec<NormalizedBox>) -> Self {
        Self { boxes }
    }

    /// Parse label text, skipping lines that are not exactly five valid tokens
    pub fn parse(text: &str) -> Self {
        let mut boxes = Vec::new();

        for (line_num, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            match decode_line(line) {
                Ok(bbox) => boxes.push(bbox),
                Err(e) => {
                    tracing::debug!(line = line_num + 1, "skipping label line: {e}");
                }
            }
        }

        Self { boxes }
    }

    /// Read and parse a label file. Only I/O failures are errors.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read label file: {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    /// Write the boxes, one per line, creating parent directories as needed
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(path, self.to_string())
            .with_context(|| format!("Failed to write label file: {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

impl fmt::Display for LabelFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bbox in &self.boxes {
            writeln!(f, "{}", encode_line(bbox))?;
        }
        Ok(())
    }
}

impl FromIterator<NormalizedBox> for LabelFile {
    fn from_iter<T: IntoIterator<Item = NormalizedBox>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
