//! Asset discovery on disk

use super::image::Image;
use crate::error::AssetError;
use cardsynth_core::{LabelFile, NormalizedBox};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory name that marks a label tree
pub const LABELS_SEGMENT: &str = "labels";

/// Finds and decodes image assets under a set of root directories
#[derive(Debug, Clone)]
pub struct AssetStore {
    roots: Vec<PathBuf>,
    supported_extensions: Vec<String>,
}

impl AssetStore {
    /// Create new store accepting `.png`, `.jpg` and `.jpeg`
    pub fn new() -> Self {
        Self {
            roots: Vec::new(),
            supported_extensions: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
        }
    }

    /// Add a directory to search
    pub fn add_root<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.roots.push(dir.as_ref().to_path_buf());
        self
    }

    /// Whether `path` has one of the supported image extensions
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                self.supported_extensions.contains(&ext)
            })
            .unwrap_or(false)
    }

    /// Lazily walk `root` recursively, yielding image files.
    ///
    /// Order follows the filesystem and is not stable. Calling again starts a
    /// fresh walk. Unreadable directory entries are skipped.
    pub fn enumerate_images<P: AsRef<Path>>(&self, root: P) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(root.as_ref())
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(move |path| self.is_supported(path))
    }

    /// All images under every configured root, root by root
    pub fn images(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.roots
            .iter()
            .flat_map(move |root| self.enumerate_images(root))
    }

    /// Decode a single image
    pub fn load_image<P: AsRef<Path>>(&self, path: P) -> Result<Image, AssetError> {
        Image::load(path)
    }
}

impl Default for AssetStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether any directory above `path` mentions `labels`
fn in_label_tree(path: &Path) -> bool {
    path.parent()
        .map(|dir| dir.to_string_lossy().contains(LABELS_SEGMENT))
        .unwrap_or(false)
}

/// Collect every box from every `.txt` file inside a `labels` directory under `root`.
///
/// Unreadable files are logged and skipped; malformed lines are dropped by the parser.
pub fn load_label_pool<P: AsRef<Path>>(root: P) -> Vec<NormalizedBox> {
    let mut boxes = Vec::new();

    for entry in WalkDir::new(root.as_ref()).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        let is_txt = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("txt"))
            .unwrap_or(false);

        if !entry.file_type().is_file() || !is_txt || !in_label_tree(path) {
            continue;
        }

        match LabelFile::load(path) {
            Ok(file) => boxes.extend(file.boxes),
            Err(e) => tracing::warn!("skipping label file {:?}: {e:#}", path),
        }
    }

    tracing::debug!(count = boxes.len(), "loaded label pool");
    boxes
}
