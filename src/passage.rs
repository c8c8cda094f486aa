//! Corpus access: category discovery and random passage windows.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rand::Rng;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::PassageWindow;

#[derive(Debug, Error)]
pub enum SampleError {
  #[error("corpus file not found: {0}")]
  NotFound(PathBuf),
  #[error("failed to read corpus file {path}: {source}")]
  Io { path: PathBuf, source: std::io::Error },
}

/// `{data_dir}/{category}.txt`, or None when the name could escape `data_dir`.
pub fn category_path(data_dir: &Path, category: &str) -> Option<PathBuf> {
  let unsafe_name = category.is_empty()
    || category.contains('/')
    || category.contains('\\')
    || category.contains("..")
    || category.contains('\0');
  if unsafe_name { None } else { Some(data_dir.join(format!("{}.txt", category))) }
}

/// Sorted category names (file stems of `*.txt`). A missing directory yields no categories.
pub async fn list_categories(data_dir: &Path) -> std::io::Result<Vec<String>> {
  let mut entries = match tokio::fs::read_dir(data_dir).await {
    Ok(e) => e,
    Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
    Err(e) => return Err(e),
  };
  let mut cats = Vec::new();
  while let Some(entry) = entries.next_entry().await? {
    let name = entry.file_name().to_string_lossy().into_owned();
    if name.len() > 4 && name.to_ascii_lowercase().ends_with(".txt") {
      cats.push(name[..name.len() - 4].to_string());
    }
  }
  cats.sort();
  Ok(cats)
}

/// Read `path` (lossy UTF-8) and cut a window of at most `target_chars` characters.
#[instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub async fn sample(path: &Path, target_chars: usize) -> Result<PassageWindow, SampleError> {
  let io_err = |e: std::io::Error| match e.kind() {
    ErrorKind::NotFound => SampleError::NotFound(path.to_path_buf()),
    _ => SampleError::Io { path: path.to_path_buf(), source: e },
  };
  // A directory named `<category>.txt` is not a corpus file.
  if !tokio::fs::metadata(path).await.map_err(io_err)?.is_file() {
    return Err(SampleError::NotFound(path.to_path_buf()));
  }
  let bytes = tokio::fs::read(path).await.map_err(io_err)?;
  let text = String::from_utf8_lossy(&bytes);
  let window = {
    let mut rng = rand::thread_rng();
    window_text(&text, target_chars, &mut rng)
  };
  debug!(offset = window.offset, source_len = window.source_len, "Passage window drawn");
  Ok(window)
}

/// Uniform start offset in `[0, len - target]`; whole text when it already fits.
pub fn window_text<R: Rng + ?Sized>(text: &str, target_chars: usize, rng: &mut R) -> PassageWindow {
  let len = text.chars().count();
  if len <= target_chars {
    return PassageWindow { text: text.to_string(), offset: 0, source_len: len };
  }
  let offset = rng.gen_range(0..=len - target_chars);
  let window: String = text.chars().skip(offset).take(target_chars).collect();
  PassageWindow { text: window, offset, source_len: len }
}
