//! Note persistence: filename sanitizing and the note sink.

pub mod render;

pub use render::{render_note, NoteOptions};

use crate::error::Result;
use regex::Regex;
use std::path::PathBuf;

/// Destination for rendered notes.
pub trait NoteSink {
    fn write_note(&self, filename: &str, content: &str) -> Result<()>;
}

/// Persists notes as files under a base directory, created on first write.
pub struct FsNoteSink {
    folder: PathBuf,
}

impl FsNoteSink {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }
}

impl NoteSink for FsNoteSink {
    fn write_note(&self, filename: &str, content: &str) -> Result<()> {
        std::fs::create_dir_all(&self.folder)?;
        let path = self.folder.join(filename);
        std::fs::write(&path, content)?;
        log::debug!("Wrote note {}", path.display());
        Ok(())
    }
}

/// Strip characters that are illegal in common filesystems and collapse the
/// resulting whitespace.
pub fn sanitize_filename(name: &str) -> String {
    let illegal = Regex::new(r#"[\\/:*?"<>|\x00-\x1f]"#).expect("Invalid regex pattern");
    let spaced = illegal.replace_all(name, " ");
    let collapse = Regex::new(r"\s+").expect("Invalid regex pattern");
    collapse.replace_all(spaced.trim(), " ").to_string()
}
