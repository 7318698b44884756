use crate::foundation::error::{ExportError, ExportResult};
use std::io::Write;
use std::path::Path;

/// Finished export held in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOutput {
    /// Complete container bytes.
    pub bytes: Vec<u8>,
    /// Frames encoded.
    pub frame_count: u64,
    /// Duration in seconds (`frame_count / fps`).
    pub duration_secs: f64,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl ExportOutput {
    /// Hand the bytes to `saver`. On failure the output is untouched and can be saved again.
    pub fn save_to(&self, saver: &dyn VideoSaver, path: &Path) -> ExportResult<()> {
        saver.save(path, &self.bytes).inspect_err(|err| {
            tracing::warn!(path = %path.display(), error = %err, "saving export failed");
        })
    }
}

/// "Save to path" collaborator.
pub trait VideoSaver {
    /// Persist `bytes` at `path`. Failures are [`ExportError::FileSaveFailed`].
    fn save(&self, path: &Path, bytes: &[u8]) -> ExportResult<()>;
}

/// Filesystem saver. Writes a temporary sibling then renames it into place, so a failed save
/// never leaves a partial file at `path`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsVideoSaver;

impl VideoSaver for FsVideoSaver {
    fn save(&self, path: &Path, bytes: &[u8]) -> ExportResult<()> {
        let file_name = path
            .file_name()
            .ok_or_else(|| ExportError::file_save(format!("'{}' is not a file path", path.display())))?;
        ensure_parent_dir(path)?;

        let mut tmp_name = std::ffi::OsString::from(".");
        tmp_name.push(file_name);
        tmp_name.push(format!(".{}.part", std::process::id()));
        let tmp = path.with_file_name(tmp_name);

        let written = write_file(&tmp, bytes).and_then(|()| {
            std::fs::rename(&tmp, path).map_err(|e| {
                ExportError::file_save(format!(
                    "rename '{}' -> '{}': {e}",
                    tmp.display(),
                    path.display()
                ))
            })
        });
        if written.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        written?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "export saved");
        Ok(())
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> ExportResult<()> {
    let mut f = std::fs::File::create(path)
        .map_err(|e| ExportError::file_save(format!("create '{}': {e}", path.display())))?;
    f.write_all(bytes)
        .and_then(|()| f.sync_all())
        .map_err(|e| ExportError::file_save(format!("write '{}': {e}", path.display())))
}

fn ensure_parent_dir(path: &Path) -> ExportResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            ExportError::file_save(format!("create dir '{}': {e}", parent.display()))
        })?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/export/save.rs"]
mod tests;
