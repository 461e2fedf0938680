//! Writes the merged document to disk.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument};

use instructgen_shared::{InstructGenError, Result};

/// Where and how much was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMeta {
    pub path: PathBuf,
    pub size_bytes: usize,
}

/// Write `content` to `dir/file_name`, creating `dir` if needed.
///
/// The file is written to a uniquely named hidden temp file next to the
/// target and then renamed over it, so readers never observe a partial
/// document and concurrent exports never share a temp file.
#[instrument(skip(content), fields(dir = %dir.display(), size = content.len()))]
pub fn write_document(dir: &Path, file_name: &str, content: &str) -> Result<ExportMeta> {
    if file_name.is_empty() || file_name.contains(['/', '\\']) {
        return Err(InstructGenError::validation(format!(
            "output file name must be a plain file name, got {file_name:?}"
        )));
    }

    std::fs::create_dir_all(dir).map_err(|e| InstructGenError::io(dir, e))?;

    let target = dir.join(file_name);
    let temp = dir.join(format!(".{file_name}.{}.tmp", uuid::Uuid::now_v7()));

    std::fs::write(&temp, content).map_err(|e| InstructGenError::io(&temp, e))?;
    if let Err(e) = std::fs::rename(&temp, &target) {
        let _ = std::fs::remove_file(&temp);
        return Err(InstructGenError::io(&target, e));
    }

    info!(path = %target.display(), "wrote instructions file");

    Ok(ExportMeta {
        path: target,
        size_bytes: content.len(),
    })
}
