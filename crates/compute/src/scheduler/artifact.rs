use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ArtifactError;

/// Atomically write `state` as JSON to `path`.
///
/// Writes to a hidden `.tmp` sibling, syncs it, then renames it into place,
/// so an existing `path` always holds a complete artifact. The sibling is
/// removed again if any step fails.
pub fn write_artifact<S: Serialize>(path: &Path, state: &S) -> Result<(), ArtifactError> {
    let tmp_path = tmp_path_for(path);
    let result = write_synced(&tmp_path, state).and_then(|()| {
        fs::rename(&tmp_path, path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_synced<S: Serialize>(tmp_path: &Path, state: &S) -> Result<(), ArtifactError> {
    let io_err = |source| ArtifactError::Io {
        path: tmp_path.to_path_buf(),
        source,
    };

    let file = File::create(tmp_path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, state).map_err(|source| {
        ArtifactError::Encoding {
            path: tmp_path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(io_err)?;
    writer.get_ref().sync_all().map_err(io_err)
}

/// Load a state previously written with [`write_artifact`].
pub fn read_artifact<S: DeserializeOwned>(path: &Path) -> Result<S, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Encoding {
        path: path.to_path_buf(),
        source,
    })
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}
