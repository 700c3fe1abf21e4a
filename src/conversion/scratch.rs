use crate::error::{ProcessingError, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Private working area for one conversion. The directory and everything in it is
/// removed when the value is dropped, whichever way the conversion ends.
pub struct ScratchDir {
    temp_dir: TempDir,
}

impl ScratchDir {
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("mrms-qpe-")
            .tempdir()
            .map_err(|e| {
                ProcessingError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create scratch directory: {}", e),
                ))
            })?;

        debug!(path = %temp_dir.path().display(), "created scratch directory");
        Ok(Self { temp_dir })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Location for an intermediate file inside the scratch area.
    pub fn file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Decompress a single-member gzip stream into the scratch area.
    pub fn decompress(&self, source: &Path, name: &str) -> Result<PathBuf> {
        let dest_path = self.file(name);
        debug!(from = %source.display(), to = %dest_path.display(), "decompressing");

        let decompression = |e: std::io::Error| ProcessingError::Decompression {
            path: source.to_path_buf(),
            source: e,
        };

        let input = File::open(source).map_err(decompression)?;
        let mut decoder = GzDecoder::new(BufReader::new(input));

        let mut dest_file = File::create(&dest_path).map_err(decompression)?;
        let mut writer = BufWriter::new(&mut dest_file);
        std::io::copy(&mut decoder, &mut writer).map_err(decompression)?;
        writer.flush().map_err(decompression)?;

        Ok(dest_path)
    }

    /// Remove the scratch area now and report failures instead of ignoring them.
    pub fn close(self) -> Result<()> {
        let path = self.temp_dir.path().to_path_buf();
        self.temp_dir.close().map_err(|e| {
            warn!(path = %path.display(), "failed to remove scratch directory: {}", e);
            ProcessingError::Io(e)
        })
    }
}

/// Move a finished intermediate to its final location. Falls back to copying through a
/// sibling `.partial` file when the scratch area is on another filesystem, so the final
/// path never holds a half-written file.
pub fn persist(intermediate: &Path, destination: &Path) -> Result<()> {
    if fs::rename(intermediate, destination).is_ok() {
        return Ok(());
    }

    let mut partial = destination.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    if let Err(e) = fs::copy(intermediate, &partial) {
        let _ = fs::remove_file(&partial);
        return Err(ProcessingError::Io(e));
    }
    fs::rename(&partial, destination).map_err(|e| {
        let _ = fs::remove_file(&partial);
        ProcessingError::Io(e)
    })
}
