use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Invalid MRMS QPE filename: {filename}")]
    InvalidFilename { filename: String },

    #[error("Failed to decompress {}: {source}", path.display())]
    Decompression {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed (exit code {}): {stderr}", code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    ExternalTool {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to read raster {}: {message}", path.display())]
    RasterRead { path: PathBuf, message: String },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{failed} of {total} files failed")]
    BatchFailures { failed: usize, total: usize },

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ProcessingError {
    pub fn invalid_filename(filename: impl Into<String>) -> Self {
        ProcessingError::InvalidFilename {
            filename: filename.into(),
        }
    }

    pub fn raster_read(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ProcessingError::RasterRead {
            path: path.into(),
            message: message.into(),
        }
    }
}
