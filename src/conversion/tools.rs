use crate::error::{ProcessingError, Result};
use crate::settings::ToolSettings;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Pixel clamp applied while writing an optimized raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clamp {
    /// Values below the bound are raised to it.
    Floor(f64),
    /// Values above the bound are lowered to it.
    Ceiling(f64),
}

impl Clamp {
    pub fn expression(&self) -> String {
        match self {
            Clamp::Floor(bound) => format!("maximum(A, {})", bound),
            Clamp::Ceiling(bound) => format!("minimum(A, {})", bound),
        }
    }
}

/// One call of the raster optimization tool.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeRequest {
    pub clamp: Clamp,
    pub nodata: f64,
    pub data_type: Option<&'static str>,
}

/// The external geospatial capabilities the conversion pipeline relies on.
pub trait GeoTools: Send + Sync {
    /// Warp `source` into `crs`, writing to `destination`.
    fn reproject(&self, source: &Path, destination: &Path, crs: &str) -> Result<PathBuf>;

    /// Write a tiled, compressed GeoTIFF of `source` to `destination`.
    fn optimize(
        &self,
        source: &Path,
        destination: &Path,
        request: &OptimizeRequest,
    ) -> Result<PathBuf>;
}

/// Runs `gdalwarp` and `gdal_calc.py` as subprocesses.
#[derive(Debug, Clone)]
pub struct GdalCommandLine {
    warp_program: String,
    calc_program: String,
    compress: String,
}

impl GdalCommandLine {
    pub fn new(settings: &ToolSettings) -> Self {
        Self {
            warp_program: settings.warp_program.clone(),
            calc_program: settings.calc_program.clone(),
            compress: settings.compress.clone(),
        }
    }

    pub fn warp_args(source: &Path, destination: &Path, crs: &str) -> Vec<OsString> {
        vec![
            "-overwrite".into(),
            "-t_srs".into(),
            crs.into(),
            source.into(),
            destination.into(),
        ]
    }

    pub fn calc_args(
        &self,
        source: &Path,
        destination: &Path,
        request: &OptimizeRequest,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-A".into(),
            source.into(),
            "--outfile".into(),
            destination.into(),
            "--overwrite".into(),
            "--calc".into(),
            request.clamp.expression().into(),
            "--NoDataValue".into(),
            request.nodata.to_string().into(),
        ];
        if let Some(data_type) = request.data_type {
            args.push("--type".into());
            args.push(data_type.into());
        }
        for option in [
            "TILED=YES".to_string(),
            "COPY_SRC_OVERVIEWS=YES".to_string(),
            format!("COMPRESS={}", self.compress),
        ] {
            args.push("--co".into());
            args.push(option.into());
        }
        args.push("--format".into());
        args.push("GTiff".into());
        args
    }

    fn run(program: &str, args: &[OsString]) -> Result<()> {
        debug!(program, ?args, "running external tool");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| ProcessingError::ExternalTool {
                tool: program.to_string(),
                code: None,
                stderr: format!("Failed to run {}: {}", program, e),
            })?;

        if !output.status.success() {
            return Err(ProcessingError::ExternalTool {
                tool: program.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

impl GeoTools for GdalCommandLine {
    fn reproject(&self, source: &Path, destination: &Path, crs: &str) -> Result<PathBuf> {
        info!("reprojecting {} to {} ({})", source.display(), destination.display(), crs);
        Self::run(&self.warp_program, &Self::warp_args(source, destination, crs))?;
        Ok(destination.to_path_buf())
    }

    fn optimize(
        &self,
        source: &Path,
        destination: &Path,
        request: &OptimizeRequest,
    ) -> Result<PathBuf> {
        info!(
            "optimizing {} to {} ({})",
            source.display(),
            destination.display(),
            request.clamp.expression()
        );
        Self::run(
            &self.calc_program,
            &self.calc_args(source, destination, request),
        )?;
        Ok(destination.to_path_buf())
    }
}
