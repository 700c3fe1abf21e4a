use std::path::{Path, PathBuf};

use crate::utils::constants::{COG_EXTENSION, GRIB2_EXTENSION, GZIP_EXTENSION, MASK_INFIX};

/// Base name of a source file with the `.gz` and `.grib2` suffixes removed.
pub fn strip_source_suffixes(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = name.strip_suffix(GZIP_EXTENSION).unwrap_or(&name);
    name.strip_suffix(GRIB2_EXTENSION).unwrap_or(name).to_string()
}

fn sibling(source: &Path, filename: String) -> PathBuf {
    match source.parent() {
        Some(dir) => dir.join(filename),
        None => PathBuf::from(filename),
    }
}

/// COG output location: next to the source, e.g. `{id}.tif`.
pub fn cog_output_path(source: &Path) -> PathBuf {
    sibling(
        source,
        format!("{}{}", strip_source_suffixes(source), COG_EXTENSION),
    )
}

/// Legacy mask output location: `{id}-mask.tif`.
pub fn mask_output_path(source: &Path) -> PathBuf {
    sibling(
        source,
        format!(
            "{}{}{}",
            strip_source_suffixes(source),
            MASK_INFIX,
            COG_EXTENSION
        ),
    )
}

/// Decompressed GRIB2 location: `{id}.grib2`.
pub fn grib2_output_path(source: &Path) -> PathBuf {
    sibling(
        source,
        format!("{}{}", strip_source_suffixes(source), GRIB2_EXTENSION),
    )
}
