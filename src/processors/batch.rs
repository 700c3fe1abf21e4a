use crate::conversion::GeoTools;
use crate::error::Result;
use crate::models::FileInfo;
use crate::processors::metadata_assembler::{ItemOptions, MetadataAssembler};
use crate::utils::progress::ProgressReporter;
use crate::writers::StacWriter;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of a batch run. A failing source never stops the others.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Created {} items, {} failed",
            self.written.len(),
            self.failures.len()
        );
        for (source, reason) in &self.failures {
            summary.push_str(&format!("\n  {}: {}", source.display(), reason));
        }
        summary
    }
}

pub struct BatchProcessor {
    max_workers: usize,
}

impl BatchProcessor {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    /// MRMS QPE files directly inside `input_dir`, one per product id, sorted by id.
    /// When both `{id}.grib2.gz` and a decompressed `{id}.grib2` exist, the gzip original wins.
    pub fn discover(input_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut by_id: BTreeMap<String, (bool, PathBuf)> = BTreeMap::new();
        for entry in fs::read_dir(input_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Ok(file) = FileInfo::parse(&path.to_string_lossy()) else {
                continue;
            };

            let keep = match by_id.get(&file.id) {
                Some((existing_gzip, _)) => file.gzip && !existing_gzip,
                None => true,
            };
            if keep {
                by_id.insert(file.id, (file.gzip, path));
            } else {
                debug!("skipping {}, another copy of {} is scheduled", path.display(), file.id);
            }
        }
        Ok(by_id.into_values().map(|(_, path)| path).collect())
    }

    /// Create one item per source and write it to `output_dir/<item id>.json`.
    pub fn process(
        &self,
        sources: &[PathBuf],
        output_dir: &Path,
        options: &ItemOptions<'_>,
        tools: &dyn GeoTools,
        progress: Option<&ProgressReporter>,
    ) -> Result<BatchReport> {
        fs::create_dir_all(output_dir)?;
        info!(
            "processing {} files with up to {} workers",
            sources.len(),
            self.max_workers
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()?;

        let assembler = MetadataAssembler::new(tools);
        let outcomes: Vec<(PathBuf, Result<PathBuf>)> = pool.install(|| {
            sources
                .par_iter()
                .map(|source| {
                    let outcome = assembler.create_item(source, options).and_then(|mut item| {
                        let destination = output_dir.join(format!("{}.json", item.id));
                        StacWriter::write_item(&mut item, &destination)
                    });

                    if let Some(p) = progress {
                        p.increment(1);
                    }
                    (source.clone(), outcome)
                })
                .collect()
        });

        let mut report = BatchReport::default();
        for (source, outcome) in outcomes {
            match outcome {
                Ok(path) => report.written.push(path),
                Err(e) => {
                    warn!("failed to create item for {}: {}", source.display(), e);
                    if let Some(p) = progress {
                        p.println(&format!("  → Failed {}: {}", source.display(), e));
                    }
                    report.failures.push((source, e.to_string()));
                }
            }
        }

        if let Some(p) = progress {
            p.finish_with_message(&report.summary());
        }
        Ok(report)
    }
}
