use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar for batch runs; a no-op when silent.
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new(total: u64, message: &str, silent: bool) -> Self {
        if silent {
            return Self { progress_bar: None };
        }

        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            progress_bar: Some(pb),
        }
    }

    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    /// Print above the bar without tearing it.
    pub fn println(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.println(message);
        }
    }

    pub fn finish_with_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            if !pb.is_finished() {
                pb.finish();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_reporter_is_inert() {
        let progress = ProgressReporter::new(10, "Creating items", true);
        progress.increment(3);
        progress.println("ignored");
        progress.finish_with_message("done");
        assert!(progress.progress_bar.is_none());
    }

    #[test]
    fn test_reporter_counts() {
        let progress = ProgressReporter::new(4, "Creating items", false);
        progress.increment(1);
        progress.increment(2);
        assert_eq!(progress.progress_bar.as_ref().map(|pb| pb.position()), Some(3));
        progress.finish_with_message("done");
    }
}
