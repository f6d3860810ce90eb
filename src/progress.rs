//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`Progress`] struct which implements
//! [`ProgressCallback`] to display visual progress bars in the terminal.
//! The resolution engine reports coarse progress in units of settled size
//! buckets and fine status text for whatever is being hashed.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress callback for the deduplication pipeline phases.
///
/// Implement this trait to receive progress updates during scanning and
/// resolution. All methods have no-op defaults except the phase hooks.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (e.g., "scan", "resolve")
    /// * `total` - Total number of items to process (0 if unknown)
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Current item number (1-based)
    /// * `label` - Human-readable description of the item
    fn on_progress(&self, current: usize, label: &str);

    /// Called when an item has been processed, providing bytes read for it.
    ///
    /// Can be used to track hashing throughput.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the status message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
///
/// Manages a spinner for the scan phase and a bar for the resolve phase.
pub struct Progress {
    multi: MultiProgress,
    scan: Mutex<Option<ProgressBar>>,
    resolve: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            scan: Mutex::new(None),
            resolve: Mutex::new(None),
            quiet,
        }
    }

    fn scan_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn resolve_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} buckets ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            "scan" => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::scan_style());
                pb.set_message("Scanning");
                pb.enable_steady_tick(Duration::from_millis(100));
                *self.scan.lock().unwrap() = Some(pb);
            }
            "resolve" => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::resolve_style());
                pb.set_message("Resolving");
                *self.resolve.lock().unwrap() = Some(pb);
            }
            _ => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_message(phase.to_string());
            }
        }
    }

    fn on_progress(&self, current: usize, label: &str) {
        if self.quiet {
            return;
        }

        if let Some(ref pb) = *self.resolve.lock().unwrap() {
            pb.set_position(current as u64);
            pb.set_message(label.to_string());
        } else if let Some(ref pb) = *self.scan.lock().unwrap() {
            pb.set_position(current as u64);
            pb.set_message(label.to_string());
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        match phase {
            "scan" => {
                if let Some(pb) = self.scan.lock().unwrap().take() {
                    pb.finish_with_message("Scan complete");
                }
            }
            "resolve" => {
                if let Some(pb) = self.resolve.lock().unwrap().take() {
                    pb.finish_with_message("Resolution complete");
                }
            }
            _ => {}
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }

        if let Some(ref pb) = *self.resolve.lock().unwrap() {
            pb.set_message(message.to_string());
        } else if let Some(ref pb) = *self.scan.lock().unwrap() {
            pb.set_message(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Callback that records how many times each hook fired.
    #[derive(Default)]
    struct CountingCallback {
        starts: AtomicUsize,
        ticks: AtomicUsize,
        ends: AtomicUsize,
    }

    impl ProgressCallback for CountingCallback {
        fn on_phase_start(&self, _phase: &str, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        fn on_progress(&self, _current: usize, _label: &str) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
        }
        fn on_phase_end(&self, _phase: &str) {
            self.ends.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_callback_trait_object_usable() {
        let cb = CountingCallback::default();
        let dyn_cb: &dyn ProgressCallback = &cb;
        dyn_cb.on_phase_start("resolve", 10);
        dyn_cb.on_progress(1, "bucket");
        dyn_cb.on_item_completed(1024);
        dyn_cb.on_phase_end("resolve");

        assert_eq!(cb.starts.load(Ordering::SeqCst), 1);
        assert_eq!(cb.ticks.load(Ordering::SeqCst), 1);
        assert_eq!(cb.ends.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_quiet_progress_ignores_updates() {
        let progress = Progress::new(true);
        progress.on_phase_start("resolve", 5);
        progress.on_progress(1, "bucket");
        progress.on_phase_end("resolve");
        assert!(progress.resolve.lock().unwrap().is_none());
    }
}
