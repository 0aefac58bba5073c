#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the hotspot map toolchain.
//!
//! Provides an `indicatif` spinner behind the dashboard's
//! [`LoadingIndicator`] trait, plus [`init_logger`] which sets up
//! `indicatif-log-bridge` so that `log::info!` and friends are suspended
//! while the spinner redraws.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use hotspot_map_dashboard::LoadingIndicator;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// An `indicatif` spinner shown while a scoring request is in flight.
pub struct SpinnerIndicator {
    multi: MultiProgress,
    bar: Mutex<Option<ProgressBar>>,
}

impl SpinnerIndicator {
    /// Creates an indicator whose spinners are added to `multi`.
    #[must_use]
    pub fn new(multi: &MultiProgress) -> Arc<dyn LoadingIndicator> {
        Arc::new(Self {
            multi: multi.clone(),
            bar: Mutex::new(None),
        })
    }

    #[cfg(test)]
    fn is_active(&self) -> bool {
        self.bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl LoadingIndicator for SpinnerIndicator {
    fn start(&self, message: &str) {
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        let previous = self
            .bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(bar);
        if let Some(previous) = previous {
            previous.finish_and_clear();
        }
    }

    fn finish(&self) {
        let bar = self
            .bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while spinners redraw.
///
/// Returns the [`MultiProgress`] that all spinners must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    // Build the pretty-env-logger logger manually so we can wrap it.
    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Already set when called twice (e.g. in tests)

    log::set_max_level(level);

    multi
}

#[cfg(test)]
mod tests {
    use indicatif::ProgressDrawTarget;

    use super::*;

    fn hidden_spinner() -> SpinnerIndicator {
        SpinnerIndicator {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            bar: Mutex::new(None),
        }
    }

    #[test]
    fn spinner_is_active_between_start_and_finish() {
        let spinner = hidden_spinner();
        assert!(!spinner.is_active());

        spinner.start("Analyzing 3 structure(s)...");
        assert!(spinner.is_active());

        spinner.finish();
        assert!(!spinner.is_active());
    }

    #[test]
    fn finish_without_start_is_harmless() {
        let spinner = hidden_spinner();
        spinner.finish();
        spinner.start("again");
        spinner.start("and again");
        spinner.finish();
        assert!(!spinner.is_active());
    }
}
