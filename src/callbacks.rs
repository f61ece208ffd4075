//! Implementation of different callback functions.
//!
//! A callback observes the adaptive refinement from the outside: it is handed a [`Progress`]
//! record after the initial evaluation and after every refinement pass, and may print it, log
//! it to a file, or ignore it. Callbacks cannot influence the refinement; early termination is
//! expressed through the evaluation budget alone.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A snapshot of an integration in progress.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Progress<T> {
    /// Number of refinement passes performed so far; `0` is the initial whole-domain
    /// evaluation.
    pub passes: usize,
    /// Number of integrand evaluations spent so far.
    pub calls: usize,
    /// Number of regions currently held by the engine (always `1` for the p-adaptive
    /// integrators).
    pub regions: usize,
    /// Current accumulated integral estimate per component.
    pub value: Vec<T>,
    /// Current accumulated error estimate per component.
    pub error: Vec<T>,
}

/// Trait for implementing callbacks for the adaptive integrators.
pub trait Callback<T> {
    /// This method is called after each refinement pass and may print information about it.
    fn print(&self, progress: &Progress<T>);
}

/// A callback function that does nothing.
pub struct SinkCallback {}

impl<T> Callback<T> for SinkCallback {
    fn print(&self, _: &Progress<T>) {}
}

/// A callback function that prints one line per refinement pass.
pub struct SimpleCallback {}

impl<T: Debug> Callback<T> for SimpleCallback {
    fn print(&self, progress: &Progress<T>) {
        println!(
            "pass {}: N={} regions={} I={:?} \u{b1} {:?}",
            progress.passes, progress.calls, progress.regions, progress.value, progress.error
        );
    }
}

/// A callback function that appends each [`Progress`] record to a file as one JSON document
/// per line.
pub struct FileWriterCallback {
    path: PathBuf,
}

impl FileWriterCallback {
    /// Creates a callback writing to the file at `path`; the file is created on the first
    /// pass if it does not exist.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl<T: Serialize> Callback<T> for FileWriterCallback {
    /// # Panics
    ///
    /// Panics if the file cannot be opened or written.
    fn print(&self, progress: &Progress<T>) {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .expect("unable to open the progress file");

        let line = serde_json::to_string(progress).expect("unable to serialize the progress");
        writeln!(file, "{}", line).expect("unable to write the progress");
    }
}
