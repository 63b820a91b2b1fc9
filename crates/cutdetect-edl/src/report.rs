//! Status summary shown after an EDL save.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::synth::Synthesis;

/// What a save produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveReport {
    pub destination: PathBuf,
    pub events: usize,
    pub cuts: u32,
    pub removed: u32,
    pub average_shot_length: f64,
}

impl SaveReport {
    pub fn new(destination: &Path, synthesis: &Synthesis) -> Self {
        Self {
            destination: destination.to_path_buf(),
            events: synthesis.document.events.len(),
            cuts: synthesis.cuts,
            removed: synthesis.removed,
            average_shot_length: synthesis.average_shot_length(),
        }
    }
}

impl fmt::Display for SaveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cuts in {}, average {:.1} fr, removed {} duplicates",
            self.cuts,
            self.destination.display(),
            self.average_shot_length,
            self.removed
        )
    }
}
