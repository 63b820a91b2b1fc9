//! Cut Detective Analysis - frame differencing
//!
//! Scores each frame against its predecessor and records the scores as a
//! per-frame curve:
//! - Luma difference scoring across RGB pixel formats
//! - Analysis pass state with a single previous-frame snapshot
//! - Synthetic frames for tests and benchmarks

pub mod difference;
pub mod session;
pub mod synthetic;

pub use difference::{score, DifferenceScorer};
pub use session::{AnalysisSession, AnalysisSummary, FrameSource};
