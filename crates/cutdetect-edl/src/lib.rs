//! Cut Detective EDL - edit decision list output
//!
//! Turns the per-frame difference curve into an EDL:
//! - Event and document model with a CMX-style text format
//! - Single-pass synthesis of cuts and duplicate removals
//! - All-or-nothing file output and a save summary

pub mod document;
pub mod event;
pub mod report;
pub mod synth;
pub mod writer;

pub use document::EdlDocument;
pub use event::{Annotation, EdlEvent, FrameSpan};
pub use report::SaveReport;
pub use synth::{title_for, EdlSynthesizer, Synthesis, SynthesisOptions};
pub use writer::write_atomic;
