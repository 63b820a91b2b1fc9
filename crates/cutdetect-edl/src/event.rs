//! EDL events and their annotations.

use cutdetect_core::{FrameRate, Timecode};
use serde::{Deserialize, Serialize};
use std::fmt;

const CUT_PREFIX: &str = "At end of this shot CutDetective detected a cut at source frame ";
const DUPLICATE_PREFIX: &str =
    "At end of this shot CutDetective removed duplicate source frames at ";
const END_OF_SOURCE: &str = "At end of this shot CutDetective reached end of source";

/// A range of frames as written to an EDL event.
///
/// `end` is the out point; consecutive shots share it as a match-cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSpan {
    pub start: i64,
    pub end: i64,
}

impl FrameSpan {
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Out point minus in point.
    pub fn len(self) -> i64 {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// The same span moved back by `frames`.
    pub fn shifted_back(self, frames: i64) -> Self {
        Self::new(self.start - frames, self.end - frames)
    }
}

/// Why an event boundary exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Annotation {
    /// The difference at `frame` exceeded the cut threshold.
    CutDetected { frame: i64 },
    /// The frame at `frame` duplicated its predecessor and was dropped.
    DuplicatesRemoved { frame: i64 },
    /// The final shot, running to the end of the source.
    EndOfSource,
    /// Free text not written by the synthesizer.
    Note(String),
}

impl Annotation {
    /// The annotation line, with frame references also given as timecode.
    pub fn render(&self, rate: FrameRate) -> String {
        match self {
            Self::CutDetected { frame } => {
                format!("{CUT_PREFIX}{frame}, {}", Timecode::from_frames(*frame, rate))
            }
            Self::DuplicatesRemoved { frame } => {
                format!("{DUPLICATE_PREFIX}{frame}, {}", Timecode::from_frames(*frame, rate))
            }
            Self::EndOfSource => END_OF_SOURCE.to_string(),
            Self::Note(text) => text.clone(),
        }
    }

    /// Recognize an annotation line; anything unrecognized is kept as a note.
    pub fn parse(line: &str) -> Self {
        let frame_of = |rest: &str| rest.split(',').next()?.trim().parse::<i64>().ok();

        if let Some(frame) = line.strip_prefix(CUT_PREFIX).and_then(frame_of) {
            return Self::CutDetected { frame };
        }
        if let Some(frame) = line.strip_prefix(DUPLICATE_PREFIX).and_then(frame_of) {
            return Self::DuplicatesRemoved { frame };
        }
        if line == END_OF_SOURCE {
            return Self::EndOfSource;
        }
        Self::Note(line.to_string())
    }
}

/// One numbered source-to-record mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdlEvent {
    /// 1-based, gapless.
    pub number: u32,
    pub source: FrameSpan,
    pub record: FrameSpan,
    pub annotations: Vec<Annotation>,
}

impl EdlEvent {
    pub fn new(number: u32, source: FrameSpan, record: FrameSpan, annotation: Annotation) -> Self {
        Self {
            number,
            source,
            record,
            annotations: vec![annotation],
        }
    }

    /// The event line, e.g. `000001  MASTER  V  C  00:00:00:00 ...`.
    pub fn event_line(&self, rate: FrameRate) -> String {
        let tc = |frame| Timecode::from_frames(frame, rate);
        format!(
            "{:06}  MASTER  V  C  {} {} {} {}",
            self.number,
            tc(self.source.start),
            tc(self.source.end),
            tc(self.record.start),
            tc(self.record.end),
        )
    }
}

impl fmt::Display for EdlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Event {} source {}..{} record {}..{}",
            self.number, self.source.start, self.source.end, self.record.start, self.record.end
        )
    }
}
