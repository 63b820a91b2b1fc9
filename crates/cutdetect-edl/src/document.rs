//! EDL documents: rendering, parsing and invariant checks.
//!
//! Format:
//! ```text
//! TITLE: Cut Detective out.edl
//! FCM: NON-DROP FRAME
//!
//! 000001  MASTER  V  C  00:00:00:00 00:00:00:09 00:00:00:00 00:00:00:09
//! At end of this shot CutDetective detected a cut at source frame 10, 00:00:00:10
//! ```

use cutdetect_core::{CutDetectError, FrameRate, Result, Timecode};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::event::{Annotation, EdlEvent, FrameSpan};

const FCM_NON_DROP: &str = "FCM: NON-DROP FRAME";

/// A complete edit decision list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdlDocument {
    pub title: String,
    pub frame_rate: FrameRate,
    /// Annotations written before the first event.
    pub header_notes: Vec<Annotation>,
    pub events: Vec<EdlEvent>,
}

impl EdlDocument {
    /// Create an empty document.
    pub fn new(title: impl Into<String>, frame_rate: FrameRate) -> Self {
        Self {
            title: title.into(),
            frame_rate,
            header_notes: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Attach a note to the most recent event, or to the header if none exists.
    pub fn push_note(&mut self, annotation: Annotation) {
        match self.events.last_mut() {
            Some(event) => event.annotations.push(annotation),
            None => self.header_notes.push(annotation),
        }
    }

    /// Render the document text. Every line ends with a newline.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "TITLE: {}", self.title);
        let _ = writeln!(out, "{FCM_NON_DROP}");
        for note in &self.header_notes {
            let _ = writeln!(out, "{}", note.render(self.frame_rate));
        }
        for event in &self.events {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", event.event_line(self.frame_rate));
            for note in &event.annotations {
                let _ = writeln!(out, "{}", note.render(self.frame_rate));
            }
        }
        out
    }

    /// Parse document text written at `frame_rate`.
    pub fn parse(text: &str, frame_rate: FrameRate) -> Result<Self> {
        let mut doc = Self::new("", frame_rate);
        let mut saw_title = false;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim_end();
            if line.is_empty() {
                continue;
            }
            if let Some(title) = line.strip_prefix("TITLE:") {
                doc.title = title.trim().to_string();
                saw_title = true;
                continue;
            }
            if let Some(mode) = line.strip_prefix("FCM:") {
                if mode.trim() != "NON-DROP FRAME" {
                    return Err(CutDetectError::EdlParse {
                        line: line_no,
                        message: format!("unsupported frame code mode '{}'", mode.trim()),
                    });
                }
                continue;
            }
            if starts_with_event_number(line) {
                let event = parse_event_line(line, line_no, frame_rate)?;
                doc.events.push(event);
                continue;
            }
            doc.push_note(Annotation::parse(line));
        }

        if !saw_title {
            return Err(CutDetectError::EdlParse {
                line: 1,
                message: "missing TITLE line".into(),
            });
        }
        Ok(doc)
    }

    /// Check event numbering and timeline continuity.
    ///
    /// - Event numbers run 1, 2, 3, ... with no gaps.
    /// - Each record span is as long as its source span.
    /// - Each event's record in point is the previous event's record out point.
    /// - Source spans never move backwards.
    pub fn validate(&self) -> Result<()> {
        let mut previous: Option<&EdlEvent> = None;
        for (idx, event) in self.events.iter().enumerate() {
            let expected = idx as u32 + 1;
            if event.number != expected {
                return Err(invalid(format!(
                    "event {} found where {expected} was expected",
                    event.number
                )));
            }
            if event.source.len() < 0 {
                return Err(invalid(format!("event {} runs backwards", event.number)));
            }
            if event.record.len() != event.source.len() {
                return Err(invalid(format!(
                    "event {} record length {} differs from source length {}",
                    event.number,
                    event.record.len(),
                    event.source.len()
                )));
            }
            if let Some(prev) = previous {
                if event.record.start != prev.record.end {
                    return Err(invalid(format!(
                        "record gap between events {} and {}",
                        prev.number, event.number
                    )));
                }
                if event.source.start < prev.source.end {
                    return Err(invalid(format!(
                        "event {} starts before event {} ends",
                        event.number, prev.number
                    )));
                }
            }
            previous = Some(event);
        }
        Ok(())
    }

    /// Sum of source span lengths over all events.
    pub fn source_length(&self) -> i64 {
        self.events.iter().map(|e| e.source.len()).sum()
    }

    /// Record out point of the last event.
    pub fn record_end(&self) -> i64 {
        self.events.last().map_or(0, |e| e.record.end)
    }

    /// Frames dropped from the source, read from the record/source drift.
    pub fn removed_frames(&self) -> i64 {
        self.events
            .last()
            .map_or(0, |e| e.source.start - e.record.start)
    }
}

fn invalid(message: String) -> CutDetectError {
    CutDetectError::InvalidParameter(format!("invalid EDL: {message}"))
}

fn starts_with_event_number(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|first| first.len() >= 3 && first.bytes().all(|b| b.is_ascii_digit()))
}

fn parse_event_line(line: &str, line_no: usize, rate: FrameRate) -> Result<EdlEvent> {
    let err = |message: String| CutDetectError::EdlParse {
        line: line_no,
        message,
    };

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 8 {
        return Err(err(format!("expected 8 fields, found {}", fields.len())));
    }
    let number = fields[0]
        .parse::<u32>()
        .map_err(|e| err(format!("bad event number: {e}")))?;
    let mut frames = [0i64; 4];
    for (slot, field) in frames.iter_mut().zip(&fields[4..]) {
        let tc: Timecode = field.parse().map_err(|e| err(format!("{e}")))?;
        *slot = tc.to_frames(rate);
    }

    Ok(EdlEvent {
        number,
        source: FrameSpan::new(frames[0], frames[1]),
        record: FrameSpan::new(frames[2], frames[3]),
        annotations: Vec::new(),
    })
}
