//! EDL synthesis from per-frame difference and threshold curves.
//!
//! A single forward pass over frames `1..total`. Two counters carry across
//! frames: the in point of the shot being built and the number of source
//! frames removed so far. Record spans are source spans shifted back by the
//! removed count, which keeps the record timeline gapless as frames are
//! dropped.
//!
//! For each frame the cut check runs before the duplicate check, and the
//! duplicate check sees the in point the cut check just moved. A frame that
//! both exceeds the cut threshold and falls under the duplicate threshold
//! therefore closes the shot at the cut and is then removed as a continuing
//! duplicate.
//!
//! Frames with no recorded difference (skipped during analysis) stay inside
//! the current shot.

use cutdetect_core::{CurveId, CurveStore, EdlSettings, FrameRate, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::document::EdlDocument;
use crate::event::{Annotation, EdlEvent, FrameSpan};
use crate::report::SaveReport;
use crate::writer::write_atomic;

/// Which boundaries to look for, and how to label the output.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOptions {
    pub detect_cuts: bool,
    pub remove_duplicates: bool,
    pub frame_rate: FrameRate,
    pub title: String,
}

impl SynthesisOptions {
    /// Options from saved settings, titled after the destination file.
    pub fn from_settings(settings: &EdlSettings) -> Self {
        Self {
            detect_cuts: settings.detect_cuts,
            remove_duplicates: settings.remove_duplicates,
            frame_rate: settings.frame_rate(),
            title: title_for(&settings.destination),
        }
    }
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self::from_settings(&EdlSettings::default())
    }
}

/// Document title for a destination path.
pub fn title_for(destination: &Path) -> String {
    let base = destination
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("Cut Detective {base}")
}

/// Output of one synthesis pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub document: EdlDocument,
    /// Events closed by a detected cut.
    pub cuts: u32,
    /// Source frames dropped as duplicates.
    pub removed: u32,
    pub total_frames: u64,
}

impl Synthesis {
    /// Average length of a kept shot, in frames.
    pub fn average_shot_length(&self) -> f64 {
        (self.total_frames as f64 - f64::from(self.removed)) / f64::from(self.cuts + 1)
    }
}

/// Walks the stored curves and produces an EDL.
#[derive(Debug, Clone, Copy)]
pub struct EdlSynthesizer<'a> {
    curves: &'a CurveStore,
}

impl<'a> EdlSynthesizer<'a> {
    pub fn new(curves: &'a CurveStore) -> Self {
        Self { curves }
    }

    /// Build the EDL for a clip of `total_frames` frames.
    pub fn synthesize(&self, total_frames: u64, options: &SynthesisOptions) -> Synthesis {
        let total = total_frames as i64;
        let mut document = EdlDocument::new(options.title.clone(), options.frame_rate);
        let mut prev_out: i64 = 0;
        let mut removed: i64 = 0;
        let mut event_number: u32 = 1;
        let mut cuts: u32 = 0;

        for i in 1..total {
            // A frame that was never scored is neither a cut nor a duplicate
            let Some(difference) = self.curves.key_at(CurveId::Difference, i) else {
                debug!(frame = i, "No difference recorded, frame kept in shot");
                continue;
            };
            let cut_threshold = self.curves.get(CurveId::CutThreshold, i);
            let dup_threshold = self.curves.get(CurveId::DuplicateThreshold, i);

            if options.detect_cuts && difference > cut_threshold {
                let source = FrameSpan::new(prev_out, i - 1);
                let annotation = Annotation::CutDetected { frame: i };
                if source.is_empty() {
                    // Zero-length shot: keep the note, skip the event
                    document.push_note(annotation);
                } else {
                    document.events.push(EdlEvent::new(
                        event_number,
                        source,
                        source.shifted_back(removed),
                        annotation,
                    ));
                    event_number += 1;
                    cuts += 1;
                }
                debug!(frame = i, difference, cut_threshold, "Cut detected");
                // The next shot starts on the frame before the cut
                prev_out = i - 1;
            }

            if options.remove_duplicates && i > 1 && difference < dup_threshold {
                if prev_out == i - 1 {
                    // A shot was just closed here; extend the removal run
                    removed += 1;
                    prev_out = i;
                    continue;
                }
                let source = FrameSpan::new(prev_out, i - 1);
                document.events.push(EdlEvent::new(
                    event_number,
                    source,
                    source.shifted_back(removed),
                    Annotation::DuplicatesRemoved { frame: i },
                ));
                debug!(frame = i, difference, dup_threshold, "Duplicate removed");
                event_number += 1;
                removed += 1;
                prev_out = i;
            }
        }

        // Ends on the last frame index: kept lengths plus removed frames sum to total - 1
        let source = FrameSpan::new(prev_out, (total - 1).max(prev_out));
        document.events.push(EdlEvent::new(
            event_number,
            source,
            source.shifted_back(removed),
            Annotation::EndOfSource,
        ));

        Synthesis {
            document,
            cuts,
            removed: removed as u32,
            total_frames,
        }
    }

    /// Synthesize and write the EDL to `destination`.
    ///
    /// The document is fully built before anything is written, and the file
    /// only appears at `destination` once completely written.
    pub fn save(
        &self,
        total_frames: u64,
        options: &SynthesisOptions,
        destination: &Path,
    ) -> Result<SaveReport> {
        let synthesis = self.synthesize(total_frames, options);
        write_atomic(destination, &synthesis.document.render())?;

        let report = SaveReport::new(destination, &synthesis);
        info!(
            path = %destination.display(),
            events = synthesis.document.events.len(),
            cuts = synthesis.cuts,
            removed = synthesis.removed,
            "EDL saved"
        );
        Ok(report)
    }
}
