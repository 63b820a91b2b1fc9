//! Per-pass analysis state.
//!
//! An [`AnalysisSession`] lives for exactly one analysis pass. It owns a single
//! snapshot of the previous frame, which is replaced (never mutated) as each
//! frame is scored, and writes every score into the difference curve.

use cutdetect_core::{AnalysisSettings, CurveId, CurveStore, CutDetectError, FrameBuffer, Result};
use tracing::{debug, info, warn};

use crate::difference::DifferenceScorer;

/// Supplies frame buffers during an analysis pass.
pub trait FrameSource {
    /// The frame at `index`.
    fn current_frame(&mut self, index: u64) -> Result<FrameBuffer>;

    /// The frame preceding `index`.
    fn previous_frame(&mut self, index: u64) -> Result<FrameBuffer> {
        match index.checked_sub(1) {
            Some(prev) => self.current_frame(prev),
            None => Err(CutDetectError::BufferUnavailable {
                frame: index,
                reason: "frame 0 has no predecessor".into(),
            }),
        }
    }
}

impl FrameSource for Vec<FrameBuffer> {
    fn current_frame(&mut self, index: u64) -> Result<FrameBuffer> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.get(i))
            .cloned()
            .ok_or_else(|| CutDetectError::BufferUnavailable {
                frame: index,
                reason: format!("sequence has {} frames", self.len()),
            })
    }
}

/// A frame held over for comparison with its successor.
#[derive(Debug)]
struct Snapshot {
    index: u64,
    frame: FrameBuffer,
}

/// Outcome of a finished analysis pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisSummary {
    pub frames_scored: u64,
    pub frames_skipped: u64,
    pub last_difference: f64,
}

/// State for one analysis pass.
#[derive(Debug)]
pub struct AnalysisSession {
    scorer: DifferenceScorer,
    previous: Option<Snapshot>,
    current_difference: f64,
    frames_scored: u64,
    frames_skipped: u64,
}

impl AnalysisSession {
    /// Start a pass with no previous frame.
    pub fn begin(settings: &AnalysisSettings) -> Result<Self> {
        let scorer = DifferenceScorer::new(settings.downres)?;
        info!(downres = settings.downres, "Analysis pass started");
        Ok(Self {
            scorer,
            previous: None,
            current_difference: 0.0,
            frames_scored: 0,
            frames_skipped: 0,
        })
    }

    /// Score frame `index` against its predecessor and key the difference curve.
    ///
    /// Returns `None` for frame 0, which has no predecessor. On error the
    /// previous-frame snapshot is left as it was, so the frame can be retried.
    /// When the host cannot supply the immediate predecessor, the frame is
    /// compared with the last analysed frame instead.
    pub fn analyse_frame<S>(
        &mut self,
        index: u64,
        source: &mut S,
        curves: &mut CurveStore,
    ) -> Result<Option<f64>>
    where
        S: FrameSource + ?Sized,
    {
        let current = match source.current_frame(index) {
            Ok(frame) => frame,
            Err(e) => return Err(self.skip(index, e)),
        };

        if index == 0 {
            self.previous = Some(Snapshot {
                index,
                frame: current,
            });
            return Ok(None);
        }

        let snapshot = match self.previous.take() {
            Some(snapshot) if snapshot.index + 1 == index => snapshot,
            stale => match source.previous_frame(index) {
                Ok(frame) => {
                    debug!(frame = index, "Fetched previous frame from host");
                    Snapshot {
                        index: index - 1,
                        frame,
                    }
                }
                Err(e) => match stale {
                    // Compare with the last frame that was analysed
                    Some(snapshot) if snapshot.index < index => {
                        warn!(
                            frame = index,
                            compared_with = snapshot.index,
                            error = %e,
                            "Previous frame unavailable, using last analysed frame"
                        );
                        snapshot
                    }
                    stale => {
                        self.previous = stale;
                        let error = CutDetectError::BufferUnavailable {
                            frame: index,
                            reason: format!("previous frame unavailable ({e})"),
                        };
                        return Err(self.skip(index, error));
                    }
                },
            },
        };

        let difference = match self.scorer.score(&current, &snapshot.frame) {
            Ok(difference) => difference,
            Err(e) => {
                self.previous = Some(snapshot);
                return Err(self.skip(index, e));
            }
        };

        debug!(frame = index, difference, "Frame scored");
        curves.set(CurveId::Difference, index as i64, difference);
        self.current_difference = difference;
        self.frames_scored += 1;
        self.previous = Some(Snapshot {
            index,
            frame: current,
        });

        Ok(Some(difference))
    }

    fn skip(&mut self, index: u64, error: CutDetectError) -> CutDetectError {
        warn!(frame = index, error = %error, "Skipping frame");
        self.frames_skipped += 1;
        error
    }

    /// Most recent score, for display.
    pub fn current_difference(&self) -> f64 {
        self.current_difference
    }

    /// Index of the frame currently held as the previous frame.
    pub fn previous_index(&self) -> Option<u64> {
        self.previous.as_ref().map(|s| s.index)
    }

    pub fn scorer(&self) -> DifferenceScorer {
        self.scorer
    }

    /// End the pass, releasing the snapshot and keying frame 0 of both thresholds.
    pub fn finish(self, curves: &mut CurveStore) -> AnalysisSummary {
        curves.seed_frame_zero(CurveId::CutThreshold);
        curves.seed_frame_zero(CurveId::DuplicateThreshold);

        info!(
            scored = self.frames_scored,
            skipped = self.frames_skipped,
            "Analysis pass finished"
        );

        AnalysisSummary {
            frames_scored: self.frames_scored,
            frames_skipped: self.frames_skipped,
            last_difference: self.current_difference,
        }
    }
}
