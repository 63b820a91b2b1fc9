//! Cut Detective Host - entry points for a compositing host
//!
//! The host drives two actions:
//! - an analysis pass, calling [`CutDetector::analyse_frame`] once per frame in
//!   increasing order and [`CutDetector::end_analysis`] when the pass ends
//! - "Save EDL", calling [`CutDetector::save_edl`] with a [`SaveRequest`]
//!
//! Frame delivery goes through the [`FrameSource`] trait.

use cutdetect_analysis::{AnalysisSession, AnalysisSummary};
use cutdetect_core::{
    normalize_destination, CurveId, CurveStore, CutDetectSettings, EdlSettings, PixelFormat,
    Result,
};
use cutdetect_edl::{title_for, EdlSynthesizer, SaveReport, SynthesisOptions};
use std::path::PathBuf;
use tracing::warn;

pub use cutdetect_analysis::FrameSource;

/// Parameters of one "Save EDL" action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub destination: PathBuf,
    pub detect_cuts: bool,
    pub remove_duplicates: bool,
    pub total_frames: u64,
}

impl SaveRequest {
    /// Build a request from a destination string typed by the user.
    pub fn new(
        destination: &str,
        detect_cuts: bool,
        remove_duplicates: bool,
        total_frames: u64,
    ) -> Self {
        Self {
            destination: normalize_destination(destination),
            detect_cuts,
            remove_duplicates,
            total_frames,
        }
    }

    /// Build a request from the saved EDL settings.
    pub fn from_settings(settings: &EdlSettings, total_frames: u64) -> Self {
        Self {
            destination: settings.destination.clone(),
            detect_cuts: settings.detect_cuts,
            remove_duplicates: settings.remove_duplicates,
            total_frames,
        }
    }
}

/// Host-facing state: settings, curves and the running analysis pass.
#[derive(Debug)]
pub struct CutDetector {
    settings: CutDetectSettings,
    curves: CurveStore,
    session: Option<AnalysisSession>,
    last_summary: Option<AnalysisSummary>,
}

impl CutDetector {
    /// Create a detector with validated settings and empty curves.
    pub fn new(settings: CutDetectSettings) -> Result<Self> {
        settings.validate()?;
        let curves = CurveStore::new(settings.edl.cut_threshold, settings.edl.duplicate_threshold);
        Ok(Self {
            settings,
            curves,
            session: None,
            last_summary: None,
        })
    }

    /// Whether the host may deliver frames in `format`.
    pub fn is_format_supported(format: PixelFormat) -> bool {
        format.is_scoreable()
    }

    pub fn settings(&self) -> &CutDetectSettings {
        &self.settings
    }

    /// Replace the settings. Threshold defaults apply to unkeyed curves.
    pub fn set_settings(&mut self, settings: CutDetectSettings) -> Result<()> {
        settings.validate()?;
        self.curves
            .curve_mut(CurveId::CutThreshold)
            .set_default_value(settings.edl.cut_threshold);
        self.curves
            .curve_mut(CurveId::DuplicateThreshold)
            .set_default_value(settings.edl.duplicate_threshold);
        self.settings = settings;
        Ok(())
    }

    pub fn curves(&self) -> &CurveStore {
        &self.curves
    }

    /// Mutable curves, for authoring threshold keys.
    pub fn curves_mut(&mut self) -> &mut CurveStore {
        &mut self.curves
    }

    /// Start a fresh analysis pass, discarding any previous-frame state.
    pub fn begin_analysis(&mut self) -> Result<()> {
        self.session = Some(AnalysisSession::begin(&self.settings.analysis)?);
        Ok(())
    }

    /// Analyse one frame, starting a pass if none is running.
    ///
    /// Returns the frame's difference score, or `None` for frame 0. Errors
    /// affect only this frame; the pass can continue with the next one.
    pub fn analyse_frame<S>(&mut self, index: u64, source: &mut S) -> Result<Option<f64>>
    where
        S: FrameSource + ?Sized,
    {
        let session = match self.session.take() {
            Some(session) => session,
            None => AnalysisSession::begin(&self.settings.analysis)?,
        };
        self.session
            .insert(session)
            .analyse_frame(index, source, &mut self.curves)
    }

    /// Finish the running pass, if any.
    pub fn end_analysis(&mut self) -> Option<AnalysisSummary> {
        let summary = self.session.take()?.finish(&mut self.curves);
        self.last_summary = Some(summary);
        Some(summary)
    }

    /// Whether an analysis pass is running.
    pub fn is_analysing(&self) -> bool {
        self.session.is_some()
    }

    /// Most recent difference score, for display.
    pub fn current_difference(&self) -> f64 {
        match &self.session {
            Some(session) => session.current_difference(),
            None => self.last_summary.map_or(0.0, |s| s.last_difference),
        }
    }

    pub fn last_summary(&self) -> Option<AnalysisSummary> {
        self.last_summary
    }

    /// Synthesize the EDL from the stored curves and write it.
    pub fn save_edl(&self, request: &SaveRequest) -> Result<SaveReport> {
        let options = SynthesisOptions {
            detect_cuts: request.detect_cuts,
            remove_duplicates: request.remove_duplicates,
            frame_rate: self.settings.edl.frame_rate(),
            title: title_for(&request.destination),
        };
        EdlSynthesizer::new(&self.curves)
            .save(request.total_frames, &options, &request.destination)
            .map_err(|e| {
                warn!(error = %e, "EDL save failed");
                e
            })
    }
}
