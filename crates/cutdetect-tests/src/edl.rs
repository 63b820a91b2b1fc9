//! End-to-end tests: analysis pass, then "Save EDL", then reading the file back.

use crate::support::{analyse_all, clip, grey, init_tracing};
use cutdetect_core::{
    CurveId, CutDetectError, CutDetectSettings, FrameBuffer, FrameRate, PixelFormat, Result,
};
use cutdetect_edl::{Annotation, EdlDocument, FrameSpan};
use cutdetect_host::{CutDetector, FrameSource, SaveRequest};
use std::path::Path;

fn spans(doc: &EdlDocument) -> Vec<(FrameSpan, FrameSpan)> {
    doc.events.iter().map(|e| (e.source, e.record)).collect()
}

fn span(start: i64, end: i64) -> FrameSpan {
    FrameSpan::new(start, end)
}

fn read_edl(path: &Path, rate: FrameRate) -> EdlDocument {
    let text = std::fs::read_to_string(path).unwrap();
    let doc = EdlDocument::parse(&text, rate).unwrap();
    doc.validate().unwrap();
    doc
}

/// Kept source frames plus removed frames account for the whole clip.
fn assert_covers_clip(doc: &EdlDocument, removed: u32, total_frames: i64) {
    assert_eq!(doc.source_length() + i64::from(removed), total_frames - 1);
    assert_eq!(doc.removed_frames(), i64::from(removed));
}

fn analysed(frames: &mut Vec<FrameBuffer>, settings: CutDetectSettings) -> CutDetector {
    let mut detector = CutDetector::new(settings).unwrap();
    analyse_all(&mut detector, frames);
    detector
}

#[test]
fn three_shots_give_three_events() {
    init_tracing();
    let tmp = tempfile::tempdir().expect("failed to create tempdir");
    let path = tmp.path().join("out.edl");
    let mut frames = clip(PixelFormat::Rgb8, &[60, 160, 40], 10);
    let detector = analysed(&mut frames, CutDetectSettings::default());

    let request = SaveRequest::new(path.to_str().unwrap(), true, true, 30);
    let report = detector.save_edl(&request).unwrap();
    assert_eq!(report.cuts, 2);
    assert_eq!(report.removed, 0);
    assert_eq!(report.events, 3);
    assert_eq!(
        report.to_string(),
        format!("2 cuts in {}, average 10.0 fr, removed 0 duplicates", path.display())
    );

    let doc = read_edl(&path, FrameRate::FPS_24);
    assert_eq!(doc.title, "Cut Detective out.edl");
    assert_eq!(
        spans(&doc),
        vec![
            (span(0, 9), span(0, 9)),
            (span(9, 19), span(9, 19)),
            (span(19, 29), span(19, 29)),
        ]
    );
    assert_eq!(doc.events[0].annotations, vec![Annotation::CutDetected { frame: 10 }]);
    assert_eq!(doc.events[1].annotations, vec![Annotation::CutDetected { frame: 20 }]);
    assert_eq!(doc.events[2].annotations, vec![Annotation::EndOfSource]);
    assert_covers_clip(&doc, 0, 30);
}

#[test]
fn duplicate_run_is_removed_and_record_closes_up() {
    init_tracing();
    let tmp = tempfile::tempdir().expect("failed to create tempdir");
    let path = tmp.path().join("dups.edl");

    // Frames 5, 6 and 7 repeat frame 4; every other frame changes slightly
    let mut frames: Vec<FrameBuffer> = (0..30)
        .map(|i| match i {
            0..=4 if i % 2 == 1 => 62,
            0..=7 => 60,
            i if i % 2 == 0 => 62,
            _ => 60,
        })
        .map(|level| grey(PixelFormat::Rgb8, level))
        .collect();
    let detector = analysed(&mut frames, CutDetectSettings::default());

    let request = SaveRequest::new(path.to_str().unwrap(), true, true, 30);
    let report = detector.save_edl(&request).unwrap();
    assert_eq!(report.cuts, 0);
    assert_eq!(report.removed, 3);
    assert!((report.average_shot_length - 27.0).abs() < 1e-9);

    let doc = read_edl(&path, FrameRate::FPS_24);
    assert_eq!(
        spans(&doc),
        vec![(span(0, 4), span(0, 4)), (span(7, 29), span(4, 26))]
    );
    assert_eq!(
        doc.events[0].annotations,
        vec![Annotation::DuplicatesRemoved { frame: 5 }]
    );
    assert_covers_clip(&doc, 3, 30);
}

#[test]
fn duplicates_kept_when_removal_disabled() {
    let tmp = tempfile::tempdir().expect("failed to create tempdir");
    let path = tmp.path().join("keep.edl");
    let mut frames = vec![grey(PixelFormat::Rgb8, 90); 12];
    let detector = analysed(&mut frames, CutDetectSettings::default());

    let request = SaveRequest::new(path.to_str().unwrap(), true, false, 12);
    detector.save_edl(&request).unwrap();

    let doc = read_edl(&path, FrameRate::FPS_24);
    assert_eq!(spans(&doc), vec![(span(0, 11), span(0, 11))]);
}

#[test]
fn cut_detection_can_be_disabled() {
    let tmp = tempfile::tempdir().expect("failed to create tempdir");
    let path = tmp.path().join("nocuts.edl");
    let mut frames = clip(PixelFormat::Rgb8, &[60, 160, 40], 10);
    let detector = analysed(&mut frames, CutDetectSettings::default());

    let request = SaveRequest::new(path.to_str().unwrap(), false, false, 30);
    let report = detector.save_edl(&request).unwrap();
    assert_eq!(report.cuts, 0);

    let doc = read_edl(&path, FrameRate::FPS_24);
    assert_eq!(spans(&doc), vec![(span(0, 29), span(0, 29))]);
}

#[test]
fn timecodes_follow_configured_rate() {
    let tmp = tempfile::tempdir().expect("failed to create tempdir");
    let path = tmp.path().join("pal.edl");
    let mut settings = CutDetectSettings::default();
    settings.edl.fps = 25;
    let mut frames = clip(PixelFormat::Rgb8, &[60, 160], 30);
    let detector = analysed(&mut frames, settings);

    let request = SaveRequest::new(path.to_str().unwrap(), true, false, 60);
    detector.save_edl(&request).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let expected = "TITLE: Cut Detective pal.edl\n\
FCM: NON-DROP FRAME\n\
\n\
000001  MASTER  V  C  00:00:00:00 00:00:01:04 00:00:00:00 00:00:01:04\n\
At end of this shot CutDetective detected a cut at source frame 30, 00:00:01:05\n\
\n\
000002  MASTER  V  C  00:00:01:04 00:00:02:09 00:00:01:04 00:00:02:09\n\
At end of this shot CutDetective reached end of source\n";
    assert_eq!(text, expected);
}

#[test]
fn keyed_threshold_suppresses_later_cut() {
    let tmp = tempfile::tempdir().expect("failed to create tempdir");
    let path = tmp.path().join("keyed.edl");
    let mut frames = clip(PixelFormat::Rgb8, &[60, 160, 40], 10);
    let mut detector = analysed(&mut frames, CutDetectSettings::default());

    // Ramp from 8 at frame 0 to 50 at frame 15, then hold
    detector.curves_mut().set(CurveId::CutThreshold, 15, 50.0);
    assert!((detector.curves().get(CurveId::CutThreshold, 10) - 36.0).abs() < 1e-9);

    let request = SaveRequest::new(path.to_str().unwrap(), true, false, 30);
    let report = detector.save_edl(&request).unwrap();
    assert_eq!(report.cuts, 1);

    let doc = read_edl(&path, FrameRate::FPS_24);
    assert_eq!(
        spans(&doc),
        vec![(span(0, 9), span(0, 9)), (span(9, 29), span(9, 29))]
    );
}

#[test]
fn settings_file_drives_save() {
    let tmp = tempfile::tempdir().expect("failed to create tempdir");
    let settings_path = tmp.path().join("settings.json");
    let edl_path = tmp.path().join("from_settings.edl");

    let mut settings = CutDetectSettings::default();
    settings.edl.destination = edl_path.clone();
    settings.edl.remove_duplicates = true;
    settings.save_to_file(&settings_path).unwrap();

    let loaded = CutDetectSettings::load_from_file(&settings_path).unwrap();
    let mut frames = clip(PixelFormat::Rgb8, &[60, 160], 10);
    let detector = analysed(&mut frames, loaded);

    let request = SaveRequest::from_settings(&detector.settings().edl, 20);
    let report = detector.save_edl(&request).unwrap();
    assert_eq!(report.destination, edl_path);
    assert_eq!(read_edl(&edl_path, FrameRate::FPS_24).events.len(), 2);
}

#[test]
fn existing_file_is_replaced() {
    let tmp = tempfile::tempdir().expect("failed to create tempdir");
    let path = tmp.path().join("again.edl");
    std::fs::write(&path, "stale contents that are much longer than nothing\n".repeat(50)).unwrap();

    let mut frames = clip(PixelFormat::Rgb8, &[60], 8);
    let detector = analysed(&mut frames, CutDetectSettings::default());
    let request = SaveRequest::new(path.to_str().unwrap(), true, false, 8);
    detector.save_edl(&request).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.contains("stale"));
    assert_eq!(read_edl(&path, FrameRate::FPS_24).events.len(), 1);
}

#[test]
fn unwritable_destination_reports_error_and_leaves_nothing() {
    init_tracing();
    let tmp = tempfile::tempdir().expect("failed to create tempdir");
    // A directory sits where the file should go
    let path = tmp.path().join("taken.edl");
    std::fs::create_dir(&path).unwrap();

    let mut frames = clip(PixelFormat::Rgb8, &[60, 160], 6);
    let detector = analysed(&mut frames, CutDetectSettings::default());
    let request = SaveRequest::new(path.to_str().unwrap(), true, false, 12);

    let err = detector.save_edl(&request).unwrap_err();
    assert!(matches!(err, CutDetectError::EdlWrite { .. }));
    assert!(err.to_string().contains("taken.edl"));

    let entries: Vec<_> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("taken.edl")]);
    assert!(path.is_dir());
}

#[test]
fn unscorable_pass_removes_nothing() {
    init_tracing();
    let tmp = tempfile::tempdir().expect("failed to create tempdir");
    let path = tmp.path().join("coarse.edl");
    let mut frames = clip(PixelFormat::Rgb8, &[10, 200], 5);
    let mut settings = CutDetectSettings::default();
    settings.analysis.downres = 64;
    let mut detector = CutDetector::new(settings).unwrap();

    for index in 0..10 {
        let _ = detector.analyse_frame(index, &mut frames);
    }
    detector.end_analysis();

    let request = SaveRequest::new(path.to_str().unwrap(), true, true, 10);
    let report = detector.save_edl(&request).unwrap();
    assert_eq!(report.removed, 0);

    let doc = read_edl(&path, FrameRate::FPS_24);
    assert_eq!(spans(&doc), vec![(span(0, 9), span(0, 9))]);
    assert_covers_clip(&doc, 0, 10);
}

/// Host that never delivers one frame.
struct FrameGap {
    frames: Vec<FrameBuffer>,
    missing: u64,
}

impl FrameSource for FrameGap {
    fn current_frame(&mut self, index: u64) -> Result<FrameBuffer> {
        if index == self.missing {
            return Err(CutDetectError::BufferUnavailable {
                frame: index,
                reason: "render failed".into(),
            });
        }
        self.frames.current_frame(index)
    }
}

#[test]
fn missing_host_frame_is_not_a_duplicate() {
    let tmp = tempfile::tempdir().expect("failed to create tempdir");
    let path = tmp.path().join("gap.edl");
    let mut source = FrameGap {
        frames: clip(PixelFormat::Rgb8, &[60, 160], 5),
        missing: 5,
    };
    let mut detector = CutDetector::new(CutDetectSettings::default()).unwrap();

    let failed: Vec<u64> = (0..10)
        .filter(|&index| detector.analyse_frame(index, &mut source).is_err())
        .collect();
    detector.end_analysis();
    assert_eq!(failed, vec![5]);

    // Frame 6 is scored against frame 4 and still reads as the cut
    let request = SaveRequest::new(path.to_str().unwrap(), true, true, 10);
    let report = detector.save_edl(&request).unwrap();
    assert_eq!(report.removed, 0);
    assert_eq!(report.cuts, 1);

    let doc = read_edl(&path, FrameRate::FPS_24);
    assert_eq!(
        spans(&doc),
        vec![(span(0, 5), span(0, 5)), (span(5, 9), span(5, 9))]
    );
    assert_eq!(doc.events[0].annotations, vec![Annotation::CutDetected { frame: 6 }]);
}
