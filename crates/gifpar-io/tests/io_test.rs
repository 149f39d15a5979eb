//! File round trips for gifpar-io.

use std::fs;

use gifpar_core::{Frame, FrameSequence, Rgb};
use gifpar_io::{IoError, RunRecord, load, runlog, save, synthetic};

/// Frames using only a handful of gray levels, so the palette is exact.
fn gray_sequence() -> FrameSequence {
    let levels = [0, 64, 128, 255];
    let frames = (0..3)
        .map(|f| {
            let pixels = (0..8 * 6).map(|i| Rgb::gray(levels[(i + f) % levels.len()])).collect();
            Frame::new(8, 6, pixels).unwrap().with_delay(100)
        })
        .collect();
    FrameSequence::new(frames).unwrap()
}

#[test]
fn test_gif_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("anim.gif");

    let seq = gray_sequence();
    save(&path, &seq).unwrap();
    let loaded = load(&path).unwrap();

    assert_eq!(loaded.len(), 3);
    for (a, b) in seq.frames().iter().zip(loaded.frames()) {
        assert_eq!((b.width, b.height), (8, 6));
        assert_eq!(a.pixels, b.pixels);
        assert_eq!(b.delay_ms, 100);
    }
}

#[test]
fn test_not_a_gif() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bogus.gif");
    fs::write(&path, b"definitely not a gif file").unwrap();

    let err = load(&path).unwrap_err();
    assert!(matches!(err, IoError::Decode(_) | IoError::UnsupportedInput(_)), "{:?}", err);
}

#[test]
fn test_synthetic_round_trip_keeps_geometry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noise.gif");

    let seq = synthetic::generate(2, 10, 7, synthetic::DEFAULT_SEED).unwrap();
    save(&path, &seq).unwrap();
    let loaded = load(&path).unwrap();
    assert_eq!(loaded.geometry(), seq.geometry());
}

#[test]
fn test_run_log_appends() {
    let dir = tempfile::tempdir().unwrap();
    let results = dir.path().join("nested").join("results");

    let mut record = RunRecord {
        tag: "1".into(),
        world_size: 3,
        n_frames: 12,
        width: 320,
        height: 200,
        distributed: true,
        threaded: true,
        accelerated: false,
        with_image: true,
        seconds: 0.25,
    };
    let first = runlog::append(&results, &record).unwrap();
    record.tag = "2".into();
    let second = runlog::append(&results, &record).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.file_name().unwrap(), "runs_with_image_1_1_0.log");
    let text = fs::read_to_string(&first).unwrap();
    assert_eq!(
        text,
        "1, 3, 12, 320, 200, 1, 1, 0, 0.250000\n2, 3, 12, 320, 200, 1, 1, 0, 0.250000\n"
    );
}
