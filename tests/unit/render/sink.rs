use super::*;
use crate::foundation::color::Color;

fn state(frame: u64) -> FrameState {
    FrameState {
        frame: FrameIndex(frame),
        scene_index: Some(0),
        clear: Color::WHITE,
        layers: Vec::new(),
        audio: Vec::new(),
    }
}

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 64,
        height: 36,
        fps: Fps::integer(30).unwrap(),
        frames: 2,
    }
}

#[test]
fn in_memory_sink_captures_config_and_frames() {
    let mut sink = InMemorySink::new();
    assert!(sink.config().is_none());
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(3), &state(3)).unwrap();
    sink.push_frame(FrameIndex(4), &state(4)).unwrap();
    sink.end().unwrap();
    assert_eq!(sink.config().unwrap().width, 64);
    let idx: Vec<_> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![3, 4]);
}

#[test]
fn sinks_reject_out_of_order_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(4), &state(4)).unwrap();
    assert!(sink.push_frame(FrameIndex(4), &state(4)).is_err());
    assert!(sink.push_frame(FrameIndex(2), &state(2)).is_err());

    let mut lines = JsonLinesSink::new(Vec::new());
    lines.begin(cfg()).unwrap();
    lines.push_frame(FrameIndex(1), &state(1)).unwrap();
    assert!(lines.push_frame(FrameIndex(0), &state(0)).is_err());
}

#[test]
fn json_lines_sink_writes_one_frame_per_line() {
    let mut sink = JsonLinesSink::new(Vec::new());
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &state(0)).unwrap();
    sink.push_frame(FrameIndex(1), &state(1)).unwrap();
    sink.end().unwrap();
    assert_eq!(sink.written(), 2);

    let text = String::from_utf8(sink.into_inner()).unwrap();
    let frames: Vec<FrameState> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(frames, vec![state(0), state(1)]);
}

#[test]
fn json_lines_sink_reports_unwritable_paths() {
    let dir = std::env::temp_dir().join("storyreel-missing-dir-for-sink-test");
    let err = JsonLinesSink::create(dir.join("nested").join("frames.jsonl"))
        .err()
        .unwrap();
    assert!(matches!(err, StoryError::Io(_)));
    assert!(err.to_string().contains("frames.jsonl"));
}
