use super::*;
use crate::config::model::{Speaker, Voice};
use std::collections::BTreeMap;

fn speaker(id: &str) -> Speaker {
    Speaker {
        id: id.to_owned(),
        name: id.to_uppercase(),
        accent_color: Color::parse("#7C3AED").unwrap(),
        role: String::new(),
        poses: BTreeMap::from([
            ("neutral".to_owned(), format!("{id}/neutral.png")),
            ("excited".to_owned(), format!("{id}/excited.png")),
        ]),
        voice: Voice {
            ref_audio_path: format!("{id}.wav"),
            ref_text: "ref".to_owned(),
            cfg_value: "2.0".to_owned(),
            steps: "15".to_owned(),
        },
    }
}

fn scene(speaker_id: &str, frames: Option<u64>) -> Scene {
    Scene {
        speaker_id: speaker_id.to_owned(),
        dialogue_text: format!("{speaker_id} says hello"),
        emotion_tag: "neutral".to_owned(),
        visual_type: VisualType::default(),
        background_reference: None,
        background_color: None,
        highlight_text: None,
        explicit_duration_seconds: frames.map(|f| f as f64 / 30.0),
        cues: Vec::new(),
    }
}

fn config(scenes: Vec<Scene>) -> VideoConfig {
    let mut cfg = VideoConfig::from_str_json(r#"{"speakers": {}, "scenes": []}"#).unwrap();
    cfg.speakers = BTreeMap::from([
        ("paw".to_owned(), speaker("paw")),
        ("pad".to_owned(), speaker("pad")),
    ]);
    cfg.scenes = scenes;
    cfg
}

fn starts(t: &Timeline) -> Vec<u64> {
    t.scenes.iter().map(|w| w.range.start.0).collect()
}

#[test]
fn offsets_accumulate_scene_lengths() {
    let lens = [150u64, 200, 1, 87, 495];
    let cfg = config(lens.iter().map(|&l| scene("paw", Some(l))).collect());
    let t = TimelineBuilder::new(&cfg).build().unwrap();
    assert_eq!(t.total_frames, lens.iter().sum::<u64>());
    let mut expected = 0;
    for (w, len) in t.scenes.iter().zip(lens) {
        assert_eq!(w.range.start.0, expected);
        assert_eq!(w.range.len_frames(), len);
        assert_eq!(w.length_source, LengthSource::Override);
        expected += len;
    }
}

#[test]
fn default_length_applies_without_override_or_manifest() {
    let cfg = config(vec![scene("paw", None), scene("pad", Some(30))]);
    let t = TimelineBuilder::new(&cfg).build().unwrap();
    assert_eq!(starts(&t), vec![0, 120]);
    assert_eq!(t.total_frames, 150);
    assert_eq!(t.scenes[0].length_source, LengthSource::Default);
}

#[test]
fn manifest_lengths_rank_between_override_and_default() {
    let cfg = config(vec![scene("paw", None), scene("pad", Some(60)), scene("paw", None)]);
    let manifest = AudioManifest::from_measurements(
        &cfg,
        vec![
            (0, "a0.wav".to_owned(), 2.5),
            (1, "a1.wav".to_owned(), 9.0),
        ],
    )
    .unwrap();
    let t = TimelineBuilder::new(&cfg)
        .with_manifest(&manifest)
        .build()
        .unwrap();
    let lens: Vec<u64> = t.scenes.iter().map(|w| w.range.len_frames()).collect();
    assert_eq!(lens, vec![75, 60, 120]);
    assert_eq!(t.scenes[0].length_source, LengthSource::Measured);
    assert_eq!(t.scenes[0].audio_path, "a0.wav");
    assert_eq!(t.scenes[2].audio_path, "audio/scene-2.wav");
}

#[test]
fn unknown_speaker_is_dropped_without_shifting() {
    let cfg = config(vec![
        scene("paw", Some(150)),
        scene("ghost", Some(999)),
        scene("pad", Some(200)),
    ]);
    let t = TimelineBuilder::new(&cfg).build().unwrap();
    assert_eq!(starts(&t), vec![0, 150]);
    assert_eq!(t.total_frames, 350);
    assert!(t.window(1).is_none());
    assert_eq!(t.window(2).unwrap().range.start, FrameIndex(150));
    assert_eq!(t.diagnostics.len(), 1);
    assert_eq!(t.diagnostics[0].scene, Some(1));
    assert!(t.diagnostics[0].message.contains("ghost"));
}

#[test]
fn unknown_emotion_skips_but_missing_pose_falls_back() {
    let mut bad = scene("paw", Some(10));
    bad.emotion_tag = "furious".to_owned();
    let mut waving = scene("pad", Some(10));
    waving.emotion_tag = "waving".to_owned();
    let cfg = config(vec![bad, waving]);
    let t = TimelineBuilder::new(&cfg).build().unwrap();
    assert_eq!(t.scenes.len(), 1);
    assert_eq!(t.scenes[0].emotion, Emotion::Waving);
    assert_eq!(t.scenes[0].pose, "pad/neutral.png");
}

#[test]
fn non_positive_override_is_skipped() {
    let mut zero = scene("paw", None);
    zero.explicit_duration_seconds = Some(0.0);
    let cfg = config(vec![zero, scene("pad", Some(40))]);
    let t = TimelineBuilder::new(&cfg).build().unwrap();
    assert_eq!(starts(&t), vec![0]);
    assert_eq!(t.total_frames, 40);
}

#[test]
fn scene_at_finds_owner_of_every_frame() {
    let cfg = config(vec![scene("paw", Some(150)), scene("pad", Some(200))]);
    let t = TimelineBuilder::new(&cfg).build().unwrap();
    assert_eq!(t.scene_at(FrameIndex(0)).unwrap().scene_index, 0);
    assert_eq!(t.scene_at(FrameIndex(149)).unwrap().scene_index, 0);
    assert_eq!(t.scene_at(FrameIndex(150)).unwrap().scene_index, 1);
    assert_eq!(t.scene_at(FrameIndex(349)).unwrap().scene_index, 1);
    assert!(t.scene_at(FrameIndex(350)).is_none());
}

#[test]
fn background_modes_resolve_sources() {
    let mut with_ref = scene("paw", Some(150));
    with_ref.background_reference = Some("custom/bg.png".to_owned());
    let mut cfg = config(vec![with_ref, scene("pad", Some(200))]);
    let t = TimelineBuilder::new(&cfg).build().unwrap();
    assert_eq!(
        t.scenes[0].background,
        SceneBackground::Image {
            source: "custom/bg.png".to_owned()
        }
    );
    assert_eq!(
        t.scenes[1].background,
        SceneBackground::Image {
            source: "scenes/scene-1.png".to_owned()
        }
    );

    cfg.style.background = BackgroundMode::Clips;
    let t = TimelineBuilder::new(&cfg).build().unwrap();
    match &t.scenes[0].background {
        SceneBackground::Clips { clips, crossfades } => {
            let lens: Vec<u64> = clips.iter().map(|c| c.span.len_frames()).collect();
            assert_eq!(lens, vec![105, 45]);
            assert_eq!(crossfades.len(), 1);
        }
        other => panic!("expected clips, got {other:?}"),
    }
    match &t.scenes[1].background {
        SceneBackground::Clips { clips, .. } => {
            assert_eq!(clips[0].span.start, FrameIndex(150));
            assert_eq!(clips.last().unwrap().span.end, FrameIndex(350));
        }
        other => panic!("expected clips, got {other:?}"),
    }

    cfg.style.background = BackgroundMode::Gradient;
    let t = TimelineBuilder::new(&cfg).build().unwrap();
    assert_eq!(
        t.scenes[1].background,
        SceneBackground::Gradient {
            base_angle_deg: 150.0
        }
    );
}

#[test]
fn lay_out_is_prefix_sum() {
    let r = lay_out(&[3, 0, 4]);
    assert_eq!(r[0], FrameRange::from_start_len(0, 3));
    assert_eq!(r[2], FrameRange::from_start_len(3, 4));
}
