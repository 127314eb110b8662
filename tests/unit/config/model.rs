use super::*;

const MINIMAL: &str = r##"{
    "speakers": {
        "paw": {
            "name": "Paw",
            "accentColor": "#7C3AED",
            "poses": { "neutral": "paw/neutral.png" },
            "voice": { "refAudioPath": "paw.wav", "refText": "hello" }
        }
    },
    "scenes": [ { "speakerId": "paw", "dialogueText": "Hi there" } ]
}"##;

#[test]
fn defaults_fill_missing_fields() {
    let cfg = VideoConfig::from_str_json(MINIMAL).unwrap();
    assert_eq!(cfg.fps, 30);
    assert_eq!(cfg.style.theme, "zkagi-brand");
    assert_eq!(cfg.style.aspect_format, AspectFormat::Landscape);
    assert!(cfg.style.subtitles);
    assert!(cfg.style.show_speaker_name);
    assert_eq!(cfg.style.transition_kind, TransitionKind::Fade);
    assert_eq!(cfg.style.background, BackgroundMode::Image);
    assert_eq!(cfg.style.clip_frames, 117);
    assert_eq!(cfg.style.crossfade_frames, 12);
    assert_eq!(cfg.style.default_scene_frames, 120);
    assert_eq!(cfg.music.volume, 0.12);
    assert!(cfg.music.url.is_none());
    assert_eq!(cfg.watermark.text, "ZkAGI");
    assert!(cfg.watermark.show);

    let scene = &cfg.scenes[0];
    assert_eq!(scene.emotion_tag, "neutral");
    assert_eq!(scene.visual_type, VisualType::TalkingHead);
    assert!(scene.explicit_duration_seconds.is_none());

    let paw = cfg.speaker("paw").unwrap();
    assert_eq!(paw.id, "paw");
    assert_eq!(paw.voice.cfg_value, "2.0");
    assert_eq!(paw.voice.steps, "15");
}

#[test]
fn legacy_field_names_are_accepted() {
    let cfg = VideoConfig::from_path(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data/pawpad.json"
    ))
    .unwrap();
    assert_eq!(cfg.speakers.len(), 2);
    assert_eq!(cfg.scenes.len(), 6);
    assert_eq!(cfg.scenes[0].speaker_id, "paw");
    assert_eq!(cfg.scenes[0].emotion_tag, "excited");
    assert_eq!(cfg.scenes[0].explicit_duration_seconds, Some(8.0));
    assert_eq!(cfg.style.theme, "pawpad");
    assert_eq!(cfg.watermark.text, "PawPad");
    assert_eq!(cfg.music.url.as_deref(), Some("music/lofi.mp3"));
    assert_eq!(
        cfg.scenes[0].cues[0].kind,
        CueKind::Sound {
            asset: "sfx/whoosh.wav".to_owned(),
            volume: 0.6
        }
    );
}

#[test]
fn aspect_formats_map_to_canvas() {
    assert_eq!(AspectFormat::Landscape.canvas().width, 1920);
    assert_eq!(AspectFormat::Portrait.canvas().height, 1920);
    assert_eq!(AspectFormat::Square.canvas().width, 1080);
    let f: AspectFormat = serde_json::from_str("\"9:16\"").unwrap();
    assert_eq!(f, AspectFormat::Portrait);
}

#[test]
fn emotion_parse_and_pose_fallback() {
    assert_eq!(Emotion::parse("Excited"), Some(Emotion::Excited));
    assert_eq!(Emotion::parse("furious"), None);

    let cfg = VideoConfig::from_str_json(MINIMAL).unwrap();
    let paw = cfg.speaker("paw").unwrap();
    assert!(paw.is_resolvable());
    assert_eq!(paw.pose_for(Emotion::Waving), Some("paw/neutral.png"));
}

#[test]
fn reveal_fraction_is_clamped() {
    let mut style = Style::default();
    style.reveal_fraction = 0.95;
    assert_eq!(style.effective_reveal_fraction(), 0.85);
    style.reveal_fraction = 0.1;
    assert_eq!(style.effective_reveal_fraction(), 0.70);
    style.reveal_fraction = f64::NAN;
    assert_eq!(style.effective_reveal_fraction(), 0.70);
}

#[test]
fn dialogue_fingerprint_tracks_order_and_text() {
    let cfg = VideoConfig::from_str_json(MINIMAL).unwrap();
    let base = cfg.dialogue_fingerprint();
    assert_eq!(base.len(), 16);

    let mut edited = cfg.clone();
    edited.scenes[0].dialogue_text.push('!');
    assert_ne!(edited.dialogue_fingerprint(), base);

    let mut restyled = cfg.clone();
    restyled.style.theme = "dark".to_owned();
    assert_eq!(restyled.dialogue_fingerprint(), base);
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = VideoConfig::from_str_json("{").unwrap_err();
    assert!(matches!(err, StoryError::Serde(_)));
}
