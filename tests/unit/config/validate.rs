use super::*;
use crate::config::model::BackgroundMode;

fn base() -> VideoConfig {
    VideoConfig::from_str_json(
        r##"{
            "speakers": {
                "paw": {
                    "name": "Paw",
                    "accentColor": "#7C3AED",
                    "poses": { "neutral": "paw.png" },
                    "voice": { "refAudioPath": "paw.wav", "refText": "hi" }
                },
                "ghost": {
                    "name": "Ghost",
                    "accentColor": "#ffffff",
                    "poses": { "excited": "ghost.png" },
                    "voice": { "refAudioPath": "g.wav", "refText": "boo" }
                }
            },
            "scenes": [
                { "speakerId": "paw", "dialogueText": "One" },
                { "speakerId": "nobody", "dialogueText": "Two" },
                { "speakerId": "ghost", "dialogueText": "Three" },
                { "speakerId": "paw", "dialogueText": "Four", "emotion": "furious" },
                { "speakerId": "paw", "dialogueText": "Five", "durationOverride": -2.0 }
            ]
        }"##,
    )
    .unwrap()
}

#[test]
fn lenient_validation_ignores_scene_problems() {
    assert!(base().validate().is_ok());
}

#[test]
fn strict_validation_reports_every_scene_problem() {
    let err = base().validate_strict().unwrap_err().to_string();
    assert!(err.contains("$.scenes[1].speakerId: unknown speaker 'nobody'"));
    assert!(err.contains("$.scenes[2].speakerId: speaker 'ghost' has no neutral pose"));
    assert!(err.contains("$.scenes[3].emotion: unknown emotion 'furious'"));
    assert!(err.contains("$.scenes[4].durationOverride"));
}

#[test]
fn empty_scene_list_is_fatal() {
    let mut cfg = base();
    cfg.scenes.clear();
    let err = cfg.validate().unwrap_err();
    assert!(matches!(err, StoryError::Configuration(_)));
    assert!(err.to_string().contains("$.scenes"));
}

#[test]
fn clip_tiling_requires_three_crossfades_per_clip() {
    let mut cfg = base();
    cfg.style.background = BackgroundMode::Clips;
    cfg.style.clip_frames = 30;
    cfg.style.crossfade_frames = 11;
    let err = cfg.validate().unwrap_err().to_string();
    assert!(err.contains("crossfadeFrames"), "{err}");
    assert!(err.contains("at most two clips blend"), "{err}");
    cfg.style.crossfade_frames = 10;
    assert!(cfg.validate().is_ok());
}

#[test]
fn music_volume_must_be_unit_range() {
    let mut cfg = base();
    cfg.music.volume = 1.5;
    assert!(cfg.validate().is_err());
    cfg.music.volume = f64::NAN;
    assert!(cfg.validate().is_err());
    cfg.music.volume = 0.0;
    assert!(cfg.validate().is_ok());
}

#[test]
fn zero_fps_is_fatal() {
    let mut cfg = base();
    cfg.fps = 0;
    assert!(cfg.validate().unwrap_err().to_string().contains("$.fps"));
}
