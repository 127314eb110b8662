use super::*;
use crate::config::model::{CueSpec, Scene, Speaker, Voice, VisualType};
use crate::foundation::color::Color;
use crate::foundation::error::DiagnosticKind;
use crate::timeline::builder::TimelineBuilder;
use std::collections::BTreeMap;

fn speaker(id: &str, accent: &str) -> Speaker {
    Speaker {
        id: id.to_owned(),
        name: id.to_owned(),
        accent_color: Color::parse(accent).unwrap(),
        role: String::new(),
        poses: BTreeMap::from([("neutral".to_owned(), format!("{id}.png"))]),
        voice: Voice {
            ref_audio_path: format!("{id}.wav"),
            ref_text: String::new(),
            cfg_value: "2.0".to_owned(),
            steps: "15".to_owned(),
        },
    }
}

fn scene(speaker_id: &str, frames: u64) -> Scene {
    Scene {
        speaker_id: speaker_id.to_owned(),
        dialogue_text: "line".to_owned(),
        emotion_tag: "neutral".to_owned(),
        visual_type: VisualType::default(),
        background_reference: None,
        background_color: None,
        highlight_text: None,
        explicit_duration_seconds: Some(frames as f64 / 30.0),
        cues: Vec::new(),
    }
}

fn config(scenes: Vec<Scene>) -> VideoConfig {
    let mut cfg = VideoConfig::from_str_json(r#"{"speakers": {}, "scenes": []}"#).unwrap();
    cfg.speakers = BTreeMap::from([
        ("paw".to_owned(), speaker("paw", "#7C3AED")),
        ("pad".to_owned(), speaker("pad", "#06B6D4")),
    ]);
    cfg.scenes = scenes;
    cfg.style.transition_kind = TransitionKind::None;
    cfg
}

fn req(scene_index: usize, track: &str, r: i64, d: u64) -> CueRequest {
    CueRequest {
        scene_index,
        track: track.to_owned(),
        relative_frame: r,
        duration_frames: d,
        kind: CueKind::Glitch { intensity: 0.5 },
    }
}

fn two_scenes() -> Timeline {
    let cfg = config(vec![scene("paw", 150), scene("pad", 200)]);
    TimelineBuilder::new(&cfg).build().unwrap()
}

#[test]
fn cue_inside_scene_resolves_against_scene_start() {
    let t = two_scenes();
    let s = CueScheduler::new(&t, 15);
    let cue = s.resolve(0, &req(0, "sfx", 130, 10)).unwrap();
    assert_eq!(cue.range, FrameRange::from_start_len(130, 10));
    let cue = s.resolve(1, &req(1, "sfx", 20, 10)).unwrap();
    assert_eq!(cue.range, FrameRange::from_start_len(170, 10));
}

#[test]
fn cue_past_scene_length_is_rejected_not_clamped() {
    let t = two_scenes();
    let s = CueScheduler::new(&t, 15);
    let d = s.resolve(0, &req(0, "sfx", 160, 10)).unwrap_err();
    assert_eq!(d.kind, DiagnosticKind::Scheduling);
    assert_eq!(d.scene, Some(0));
    assert!(s.resolve(0, &req(0, "sfx", 150, 1)).is_err());
    assert!(s.resolve(0, &req(0, "sfx", -1, 5)).is_err());
    assert!(s.resolve(0, &req(0, "sfx", 10, 0)).is_err());
}

#[test]
fn tolerance_lets_a_cue_bleed_into_the_next_scene() {
    let t = two_scenes();
    let s = CueScheduler::new(&t, 15);
    let cue = s.resolve(0, &req(0, "sfx", 140, 25)).unwrap();
    assert_eq!(cue.range.end, FrameIndex(165));
    assert!(s.resolve(0, &req(0, "sfx", 140, 26)).is_err());
}

#[test]
fn cue_may_not_run_past_the_timeline() {
    let t = two_scenes();
    let s = CueScheduler::new(&t, 15);
    assert!(s.resolve(1, &req(1, "sfx", 190, 10)).is_ok());
    assert!(s.resolve(1, &req(1, "sfx", 190, 11)).is_err());
}

#[test]
fn cue_on_skipped_scene_is_dropped() {
    let cfg = config(vec![scene("paw", 150), scene("ghost", 30), scene("pad", 200)]);
    let t = TimelineBuilder::new(&cfg).build().unwrap();
    let s = CueScheduler::new(&t, 15);
    let d = s.resolve(0, &req(1, "sfx", 0, 5)).unwrap_err();
    assert!(d.message.contains("not on the timeline"));
    let cue = s.resolve(1, &req(2, "sfx", 0, 5)).unwrap();
    assert_eq!(cue.range.start, FrameIndex(150));
}

#[test]
fn same_track_overlap_keeps_the_later_declaration() {
    let t = two_scenes();
    let schedule = CueScheduler::new(&t, 15).schedule(vec![
        req(0, "sfx", 10, 30),
        req(0, "vfx", 20, 30),
        req(0, "sfx", 30, 10),
        req(0, "sfx", 100, 10),
    ]);
    let starts = |track: &str| -> Vec<u64> {
        schedule
            .cues
            .iter()
            .filter(|c| c.track == track)
            .map(|c| c.range.start.0)
            .collect()
    };
    assert_eq!(starts("sfx"), vec![30, 100]);
    assert_eq!(starts("vfx"), vec![20]);
    assert_eq!(schedule.diagnostics.len(), 1);
    assert!(schedule.diagnostics[0].message.contains("overridden"));
}

#[test]
fn schedule_is_sorted_and_queryable_by_frame() {
    let t = two_scenes();
    let schedule = CueScheduler::new(&t, 15).schedule(vec![
        req(1, "a", 0, 10),
        req(0, "b", 5, 160),
        req(0, "c", 400, 10),
    ]);
    let starts: Vec<_> = schedule.cues.iter().map(|c| c.range.start.0).collect();
    assert_eq!(starts, vec![5, 150]);
    assert_eq!(schedule.diagnostics.len(), 1);

    let active: Vec<_> = schedule
        .active_at(FrameIndex(152))
        .map(|c| c.track.as_str())
        .collect();
    assert_eq!(active, vec!["b", "a"]);
    assert_eq!(schedule.active_at(FrameIndex(300)).count(), 0);
}

#[test]
fn automatic_cues_carry_wipe_and_highlight() {
    let mut first = scene("paw", 150);
    first.highlight_text = Some("Self-custody".to_owned());
    first.cues.push(CueSpec {
        track: "sfx".to_owned(),
        relative_frame: 0,
        duration_frames: 20,
        kind: CueKind::Sound {
            asset: "sfx/whoosh.wav".to_owned(),
            volume: 0.6,
        },
    });
    let mut cfg = config(vec![first, scene("pad", 10)]);
    cfg.style.transition_kind = TransitionKind::Fade;
    let t = TimelineBuilder::new(&cfg).build().unwrap();

    let requests = cue_requests(&cfg, &t);
    let tracks: Vec<_> = requests.iter().map(|r| r.track.as_str()).collect();
    assert_eq!(tracks, vec!["transition", "highlight", "sfx", "transition"]);

    assert_eq!(
        requests[0].kind,
        CueKind::Wipe {
            color: Color::parse("#7C3AED").unwrap(),
            direction: WipeDirection::RightToLeft,
        }
    );
    assert_eq!(requests[1].relative_frame, 10);
    assert_eq!(requests[1].duration_frames, 140);
    assert_eq!(requests[3].duration_frames, 10);

    let schedule = CueScheduler::new(&t, cfg.style.cue_tolerance).schedule(requests);
    assert!(schedule.diagnostics.is_empty());
    assert_eq!(schedule.cues.len(), 4);
}

#[test]
fn transitions_off_emits_no_wipe() {
    let cfg = config(vec![scene("paw", 150)]);
    let t = TimelineBuilder::new(&cfg).build().unwrap();
    assert!(cue_requests(&cfg, &t).is_empty());
}
