use super::*;

fn lens(plan: SubClipPlan, s: u64) -> Vec<u64> {
    plan.spans(s).iter().map(|r| r.len_frames()).collect()
}

#[test]
fn scene_of_150_splits_into_105_and_45() {
    let plan = SubClipPlan::new(117, 12).unwrap();
    assert_eq!(lens(plan, 150), vec![105, 45]);
}

#[test]
fn short_scene_is_a_single_clip_without_crossfade() {
    let plan = SubClipPlan::new(117, 12).unwrap();
    assert_eq!(lens(plan, 117), vec![117]);
    assert_eq!(lens(plan, 40), vec![40]);
    let (clips, fades) = plan.layout(FrameRange::from_start_len(300, 40), 2);
    assert_eq!(clips.len(), 1);
    assert!(fades.is_empty());
    assert_eq!(clips[0].visible, clips[0].span);
}

#[test]
fn spans_partition_every_length() {
    for (c, x) in [(117, 12), (30, 10), (10, 0), (9, 3), (1, 0)] {
        let plan = SubClipPlan::new(c, x).unwrap();
        for s in 1..600 {
            let spans = plan.spans(s);
            assert_eq!(spans.iter().map(|r| r.len_frames()).sum::<u64>(), s);
            assert!(spans.iter().all(|r| r.len_frames() > 0));
            assert!(spans.iter().all(|r| r.len_frames() <= c));
            assert_eq!(spans[0].start, FrameIndex(0));
            for w in spans.windows(2) {
                assert_eq!(w[0].end, w[1].start);
            }
            if spans.len() > 1 {
                assert!(spans.last().unwrap().len_frames() > x);
            }
        }
    }
}

#[test]
fn rejects_crossfade_wider_than_a_third() {
    assert!(SubClipPlan::new(117, 40).is_err());
    assert!(SubClipPlan::new(117, 39).is_ok());
    assert!(SubClipPlan::new(0, 0).is_err());
    let err = SubClipPlan::new(30, 12).unwrap_err().to_string();
    assert!(err.contains("need 3X <= C"), "{err}");
    assert!(err.contains("do not overlap"), "{err}");
}

#[test]
fn clips_start_on_their_span_and_window_opens_there() {
    let plan = SubClipPlan::new(117, 12).unwrap();
    let (clips, fades) = plan.layout(FrameRange::from_start_len(1000, 150), 0);
    assert_eq!(fades.len(), 1);
    let w = fades[0];
    assert_eq!(w.boundary, FrameIndex(1105));
    assert_eq!(w.range, FrameRange::from_start_len(1105, 24));
    assert_eq!((w.outgoing, w.incoming), (0, 1));

    assert_eq!(clips[0].visible, FrameRange::from_start_len(1000, 117));
    assert_eq!(clips[1].visible, FrameRange::from_start_len(1105, 45));
    assert_eq!(clips[1].media_frame(FrameIndex(1104)), None);
    assert_eq!(clips[1].media_frame(FrameIndex(1105)), Some(0));
    assert_eq!(clips[0].source, "scenes/scene-0-a.mp4");
    assert_eq!(clips[1].source, "scenes/scene-0-b.mp4");
}

#[test]
fn overlap_stays_inside_the_declared_window() {
    let plan = SubClipPlan::new(117, 12).unwrap();
    let scene = FrameRange::from_start_len(0, 400);
    let (clips, fades) = plan.layout(scene, 0);
    for f in 0..400 {
        let frame = FrameIndex(f);
        let drawn = clips.iter().filter(|c| c.visible.contains(frame)).count();
        let in_window = fades.iter().any(|w| w.range.contains(frame));
        assert!(drawn == 1 || (drawn == 2 && in_window), "frame {f}: {drawn} clips");
    }
    assert!(fades.iter().all(|w| w.range.end <= scene.end));
}

#[test]
fn window_is_cut_at_the_scene_end() {
    // 130 frames: clips at 0 and 105, the last one 25 frames long.
    let plan = SubClipPlan::new(117, 12).unwrap();
    let (clips, fades) = plan.layout(FrameRange::from_start_len(0, 130), 0);
    assert_eq!(clips[1].span, FrameRange::from_start_len(105, 25));
    assert_eq!(fades[0].range, FrameRange::from_start_len(105, 24));
    let (_, fades) = plan.layout(FrameRange::from_start_len(0, 125), 0);
    assert_eq!(fades[0].range, FrameRange::from_start_len(105, 20));
}

#[test]
fn mask_is_triangular_and_weight_is_linear() {
    let w = CrossfadeWindow::new(FrameIndex(100), 12, FrameIndex(1000), 0, 1);
    assert_eq!(w.mask_opacity(FrameIndex(99)), 0.0);
    assert_eq!(w.mask_opacity(FrameIndex(100)), 0.0);
    assert!((w.mask_opacity(FrameIndex(106)) - 0.5).abs() < 1e-12);
    assert_eq!(w.mask_opacity(FrameIndex(112)), 1.0);
    assert!((w.mask_opacity(FrameIndex(118)) - 0.5).abs() < 1e-12);
    assert_eq!(w.mask_opacity(FrameIndex(124)), 0.0);

    assert_eq!(w.incoming_weight(FrameIndex(80)), 0.0);
    assert_eq!(w.incoming_weight(FrameIndex(100)), 0.0);
    assert!((w.incoming_weight(FrameIndex(106)) - 0.5).abs() < 1e-12);
    assert_eq!(w.incoming_weight(FrameIndex(112)), 1.0);
    assert_eq!(w.incoming_weight(FrameIndex(120)), 1.0);
}

#[test]
fn media_never_runs_past_the_generated_clip() {
    let plan = SubClipPlan::new(117, 12).unwrap();
    let (clips, _) = plan.layout(FrameRange::from_start_len(0, 400), 1);
    assert!(clips.len() >= 3);
    for clip in &clips {
        assert!(clip.visible.len_frames() <= 117);
        assert_eq!(clip.media_frame(clip.visible.start), Some(0));
        let last = FrameIndex(clip.visible.end.0 - 1);
        assert_eq!(clip.media_frame(last), Some(clip.visible.len_frames() - 1));
        assert_eq!(clip.media_frame(clip.visible.end), None);
    }
    assert_eq!(clips[1].visible.len_frames(), 117);
}
