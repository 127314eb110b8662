use super::*;

fn cfg() -> VideoConfig {
    VideoConfig::from_path(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data/pawpad.json"
    ))
    .unwrap()
}

fn measured() -> Vec<(usize, String, f64)> {
    [8.0, 7.2, 7.36, 7.68, 16.48, 2.88]
        .into_iter()
        .enumerate()
        .map(|(i, s)| (i, format!("audio/scene-{i}.wav"), s))
        .collect()
}

#[test]
fn frames_are_ceiled_from_seconds() {
    let m = AudioManifest::from_measurements(&cfg(), measured()).unwrap();
    let frames: Vec<u64> = m.scenes.iter().map(|e| e.frames).collect();
    assert_eq!(frames, vec![240, 216, 221, 231, 495, 87]);
    assert_eq!(m.total_frames, 1490);
    assert_eq!(m.entry(4).unwrap().audio_path, "audio/scene-4.wav");
    assert!(m.entry(9).is_none());
}

#[test]
fn stale_manifest_is_rejected() {
    let m = AudioManifest::from_measurements(&cfg(), measured()).unwrap();
    let mut edited = cfg();
    edited.scenes.swap(0, 1);
    let err = m.check_consistency(&edited).unwrap_err();
    assert!(err.to_string().contains("different scene list"));
}

#[test]
fn tampered_frames_are_rejected() {
    let mut m = AudioManifest::from_measurements(&cfg(), measured()).unwrap();
    m.scenes[2].frames += 1;
    m.total_frames += 1;
    assert!(m.check_consistency(&cfg()).is_err());
}

#[test]
fn non_positive_measurement_is_an_error() {
    let mut bad = measured();
    bad[1].2 = 0.0;
    assert!(AudioManifest::from_measurements(&cfg(), bad).is_err());
}

#[test]
fn out_of_range_or_duplicate_index_is_rejected() {
    let mut extra = measured();
    extra.push((6, "x.wav".to_owned(), 1.0));
    assert!(AudioManifest::from_measurements(&cfg(), extra).is_err());

    let mut dup = measured();
    dup.push((0, "again.wav".to_owned(), 8.0));
    assert!(AudioManifest::from_measurements(&cfg(), dup).is_err());
}

#[test]
fn json_uses_camel_case() {
    let m = AudioManifest::from_measurements(&cfg(), measured()).unwrap();
    let v = serde_json::to_value(&m).unwrap();
    assert!(v.get("configFingerprint").is_some());
    assert_eq!(v["scenes"][0]["audioPath"], "audio/scene-0.wav");
    let back = AudioManifest::from_reader(serde_json::to_vec(&m).unwrap().as_slice()).unwrap();
    assert_eq!(back, m);
}
