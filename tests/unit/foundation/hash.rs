use super::*;

#[test]
fn string_writes_are_length_prefixed() {
    let mut a = StableHasher::new();
    a.write_str("ab");
    a.write_str("c");
    let mut b = StableHasher::new();
    b.write_str("a");
    b.write_str("bc");
    assert_ne!(a.finish64(), b.finish64());
}

#[test]
fn digest_is_deterministic() {
    let run = || {
        let mut h = StableHasher::new();
        h.write_u64(42);
        h.write_str("neutral");
        h.write_bytes(&[1, 2, 3]);
        h.finish()
    };
    assert_eq!(run(), run());
    assert_ne!(run(), StableHasher::new().finish());
}

#[test]
fn integers_hash_little_endian() {
    let mut a = StableHasher::new();
    a.write_u64(0x0102);
    let mut b = StableHasher::new();
    b.write_bytes(&[0x02, 0x01, 0, 0, 0, 0, 0, 0]);
    assert_eq!(a.finish64(), b.finish64());
}
