use super::*;

#[test]
fn zero_sample_rate_is_rejected() {
    let err = synthesize_flip_cue(0, 1).unwrap_err();
    assert!(matches!(err, FlipbookError::Audio(_)));
}

#[test]
fn cue_is_400ms_and_bounded() {
    let cue = synthesize_flip_cue(48_000, 11).unwrap();
    assert_eq!(cue.samples.len(), 19_200);
    assert!((cue.duration_secs() - 0.4).abs() < 1e-9);
    assert!(cue.peak() > 0.0);
    assert!(cue.peak() <= 1.0);
    assert!(cue.samples.iter().all(|s| s.is_finite()));
}

#[test]
fn same_seed_reproduces_and_different_seed_varies() {
    let a = synthesize_flip_cue(44_100, 5).unwrap();
    let b = synthesize_flip_cue(44_100, 5).unwrap();
    let c = synthesize_flip_cue(44_100, 6).unwrap();
    assert_eq!(a, b);
    assert_ne!(a.samples, c.samples);
}

#[test]
fn energy_front_loaded_with_late_thump() {
    let cue = synthesize_flip_cue(48_000, 3).unwrap();
    let attack = cue.rms_between(0.0, 0.12);
    let tail = cue.rms_between(0.36, 0.4);
    assert!(attack > tail * 4.0, "attack={attack} tail={tail}");

    // Between rustle fade-out and thump start there is little left.
    let gap = cue.rms_between(0.3, 0.4);
    let thump = cue.rms_between(0.21, 0.26);
    assert!(thump > gap * 0.5);
}

#[test]
fn thump_envelope_shape() {
    assert_eq!(thump_gain(0.1), 0.0);
    assert!((thump_gain(0.21) - 0.035).abs() < 1e-12);
    assert!((thump_gain(0.22) - 0.07).abs() < 1e-12);
    assert!((thump_gain(0.34) - 0.001).abs() < 1e-12);
    assert_eq!(thump_gain(0.39), 0.001);
}

#[test]
fn player_delivers_one_cue_per_fire() {
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Shared(Rc<RefCell<Vec<usize>>>);
    impl CueSink for Shared {
        fn play(&mut self, cue: &CueBuffer) -> anyhow::Result<()> {
            self.0.borrow_mut().push(cue.samples.len());
            Ok(())
        }
    }

    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut player = FlipCuePlayer::new(8_000, 1, Box::new(Shared(seen.clone())));
    player.fire();
    player.fire();
    assert_eq!(*seen.borrow(), vec![3_200, 3_200]);
}

#[test]
fn failing_sink_is_swallowed() {
    struct Broken;
    impl CueSink for Broken {
        fn play(&mut self, _cue: &CueBuffer) -> anyhow::Result<()> {
            anyhow::bail!("device unavailable")
        }
    }
    let mut player = FlipCuePlayer::new(48_000, 0, Box::new(Broken));
    player.fire();
}

#[test]
fn f32le_file_has_four_bytes_per_sample() {
    let dir = std::env::temp_dir().join(format!("flipbook_cue_{}", std::process::id()));
    let path = dir.join("cue.f32le");
    let cue = synthesize_flip_cue(8_000, 2).unwrap();
    write_cue_f32le(&cue, &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), cue.samples.len() * 4);
    let first = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    assert_eq!(first, cue.samples[0]);
    let _ = std::fs::remove_dir_all(&dir);
}
