use super::*;

#[test]
fn defaults_validate() {
    FlipbookConfig::default().validate().unwrap();
}

#[test]
fn partial_json_keeps_defaults() {
    let cfg =
        FlipbookConfig::from_json_str(r#"{ "gesture": { "complete_threshold": 0.25 } }"#).unwrap();
    assert_eq!(cfg.gesture.complete_threshold, 0.25);
    assert_eq!(cfg.gesture.edge_zone_fraction, 0.30);
    assert_eq!(cfg.animation.complete_ms, 480.0);
    assert_eq!(cfg.layout.max_height_fraction, 0.82);
}

#[test]
fn invalid_values_are_rejected() {
    assert!(FlipbookConfig::from_json_str(r#"{ "gesture": { "edge_zone_fraction": 1.5 } }"#).is_err());
    assert!(FlipbookConfig::from_json_str(r#"{ "animation": { "complete_ms": 0 } }"#).is_err());
    assert!(FlipbookConfig::from_json_str(r#"{ "animation": { "hint_split": 1.0 } }"#).is_err());
    assert!(FlipbookConfig::from_json_str(r#"{ "audio": { "sample_rate": 0 } }"#).is_err());
    assert!(FlipbookConfig::from_json_str("not json").is_err());
}

#[test]
fn overrides_apply_and_ignore_garbage() {
    let mut cfg = FlipbookConfig::default();
    cfg.apply_overrides(|key| match key {
        "FLIPBOOK_HINT_DELAY_MS" => Some("250".to_string()),
        "FLIPBOOK_AUDIO" => Some("off".to_string()),
        "FLIPBOOK_SAMPLE_RATE" => Some("nope".to_string()),
        _ => None,
    });
    assert_eq!(cfg.animation.hint_delay_ms, 250.0);
    assert!(!cfg.audio.enabled);
    assert_eq!(cfg.audio.sample_rate, 48_000);
}

#[test]
fn palette_round_trips_through_json() {
    let cfg = FlipbookConfig::default();
    let s = serde_json::to_string(&cfg).unwrap();
    let back = FlipbookConfig::from_json_str(&s).unwrap();
    assert_eq!(back.palette, cfg.palette);
    assert_eq!(back.gesture, cfg.gesture);
}
