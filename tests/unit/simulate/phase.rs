use super::*;

#[test]
fn default_budget_is_30_40_40_10() {
    let f = PhaseFrames::default();
    let counts: Vec<u32> = Phase::ALL.iter().map(|p| p.frame_count(&f)).collect();
    assert_eq!(counts, vec![30, 40, 40, 10]);
    assert_eq!(f.total(), 120);
}

#[test]
fn locate_maps_absolute_frames_to_phases() {
    let f = PhaseFrames::default();
    assert_eq!(f.locate(0), Some((Phase::Explosion, 0)));
    assert_eq!(f.locate(29), Some((Phase::Explosion, 29)));
    assert_eq!(f.locate(30), Some((Phase::Floating, 0)));
    assert_eq!(f.locate(70), Some((Phase::Return, 0)));
    assert_eq!(f.locate(110), Some((Phase::Finalize, 0)));
    assert_eq!(f.locate(119), Some((Phase::Finalize, 9)));
    assert_eq!(f.locate(120), None);
}

#[test]
fn locate_skips_empty_phases() {
    let f = PhaseFrames {
        explosion: 0,
        floating: 2,
        return_home: 0,
        finalize: 1,
    };
    assert_eq!(f.locate(0), Some((Phase::Floating, 0)));
    assert_eq!(f.locate(2), Some((Phase::Finalize, 0)));
}

#[test]
fn json_uses_return_key() {
    let f: PhaseFrames = serde_json::from_str(r#"{ "return": 3 }"#).unwrap();
    assert_eq!(f.return_home, 3);
    assert_eq!(f.explosion, 30);
    assert_eq!(Phase::Return.to_string(), "return");
    assert!(!Phase::Finalize.draws_particles());
}
