// Host-side checks of setting validation and change notification.

use fabric_core::{Change, SettingKey, SettingValue, Settings, SettingsError, SettingsStore};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn topology_keys_force_rebuild() {
    let rebuild: Vec<_> = SettingKey::ALL
        .iter()
        .copied()
        .filter(|k| k.change() == Change::Rebuild)
        .collect();
    assert_eq!(
        rebuild,
        vec![
            SettingKey::Seed,
            SettingKey::Points,
            SettingKey::ConnectedNeighbors,
            SettingKey::ConnectedBinsStride,
            SettingKey::GridLines
        ]
    );
}

#[test]
fn apply_reports_change_kind() {
    let mut s = Settings::default();
    assert_eq!(s.apply(SettingKey::Points, SettingValue::Number(800.0)), Ok(Change::Rebuild));
    assert_eq!(s.points, 800);
    assert_eq!(s.apply(SettingKey::BlurMag, SettingValue::Number(3.5)), Ok(Change::Live));
    assert_eq!(s.blur_mag, 3.5);
    assert_eq!(s.apply(SettingKey::MotionBlur, SettingValue::Flag(false)), Ok(Change::Live));
    assert!(!s.motion_blur);
}

#[test]
fn rejected_values_leave_settings_untouched() {
    let mut s = Settings::default();
    assert_eq!(
        s.apply(SettingKey::NeighborWeight, SettingValue::Number(0.5)),
        Err(SettingsError::OutOfRange {
            key: SettingKey::NeighborWeight,
            value: 0.5
        })
    );
    assert!(matches!(
        s.apply(SettingKey::MotionBlur, SettingValue::Number(1.0)),
        Err(SettingsError::WrongKind { key: SettingKey::MotionBlur, .. })
    ));
    assert!(matches!(
        s.apply(SettingKey::Stiffness, SettingValue::Number(f64::NAN)),
        Err(SettingsError::WrongKind { .. })
    ));
    assert_eq!(s, Settings::default());
}

#[test]
fn unknown_names_are_rejected() {
    let mut store = SettingsStore::default();
    assert_eq!(
        store.set_named("bogus", SettingValue::Number(1.0)),
        Err(SettingsError::UnknownKey("bogus".to_string()))
    );
    assert_eq!(store.set_named("freqPow", SettingValue::Number(2.5)), Ok(Change::Live));
    assert_eq!(store.settings().freq_pow, 2.5);
}

#[test]
fn listeners_see_accepted_changes_only() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut store = SettingsStore::default();
    let log = Rc::clone(&seen);
    store.subscribe(move |key, change, s| log.borrow_mut().push((key, change, s.grid_lines)));

    store.set(SettingKey::GridLines, SettingValue::Number(40.0)).unwrap();
    assert!(store.set(SettingKey::GridLines, SettingValue::Number(5.0)).is_err());
    store
        .set(SettingKey::Background, SettingValue::Color([0.0, 0.0, 0.0, 1.0]))
        .unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![
            (SettingKey::GridLines, Change::Rebuild, 40),
            (SettingKey::Background, Change::Live, 40)
        ]
    );
}
