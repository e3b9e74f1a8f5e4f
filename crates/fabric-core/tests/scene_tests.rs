// Host-side checks of generation rebuilds and per-frame updates.

use fabric_core::constants::FREQUENCY_BIN_COUNT;
use fabric_core::{
    Change, FrequencySource, Scene, SettingKey, SettingValue, Settings, SettingsStore, Silence,
};
use std::cell::RefCell;
use std::rc::Rc;

struct Tone(u8);

impl FrequencySource for Tone {
    fn bin_count(&self) -> usize {
        64
    }

    fn frequencies(&mut self, out: &mut Vec<u8>) {
        out.clear();
        out.resize(64, self.0);
    }
}

fn settings() -> Settings {
    Settings {
        points: 200,
        grid_lines: 10,
        ..Settings::default()
    }
}

#[test]
fn new_scene_is_first_generation() {
    let scene = Scene::new(settings(), 64, 0.0, 7).unwrap();
    assert_eq!(scene.generation(), 1);
    assert_eq!(scene.field().graph().point_count(), 200);
    assert_eq!(scene.grid().len(), 18);
    assert_eq!(scene.grid_vertices().len(), scene.grid().float_len());
}

#[test]
fn default_scene_stays_flat_in_silence() {
    let mut scene = Scene::new(Settings::default(), FREQUENCY_BIN_COUNT, 0.0, 1).unwrap();
    assert_eq!(scene.field().graph().tracked_point_count(), FREQUENCY_BIN_COUNT);
    let mut silence = Silence::new(FREQUENCY_BIN_COUNT);
    for _ in 0..5 {
        scene.update(&mut silence);
    }
    assert!(scene
        .field()
        .graph()
        .points
        .iter()
        .all(|p| p.spring.value() == 0.0));
}

#[test]
fn update_lifts_tracked_points() {
    let mut scene = Scene::new(settings(), 64, 0.0, 7).unwrap();
    for _ in 0..10 {
        scene.update(&mut Tone(255));
    }
    let graph = scene.field().graph();
    assert!(graph
        .points
        .iter()
        .filter(|p| p.frequency_bin.is_some())
        .all(|p| p.spring.value() > 0.0));
}

#[test]
fn rebuild_replaces_generation() {
    let mut scene = Scene::new(settings(), 64, 0.0, 7).unwrap();
    let mut next = scene.settings().clone();
    next.points = 400;
    scene.apply_settings(&next, Change::Rebuild, 5_000.0).unwrap();
    assert_eq!(scene.generation(), 2);
    assert_eq!(scene.field().graph().point_count(), 400);
    assert_eq!(scene.scheduler().next_wave_ms(), 29_500.0);
}

#[test]
fn failed_rebuild_keeps_previous_generation() {
    let mut scene = Scene::new(settings(), 0, 0.0, 7).unwrap();
    let before = scene.field().graph().triangulation.clone();
    let mut next = scene.settings().clone();
    next.points = 2;
    assert!(scene.apply_settings(&next, Change::Rebuild, 0.0).is_err());
    assert_eq!(scene.generation(), 1);
    assert_eq!(scene.field().graph().triangulation, before);
}

#[test]
fn live_change_retunes_without_rebuilding() {
    let mut scene = Scene::new(settings(), 64, 0.0, 7).unwrap();
    let mut next = scene.settings().clone();
    next.stiffness = 0.3;
    next.lines_stiffness = 0.5;
    scene.apply_settings(&next, Change::Live, 0.0).unwrap();
    assert_eq!(scene.generation(), 1);
    let s = &scene.field().graph().points[0].spring;
    assert!((s.stiffness() - 0.3).abs() < 1e-6);
    assert!((s.dampening() - 0.3).abs() < 1e-6);
    assert_eq!(scene.grid().lines()[0].offset.stiffness(), 0.5);
}

#[test]
fn store_listener_drives_the_scene() {
    let scene = Rc::new(RefCell::new(Scene::new(settings(), 64, 0.0, 7).unwrap()));
    let mut store = SettingsStore::new(settings());
    let target = Rc::clone(&scene);
    store.subscribe(move |_, change, s| {
        let _ = target.borrow_mut().apply_settings(s, change, 0.0);
    });
    store.set(SettingKey::GridLines, SettingValue::Number(20.0)).unwrap();
    assert_eq!(scene.borrow().grid().len(), 38);
    assert_eq!(scene.borrow().generation(), 2);
    store.set(SettingKey::FreqPow, SettingValue::Number(2.0)).unwrap();
    assert_eq!(scene.borrow().generation(), 2);
    assert_eq!(scene.borrow().settings().freq_pow, 2.0);
}

#[test]
fn retargets_are_polled_through_the_scene() {
    let mut scene = Scene::new(settings(), 64, 0.0, 7).unwrap();
    assert_eq!(scene.poll_retargets(24_000.0), 0);
    assert_eq!(scene.poll_retargets(24_500.0), 1);
}
