use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use lottie_test_fixtures::animations;
use lottie_view_core::{
    AnimationSurface, BackgroundBehavior, Completion, Config, ContainerView, FsAssetLoader,
    MemoryAssetLoader, ViewCommand, ViewEvent, ViewProps, ViewState,
};

fn doc(fr: u32, op: u32) -> String {
    format!(r#"{{ "nm": "doc", "fr": {fr}, "ip": 0, "op": {op}, "layers": [] }}"#)
}

fn view() -> ContainerView {
    ContainerView::headless(Config::default(), Box::new(MemoryAssetLoader::new())).unwrap()
}

fn ticks(view: &mut ContainerView, n: usize) -> Vec<ViewEvent> {
    (0..n)
        .flat_map(|_| view.tick(Duration::from_millis(50)))
        .collect()
}

fn recorder() -> (Rc<RefCell<Vec<bool>>>, Completion) {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let sink = calls.clone();
    (calls, Box::new(move |done| sink.borrow_mut().push(done)))
}

fn finishes(events: &[ViewEvent]) -> Vec<bool> {
    events
        .iter()
        .filter_map(|e| match e {
            ViewEvent::AnimationFinish { completed } => Some(*completed),
            _ => None,
        })
        .collect()
}

#[test]
fn new_play_interrupts_the_previous_one() {
    let mut v = view();
    v.set_source_json(&doc(10, 100));
    let (first, cb1) = recorder();
    let (second, cb2) = recorder();
    v.play(Some(cb1));
    v.play_range(Some(0.0), 50.0, Some(cb2));
    assert_eq!(*first.borrow(), vec![false]);
    assert!(second.borrow().is_empty());
    assert_eq!(
        v.take_events(),
        vec![
            ViewEvent::AnimationStart,
            ViewEvent::AnimationFinish { completed: false },
            ViewEvent::AnimationStart,
        ]
    );
}

#[test]
fn pause_and_reset_conclude_as_interrupted() {
    let mut v = view();
    v.set_source_json(&doc(10, 100));
    v.set_progress(0.4);
    let (calls, cb) = recorder();
    v.play(Some(cb));
    ticks(&mut v, 4);
    v.pause();
    let paused_at = v.progress().unwrap();
    assert!(paused_at > 0.4);
    assert_eq!(*calls.borrow(), vec![false]);
    assert_eq!(v.state(), ViewState::LoadedIdle);

    v.resume();
    assert_eq!(v.state(), ViewState::LoadedPlaying);
    assert_eq!(v.progress(), Some(paused_at));
    v.reset();
    assert_eq!(v.progress(), Some(0.0));
    assert_eq!(v.state(), ViewState::LoadedIdle);
    assert_eq!(v.store().progress(), 0.4);
}

#[test]
fn source_swap_interrupts_and_reapplies_speed() {
    let mut v = view();
    v.set_source_json(&doc(10, 100));
    let (calls, cb) = recorder();
    v.play(Some(cb));
    v.take_events();

    assert!(v.set_source_json(&doc(30, 90)));
    assert_eq!(*calls.borrow(), vec![false]);
    assert_eq!(
        v.take_events(),
        vec![ViewEvent::AnimationFinish { completed: false }]
    );
    // Stored speed is still 0, so the new source stays idle.
    assert_eq!(v.state(), ViewState::LoadedIdle);

    v.set_speed(1.5);
    assert!(v.set_source_json(&doc(24, 48)));
    assert_eq!(v.state(), ViewState::LoadedPlaying);
    assert_eq!(v.handle().unwrap().surface().speed(), 1.5);
    assert_eq!(
        v.take_events(),
        vec![
            ViewEvent::AnimationStart,
            ViewEvent::AnimationFinish { completed: false },
            ViewEvent::AnimationStart,
        ]
    );
}

#[test]
fn sampler_follows_source_swap() {
    let mut v = view();
    v.set_loop(true);
    v.set_speed(1.0);
    v.set_source_json(&doc(10, 100));
    assert!(v.is_sampling());
    v.set_source_json(&doc(20, 100));
    assert!(v.is_sampling());
    let events = ticks(&mut v, 2);
    assert_eq!(events.iter().filter(|e| e.is_progress()).count(), 2);
}

#[test]
fn detached_play_commands_are_deferred_last_wins() {
    let mut v = view();
    v.set_source_json(&doc(10, 100));
    v.detach();
    let (first, cb1) = recorder();
    let (second, cb2) = recorder();
    v.play(Some(cb1));
    v.play_range(Some(80.0), 20.0, Some(cb2));
    v.pause();
    assert_eq!(*first.borrow(), vec![false]);
    assert_eq!(v.state(), ViewState::LoadedIdle);
    assert!(v.take_events().is_empty());

    v.attach();
    assert_eq!(v.state(), ViewState::LoadedPlaying);
    assert!(v.is_sampling());
    assert_eq!(v.take_events(), vec![ViewEvent::AnimationStart]);
    let start = v.progress().unwrap();
    ticks(&mut v, 2);
    assert!(v.progress().unwrap() < start, "range 80 -> 20 plays backwards");
    assert!(second.borrow().is_empty());
}

#[test]
fn detach_stops_sampling_until_attach() {
    let mut v = view();
    v.set_loop(true);
    v.set_speed(1.0);
    v.set_source_json(&doc(10, 100));
    v.detach();
    assert!(!v.is_sampling());
    assert!(!ticks(&mut v, 4).iter().any(ViewEvent::is_progress));
    v.attach();
    assert!(ticks(&mut v, 1).iter().any(ViewEvent::is_progress));
}

#[test]
fn background_pause_and_restore_keeps_the_play_open() {
    let mut v = view();
    v.set_source_json(&doc(10, 100));
    let (calls, cb) = recorder();
    v.play(Some(cb));
    assert_eq!(
        v.handle().unwrap().surface().background_behavior(),
        BackgroundBehavior::PauseAndRestore
    );
    v.take_events();

    v.enter_background();
    assert_eq!(v.state(), ViewState::LoadedIdle);
    assert!(v.take_events().is_empty());
    assert!(calls.borrow().is_empty());

    v.enter_foreground();
    assert_eq!(v.state(), ViewState::LoadedPlaying);
    assert!(v.is_sampling());
}

#[test]
fn background_default_pause_concludes_the_play() {
    let mut v = view();
    v.set_speed(1.0);
    v.set_source_json(&doc(10, 100));
    v.take_events();
    v.enter_background();
    assert_eq!(finishes(&v.take_events()), vec![false]);
    v.enter_foreground();
    assert_eq!(v.state(), ViewState::LoadedIdle);
}

#[test]
fn teardown_completes_in_flight_play_without_events() {
    let mut v = view();
    v.set_source_json(&doc(10, 100));
    let (calls, cb) = recorder();
    v.play(Some(cb));
    v.take_events();
    v.teardown();
    assert_eq!(*calls.borrow(), vec![false]);
    assert!(v.take_events().is_empty());

    let (late, cb) = recorder();
    v.play(Some(cb));
    assert_eq!(*late.borrow(), vec![false]);
    assert_eq!(v.state(), ViewState::Empty);
}

#[test]
fn dropping_the_view_completes_deferred_plays() {
    let (calls, cb) = recorder();
    {
        let mut v = view();
        v.set_source_json(&doc(10, 100));
        v.detach();
        v.play(Some(cb));
    }
    assert_eq!(*calls.borrow(), vec![false]);
}

#[test]
fn numeric_commands_and_prop_batches() {
    let mut v = view();
    let props: ViewProps = serde_json::from_str(&format!(
        r#"{{ "loop": true, "speed": 2, "resizeMode": "center", "sourceJson": {} }}"#,
        serde_json::to_string(&doc(10, 100)).unwrap()
    ))
    .unwrap();
    assert!(v.apply_props(&props).is_none());
    assert_eq!(v.state(), ViewState::LoadedPlaying);
    assert_eq!(
        v.handle().unwrap().surface().content_mode(),
        lottie_view_core::ResizeMode::Center
    );

    v.dispatch(ViewCommand::from_command_id(3, &[]).unwrap());
    assert_eq!(v.state(), ViewState::LoadedIdle);
    v.dispatch(ViewCommand::from_command_id(5, &[0.9]).unwrap());
    assert_eq!(v.state(), ViewState::LoadedPlaying);
    let events = ticks(&mut v, 12);
    assert_eq!(finishes(&events), vec![true]);
}

#[test]
fn backpressure_drops_progress_but_keeps_lifecycle_events() {
    let cfg = Config {
        max_pending_events: 3,
        ..Config::default()
    };
    let mut v = ContainerView::headless(cfg, Box::new(MemoryAssetLoader::new())).unwrap();
    v.set_source_json(&doc(10, 20));
    v.play(None);
    for _ in 0..50 {
        v.advance(Duration::from_millis(50));
    }
    let events = v.take_events();
    assert_eq!(events.first(), Some(&ViewEvent::AnimationStart));
    assert_eq!(
        events.last(),
        Some(&ViewEvent::AnimationFinish { completed: true })
    );
    assert_eq!(events.len(), 4);
    assert!(v.dropped_events() > 0);
}

#[test]
fn loads_named_fixtures_from_disk() {
    let loader = FsAssetLoader::new(animations::dir());
    let mut v = ContainerView::headless(Config::default(), Box::new(loader)).unwrap();
    assert!(v.set_source_name("spinner"));
    let surface = v.handle().unwrap().surface();
    assert_eq!(surface.frame_range(), (0.0, 30.0));
    assert_eq!(surface.frame_rate(), 60.0);
    assert!(!v.set_source_name("nope"));
    assert_eq!(v.state(), ViewState::LoadedIdle);
}
