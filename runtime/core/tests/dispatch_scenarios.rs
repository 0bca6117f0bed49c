use std::time::{Duration, Instant};

use binding_format::{Color, FlagField, PageField, Predicate, StateField, StateValue};
use footswitch_core::action::{FixedCc, PageSwap, SceneStep, ToggleCc};
use footswitch_core::feedback::{Display, FeedbackCall, RecordingSurface};
use footswitch_core::probe::NoProbes;
use footswitch_core::{
    load_from_str, ClassifierConfig, Dispatcher, Gesture, Panel, RecordingSink, SwitchBindings,
};

const PROFILE: &str = include_str!("../../../profiles/qc_mini6.yaml");
const TICK: Duration = Duration::from_millis(10);

/// Feeds the dispatcher one tick at a time with a constant level per stretch.
struct Bench {
    dispatcher: Dispatcher,
    sink: RecordingSink,
    surface: RecordingSurface,
    base: Instant,
    elapsed: Duration,
    levels: Vec<bool>,
}

impl Bench {
    fn new(dispatcher: Dispatcher) -> Self {
        let levels = vec![false; dispatcher.switch_count()];
        Self {
            dispatcher,
            sink: RecordingSink::new(),
            surface: RecordingSurface::new(),
            base: Instant::now(),
            elapsed: Duration::ZERO,
            levels,
        }
    }

    fn run(&mut self, duration: Duration) {
        let end = self.elapsed + duration;
        while self.elapsed < end {
            self.dispatcher.tick(
                self.base + self.elapsed,
                &self.levels,
                &mut self.sink,
                &mut self.surface,
            );
            self.elapsed += TICK;
        }
    }

    fn press(&mut self, switch: usize, held: Duration) {
        self.levels[switch] = true;
        self.run(held);
        self.levels[switch] = false;
        self.run(TICK);
    }

    fn frames(&mut self) -> Vec<[u8; 3]> {
        self.sink.take()
    }
}

fn gig(value: bool) -> Predicate {
    Predicate::Equals {
        field: StateField::GigView,
        value: StateValue::Flag(value),
    }
}

fn single_switch(action: Box<dyn footswitch_core::Action>) -> Dispatcher {
    let mut dispatcher = Dispatcher::default();
    let id = dispatcher.add_action("only", action, Predicate::Always, true);
    dispatcher.add_switch(
        "key0",
        ClassifierConfig::from_millis(600, None),
        SwitchBindings {
            short: vec![id],
            ..SwitchBindings::default()
        },
    );
    dispatcher
}

#[test]
fn toggle_reports_state_after_each_activation() {
    let mut dispatcher = single_switch(Box::new(ToggleCc {
        channel: 0,
        field: FlagField::Tuner,
        cc: 45,
        text: "TUN".into(),
        color_on: Color::RED,
        color_off: Color::DARK_PURPLE,
        brightness: 0.3,
    }));
    let mut sink = RecordingSink::new();

    assert!(dispatcher.dispatch(0, Gesture::Short, &mut sink));
    assert!(dispatcher.state().tuner);
    assert!(dispatcher.dispatch(0, Gesture::Short, &mut sink));
    assert!(!dispatcher.state().tuner);
    assert_eq!(sink.take(), vec![[0xB0, 45, 127], [0xB0, 45, 0]]);
}

#[test]
fn page_swap_flips_and_reports_swap_value() {
    let mut dispatcher = single_switch(Box::new(PageSwap {
        channel: 0,
        field: PageField::QcPage,
        send_swap: true,
        label_prefix: "QP".into(),
        split_led: false,
        brightness: 0.25,
    }));
    let mut sink = RecordingSink::new();

    dispatcher.dispatch(0, Gesture::Short, &mut sink);
    assert_eq!(dispatcher.state().qc_page, 1);
    dispatcher.dispatch(0, Gesture::Short, &mut sink);
    assert_eq!(dispatcher.state().qc_page, 2);
    assert_eq!(sink.take(), vec![[0xB0, 64, 0], [0xB0, 64, 127]]);
}

#[test]
fn scene_step_wraps_at_modulus() {
    let mut dispatcher = single_switch(Box::new(SceneStep {
        channel: 0,
        step: 1,
        modulus: 8,
        cc: 43,
        color: Color::LIGHT_GREEN,
        brightness: 0.3,
    }));
    dispatcher.state_mut().scene_idx = 7;
    let mut sink = RecordingSink::new();

    dispatcher.dispatch(0, Gesture::Short, &mut sink);
    assert_eq!(dispatcher.state().scene_idx, 0);
    assert_eq!(sink.take(), vec![[0xB0, 43, 0]]);
}

#[test]
fn flipping_view_swaps_which_candidate_renders() {
    let mut dispatcher = Dispatcher::default();
    let chain = dispatcher.add_action(
        "chain",
        Box::new(FixedCc {
            channel: 0,
            cc: 35,
            value: 127,
            text: "A2".into(),
            color: Color::PINK,
            brightness: 0.3,
        }),
        gig(false),
        true,
    );
    let gig_slot = dispatcher.add_action(
        "gig",
        Box::new(FixedCc {
            channel: 0,
            cc: 39,
            value: 127,
            text: "AC".into(),
            color: Color::BLUE,
            brightness: 0.3,
        }),
        gig(true),
        true,
    );
    let toggle = dispatcher.add_action(
        "gig_toggle",
        Box::new(ToggleCc {
            channel: 0,
            field: FlagField::GigView,
            cc: 46,
            text: "GIG".into(),
            color_on: Color::GREEN,
            color_off: Color::DARK_GREEN,
            brightness: 0.3,
        }),
        Predicate::Always,
        true,
    );
    dispatcher.add_switch(
        "key0",
        ClassifierConfig::from_millis(600, None),
        SwitchBindings {
            short: vec![chain, gig_slot],
            ..SwitchBindings::default()
        },
    );
    dispatcher.add_switch(
        "key5",
        ClassifierConfig::from_millis(600, None),
        SwitchBindings {
            hold: vec![toggle],
            ..SwitchBindings::default()
        },
    );

    let mut before = RecordingSurface::new();
    dispatcher.refresh(&mut before);
    let before = before.calls_for(Display::Switch(0));

    let mut sink = RecordingSink::new();
    dispatcher.dispatch(1, Gesture::Hold, &mut sink);
    assert_eq!(sink.take(), vec![[0xB0, 46, 127]]);

    let mut after = RecordingSurface::new();
    dispatcher.refresh(&mut after);
    let after = after.calls_for(Display::Switch(0));

    assert_ne!(before, after);
    assert_eq!(before.len(), after.len());
    assert!(before.contains(&FeedbackCall::Text("A2".into())));
    assert!(!before.contains(&FeedbackCall::Text("AC".into())));
    assert!(after.contains(&FeedbackCall::Text("AC".into())));
    assert!(!after.contains(&FeedbackCall::Text("A2".into())));
}

#[test]
fn refresh_twice_without_change_is_identical() {
    let loaded = load_from_str(PROFILE).expect("profile");
    let dispatcher = Dispatcher::from_table(&loaded.table, &mut NoProbes);
    let mut first = RecordingSurface::new();
    let mut second = RecordingSurface::new();
    dispatcher.refresh(&mut first);
    dispatcher.refresh(&mut second);
    assert_eq!(first.take(), second.take());
}

fn shipped_bench() -> (Bench, Vec<String>) {
    let loaded = load_from_str(PROFILE).expect("profile");
    let ids = loaded
        .table
        .switches
        .iter()
        .map(|switch| switch.id.clone())
        .collect();
    (
        Bench::new(Dispatcher::from_table(&loaded.table, &mut NoProbes)),
        ids,
    )
}

fn switch_index(ids: &[String], id: &str) -> usize {
    ids.iter().position(|candidate| candidate == id).expect("switch id")
}

#[test]
fn shipped_profile_chain_and_gig_views() {
    let (mut bench, ids) = shipped_bench();
    let key0 = switch_index(&ids, "key0");
    let key5 = switch_index(&ids, "key5");

    // chain view short on key0 selects A on the internal MIDI page (2)
    bench.press(key0, Duration::from_millis(50));
    assert_eq!(bench.frames(), vec![[0xB0, 39, 127]]);

    // chain view hold on key0 toggles the tuner
    bench.press(key0, Duration::from_millis(700));
    assert_eq!(bench.frames(), vec![[0xB0, 45, 127]]);
    assert!(bench.dispatcher.state().tuner);

    // key5 hold enters gig view; key0 then targets the QC page
    bench.press(key5, Duration::from_millis(700));
    assert_eq!(bench.frames(), vec![[0xB0, 46, 127]]);
    bench.press(key0, Duration::from_millis(50));
    assert_eq!(bench.frames(), vec![[0xB0, 39, 127]]);
    // and hold addresses the opposite page
    bench.press(key0, Duration::from_millis(700));
    assert_eq!(bench.frames(), vec![[0xB0, 35, 127]]);
}

#[test]
fn shipped_profile_double_click_and_delayed_single() {
    let (mut bench, ids) = shipped_bench();
    let key2 = switch_index(&ids, "key2");

    // lone click cycles mode only after the window lapses
    bench.press(key2, Duration::from_millis(50));
    assert!(bench.frames().is_empty());
    assert!(bench.dispatcher.is_click_pending(key2));
    bench.run(Duration::from_millis(640));
    assert!(bench.frames().is_empty());
    bench.run(Duration::from_millis(80));
    assert_eq!(bench.frames(), vec![[0xB0, 47, 1]]);
    assert_eq!(bench.dispatcher.state().mode_slot, 1);

    // two quick clicks flip the style and never cycle the mode
    bench.press(key2, Duration::from_millis(50));
    bench.run(Duration::from_millis(100));
    bench.press(key2, Duration::from_millis(50));
    bench.run(Duration::from_millis(1000));
    assert!(bench.frames().is_empty());
    assert_eq!(bench.dispatcher.state().mode_slot, 1);
    assert_eq!(
        bench.dispatcher.state().gig_view_style,
        binding_format::ViewStyle::ShortOpposite
    );
}

#[test]
fn shipped_profile_click_then_hold_is_only_hold() {
    let (mut bench, ids) = shipped_bench();
    let key2 = switch_index(&ids, "key2");

    bench.press(key2, Duration::from_millis(50));
    bench.run(Duration::from_millis(200));
    // second press starts inside the window and outlasts the hold threshold
    bench.press(key2, Duration::from_millis(700));
    bench.run(Duration::from_millis(1000));

    assert_eq!(bench.frames(), vec![[0xB0, 64, 0]]);
    assert_eq!(bench.dispatcher.state().mode_slot, 0);
    assert_eq!(bench.dispatcher.state().qc_page, 1);
    assert!(!bench.dispatcher.is_click_pending(key2));
}

#[test]
fn pending_click_shows_on_mode_label() {
    let loaded = load_from_str(PROFILE).expect("profile");
    let ids: Vec<String> = loaded.table.switches.iter().map(|s| s.id.clone()).collect();
    let key2 = switch_index(&ids, "key2");
    let mut dispatcher = Dispatcher::from_table(&loaded.table, &mut NoProbes);
    let mut panel = Panel::new(ids.clone());
    let mut sink = RecordingSink::new();
    let base = Instant::now();

    let mut levels = vec![false; ids.len()];
    levels[key2] = true;
    dispatcher.tick(base, &levels, &mut sink, &mut panel);
    levels[key2] = false;
    dispatcher.tick(base + Duration::from_millis(50), &levels, &mut sink, &mut panel);
    assert_eq!(panel.switch_label(key2).map(|l| l.text.as_str()), Some("DBL?"));

    dispatcher.tick(base + Duration::from_millis(800), &levels, &mut sink, &mut panel);
    assert_eq!(panel.switch_label(key2).map(|l| l.text.as_str()), Some("SCN"));
    assert_eq!(panel.main().text, "CH\nSCN MP2 QP2");
}
