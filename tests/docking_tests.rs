// End-to-end runs of the docking loop with a scripted clock.
//
// `ScriptedRate` stands in for the 10 Hz rate: every `sleep()` marks the end
// of a tick and applies the sensor updates planned for the next one, so the
// tests run instantly and deterministically.

use eos_dock::{
    AbortReason, BeaconCode, BeaconReading, DockingConfig, DockingController, DockingFeedback,
    DockingGoal, Outcome, TickRate, VelocityCommand, VelocitySink,
};
use rstest::rstest;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingSink {
    commands: Mutex<Vec<VelocityCommand>>,
}

impl RecordingSink {
    fn commands(&self) -> Vec<VelocityCommand> {
        self.commands.lock().unwrap().clone()
    }
}

impl VelocitySink for RecordingSink {
    fn send(&self, command: VelocityCommand) {
        self.commands.lock().unwrap().push(command);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Reported {
    Succeeded,
    Aborted(AbortReason),
}

struct RecordingGoal {
    active: AtomicBool,
    feedback: Mutex<Vec<DockingFeedback>>,
    reported: Mutex<Vec<Reported>>,
}

impl RecordingGoal {
    fn new() -> Self {
        RecordingGoal {
            active: AtomicBool::new(true),
            feedback: Mutex::new(Vec::new()),
            reported: Mutex::new(Vec::new()),
        }
    }

    fn cancel(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    fn reported(&self) -> Vec<Reported> {
        self.reported.lock().unwrap().clone()
    }

    fn feedback(&self) -> Vec<DockingFeedback> {
        self.feedback.lock().unwrap().clone()
    }
}

impl DockingGoal for RecordingGoal {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn publish_feedback(&self, feedback: DockingFeedback) {
        self.feedback.lock().unwrap().push(feedback);
    }

    fn set_succeeded(&self) {
        self.reported.lock().unwrap().push(Reported::Succeeded);
    }

    fn set_aborted(&self, reason: AbortReason) {
        self.reported.lock().unwrap().push(Reported::Aborted(reason));
    }
}

type Controller = DockingController<Arc<RecordingSink>>;

/// Update applied between two ticks
#[derive(Debug, Clone, Copy)]
enum Step {
    Beacon(BeaconReading),
    Docked(bool),
    Cancel,
    Nothing,
}

struct ScriptedRate {
    controller: Arc<Controller>,
    goal: Arc<RecordingGoal>,
    script: VecDeque<Step>,
    sleeps: usize,
    saw_running: bool,
}

impl ScriptedRate {
    fn new(controller: Arc<Controller>, goal: Arc<RecordingGoal>, script: Vec<Step>) -> Self {
        ScriptedRate {
            controller,
            goal,
            script: script.into(),
            sleeps: 0,
            saw_running: false,
        }
    }
}

impl TickRate for ScriptedRate {
    fn sleep(&mut self) {
        self.sleeps += 1;
        assert!(self.sleeps < 1_000, "docking loop never terminated");
        self.saw_running |= self.controller.is_running();

        match self.script.pop_front().unwrap_or(Step::Nothing) {
            Step::Beacon(reading) => self.controller.on_beacon_update(reading),
            Step::Docked(docked) => self.controller.on_dock_status_update(docked),
            Step::Cancel => self.goal.cancel(),
            Step::Nothing => {}
        }
    }
}

struct Harness {
    sink: Arc<RecordingSink>,
    goal: Arc<RecordingGoal>,
    controller: Arc<Controller>,
}

impl Harness {
    fn new(config: DockingConfig) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let sink = Arc::new(RecordingSink::default());
        let controller = Arc::new(DockingController::new(sink.clone(), &config));
        Harness {
            sink,
            goal: Arc::new(RecordingGoal::new()),
            controller,
        }
    }

    fn run(&self, script: Vec<Step>) -> (Outcome, ScriptedRate) {
        let mut rate = ScriptedRate::new(self.controller.clone(), self.goal.clone(), script);
        let outcome = self.controller.begin_docking(&*self.goal, &mut rate);
        (outcome, rate)
    }
}

fn silent() -> Step {
    Step::Beacon(BeaconReading::default())
}

fn beacon(omni: BeaconCode, left: BeaconCode, right: BeaconCode) -> Step {
    Step::Beacon(BeaconReading::new(omni, left, right))
}

const RED_LEFT: VelocityCommand = VelocityCommand::new(0.05, 0.1);
const CENTERED: VelocityCommand = VelocityCommand::new(0.05, 0.0);

#[test]
fn sustained_silence_aborts_after_ten_ticks() {
    let harness = Harness::new(DockingConfig::default());

    let (outcome, rate) = harness.run(vec![]);

    assert_eq!(outcome, Outcome::Aborted(AbortReason::SignalLost));
    assert_eq!(rate.sleeps, 9);
    assert_eq!(harness.sink.commands(), vec![VelocityCommand::STOP]);
    assert_eq!(harness.goal.reported(), vec![Reported::Aborted(AbortReason::SignalLost)]);
    assert!(harness.goal.feedback().iter().all(|f| !f.sees_dock));
    assert!(!harness.controller.is_running());
}

#[test]
fn counter_restarts_after_an_interruption() {
    use BeaconCode::*;
    let harness = Harness::new(DockingConfig::default());

    // Tick 1 is silent from the initial state; ticks 2..=9 silent, tick 10
    // sees the red buoy, ticks 11..=20 silent.
    let mut script: Vec<Step> = (2..=9).map(|_| silent()).collect();
    script.push(beacon(NoSignal, RedBuoy, NoSignal));
    script.extend((11..=20).map(|_| silent()));

    let (outcome, rate) = harness.run(script);

    assert_eq!(outcome, Outcome::Aborted(AbortReason::SignalLost));
    // Aborts on tick 20, so 19 sleeps happened before it.
    assert_eq!(rate.sleeps, 19);
    assert_eq!(harness.sink.commands(), vec![RED_LEFT, VelocityCommand::STOP]);

    let feedback = harness.goal.feedback();
    assert_eq!(feedback.len(), 19);
    assert_eq!(feedback[8].no_signal_ticks, 9);
    assert_eq!(feedback[9], DockingFeedback { sees_dock: true, no_signal_ticks: 0 });
    assert_eq!(feedback[18].no_signal_ticks, 9);
}

#[test]
fn docking_contact_ends_with_success() {
    use BeaconCode::*;
    let harness = Harness::new(DockingConfig::default());

    let script = vec![
        beacon(ForceField, RedBuoyGreenBuoy, RedBuoyGreenBuoy),
        beacon(ForceField, RedBuoyGreenBuoyForceField, RedBuoyGreenBuoyForceField),
        Step::Docked(true),
    ];
    let (outcome, rate) = harness.run(script);

    assert_eq!(outcome, Outcome::Succeeded);
    assert_eq!(rate.sleeps, 3);
    assert!(rate.saw_running);
    // Tick 1 is silent and unmatched, so nothing is sent.
    assert_eq!(
        harness.sink.commands(),
        vec![CENTERED, CENTERED, VelocityCommand::STOP]
    );
    assert_eq!(harness.goal.reported(), vec![Reported::Succeeded]);
    assert!(!harness.controller.is_running());
}

#[test]
fn already_docked_succeeds_on_first_tick() {
    let harness = Harness::new(DockingConfig::default());
    harness.controller.on_dock_status_update(true);

    let (outcome, rate) = harness.run(vec![]);

    assert_eq!(outcome, Outcome::Succeeded);
    assert_eq!(rate.sleeps, 0);
    assert_eq!(harness.sink.commands(), vec![VelocityCommand::STOP]);
}

#[rstest]
#[case::reference_behavior(false, vec![RED_LEFT, RED_LEFT])]
#[case::stop_on_cancel(true, vec![RED_LEFT, RED_LEFT, VelocityCommand::STOP])]
fn cancel_reports_nothing(#[case] stop_on_cancel: bool, #[case] expected: Vec<VelocityCommand>) {
    use BeaconCode::*;
    let harness = Harness::new(DockingConfig { stop_on_cancel });
    harness.controller.on_beacon_update(BeaconReading::new(NoSignal, RedBuoy, NoSignal));

    let script = vec![Step::Nothing, Step::Cancel, Step::Docked(true)];
    let (outcome, rate) = harness.run(script);

    assert_eq!(outcome, Outcome::Canceled);
    assert_eq!(rate.sleeps, 2);
    assert_eq!(harness.sink.commands(), expected);
    assert!(harness.goal.reported().is_empty());
    assert!(!harness.controller.is_running());
}

#[test]
fn canceled_before_start_sends_nothing() {
    let harness = Harness::new(DockingConfig::default());
    harness.goal.cancel();

    let (outcome, rate) = harness.run(vec![]);

    assert_eq!(outcome, Outcome::Canceled);
    assert_eq!(rate.sleeps, 0);
    assert!(harness.sink.commands().is_empty());
    assert!(harness.goal.feedback().is_empty());
}

#[test]
fn coasts_between_matching_readings() {
    use BeaconCode::*;
    let harness = Harness::new(DockingConfig::default());
    harness.controller.on_beacon_update(BeaconReading::new(NoSignal, NoSignal, GreenBuoy));

    let script = vec![
        beacon(RedBuoyGreenBuoy, NoSignal, NoSignal),
        beacon(VirtualWall, VirtualWall, VirtualWall),
        Step::Docked(true),
    ];
    let (outcome, _) = harness.run(script);

    assert_eq!(outcome, Outcome::Succeeded);
    assert_eq!(
        harness.sink.commands(),
        vec![VelocityCommand::new(0.05, -0.1), VelocityCommand::STOP]
    );
    assert!(harness.goal.feedback().iter().all(|f| f.sees_dock));
}

#[test]
fn a_new_request_starts_with_a_fresh_counter() {
    let harness = Harness::new(DockingConfig::default());

    let (first, _) = harness.run(vec![]);
    assert_eq!(first, Outcome::Aborted(AbortReason::SignalLost));

    let goal = Arc::new(RecordingGoal::new());
    let mut rate = ScriptedRate::new(harness.controller.clone(), goal.clone(), vec![]);
    let second = harness.controller.begin_docking(&*goal, &mut rate);

    assert_eq!(second, Outcome::Aborted(AbortReason::SignalLost));
    assert_eq!(rate.sleeps, 9);
}

#[test]
fn updates_outside_a_request_are_kept_for_the_next_one() {
    use BeaconCode::*;
    let harness = Harness::new(DockingConfig::default());
    assert!(!harness.controller.is_running());

    harness.controller.on_beacon_update(BeaconReading::new(NoSignal, RedBuoyGreenBuoy, RedBuoyGreenBuoy));
    let status = harness.controller.status();
    assert!(!status.running);
    assert_eq!(status.sensors.beacon.left, RedBuoyGreenBuoy);
    assert!(harness.sink.commands().is_empty());

    let (outcome, _) = harness.run(vec![Step::Docked(true)]);
    assert_eq!(outcome, Outcome::Succeeded);
    assert_eq!(harness.sink.commands(), vec![CENTERED, VelocityCommand::STOP]);
}

#[test]
fn sensor_updates_from_other_threads_reach_the_loop() {
    use BeaconCode::*;
    let harness = Harness::new(DockingConfig::default());
    harness.controller.on_beacon_update(BeaconReading::new(ForceField, NoSignal, NoSignal));

    let controller = harness.controller.clone();
    let goal = harness.goal.clone();
    let worker = std::thread::spawn(move || {
        let mut rate = eos_dock::FixedRate::with_period(std::time::Duration::from_millis(5));
        controller.begin_docking(&*goal, &mut rate)
    });

    while !harness.controller.is_running() {
        std::thread::yield_now();
    }
    harness.controller.on_dock_status_update(true);

    assert_eq!(worker.join().unwrap(), Outcome::Succeeded);
    assert_eq!(harness.goal.reported(), vec![Reported::Succeeded]);
}
