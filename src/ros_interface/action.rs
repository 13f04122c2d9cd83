// src/ros_interface/action.rs
// Dock action server. Goals run the blocking docking loop on their own thread;
// the r2r goal handle stays on the executor thread and receives feedback and
// results from the docking thread over a channel.

use super::RosController;
use crate::navigation::{AbortReason, DockingFeedback, DockingGoal, FixedRate, TICK_PERIOD};
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::executor::LocalSpawner;
use futures::task::LocalSpawnExt;
use futures::stream::{self, PollNext};
use futures::{Stream, StreamExt};
use log::{debug, error, info, warn};
use r2r::irobot_create_msgs::action::Dock as DockAction;
use r2r::{ActionServerCancelRequest, ActionServerGoal, ActionServerGoalRequest};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// What the docking thread reports back to the goal handle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GoalEvent {
    /// Per-tick progress
    Feedback(DockingFeedback),
    /// Docked
    Succeeded,
    /// Gave up
    Aborted(AbortReason),
}

/// `DockingGoal` seen by the docking thread
pub struct ChannelGoal {
    active: Arc<AtomicBool>,
    events: UnboundedSender<GoalEvent>,
}

impl ChannelGoal {
    /// Wraps the active flag and the event channel of one goal
    pub fn new(active: Arc<AtomicBool>, events: UnboundedSender<GoalEvent>) -> Self {
        ChannelGoal { active, events }
    }

    fn emit(&self, event: GoalEvent) {
        // The goal handle is gone once the request was canceled.
        if self.events.unbounded_send(event).is_err() {
            debug!("Goal handle closed, dropping {:?}", event);
        }
    }
}

impl DockingGoal for ChannelGoal {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn publish_feedback(&self, feedback: DockingFeedback) {
        self.emit(GoalEvent::Feedback(feedback));
    }

    fn set_succeeded(&self) {
        self.emit(GoalEvent::Succeeded);
    }

    fn set_aborted(&self, reason: AbortReason) {
        self.emit(GoalEvent::Aborted(reason));
    }
}

enum Incoming<C> {
    Cancel(C),
    Event(GoalEvent),
}

// Docking events are always drained before cancel requests, so a result that
// is already queued is reported instead of being overtaken by a late cancel.
fn goal_inputs<E, C>(events: E, cancels: C) -> impl Stream<Item = Incoming<C::Item>> + Unpin
where
    E: Stream<Item = GoalEvent> + Unpin,
    C: Stream + Unpin,
{
    stream::select_with_strategy(
        events.map(Incoming::Event),
        cancels.map(Incoming::Cancel),
        |_: &mut ()| PollNext::Left,
    )
}

/// Accepts dock goals one at a time
pub async fn serve_goals<S>(mut requests: S, controller: Arc<RosController>, spawner: LocalSpawner)
where
    S: Stream<Item = ActionServerGoalRequest<DockAction::Action>> + Unpin,
{
    let busy = Arc::new(AtomicBool::new(false));

    while let Some(request) = requests.next().await {
        if busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Docking already in progress, rejecting new goal");
            if let Err(e) = request.reject() {
                error!("Failed to reject goal: {}", e);
            }
            continue;
        }

        let (goal, cancels) = match request.accept() {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to accept goal: {}", e);
                busy.store(false, Ordering::SeqCst);
                continue;
            }
        };

        let active = Arc::new(AtomicBool::new(true));
        let (tx, rx) = unbounded();

        let worker = {
            let controller = controller.clone();
            let busy = busy.clone();
            let docking_goal = ChannelGoal::new(active.clone(), tx);
            thread::Builder::new()
                .name("docking".to_string())
                .spawn(move || {
                    let mut rate = FixedRate::with_period(TICK_PERIOD);
                    let outcome = controller.begin_docking(&docking_goal, &mut rate);
                    info!("Docking finished: {:?}", outcome);
                    // Only released here: after a cancel the loop may still
                    // be inside its last period, and a second loop must not
                    // start next to it.
                    busy.store(false, Ordering::SeqCst);
                })
        };

        if let Err(e) = worker {
            error!("Failed to start docking thread: {}", e);
            busy.store(false, Ordering::SeqCst);
            let mut goal = goal;
            if let Err(e) = goal.abort(DockAction::Result { is_docked: false }) {
                error!("Failed to abort goal: {}", e);
            }
            continue;
        }

        let bridge = bridge_goal(goal, cancels, rx, active, controller.clone());
        if let Err(e) = spawner.spawn_local(bridge) {
            error!("Failed to spawn goal bridge: {}", e);
        }
    }
}

// Forwards docking events to the goal handle and turns cancel requests into
// a cleared active flag. Ends with the goal.
async fn bridge_goal<C>(
    mut goal: ActionServerGoal<DockAction::Action>,
    cancels: C,
    events: UnboundedReceiver<GoalEvent>,
    active: Arc<AtomicBool>,
    controller: Arc<RosController>,
) where
    C: Stream<Item = ActionServerCancelRequest> + Unpin,
{
    let mut incoming = goal_inputs(events, cancels);

    while let Some(item) = incoming.next().await {
        let result = match item {
            Incoming::Event(GoalEvent::Feedback(feedback)) => {
                let msg = DockAction::Feedback {
                    sees_dock: feedback.sees_dock,
                };
                if let Err(e) = goal.publish_feedback(msg) {
                    warn!("Failed to publish docking feedback: {}", e);
                }
                continue;
            }
            Incoming::Event(GoalEvent::Succeeded) => {
                goal.succeed(DockAction::Result { is_docked: true })
            }
            Incoming::Event(GoalEvent::Aborted(reason)) => {
                info!("GoDock aborting: {}", reason);
                goal.abort(DockAction::Result { is_docked: false })
            }
            Incoming::Cancel(request) => {
                request.accept();
                active.store(false, Ordering::SeqCst);
                let is_docked = controller.status().sensors.docked;
                goal.cancel(DockAction::Result { is_docked })
            }
        };
        if let Err(e) = result {
            error!("Failed to report docking result: {}", e);
        }
        break;
    }
}
