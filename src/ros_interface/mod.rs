//! ROS 2 interface for Eos Dock
//!
//! This module wires the docking controller to ROS 2:
//! - IR characters and dock contact come in on topics
//! - velocity commands go out on `/cmd_vel`
//! - docking requests arrive through the `Dock` action server

mod action;
mod publisher;
mod subscriber;

pub use action::{serve_goals, ChannelGoal, GoalEvent};
pub use publisher::{to_twist, CmdVelPublisher};
pub use subscriber::{beacon_from_msg, docked_from_msg, subscribe_with};

use crate::navigation::DockingController;
use crate::{DockConfig, DockError};
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use r2r::irobot_create_msgs::action::Dock as DockAction;
use r2r::std_msgs::msg::{Bool, UInt8MultiArray};
use r2r::{Context, Node, QosProfile};
use std::sync::Arc;
use std::time::Duration;

/// Controller publishing straight to `/cmd_vel`
pub type RosController = DockingController<CmdVelPublisher>;

/// ROS 2 interface manager
pub struct RosInterface {
    node: Node,
    pool: LocalPool,
    controller: Arc<RosController>,
}

impl RosInterface {
    /// Creates the node, its topics and the action server
    pub fn new(config: &DockConfig) -> Result<Self, DockError> {
        let ros = &config.ros;
        let context = Context::create()?;
        let mut node = Node::create(context, &ros.node_name, &ros.namespace)?;
        let qos = QosProfile::default().keep_last(ros.qos_depth);

        let cmd_vel = CmdVelPublisher::new(&mut node, &ros.cmd_vel_topic, qos.clone())?;
        let controller = Arc::new(DockingController::new(cmd_vel, &config.docking));

        let pool = LocalPool::new();
        let spawner = pool.spawner();

        let beacon_controller = controller.clone();
        subscribe_with::<UInt8MultiArray, _>(&mut node, &spawner, &ros.ir_topic, qos.clone(), move |msg| {
            beacon_controller.on_beacon_update(beacon_from_msg(&msg));
        })?;

        let dock_controller = controller.clone();
        subscribe_with::<Bool, _>(&mut node, &spawner, &ros.dock_topic, qos, move |msg| {
            dock_controller.on_dock_status_update(docked_from_msg(&msg));
        })?;

        let requests = node.create_action_server::<DockAction::Action>(&ros.action_name)?;
        spawner
            .spawn_local(serve_goals(requests, controller.clone(), spawner.clone()))
            .map_err(|e| DockError::RosError(format!("cannot spawn action server: {}", e)))?;

        log::info!(
            "Dock action '{}' ready (ir: {}, dock: {}, cmd_vel: {})",
            ros.action_name,
            ros.ir_topic,
            ros.dock_topic,
            ros.cmd_vel_topic
        );

        Ok(RosInterface {
            node,
            pool,
            controller,
        })
    }

    /// Processes pending ROS traffic once
    pub fn spin_once(&mut self, timeout: Duration) {
        self.node.spin_once(timeout);
        self.pool.run_until_stalled();
    }

    /// Spins until the process is stopped
    pub fn run(&mut self) -> Result<(), DockError> {
        loop {
            self.spin_once(Duration::from_millis(10));
        }
    }

    /// The controller driven by this interface
    pub fn controller(&self) -> &Arc<RosController> {
        &self.controller
    }
}
