// src/ros_interface/subscriber.rs
// Sensor inputs for the docking controller: IR characters and dock contact.

use crate::core::BeaconReading;
use crate::DockError;
use futures::executor::LocalSpawner;
use futures::task::LocalSpawnExt;
use futures::{future, StreamExt};
use r2r::std_msgs::msg::{Bool, UInt8MultiArray};
use r2r::{Node, QosProfile, WrappedTypesupport};

/// Subscribes to `topic` and hands every message to `callback` on the
/// executor thread. The subscription lives as long as the executor.
pub fn subscribe_with<T, F>(
    node: &mut Node,
    spawner: &LocalSpawner,
    topic: &str,
    qos: QosProfile,
    mut callback: F,
) -> Result<(), DockError>
where
    T: WrappedTypesupport + 'static,
    F: FnMut(T) + 'static,
{
    let stream = node.subscribe::<T>(topic, qos)?;
    spawner
        .spawn_local(stream.for_each(move |msg| {
            callback(msg);
            future::ready(())
        }))
        .map_err(|e| DockError::RosError(format!("cannot spawn subscription on {}: {}", topic, e)))
}

/// Decodes an IR character frame, data = `[omni, left, right]`
pub fn beacon_from_msg(msg: &UInt8MultiArray) -> BeaconReading {
    BeaconReading::from_raw(&msg.data)
}

/// Dock contact state from a Bool message
pub fn docked_from_msg(msg: &Bool) -> bool {
    msg.data
}
