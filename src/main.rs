// src/main.rs
// Entry point for the Eos docking action node.
//
// Usage: eos-dock [ACTION_NAME] [CONFIG.yaml]

use eos_dock::ros_interface::RosInterface;
use eos_dock::DockConfig;
use log::{error, info};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let action_name = args.next();
    let mut config = match args.next() {
        Some(path) => DockConfig::load(&path)?,
        None => DockConfig::default(),
    };
    if let Some(name) = action_name {
        config.ros.action_name = name;
    }

    info!("Starting Eos dock action '{}'...", config.ros.action_name);
    let mut interface = RosInterface::new(&config).map_err(|e| {
        error!("Failed to start ROS interface: {}", e);
        e
    })?;

    interface.run()?;
    Ok(())
}
