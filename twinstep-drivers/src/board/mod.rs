//! Motor-driver board implementations

pub mod robotics;

pub use robotics::{RoboticsBoard, DEFAULT_ADDRESS};
