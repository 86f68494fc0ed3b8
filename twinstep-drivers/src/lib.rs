//! Motor-driver backend implementations
//!
//! This crate provides concrete implementations of the
//! [`MotorOutputBackend`](twinstep_core::MotorOutputBackend) trait defined
//! in twinstep-core:
//!
//! - 4-motor robotics board (PCA9685-class PWM chip over I2C)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod board;

pub use board::{RoboticsBoard, DEFAULT_ADDRESS};
