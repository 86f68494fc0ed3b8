//! Configuration types
//!
//! Axis configuration plus a board-level configuration record that can be
//! stored as postcard binary data.

pub mod axis;
pub mod types;

pub use axis::*;
pub use types::*;
