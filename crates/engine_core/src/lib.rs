//! Core engine types shared by the terrain crates.
//!
//! This crate provides the foundational types used across the workspace:
//! - Frame clock driving the per-frame terrain update
//! - Transform used for tile placement and the camera

pub mod time;
pub mod transform;

pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
