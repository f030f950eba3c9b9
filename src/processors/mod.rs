//! Data processing modules.

pub mod classification;
pub mod frames;

// Re-export key types for convenience
pub use classification::{classify, classify_point, Group, GroupMasks};
pub use frames::{AzimuthRange, AzimuthSequence, FrameError, MAX_FRAMES};
