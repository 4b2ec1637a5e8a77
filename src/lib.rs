//! Per-frame finger-state classification over 21-point hand skeletons.
//!
//! An external hand-pose detector reports normalized landmark coordinates
//! for each hand it sees in a video frame; this crate decides which fingers
//! are extended versus folded and draws the annotated overlay. The
//! classification core is pure and carries no state between frames. Capture,
//! detection and display stay behind the [`driver::FrameSource`] and
//! [`driver::FrameSink`] seams; [`replay`] ships implementations that work
//! from a recording instead of live hardware.

pub mod classifier;
pub mod driver;
pub mod frame;
pub mod hand;
pub mod overlay;
pub mod replay;

pub use classifier::{FingerClassifier, FingerId, FingerState, HandResult, Policy};
pub use frame::{FrameResult, HandError};
pub use hand::{HandSkeleton, InvalidSkeleton};
