//! Scrolling screen capture.
//!
//! A [`CaptureSession`] repeatedly screenshots the device, swipes up and
//! compares each frame's digest with the previous one. A run of identical
//! frames means the list can't scroll further and ends the session.

pub mod errors;
pub mod session;
pub mod stop;
pub mod types;

pub use errors::CaptureError;
pub use session::CaptureSession;
pub use stop::{install_interrupt_handler, spawn_enter_listener, StopSignal};
pub use types::{
    plan_swipe, CapturedFrame, SessionEvent, SessionReport, SessionState, SessionTarget,
    StopReason,
};
