//! Platform abstraction for the Ember runtime.
//!
//! The runtime never drives itself: it tells the host that work is pending
//! and the host decides when to call back in (an event-loop turn, a frame,
//! a test step).

/// Notified whenever a root wants a render pass or has queued tasks.
pub trait RuntimeScheduler {
    /// Request that the host schedule a new render/task turn.
    fn schedule_frame(&self);
}
