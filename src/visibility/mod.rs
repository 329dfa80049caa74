//! Overlay visibility driven by tracking events.

/// Gate binding visibility events to the overlay root.
pub mod gate;
