//! Session history for Oxpecker: the keyed session store and the
//! token-budget trimmer.
//!
//! Per-session history is read and appended atomically with respect to
//! concurrent turns on the same session; turns on different sessions
//! never block one another.

pub mod store;
pub mod trim;

pub use store::{SessionHandle, SessionInfo, SessionStore};
pub use trim::trim;
