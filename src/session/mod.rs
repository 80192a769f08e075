//! Browser sessions: in-memory token store, signed cookie, idle sweep.

pub mod cookie;
pub mod store;
pub mod sweeper;

pub use store::{Session, SessionStore};
pub use sweeper::sweep_daemon;
