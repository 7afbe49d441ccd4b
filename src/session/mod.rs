//! Session state: per-key active persona and bounded turn history.

pub mod model;
pub mod store;

pub use model::{Role, Session, Turn};
pub use store::{InMemorySessionStore, SessionStore};
