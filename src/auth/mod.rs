// src/auth/mod.rs
//
// Login gate in front of the reports. Nothing here reaches the forecast itself;
// the server only asks whether a request carries a live session.

pub mod credentials;
pub mod session;

pub use credentials::{CredentialStore, JsonCredentialStore, Registration};
pub use session::{InMemorySessionStore, SessionStore};
