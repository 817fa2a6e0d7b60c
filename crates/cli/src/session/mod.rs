//! Session identity, registration and the per-session command layer.
//!
//! A session publishes an endpoint descriptor, lists its id in the host-wide
//! registry and answers peers on its socket until it shuts down.

/// User command lines and their status messages.
pub mod command;
/// Endpoint descriptors naming each session's socket and pid.
pub mod endpoint;
/// The running session and its request handling.
pub mod manager;
/// Host-wide registry of session ids.
pub mod registry;

pub use command::{CommandStatus, SessionCommand};
pub use endpoint::{EndpointStore, SessionEndpoint};
pub use manager::{Liveness, Peer, Session};
pub use registry::SessionRegistry;
