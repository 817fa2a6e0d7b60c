//! Wire types for the cohort inter-session protocol.
//!
//! Sessions talk to each other with newline-delimited JSON over per-session
//! Unix sockets. This crate holds the shapes of that traffic and of the
//! artifacts sessions hand to each other through the runtime directory
//! (view snapshots, buffer listings).
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond validation and serialization
//! * Typed: every remote operation is an operation tag plus structured fields,
//!   never a string-templated expression
//! * Stable: Changes only when the wire protocol changes
//!
//! Session orchestration is built on top of these types in `cohort-cli`.

pub mod history;
pub mod message;
pub mod types;

pub use history::*;
pub use message::*;
pub use types::*;
