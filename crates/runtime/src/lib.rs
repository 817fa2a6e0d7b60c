//! Host-level primitives shared by every cohort session.
//!
//! Sessions coordinate through plain files in a runtime directory. The
//! helpers here keep those files consistent when several processes touch
//! them at once.

pub mod fs;
pub mod lock;
pub mod process;

pub use fs::{read_optional, write_atomic};
pub use lock::FileLock;
pub use process::pid_is_alive;
