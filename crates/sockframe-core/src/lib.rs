//! Session driver core: the message pipeline, the session state machine,
//! and the `Environment` abstraction that lets both run deterministically
//! under simulation.
//!
//! Nothing in this crate touches a socket. `sockframe-server` and
//! `sockframe-client` own the actual I/O and execute the
//! [`connection::SessionAction`]s this crate's state machine returns.

pub mod config;
pub mod connection;
pub mod env;
pub mod error;
pub mod pipeline;

pub use config::Config;
pub use connection::{Connection, SessionAction, SessionState};
pub use env::{Environment, SystemEnv};
pub use error::{ConnectionError, PipelineError};
