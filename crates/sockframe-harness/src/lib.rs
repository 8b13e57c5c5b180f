//! Deterministic simulation and end-to-end scenario tests for the sockframe
//! protocol stack.
//!
//! The [`sim_env`] module provides a seeded [`sockframe_core::Environment`]
//! for reproducible unit-level tests. The `tests/` directory holds
//! whole-stack scenarios (real TCP loopback, real `sockframe-server` and
//! `sockframe-client`) and `turmoil`-driven wire-level resync tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod sim_env;

pub use sim_env::SimEnv;
