//! Cube solving oracle adapters.
//!
//! Implements the [`pipeline::SolvingOracle`] trait over two transports:
//!
//! - [`HttpSolvingOracle`]: a JSON request/response solver service.
//! - [`CommandSolvingOracle`]: an external solver binary that receives the
//!   facelet string as its last argument and prints the moves on stdout.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport, framing, and process management live here.
//! The [`pipeline`] crate sees only [`pipeline::SolvingOracle`] and
//! [`pipeline::OracleError`].
//!
//! ## Error mapping
//!
//! A solver that answers but cannot solve the cube yields
//! [`pipeline::OracleError::SolveFailure`] carrying the solver's own message.
//! A solver that cannot be reached, times out, or answers with something
//! unreadable yields [`pipeline::OracleError::Unavailable`].

mod command;
mod http;

pub use command::CommandSolvingOracle;
pub use http::{HttpSolvingOracle, SolveRequest, SolveResponse};

use thiserror::Error;

/// Errors raised while constructing an adapter.
#[derive(Debug, Error)]
pub enum SolverServiceError {
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),
}
