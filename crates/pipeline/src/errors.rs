//! Error types for the cube solve domain.
//!
//! Each component owns a small error enum so that its failure modes are part
//! of its contract:
//!
//! - [`ValidationError`]: a submitted cube is rejected; never retried.
//! - [`OracleError`]: the solving oracle failed; surfaced to the caller as an
//!   unsuccessful [`crate::SolveOutcome`], not as a fatal error.
//! - [`VisionError`]: the vision oracle failed or replied with something
//!   unusable. Always absorbed by the acquirer's fallback.
//! - [`AcquisitionError`]: the acquisition request itself is unacceptable.
//!
//! None of these are fatal to the hosting process.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Color, FaceId};

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reasons a submitted cube state is rejected before solving.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    /// One of the six faces is absent from the submission.
    #[error("Missing face {face} in cube state")]
    MissingFace {
        /// The first absent face, in U, R, F, D, L, B order.
        face: FaceId,
    },

    /// A face is not exactly three rows of exactly three cells.
    #[error("Invalid data for face {face}: expected a 3x3 grid")]
    MalformedGrid { face: FaceId },

    /// A cell is not one of the six recognised colors.
    #[error("Invalid color detected on face {face}: {value}")]
    InvalidColor {
        face: FaceId,
        /// The offending cell as submitted.
        value: String,
    },

    /// The colors do not each appear exactly nine times.
    ///
    /// Only produced when the balanced-color check is enabled in
    /// [`crate::ValidationOptions`].
    #[error("Color {color} appears {count} times; every color must appear exactly 9 times")]
    UnbalancedColors { color: Color, count: usize },
}

// ---------------------------------------------------------------------------
// Oracles
// ---------------------------------------------------------------------------

/// A solving oracle could not produce a move sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum OracleError {
    /// The oracle rejected the facelets or failed while searching.
    #[error("{message}")]
    SolveFailure {
        /// The oracle's own message, passed through unchanged.
        message: String,
    },

    /// The oracle could not be reached or its reply could not be read.
    #[error("Solver unavailable: {message}")]
    Unavailable { message: String },
}

impl OracleError {
    /// Builds an [`OracleError::SolveFailure`] from the oracle's message.
    pub fn solve_failure(message: impl Into<String>) -> Self {
        Self::SolveFailure {
            message: message.into(),
        }
    }

    /// Builds an [`OracleError::Unavailable`] describing why the oracle could not be used.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// A vision oracle call that did not yield a usable grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisionError {
    /// The oracle call itself failed (transport, auth, quota, empty reply).
    #[error("Vision request failed: {0}")]
    VisionFailure(String),

    /// The oracle replied, but the reply is not a 3x3 grid of known colors.
    #[error("Vision response could not be used: {0}")]
    MalformedVisionResponse(String),
}

// ---------------------------------------------------------------------------
// Acquisition
// ---------------------------------------------------------------------------

/// Reasons a face acquisition request is refused outright.
///
/// Oracle failures are not listed here: acquisition falls back instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquisitionError {
    /// The face identifier is not one of U, R, F, D, L, B.
    #[error("Invalid face identifier: {0}")]
    UnsupportedFace(String),

    /// The upload exceeds the configured size limit.
    #[error("Image too large ({size} bytes, max {limit} bytes)")]
    ImageTooLarge { size: u64, limit: u64 },

    /// The upload's file extension is not an accepted image format.
    #[error("Invalid file format '{extension}'. Only JPG and PNG are supported.")]
    UnsupportedFormat { extension: String },
}

// ---------------------------------------------------------------------------
// Pipeline-level errors
// ---------------------------------------------------------------------------

/// Errors that stop a photographs-to-solution run before the solver is asked.
///
/// A failed solve is not listed: it is reported as an unsuccessful
/// [`crate::SolveOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// An upload was refused.
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    /// The acquired faces do not form a complete cube.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
