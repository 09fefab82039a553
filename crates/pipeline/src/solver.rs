//! Solving: facelet encoding, oracle delegation, and phase decoration.

use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::errors::{OracleError, ValidationError};
use crate::notation::encode;
use crate::phases::{segment, Phase};
use crate::ports::SolvingOracle;
use crate::validation::{check_options, validate_with, ValidationOptions};
use crate::{CubeState, FaceletString, MoveSequence, SolveRunId};

/// A successful solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub moves: MoveSequence,
    pub phases: Vec<Phase>,
}

/// The result of asking the oracle to solve a cube.
///
/// Oracle failure is an ordinary outcome here, not an `Err`: the caller gets
/// an unsuccessful result carrying the oracle's message.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Solved(Solution),
    Failed { error: String },
}

impl SolveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Solved(_))
    }
}

impl Serialize for SolveOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Solved(solution) => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("solution", &solution.moves.to_string())?;
                map.serialize_entry("steps", &solution.phases)?;
                map.serialize_entry("movesCount", &solution.moves.len())?;
                map.end()
            }
            Self::Failed { error } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}

/// Solves cube states through an injected [`SolvingOracle`].
#[derive(Clone)]
pub struct CubeSolver {
    oracle: Arc<dyn SolvingOracle>,
    options: ValidationOptions,
}

impl CubeSolver {
    pub fn new(oracle: Arc<dyn SolvingOracle>) -> Self {
        Self {
            oracle,
            options: ValidationOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    /// Applies this solver's [`ValidationOptions`] to an already assembled cube.
    ///
    /// [`Self::solve_raw`] runs the same checks as part of validation; callers
    /// that build a [`CubeState`] themselves call this before [`Self::solve`].
    ///
    /// # Errors
    ///
    /// [`ValidationError::UnbalancedColors`] when the balanced-color check is
    /// enabled and fails.
    pub fn check(&self, state: &CubeState) -> Result<(), ValidationError> {
        check_options(state, self.options)
    }

    /// Passes the facelets to the oracle unchanged and splits its reply into
    /// move tokens. No retries.
    pub async fn request_moves(&self, facelets: &FaceletString) -> Result<MoveSequence, OracleError> {
        let reply = self.oracle.solve(facelets).await?;
        Ok(MoveSequence::from_solution(&reply))
    }

    /// Solves a validated cube.
    #[instrument(skip_all, fields(run = %SolveRunId::new_random(), oracle = self.oracle.name()))]
    pub async fn solve(&self, state: &CubeState) -> SolveOutcome {
        let facelets = encode(state);
        match self.request_moves(&facelets).await {
            Ok(moves) => {
                info!(moves = moves.len(), "Cube solved");
                let phases = segment(&moves);
                SolveOutcome::Solved(Solution { moves, phases })
            }
            Err(e) => {
                warn!(error = %e, facelets = %facelets, "Solver failed");
                SolveOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Validates a raw submission, then solves it.
    ///
    /// # Errors
    ///
    /// Any [`ValidationError`]; the oracle is not consulted in that case.
    pub async fn solve_raw(&self, raw: &Value) -> Result<SolveOutcome, ValidationError> {
        let state = validate_with(raw, self.options)?;
        Ok(self.solve(&state).await)
    }
}
