//! Core domain for cube solving.
//!
//! This crate turns a submitted (or photographed) Rubik's cube into a solution
//! split into readable phases. Solving and color recognition are external
//! oracles reached through the port traits in [`ports`]; infrastructure crates
//! implement those traits and never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | `FaceId`, `SolveRunId` |
//! | [`types`] | `Color`, `FaceGrid`, `CubeState`, `FaceletString`, `MoveToken`, `MoveSequence` |
//! | [`errors`] | Per-component error enums |
//! | [`validation`] | Raw submission → `CubeState` |
//! | [`notation`] | Facelet encoding and move token decoding |
//! | [`moves`] | Per-move axis/direction/layer metadata |
//! | [`phases`] | Proportional Cross/F2L/OLL/PLL segmentation |
//! | [`ports`] | `SolvingOracle`, `VisionOracle`, `ImageUpload` |
//! | [`acquisition`] | Face color acquisition with fallback |
//! | [`solver`] | Oracle delegation and solve outcomes |
//! | [`orchestrator`] | Photographs-to-solution pipeline |

pub mod acquisition;
pub mod errors;
pub mod identifiers;
pub mod moves;
pub mod notation;
pub mod orchestrator;
pub mod phases;
pub mod ports;
pub mod solver;
pub mod types;
pub mod validation;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use acquisition::{
    AcquiredFace, FaceColorAcquirer, FallbackGrid, GridSource, RandomGrid, SeededGrid,
    UploadPolicy,
};
pub use errors::{AcquisitionError, OracleError, PipelineError, ValidationError, VisionError};
pub use identifiers::{FaceId, SolveRunId};
pub use moves::{Axis, LayerSelector, MoveDetail};
pub use orchestrator::{CubePipeline, ScanReport};
pub use phases::{Phase, PhaseKind};
pub use ports::{ImageUpload, InMemoryImage, SolvingOracle, VisionOracle, VisionRequest};
pub use solver::{CubeSolver, Solution, SolveOutcome};
pub use types::{Color, CubeState, FaceGrid, FaceletString, MoveSequence, MoveToken, Turn};
pub use validation::{check_options, validate, validate_with, ValidationOptions};
