//! End-to-end pipeline: six face photographs in, decorated solution out.

use serde::Serialize;
use tracing::{info, instrument};

use crate::acquisition::{AcquiredFace, FaceColorAcquirer};
use crate::errors::PipelineError;
use crate::ports::ImageUpload;
use crate::solver::{CubeSolver, SolveOutcome};
use crate::{CubeState, GridSource};

/// Faces acquired from photographs together with the solve attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub faces: Vec<AcquiredFace>,
    pub state: CubeState,
    pub outcome: SolveOutcome,
}

/// Composes face acquisition with solving.
#[derive(Clone)]
pub struct CubePipeline {
    acquirer: FaceColorAcquirer,
    solver: CubeSolver,
}

impl CubePipeline {
    pub fn new(acquirer: FaceColorAcquirer, solver: CubeSolver) -> Self {
        Self { acquirer, solver }
    }

    pub fn acquirer(&self) -> &FaceColorAcquirer {
        &self.acquirer
    }

    pub fn solver(&self) -> &CubeSolver {
        &self.solver
    }

    /// Acquires each face from its upload, assembles the cube and solves it.
    ///
    /// Faces are acquired one at a time in the order given. Every upload is
    /// released, including those left unread after an earlier face was
    /// rejected.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Acquisition`] for the first rejected upload.
    /// - [`PipelineError::Validation`] if the uploads do not cover all six
    ///   faces, or the assembled cube fails the solver's optional checks.
    #[instrument(skip_all, fields(uploads = uploads.len()))]
    pub async fn scan_and_solve(
        &self,
        uploads: Vec<(String, Box<dyn ImageUpload>)>,
    ) -> Result<ScanReport, PipelineError> {
        let mut faces = Vec::with_capacity(uploads.len());
        let mut first_error = None;
        for (face, mut upload) in uploads {
            if first_error.is_some() {
                upload.release().await;
                continue;
            }
            match self.acquirer.acquire_upload(upload.as_mut(), &face).await {
                Ok(acquired) => faces.push(acquired),
                Err(e) => first_error = Some(e),
            }
        }
        if let Some(e) = first_error {
            return Err(e.into());
        }

        let state = CubeState::from_faces(faces.iter().map(|a| (a.face, a.grid)))?;
        self.solver.check(&state)?;
        info!(
            fallback_faces = faces
                .iter()
                .filter(|a| !matches!(a.source, GridSource::Vision))
                .count(),
            "Cube assembled from photographs"
        );
        let outcome = self.solver.solve(&state).await;
        Ok(ScanReport {
            faces,
            state,
            outcome,
        })
    }
}
