//! External solver binary adapter.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use pipeline::{FaceletString, OracleError, SolvingOracle};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::SolverServiceError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A [`SolvingOracle`] that runs a solver program once per cube.
///
/// The program is invoked as `program [args...] <facelets>`. Exit status zero
/// means solved and stdout holds the moves. Any other status is a solve
/// failure whose message is the trimmed stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSolvingOracle {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandSolvingOracle {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Splits a whitespace-separated command line into program and arguments.
    ///
    /// No shell quoting is interpreted.
    pub fn from_command_line(line: &str) -> Result<Self, SolverServiceError> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| {
            SolverServiceError::Misconfiguration("Solver command is empty".to_string())
        })?;
        Ok(Self::new(program, parts.collect()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[async_trait]
impl SolvingOracle for CommandSolvingOracle {
    fn name(&self) -> &str {
        "command"
    }

    async fn solve(&self, facelets: &FaceletString) -> Result<String, OracleError> {
        debug!(oracle = "command", program = %self.program, facelets = %facelets, "Running solver");

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(facelets.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                OracleError::unavailable(format!("Failed to start solver '{}': {e}", self.program))
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                OracleError::unavailable(format!("Solver timed out after {:?}", self.timeout))
            })?
            .map_err(|e| OracleError::unavailable(format!("Solver I/O error: {e}")))?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!(oracle = "command", status = %output.status, "Solver exited unsuccessfully");
        if stderr.is_empty() {
            Err(OracleError::solve_failure(format!(
                "Solver exited with {}",
                output.status
            )))
        } else {
            Err(OracleError::solve_failure(stderr))
        }
    }
}
