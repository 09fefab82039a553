//! Subcommand definitions and handlers.
//!
//! Every handler prints a single JSON document on stdout and returns the
//! process exit status: `0` on success, `1` when the solver could not solve
//! the cube, `2` when the request itself was rejected.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use llm::GeminiVisionOracle;
use pipeline::{
    CubePipeline, CubeSolver, FaceColorAcquirer, FaceGrid, FaceId, FallbackGrid, GridSource,
    ImageUpload, RandomGrid, SeededGrid, SolveOutcome, VisionOracle,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::config::CliConfig;
use crate::upload::FileUpload;

/// cubesolve - solve a Rubik's cube from its colors or from photographs of its faces
#[derive(Debug, Parser)]
#[command(name = "cubesolve", version)]
#[command(long_about = r#"
Solves a 3x3 Rubik's cube and explains the solution in four phases
(Cross, F2L, OLL, PLL).

EXAMPLES:
  # Solve a cube described as JSON ({"U": [[..],[..],[..]], "R": ...})
  cubesolve solve --state cube.json

  # Read the sticker colors of one face from a photograph
  cubesolve scan --face F --image front.jpg

  # Photograph all six faces, then solve
  cubesolve scan-solve --image U=up.jpg --image R=right.jpg --image F=front.jpg \
                       --image D=down.jpg --image L=left.jpg --image B=back.jpg

CONFIGURATION:
  Settings are read from --config (default ./cubesolve.toml if present), then
  overridden by GEMINI_API_KEY, GEMINI_MODEL, GEMINI_BASE_URL,
  CUBESOLVE_SOLVER_URL, CUBESOLVE_SOLVER_COMMAND and OTEL_EXPORTER_OTLP_ENDPOINT.
"#)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate and solve a cube state read from a JSON file (`-` for stdin)
    Solve {
        #[arg(long)]
        state: PathBuf,
    },

    /// Read the sticker colors of one face from a photograph
    Scan {
        /// Face identifier: U, R, F, D, L or B
        #[arg(long)]
        face: String,

        #[arg(long)]
        image: PathBuf,

        /// Delete the image once it has been read
        #[arg(long)]
        remove_after: bool,
    },

    /// Read all six faces from photographs and solve the resulting cube
    ScanSolve {
        /// FACE=PATH, once per face
        #[arg(long = "image", value_parser = parse_face_image, required = true)]
        images: Vec<(String, PathBuf)>,

        /// Delete the images once they have been read
        #[arg(long)]
        remove_after: bool,
    },
}

fn parse_face_image(arg: &str) -> Result<(String, PathBuf), String> {
    let (face, path) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected FACE=PATH, got '{arg}'"))?;
    if path.is_empty() {
        return Err(format!("missing image path for face '{face}'"));
    }
    Ok((face.to_string(), PathBuf::from(path)))
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

fn build_solver(config: &CliConfig) -> Result<CubeSolver> {
    let oracle = config.solver_backend()?.build()?;
    info!(oracle = oracle.name(), "Solver configured");
    Ok(CubeSolver::new(oracle).with_options(config.validation))
}

fn build_acquirer(config: &CliConfig) -> Result<FaceColorAcquirer> {
    let vision: Option<Arc<dyn VisionOracle>> = match config.gemini_config() {
        Some(gemini) => Some(Arc::new(GeminiVisionOracle::new(gemini)?)),
        None => {
            info!("No Gemini API key configured; face colors will come from the fallback grid");
            None
        }
    };
    let fallback: Arc<dyn FallbackGrid> = match config.fallback_seed {
        Some(seed) => Arc::new(SeededGrid::new(seed)),
        None => Arc::new(RandomGrid),
    };
    Ok(FaceColorAcquirer::new(vision)
        .with_fallback(fallback)
        .with_policy(config.upload_policy()?))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn run(command: Command, config: &CliConfig) -> Result<ExitCode> {
    match command {
        Command::Solve { state } => solve(&state, config).await,
        Command::Scan {
            face,
            image,
            remove_after,
        } => scan(&face, image, remove_after || config.upload.remove_after, config).await,
        Command::ScanSolve {
            images,
            remove_after,
        } => scan_solve(images, remove_after || config.upload.remove_after, config).await,
    }
}

async fn solve(state: &Path, config: &CliConfig) -> Result<ExitCode> {
    let solver = build_solver(config)?;
    let text = if state.as_os_str() == "-" {
        tokio::task::spawn_blocking(|| std::io::read_to_string(std::io::stdin()))
            .await
            .context("stdin reader panicked")?
            .context("Failed to read cube state from stdin")?
    } else {
        tokio::fs::read_to_string(state)
            .await
            .with_context(|| format!("Failed to read cube state from {}", state.display()))?
    };
    let raw: Value = serde_json::from_str(&text).context("Cube state is not valid JSON")?;

    match solver.solve_raw(unwrap_envelope(&raw)).await {
        Ok(outcome) => {
            print_json(&outcome)?;
            Ok(outcome_status(&outcome))
        }
        Err(e) => rejected(&e),
    }
}

async fn scan(face: &str, image: PathBuf, remove_after: bool, config: &CliConfig) -> Result<ExitCode> {
    let acquirer = build_acquirer(config)?;
    let mut upload = FileUpload::open(image, remove_after).await;

    match acquirer.acquire_upload(&mut upload, face).await {
        Ok(acquired) => {
            print_json(&ScanOutput {
                success: true,
                face: acquired.face,
                colors: &acquired.grid,
                source: &acquired.source,
            })?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => rejected(&e),
    }
}

async fn scan_solve(
    images: Vec<(String, PathBuf)>,
    remove_after: bool,
    config: &CliConfig,
) -> Result<ExitCode> {
    let pipeline = CubePipeline::new(build_acquirer(config)?, build_solver(config)?);

    let mut uploads: Vec<(String, Box<dyn ImageUpload>)> = Vec::with_capacity(images.len());
    for (face, path) in images {
        let upload: Box<dyn ImageUpload> = Box::new(FileUpload::open(path, remove_after).await);
        uploads.push((face, upload));
    }

    match pipeline.scan_and_solve(uploads).await {
        Ok(report) => {
            print_json(&report)?;
            Ok(outcome_status(&report.outcome))
        }
        Err(e) => rejected(&e),
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ScanOutput<'a> {
    success: bool,
    face: FaceId,
    colors: &'a FaceGrid,
    #[serde(flatten)]
    source: &'a GridSource,
}

/// Accepts either a bare face map or `{"cubeState": {...}}`.
fn unwrap_envelope(raw: &Value) -> &Value {
    raw.get("cubeState").unwrap_or(raw)
}

fn outcome_status(outcome: &SolveOutcome) -> ExitCode {
    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn rejected(error: &dyn std::error::Error) -> Result<ExitCode> {
    print_json(&json!({ "success": false, "error": error.to_string() }))?;
    Ok(ExitCode::from(2))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pipeline::{Color, CubeState};

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_face_image() {
        assert_eq!(
            parse_face_image("U=up.jpg").unwrap(),
            ("U".to_string(), PathBuf::from("up.jpg"))
        );
        assert!(parse_face_image("up.jpg").is_err());
        assert!(parse_face_image("U=").is_err());
    }

    #[test]
    fn test_scan_solve_collects_images() {
        let cli = Cli::try_parse_from([
            "cubesolve",
            "scan-solve",
            "--image",
            "U=u.jpg",
            "--image",
            "R=r.png",
            "--remove-after",
        ])
        .unwrap();
        let Command::ScanSolve {
            images,
            remove_after,
        } = cli.command
        else {
            panic!("expected scan-solve");
        };
        assert_eq!(images.len(), 2);
        assert_eq!(images[1].0, "R");
        assert!(remove_after);
    }

    #[test]
    fn test_scan_requires_face_and_image() {
        assert!(Cli::try_parse_from(["cubesolve", "scan", "--face", "F"]).is_err());
    }

    #[test]
    fn test_unwrap_envelope() {
        let bare = json!({"U": []});
        assert_eq!(unwrap_envelope(&bare), &bare);
        let wrapped = json!({"cubeState": {"U": []}});
        assert_eq!(unwrap_envelope(&wrapped), &json!({"U": []}));
    }

    #[test]
    fn test_scan_output_shape() {
        let grid = FaceGrid::uniform(Color::Green);
        let value = serde_json::to_value(ScanOutput {
            success: true,
            face: FaceId::F,
            colors: &grid,
            source: &GridSource::Vision,
        })
        .unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["face"], "F");
        assert_eq!(value["colors"][2][2], "green");
        assert_eq!(value["source"], "vision");
    }

    #[tokio::test]
    async fn test_solve_without_solver_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.json");
        std::fs::write(&path, serde_json::to_string(&CubeState::solved()).unwrap()).unwrap();

        let err = solve(&path, &CliConfig::default()).await.unwrap_err();
        assert!(err.to_string().contains("No solver configured"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_solve_with_command_solver() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.json");
        let body = json!({ "cubeState": CubeState::solved() });
        std::fs::write(&path, body.to_string()).unwrap();

        let mut config = CliConfig::default();
        config.solver.command = Some("sh -c true".to_string());
        let status = solve(&path, &config).await.unwrap();
        assert_eq!(status, ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn test_scan_rejects_unsupported_format_and_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.gif");
        std::fs::write(&path, b"gif").unwrap();

        let status = scan("F", path.clone(), true, &CliConfig::default())
            .await
            .unwrap();
        assert_eq!(status, ExitCode::from(2));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_scan_without_vision_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.jpg");
        std::fs::write(&path, b"jpeg").unwrap();

        let mut config = CliConfig::default();
        config.fallback_seed = Some(1);
        let status = scan("U", path.clone(), false, &config).await.unwrap();
        assert_eq!(status, ExitCode::SUCCESS);
        assert!(path.exists());
    }
}
