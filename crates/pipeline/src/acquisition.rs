//! Face color acquisition from photographs.
//!
//! [`FaceColorAcquirer`] asks a [`VisionOracle`] for the nine sticker colors
//! of one face. Acquisition never fails structurally: when no oracle is
//! configured, the image is empty, the call fails, or the reply is not a 3×3
//! grid of known colors, the acquirer substitutes a grid from its
//! [`FallbackGrid`] strategy and logs why.

use std::path::Path;
use std::sync::{Arc, LazyLock};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::errors::{AcquisitionError, VisionError};
use crate::ports::{ImageUpload, VisionOracle, VisionRequest};
use crate::{Color, FaceGrid, FaceId};

// ---------------------------------------------------------------------------
// Fallback strategies
// ---------------------------------------------------------------------------

/// Produces a substitute grid when the vision oracle cannot be used.
///
/// Implementations must always return a grid; the 3×3 shape is guaranteed by
/// [`FaceGrid`] itself.
pub trait FallbackGrid: Send + Sync {
    fn generate(&self, face: FaceId) -> FaceGrid;
}

/// Draws every cell uniformly at random from the six colors.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGrid;

impl FallbackGrid for RandomGrid {
    fn generate(&self, _face: FaceId) -> FaceGrid {
        sample_grid(&mut rand::thread_rng())
    }
}

/// Like [`RandomGrid`], but reproducible: the same seed and face always give
/// the same grid.
#[derive(Debug, Clone, Copy)]
pub struct SeededGrid {
    seed: u64,
}

impl SeededGrid {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl FallbackGrid for SeededGrid {
    fn generate(&self, face: FaceId) -> FaceGrid {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(face as u64));
        sample_grid(&mut rng)
    }
}

fn sample_grid<R: Rng + ?Sized>(rng: &mut R) -> FaceGrid {
    let mut rows = [[Color::White; 3]; 3];
    for cell in rows.iter_mut().flatten() {
        *cell = Color::ALL[rng.gen_range(0..Color::ALL.len())];
    }
    FaceGrid::new(rows)
}

// ---------------------------------------------------------------------------
// Upload policy
// ---------------------------------------------------------------------------

/// Limits applied to uploaded photographs before they are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: u64,
    /// Accepted lowercase extensions, without the dot.
    pub extensions: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 20 * 1024 * 1024,
            extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
        }
    }
}

impl UploadPolicy {
    /// Checks an upload's name and (if known) size.
    pub fn check(&self, file_name: &str, size: Option<u64>) -> Result<(), AcquisitionError> {
        if let Some(size) = size.filter(|s| *s > self.max_bytes) {
            return Err(AcquisitionError::ImageTooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        let extension = extension_of(file_name);
        if !self.extensions.iter().any(|e| *e == extension) {
            return Err(AcquisitionError::UnsupportedFormat { extension });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Acquirer
// ---------------------------------------------------------------------------

/// Where an acquired grid came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum GridSource {
    Vision,
    Fallback { reason: String },
}

/// The result of acquiring one face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcquiredFace {
    pub face: FaceId,
    pub grid: FaceGrid,
    #[serde(flatten)]
    pub source: GridSource,
}

/// Obtains the 3×3 color grid of one face from a photograph.
#[derive(Clone)]
pub struct FaceColorAcquirer {
    vision: Option<Arc<dyn VisionOracle>>,
    fallback: Arc<dyn FallbackGrid>,
    policy: UploadPolicy,
}

impl FaceColorAcquirer {
    /// Creates an acquirer. With `vision` set to `None` every face comes from
    /// the fallback.
    pub fn new(vision: Option<Arc<dyn VisionOracle>>) -> Self {
        Self {
            vision,
            fallback: Arc::new(RandomGrid),
            policy: UploadPolicy::default(),
        }
    }

    /// Replaces the fallback strategy.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackGrid>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Replaces the upload policy used by [`Self::acquire_upload`].
    #[must_use]
    pub fn with_policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Acquires a face from raw image bytes.
    ///
    /// # Errors
    ///
    /// Only [`AcquisitionError::UnsupportedFace`]; every oracle problem is
    /// absorbed by the fallback.
    #[instrument(skip_all, fields(face = %face, bytes = image.len()))]
    pub async fn acquire(
        &self,
        image: &[u8],
        file_name: &str,
        face: &str,
    ) -> Result<AcquiredFace, AcquisitionError> {
        let face_id =
            FaceId::parse(face).ok_or_else(|| AcquisitionError::UnsupportedFace(face.to_string()))?;
        Ok(self.acquire_face(image.to_vec(), file_name, face_id).await)
    }

    /// Acquires a face from an upload, releasing the upload on every path.
    ///
    /// The face and the upload policy are checked first; the image is then
    /// read and released before the oracle is consulted. An unreadable upload
    /// falls back like any other oracle problem.
    #[instrument(skip_all, fields(face = %face, file = upload.file_name()))]
    pub async fn acquire_upload<U>(
        &self,
        upload: &mut U,
        face: &str,
    ) -> Result<AcquiredFace, AcquisitionError>
    where
        U: ImageUpload + ?Sized,
    {
        let checked = FaceId::parse(face)
            .ok_or_else(|| AcquisitionError::UnsupportedFace(face.to_string()))
            .and_then(|id| {
                self.policy
                    .check(upload.file_name(), upload.size_hint())
                    .map(|()| id)
            });
        let face_id = match checked {
            Ok(id) => id,
            Err(e) => {
                upload.release().await;
                return Err(e);
            }
        };

        let read = upload.read().await;
        let file_name = upload.file_name().to_string();
        upload.release().await;

        match read {
            Ok(bytes) => Ok(self.acquire_face(bytes, &file_name, face_id).await),
            Err(e) => Ok(self.fall_back(face_id, format!("could not read upload: {e}"))),
        }
    }

    async fn acquire_face(&self, image: Vec<u8>, file_name: &str, face: FaceId) -> AcquiredFace {
        let Some(vision) = &self.vision else {
            return self.fall_back(face, "no vision oracle configured".to_string());
        };
        if image.is_empty() {
            return self.fall_back(face, "image is empty".to_string());
        }

        let request = VisionRequest {
            image,
            mime_type: mime_type_for(file_name),
            prompt: build_prompt(face),
        };
        debug!(
            oracle = vision.name(),
            mime_type = request.mime_type,
            "Requesting face colors"
        );

        match vision.classify(request).await.and_then(|text| extract_grid(&text)) {
            Ok(grid) => {
                info!(face = %face, "Face colors read by vision oracle");
                AcquiredFace {
                    face,
                    grid,
                    source: GridSource::Vision,
                }
            }
            Err(e) => self.fall_back(face, e.to_string()),
        }
    }

    fn fall_back(&self, face: FaceId, reason: String) -> AcquiredFace {
        warn!(face = %face, reason = %reason, "Using fallback face grid");
        AcquiredFace {
            face,
            grid: self.fallback.generate(face),
            source: GridSource::Fallback { reason },
        }
    }
}

// ---------------------------------------------------------------------------
// Oracle request and reply helpers
// ---------------------------------------------------------------------------

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// MIME type for an image file name; unknown extensions are treated as JPEG.
pub fn mime_type_for(file_name: &str) -> &'static str {
    match extension_of(file_name).as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        other => {
            debug!(extension = other, "Unknown image extension, assuming JPEG");
            "image/jpeg"
        }
    }
}

/// The instruction sent to the vision oracle for `face`.
pub fn build_prompt(face: FaceId) -> String {
    let colors = Color::ALL.map(Color::as_str);
    format!(
        "This is an image of the {name} face ({letter}) of a Rubik's cube.\n\
         Analyze the image and identify the color of each square in a 3x3 grid.\n\
         The possible colors are: {list}, and {last}.\n\
         Return the result as a 3x3 JSON array of colors, with no additional text.\n\
         Format should be exactly: [[\"color\",\"color\",\"color\"],[\"color\",\"color\",\"color\"],[\"color\",\"color\",\"color\"]]\n",
        name = face.display_name(),
        letter = face.letter(),
        list = colors[..5].join(", "),
        last = colors[5],
    )
}

static GRID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\[\s*\[.*?\]\s*\]").expect("grid pattern is a valid regex")
});

/// Pulls a 3×3 color grid out of free-form oracle text.
///
/// The first `[[ ... ]]` substring is parsed as JSON; without one the whole
/// text is tried. Colors are matched case-insensitively.
pub fn extract_grid(text: &str) -> Result<FaceGrid, VisionError> {
    let candidate = GRID_PATTERN.find(text).map_or(text, |m| m.as_str());
    let rows: Vec<Vec<serde_json::Value>> = serde_json::from_str(candidate.trim())
        .map_err(|e| VisionError::MalformedVisionResponse(format!("not a JSON grid: {e}")))?;

    if rows.len() != 3 || rows.iter().any(|r| r.len() != 3) {
        return Err(VisionError::MalformedVisionResponse(
            "expected 3 rows of 3 colors".to_string(),
        ));
    }

    let mut grid = [[Color::White; 3]; 3];
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            grid[r][c] = cell.as_str().and_then(Color::parse).ok_or_else(|| {
                VisionError::MalformedVisionResponse(format!("unrecognised color {cell}"))
            })?;
        }
    }
    Ok(FaceGrid::new(grid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::InMemoryImage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedGrid(Color);

    impl FallbackGrid for FixedGrid {
        fn generate(&self, _face: FaceId) -> FaceGrid {
            FaceGrid::uniform(self.0)
        }
    }

    struct ScriptedVision {
        reply: Result<String, VisionError>,
        seen: Mutex<Vec<VisionRequest>>,
    }

    impl ScriptedVision {
        fn replying(reply: Result<&str, VisionError>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_owned),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl VisionOracle for ScriptedVision {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn classify(&self, request: VisionRequest) -> Result<String, VisionError> {
            self.seen.lock().unwrap().push(request);
            self.reply.clone()
        }
    }

    const GOOD_REPLY: &str = r#"Here you go:
[["White","red","green"],
 ["blue","orange","yellow"],
 ["white","white","white"]]
Hope this helps."#;

    fn acquirer(vision: Option<Arc<dyn VisionOracle>>) -> FaceColorAcquirer {
        FaceColorAcquirer::new(vision).with_fallback(Arc::new(FixedGrid(Color::Blue)))
    }

    #[test]
    fn test_random_grid_draws_every_color() {
        // 450 cells: the chance of a color never appearing is about 6 * (5/6)^450.
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..50 {
            seen.extend(RandomGrid.generate(FaceId::F).cells());
        }
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), Color::ALL.to_vec());
    }

    #[test]
    fn test_seeded_grid_draws_every_color_across_seeds() {
        let mut seen = std::collections::BTreeSet::new();
        for seed in 0..50 {
            seen.extend(SeededGrid::new(seed).generate(FaceId::U).cells());
        }
        assert_eq!(seen.len(), Color::ALL.len());
    }

    #[test]
    fn test_seeded_grid_is_reproducible() {
        let a = SeededGrid::new(7);
        let b = SeededGrid::new(7);
        for face in FaceId::ORDER {
            assert_eq!(a.generate(face), b.generate(face));
        }
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type_for("face.JPG"), "image/jpeg");
        assert_eq!(mime_type_for("face.jpeg"), "image/jpeg");
        assert_eq!(mime_type_for("face.png"), "image/png");
        assert_eq!(mime_type_for("face.gif"), "image/gif");
        assert_eq!(mime_type_for("face.webp"), "image/webp");
        assert_eq!(mime_type_for("face.bmp"), "image/jpeg");
        assert_eq!(mime_type_for("face"), "image/jpeg");
    }

    #[test]
    fn test_prompt_names_face_and_colors() {
        let prompt = build_prompt(FaceId::D);
        assert!(prompt.contains("Down (bottom) face (D)"));
        assert!(prompt.contains("white, yellow, red, orange, green, and blue"));
        assert!(prompt.contains(r#"[["color","color","color"]"#));
    }

    #[test]
    fn test_extract_grid_from_surrounding_text() {
        let grid = extract_grid(GOOD_REPLY).unwrap();
        assert_eq!(grid.rows()[0], [Color::White, Color::Red, Color::Green]);
        assert_eq!(grid.center(), Color::Orange);
    }

    #[test]
    fn test_extract_grid_rejects_bad_replies() {
        for reply in [
            "I cannot see a cube",
            r#"[["white","white"],["white","white"]]"#,
            r#"[["white","white","white"],["white","pink","white"],["white","white","white"]]"#,
            r#"[["white","white","white"],["white",3,"white"],["white","white","white"]]"#,
        ] {
            assert!(
                matches!(extract_grid(reply), Err(VisionError::MalformedVisionResponse(_))),
                "reply {reply:?}"
            );
        }
    }

    #[test]
    fn test_upload_policy() {
        let policy = UploadPolicy::default();
        assert!(policy.check("a.PNG", Some(10)).is_ok());
        assert_eq!(
            policy.check("a.gif", Some(10)),
            Err(AcquisitionError::UnsupportedFormat {
                extension: "gif".to_string()
            })
        );
        assert!(matches!(
            policy.check("a.jpg", Some(21 * 1024 * 1024)),
            Err(AcquisitionError::ImageTooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn test_no_vision_oracle_falls_back() {
        let acquired = acquirer(None).acquire(b"jpeg", "u.jpg", "U").await.unwrap();
        assert_eq!(acquired.grid, FaceGrid::uniform(Color::Blue));
        assert!(matches!(acquired.source, GridSource::Fallback { .. }));
    }

    #[tokio::test]
    async fn test_random_fallback_is_always_a_full_grid() {
        let acquirer = FaceColorAcquirer::new(None);
        for face in ["U", "R", "F", "D", "L", "B"] {
            let acquired = acquirer.acquire(&[], "x.png", face).await.unwrap();
            assert_eq!(acquired.grid.rows().len(), 3);
            assert!(acquired.grid.rows().iter().all(|row| row.len() == 3));
        }
    }

    #[tokio::test]
    async fn test_unsupported_face_is_rejected() {
        let err = acquirer(None).acquire(b"x", "u.jpg", "Q").await.unwrap_err();
        assert_eq!(err, AcquisitionError::UnsupportedFace("Q".to_string()));
    }

    #[tokio::test]
    async fn test_vision_reply_is_used() {
        let vision = ScriptedVision::replying(Ok(GOOD_REPLY));
        let acquired = acquirer(Some(vision.clone()))
            .acquire(b"png-bytes", "r.png", "R")
            .await
            .unwrap();
        assert_eq!(acquired.source, GridSource::Vision);
        assert_eq!(acquired.grid, extract_grid(GOOD_REPLY).unwrap());

        let seen = vision.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].mime_type, "image/png");
        assert_eq!(seen[0].image, b"png-bytes");
        assert!(seen[0].prompt.contains("Right face (R)"));
    }

    #[tokio::test]
    async fn test_vision_failure_falls_back() {
        let vision = ScriptedVision::replying(Err(VisionError::VisionFailure("quota".into())));
        let acquired = acquirer(Some(vision)).acquire(b"x", "f.jpg", "F").await.unwrap();
        assert_eq!(acquired.grid, FaceGrid::uniform(Color::Blue));
    }

    #[tokio::test]
    async fn test_malformed_reply_falls_back() {
        let vision = ScriptedVision::replying(Ok("[[\"white\"]]"));
        let acquired = acquirer(Some(vision)).acquire(b"x", "f.jpg", "F").await.unwrap();
        assert!(matches!(acquired.source, GridSource::Fallback { .. }));
    }

    #[tokio::test]
    async fn test_empty_image_skips_oracle() {
        let vision = ScriptedVision::replying(Ok(GOOD_REPLY));
        let acquired = acquirer(Some(vision.clone())).acquire(&[], "f.jpg", "F").await.unwrap();
        assert!(matches!(acquired.source, GridSource::Fallback { .. }));
        assert!(vision.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_released_after_success() {
        let vision = ScriptedVision::replying(Ok(GOOD_REPLY));
        let mut upload = InMemoryImage::new("l.jpg", b"bytes".to_vec());
        let acquired = acquirer(Some(vision)).acquire_upload(&mut upload, "L").await.unwrap();
        assert_eq!(acquired.source, GridSource::Vision);
        assert!(upload.is_released());
    }

    #[tokio::test]
    async fn test_upload_released_after_rejection() {
        let mut bad_face = InMemoryImage::new("l.jpg", b"bytes".to_vec());
        assert!(acquirer(None).acquire_upload(&mut bad_face, "X").await.is_err());
        assert!(bad_face.is_released());

        let mut bad_format = InMemoryImage::new("l.bmp", b"bytes".to_vec());
        assert!(acquirer(None).acquire_upload(&mut bad_format, "L").await.is_err());
        assert!(bad_format.is_released());
    }

    #[tokio::test]
    async fn test_upload_released_after_fallback() {
        let vision = ScriptedVision::replying(Err(VisionError::VisionFailure("down".into())));
        let mut upload = InMemoryImage::new("b.png", b"bytes".to_vec());
        let acquired = acquirer(Some(vision)).acquire_upload(&mut upload, "B").await.unwrap();
        assert!(matches!(acquired.source, GridSource::Fallback { .. }));
        assert!(upload.is_released());
    }
}
