//! Domain identifiers.
//!
//! [`FaceId`] names one of the six cube faces and fixes the canonical face
//! order used everywhere a whole cube is walked. [`SolveRunId`] correlates the
//! spans and events of a single pipeline run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Faces
// ---------------------------------------------------------------------------

/// One of the six faces of the cube, identified by its single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FaceId {
    /// Up.
    U,
    /// Right.
    R,
    /// Front.
    F,
    /// Down.
    D,
    /// Left.
    L,
    /// Back.
    B,
}

impl FaceId {
    /// All faces in facelet order: U, R, F, D, L, B.
    pub const ORDER: [FaceId; 6] = [FaceId::U, FaceId::R, FaceId::F, FaceId::D, FaceId::L, FaceId::B];

    /// Parses a face letter. Only the exact uppercase letters are accepted.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'U' => Some(Self::U),
            'R' => Some(Self::R),
            'F' => Some(Self::F),
            'D' => Some(Self::D),
            'L' => Some(Self::L),
            'B' => Some(Self::B),
            _ => None,
        }
    }

    /// Parses a face identifier string such as `"U"`.
    ///
    /// Returns `None` for anything other than a single face letter.
    pub fn parse(value: &str) -> Option<Self> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_letter(c),
            _ => None,
        }
    }

    /// Returns the face letter.
    pub fn letter(self) -> char {
        match self {
            Self::U => 'U',
            Self::R => 'R',
            Self::F => 'F',
            Self::D => 'D',
            Self::L => 'L',
            Self::B => 'B',
        }
    }

    /// Human-readable face name, as used in vision prompts.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::U => "Upper (top)",
            Self::R => "Right",
            Self::F => "Front",
            Self::D => "Down (bottom)",
            Self::L => "Left",
            Self::B => "Back",
        }
    }

    /// Short face name used in move descriptions (`"Right face clockwise"`).
    pub fn short_name(self) -> &'static str {
        match self {
            Self::U => "Up",
            Self::R => "Right",
            Self::F => "Front",
            Self::D => "Down",
            Self::L => "Left",
            Self::B => "Back",
        }
    }
}

impl std::fmt::Display for FaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

/// Identifies a single pipeline run (one solve or one face acquisition).
///
/// Generated fresh for every request; recorded on the run's span so all
/// activity, including oracle calls, can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SolveRunId(Uuid);

impl SolveRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for SolveRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
