//! Shared value types for the cube solve domain.
//!
//! Unlike the identifiers in [`crate::identifiers`], these types carry values
//! with invariants: a [`FaceGrid`] is always 3×3, a [`CubeState`] always has
//! all six faces, a [`FaceletString`] is always 54 face letters.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::errors::ValidationError;
use crate::FaceId;

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// A sticker color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Center of the up face on a solved cube.
    White,
    /// Center of the down face.
    Yellow,
    /// Center of the right face.
    Red,
    /// Center of the left face.
    Orange,
    /// Center of the front face.
    Green,
    /// Center of the back face.
    Blue,
}

impl Color {
    /// Every recognised color, in the order used by prompts and fallback sampling.
    pub const ALL: [Color; 6] = [
        Color::White,
        Color::Yellow,
        Color::Red,
        Color::Orange,
        Color::Green,
        Color::Blue,
    ];

    /// Parses a color label, ignoring ASCII case.
    pub fn parse(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "white" => Some(Self::White),
            "yellow" => Some(Self::Yellow),
            "red" => Some(Self::Red),
            "orange" => Some(Self::Orange),
            "green" => Some(Self::Green),
            "blue" => Some(Self::Blue),
            _ => None,
        }
    }

    /// Canonical lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Green => "green",
            Self::Blue => "blue",
        }
    }

    /// The face letter this color stands for in facelet notation.
    ///
    /// The mapping encodes color identity, not the position of the face being
    /// encoded: a red sticker is `R` wherever it sits.
    pub fn facelet(self) -> FaceId {
        match self {
            Self::White => FaceId::U,
            Self::Yellow => FaceId::D,
            Self::Red => FaceId::R,
            Self::Orange => FaceId::L,
            Self::Green => FaceId::F,
            Self::Blue => FaceId::B,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Grids and cube state
// ---------------------------------------------------------------------------

/// A 3×3 face of stickers, rows top-to-bottom and cells left-to-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceGrid([[Color; 3]; 3]);

impl FaceGrid {
    /// Creates a grid from its rows.
    pub fn new(rows: [[Color; 3]; 3]) -> Self {
        Self(rows)
    }

    /// A grid with every cell set to `color`.
    pub fn uniform(color: Color) -> Self {
        Self([[color; 3]; 3])
    }

    /// Returns the rows of the grid.
    pub fn rows(&self) -> &[[Color; 3]; 3] {
        &self.0
    }

    /// Iterates the cells row-major.
    pub fn cells(&self) -> impl Iterator<Item = Color> + '_ {
        self.0.iter().flat_map(|row| row.iter().copied())
    }

    /// The centre sticker.
    pub fn center(&self) -> Color {
        self.0[1][1]
    }
}

/// A complete cube: one [`FaceGrid`] for each of the six faces.
///
/// Constructed per solve request from a validated submission or from six
/// acquired faces; never retained by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeState {
    faces: [FaceGrid; 6],
}

impl CubeState {
    /// Assembles a cube from per-face grids.
    ///
    /// Faces may be given in any order; later duplicates replace earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFace`] naming the first face (in
    /// U, R, F, D, L, B order) with no grid.
    pub fn from_faces(
        faces: impl IntoIterator<Item = (FaceId, FaceGrid)>,
    ) -> Result<Self, ValidationError> {
        let by_face: BTreeMap<FaceId, FaceGrid> = faces.into_iter().collect();
        let mut grids = [FaceGrid::uniform(Color::White); 6];
        for (slot, face) in grids.iter_mut().zip(FaceId::ORDER) {
            *slot = *by_face
                .get(&face)
                .ok_or(ValidationError::MissingFace { face })?;
        }
        Ok(Self { faces: grids })
    }

    /// The solved cube in the standard color scheme (white up, green front).
    pub fn solved() -> Self {
        Self {
            faces: FaceId::ORDER.map(|face| {
                let color = Color::ALL
                    .into_iter()
                    .find(|c| c.facelet() == face)
                    .unwrap_or(Color::White);
                FaceGrid::uniform(color)
            }),
        }
    }

    /// Returns the grid for `face`.
    pub fn face(&self, face: FaceId) -> &FaceGrid {
        &self.faces[face as usize]
    }

    /// Iterates `(face, grid)` pairs in U, R, F, D, L, B order.
    pub fn iter(&self) -> impl Iterator<Item = (FaceId, &FaceGrid)> + '_ {
        FaceId::ORDER.into_iter().zip(self.faces.iter())
    }

    /// Counts how often each color appears across all 54 stickers.
    pub fn color_counts(&self) -> BTreeMap<Color, usize> {
        let mut counts: BTreeMap<Color, usize> = Color::ALL.iter().map(|c| (*c, 0)).collect();
        for (_, grid) in self.iter() {
            for color in grid.cells() {
                *counts.entry(color).or_insert(0) += 1;
            }
        }
        counts
    }
}

impl Serialize for CubeState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(6))?;
        for (face, grid) in self.iter() {
            map.serialize_entry(&face, grid)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Notation
// ---------------------------------------------------------------------------

/// Number of stickers on a cube, and so the length of every [`FaceletString`].
pub const FACELET_COUNT: usize = 54;

/// The 54-letter facelet encoding of a [`CubeState`], as consumed by a
/// solving oracle.
///
/// Only produced by [`crate::notation::encode`], so it always has exactly
/// [`FACELET_COUNT`] characters over `U R F D L B`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FaceletString(String);

impl FaceletString {
    pub(crate) fn from_encoded(value: String) -> Self {
        debug_assert_eq!(value.len(), FACELET_COUNT);
        Self(value)
    }

    /// Returns the facelets as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FaceletString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How far a face layer turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    /// Quarter turn clockwise (no suffix).
    Clockwise,
    /// Quarter turn counter-clockwise (`'`).
    CounterClockwise,
    /// Half turn (`2`).
    Half,
}

impl Turn {
    /// The notation suffix for this turn.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Clockwise => "",
            Self::CounterClockwise => "'",
            Self::Half => "2",
        }
    }
}

/// A single face turn in standard notation, e.g. `R`, `U'`, `F2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveToken {
    /// The face being turned.
    pub face: FaceId,
    /// Direction and amount, from the token's suffix.
    pub turn: Turn,
}

impl MoveToken {
    /// Creates a token turning `face` by `turn`.
    pub fn new(face: FaceId, turn: Turn) -> Self {
        Self { face, turn }
    }
}

impl std::fmt::Display for MoveToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.face, self.turn.suffix())
    }
}

/// The move tokens returned by a solving oracle, in order.
///
/// Tokens are kept as the oracle's text so that an unrecognised token still
/// appears in the output with an unknown-move detail rather than being lost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveSequence(Vec<String>);

impl MoveSequence {
    /// Splits an oracle reply on whitespace, discarding empty tokens.
    pub fn from_solution(solution: &str) -> Self {
        Self(solution.split_whitespace().map(str::to_owned).collect())
    }

    /// The tokens in order.
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Number of tokens, recognised or not.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when the oracle returned no moves (an already solved cube).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for MoveSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

impl<S: Into<String>> FromIterator<S> for MoveSequence {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse_ignores_case() {
        assert_eq!(Color::parse("WHITE"), Some(Color::White));
        assert_eq!(Color::parse("Green"), Some(Color::Green));
        assert_eq!(Color::parse("purple"), None);
        assert_eq!(Color::parse(""), None);
    }

    #[test]
    fn test_color_serializes_lowercase() {
        let json = serde_json::to_string(&Color::Orange).unwrap();
        assert_eq!(json, r#""orange""#);
    }

    #[test]
    fn test_solved_cube_centers_match_facelet_letters() {
        let cube = CubeState::solved();
        for (face, grid) in cube.iter() {
            assert_eq!(grid.center().facelet(), face);
        }
    }

    #[test]
    fn test_from_faces_reports_first_missing_face() {
        let faces = [FaceId::U, FaceId::R, FaceId::F, FaceId::D, FaceId::L]
            .map(|f| (f, FaceGrid::uniform(Color::Red)));
        let err = CubeState::from_faces(faces).unwrap_err();
        assert_eq!(err, ValidationError::MissingFace { face: FaceId::B });
    }

    #[test]
    fn test_color_counts_of_solved_cube() {
        let counts = CubeState::solved().color_counts();
        assert_eq!(counts.len(), 6);
        assert!(counts.values().all(|n| *n == 9));
    }

    #[test]
    fn test_cube_state_serializes_as_face_map() {
        let value = serde_json::to_value(CubeState::solved()).unwrap();
        assert_eq!(value["U"][0][0], "white");
        assert_eq!(value["B"][2][2], "blue");
    }

    #[test]
    fn test_move_sequence_discards_empty_tokens() {
        let seq = MoveSequence::from_solution("  R U'\n\tF2  ");
        assert_eq!(seq.tokens(), ["R", "U'", "F2"]);
        assert_eq!(seq.to_string(), "R U' F2");
    }
}
