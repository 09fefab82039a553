//! Structural and value validation of submitted cube states.
//!
//! A submission arrives as loosely-typed JSON (`{"U": [["white", ...], ...], ...}`)
//! and leaves as a [`CubeState`]. Only shape and per-cell color membership are
//! checked; whether the stickers describe a reachable cube is not, unless the
//! balanced-color check is switched on.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ValidationError;
use crate::{Color, CubeState, FaceGrid, FaceId};

/// Optional checks layered on top of shape and color validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Reject cubes whose colors do not each appear exactly nine times.
    pub require_balanced_colors: bool,
}

/// Validates a raw submission with default options.
///
/// Faces are checked in U, R, F, D, L, B order and the first problem found is
/// reported. Keys other than the six face letters are ignored.
///
/// # Errors
///
/// - [`ValidationError::MissingFace`] if a face key is absent (or the
///   submission is not a JSON object at all).
/// - [`ValidationError::MalformedGrid`] if a face is not 3 rows of 3 cells.
/// - [`ValidationError::InvalidColor`] if a cell is not a recognised color.
pub fn validate(raw: &Value) -> Result<CubeState, ValidationError> {
    validate_with(raw, ValidationOptions::default())
}

/// Validates a raw submission, applying `options`.
pub fn validate_with(raw: &Value, options: ValidationOptions) -> Result<CubeState, ValidationError> {
    let mut faces = Vec::with_capacity(FaceId::ORDER.len());
    for face in FaceId::ORDER {
        let value = raw
            .get(face.letter().to_string())
            .filter(|v| !v.is_null())
            .ok_or(ValidationError::MissingFace { face })?;
        faces.push((face, parse_grid(face, value)?));
    }

    let state = CubeState::from_faces(faces)?;
    check_options(&state, options)?;
    Ok(state)
}

/// Applies the optional whole-cube checks in `options` to an assembled state.
///
/// # Errors
///
/// [`ValidationError::UnbalancedColors`] when the balanced-color check is
/// enabled and some color does not appear exactly nine times.
pub fn check_options(state: &CubeState, options: ValidationOptions) -> Result<(), ValidationError> {
    if options.require_balanced_colors {
        check_balanced(state)?;
    }
    Ok(())
}

/// Parses one face's value into a [`FaceGrid`].
///
/// Shape is checked for the whole face before any cell is inspected, so a
/// ragged grid is reported as malformed even if it also holds bad colors.
pub fn parse_grid(face: FaceId, value: &Value) -> Result<FaceGrid, ValidationError> {
    let malformed = || ValidationError::MalformedGrid { face };

    let rows = value.as_array().filter(|r| r.len() == 3).ok_or_else(malformed)?;
    let mut cells: Vec<&Vec<Value>> = Vec::with_capacity(3);
    for row in rows {
        cells.push(row.as_array().filter(|c| c.len() == 3).ok_or_else(malformed)?);
    }

    let mut grid = [[Color::White; 3]; 3];
    for (r, row) in cells.into_iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            grid[r][c] = parse_cell(face, cell)?;
        }
    }
    Ok(FaceGrid::new(grid))
}

fn parse_cell(face: FaceId, cell: &Value) -> Result<Color, ValidationError> {
    cell.as_str()
        .and_then(Color::parse)
        .ok_or_else(|| ValidationError::InvalidColor {
            face,
            value: match cell {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        })
}

fn check_balanced(state: &CubeState) -> Result<(), ValidationError> {
    match state.color_counts().into_iter().find(|(_, count)| *count != 9) {
        Some((color, count)) => Err(ValidationError::UnbalancedColors { color, count }),
        None => Ok(()),
    }
}
