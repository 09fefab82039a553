//! Geometric metadata for single moves, consumed by 3D animation.
//!
//! Cubies are addressed by their centre position in a cube spanning
//! `[-1, 1]` on each axis. A move turns the layer of cubies on one side of
//! that cube around one axis.

use serde::{Deserialize, Serialize};

use crate::notation::decode;
use crate::{FaceId, MoveToken, Turn};

/// A rotation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Selects the cubies in a turning layer: those whose coordinate on `axis`
/// lies strictly beyond `threshold` on the `side` of the cube.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerSelector {
    pub axis: Axis,
    /// `+1` selects `coord > threshold`; `-1` selects `coord < -threshold`.
    pub side: i8,
    pub threshold: f64,
}

impl LayerSelector {
    /// Returns `true` if a cubie centred at `position` belongs to the layer.
    pub fn contains(&self, position: [f64; 3]) -> bool {
        let coord = position[self.axis.index()];
        if self.side > 0 {
            coord > self.threshold
        } else {
            coord < -self.threshold
        }
    }
}

/// Axis, direction and extent of one move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDetail {
    pub axis: Axis,
    /// `+1` or `-1`.
    pub direction: i8,
    /// `1` for a quarter turn, `2` for a half turn.
    pub turn_count: u8,
    pub layer: LayerSelector,
}

const LAYER_THRESHOLD: f64 = 0.5;

/// Resolves the detail for a decoded move.
///
/// Each face has a fixed axis and base direction (R/U/F positive, L/D/B
/// negative). A counter-clockwise turn negates the direction; a half turn is
/// two quarter turns in the base direction.
pub fn resolve(token: MoveToken) -> MoveDetail {
    let (axis, base) = match token.face {
        FaceId::R => (Axis::X, 1),
        FaceId::L => (Axis::X, -1),
        FaceId::U => (Axis::Y, 1),
        FaceId::D => (Axis::Y, -1),
        FaceId::F => (Axis::Z, 1),
        FaceId::B => (Axis::Z, -1),
    };
    let (direction, turn_count) = match token.turn {
        Turn::Clockwise => (base, 1),
        Turn::CounterClockwise => (-base, 1),
        Turn::Half => (base, 2),
    };
    MoveDetail {
        axis,
        direction,
        turn_count,
        layer: LayerSelector {
            axis,
            side: base,
            threshold: LAYER_THRESHOLD,
        },
    }
}

/// Resolves the detail for a raw token; `None` marks an unknown move.
pub fn resolve_token(token: &str) -> Option<MoveDetail> {
    decode(token).map(resolve)
}

/// A human description of a raw token, e.g. `"Right face counter-clockwise"`.
pub fn describe(token: &str) -> String {
    match decode(token) {
        Some(mv) => {
            let how = match mv.turn {
                Turn::Clockwise => "clockwise",
                Turn::CounterClockwise => "counter-clockwise",
                Turn::Half => "180 degrees",
            };
            format!("{} face {how}", mv.face.short_name())
        }
        None => "Unknown move".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_r_prime_detail() {
        let detail = resolve_token("R'").unwrap();
        assert_eq!(detail.axis, Axis::X);
        assert_eq!(detail.direction, -1);
        assert_eq!(detail.turn_count, 1);
    }

    #[test]
    fn test_d2_detail() {
        let detail = resolve_token("D2").unwrap();
        assert_eq!(detail.axis, Axis::Y);
        assert_eq!(detail.direction, -1);
        assert_eq!(detail.turn_count, 2);
    }

    #[test]
    fn test_face_table() {
        let expected = [
            ("R", Axis::X, 1),
            ("L", Axis::X, -1),
            ("U", Axis::Y, 1),
            ("D", Axis::Y, -1),
            ("F", Axis::Z, 1),
            ("B", Axis::Z, -1),
        ];
        for (token, axis, direction) in expected {
            let detail = resolve_token(token).unwrap();
            assert_eq!((detail.axis, detail.direction, detail.turn_count), (axis, direction, 1));
        }
    }

    #[test]
    fn test_prime_on_negative_face_is_positive() {
        assert_eq!(resolve_token("L'").unwrap().direction, 1);
    }

    #[test]
    fn test_layer_selection_is_independent_of_modifier() {
        let quarter = resolve_token("F").unwrap().layer;
        let prime = resolve_token("F'").unwrap().layer;
        assert_eq!(quarter, prime);
        assert!(quarter.contains([0.0, 0.0, 1.0]));
        assert!(!quarter.contains([0.0, 0.0, 0.0]));
        assert!(!quarter.contains([0.0, 0.0, 0.5]));
    }

    #[test]
    fn test_back_layer_selects_negative_side() {
        let layer = resolve_token("B2").unwrap().layer;
        assert!(layer.contains([1.0, -1.0, -1.0]));
        assert!(!layer.contains([1.0, -1.0, 1.0]));
    }

    #[test]
    fn test_unknown_moves() {
        assert_eq!(resolve_token("Q"), None);
        assert_eq!(resolve_token(""), None);
        assert_eq!(describe("Q"), "Unknown move");
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(describe("R"), "Right face clockwise");
        assert_eq!(describe("U'"), "Up face counter-clockwise");
        assert_eq!(describe("B2"), "Back face 180 degrees");
    }

    #[test]
    fn test_detail_serializes_camel_case() {
        let value = serde_json::to_value(resolve_token("D2").unwrap()).unwrap();
        assert_eq!(value["axis"], "y");
        assert_eq!(value["turnCount"], 2);
        assert_eq!(value["layer"]["side"], -1);
    }
}
