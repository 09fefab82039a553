//! Facelet encoding of cube states and decoding of move tokens.

use crate::types::FACELET_COUNT;
use crate::{CubeState, FaceId, FaceletString, MoveToken, Turn};

/// Encodes a cube as the 54-letter facelet string a solving oracle expects.
///
/// Faces are walked in U, R, F, D, L, B order, each face row-major. Every
/// sticker is written as the letter of the face its color belongs to (see
/// [`crate::Color::facelet`]).
pub fn encode(state: &CubeState) -> FaceletString {
    let mut out = String::with_capacity(FACELET_COUNT);
    for (_, grid) in state.iter() {
        out.extend(grid.cells().map(|color| color.facelet().letter()));
    }
    FaceletString::from_encoded(out)
}

/// Decodes one move token such as `R`, `U'` or `F2`.
///
/// Returns `None` (an unknown move) for an empty token, an unknown face
/// letter, a modifier other than `'` or `2`, or any trailing characters.
/// Oracle output feeds visualisation on a best-effort basis, so bad tokens
/// are reported rather than raised.
pub fn decode(token: &str) -> Option<MoveToken> {
    let mut chars = token.chars();
    let face = FaceId::from_letter(chars.next()?)?;
    let turn = match chars.next() {
        None => Turn::Clockwise,
        Some('\'') => Turn::CounterClockwise,
        Some('2') => Turn::Half,
        Some(_) => return None,
    };
    if chars.next().is_some() {
        return None;
    }
    Some(MoveToken::new(face, turn))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, FaceGrid};
    use proptest::prelude::*;

    #[test]
    fn test_encode_solved_cube() {
        let facelets = encode(&CubeState::solved());
        assert_eq!(
            facelets.as_str(),
            "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB"
        );
    }

    #[test]
    fn test_encode_uses_color_not_position() {
        // A front face that is entirely white still encodes as U letters.
        let faces = FaceId::ORDER.map(|face| {
            let grid = if face == FaceId::F {
                FaceGrid::uniform(Color::White)
            } else {
                *CubeState::solved().face(face)
            };
            (face, grid)
        });
        let state = CubeState::from_faces(faces).unwrap();
        assert_eq!(&encode(&state).as_str()[18..27], "UUUUUUUUU");
    }

    #[test]
    fn test_encode_is_row_major() {
        let mut rows = [[Color::Green; 3]; 3];
        rows[0][2] = Color::Red;
        rows[2][0] = Color::Blue;
        let faces = FaceId::ORDER.map(|face| {
            let grid = if face == FaceId::U {
                FaceGrid::new(rows)
            } else {
                FaceGrid::uniform(Color::Green)
            };
            (face, grid)
        });
        let state = CubeState::from_faces(faces).unwrap();
        assert_eq!(&encode(&state).as_str()[..9], "FFRFFFBFF");
    }

    #[test]
    fn test_decode_modifiers() {
        assert_eq!(decode("R"), Some(MoveToken::new(FaceId::R, Turn::Clockwise)));
        assert_eq!(
            decode("U'"),
            Some(MoveToken::new(FaceId::U, Turn::CounterClockwise))
        );
        assert_eq!(decode("B2"), Some(MoveToken::new(FaceId::B, Turn::Half)));
    }

    #[test]
    fn test_decode_rejects_unknown_tokens() {
        for token in ["", "X", "r", "R3", "R'2", "R2'", "M", "Rw"] {
            assert_eq!(decode(token), None, "token {token:?}");
        }
    }

    fn any_color() -> impl Strategy<Value = Color> {
        prop::sample::select(Color::ALL.to_vec())
    }

    fn any_grid() -> impl Strategy<Value = FaceGrid> {
        prop::array::uniform3(prop::array::uniform3(any_color())).prop_map(FaceGrid::new)
    }

    fn any_cube() -> impl Strategy<Value = CubeState> {
        prop::array::uniform6(any_grid()).prop_map(|grids| {
            CubeState::from_faces(FaceId::ORDER.into_iter().zip(grids))
                .expect("all six faces supplied")
        })
    }

    fn any_token() -> impl Strategy<Value = String> {
        (
            prop::sample::select(vec!["R", "L", "U", "D", "F", "B"]),
            prop::sample::select(vec!["", "'", "2"]),
        )
            .prop_map(|(face, suffix)| format!("{face}{suffix}"))
    }

    proptest! {
        #[test]
        fn prop_encode_is_54_face_letters(cube in any_cube()) {
            let facelets = encode(&cube);
            prop_assert_eq!(facelets.as_str().len(), FACELET_COUNT);
            prop_assert!(facelets.as_str().chars().all(|c| "URFDLB".contains(c)));
        }

        #[test]
        fn prop_decode_renders_original_token(token in any_token()) {
            let decoded = decode(&token);
            prop_assert!(decoded.is_some());
            prop_assert_eq!(decoded.unwrap().to_string(), token);
        }
    }
}
