//! Segmentation of a solution into named CFOP phases.
//!
//! The split is proportional by position: the sequence is cut into four
//! near-equal runs and labelled Cross, F2L, OLL, PLL in order. No move is
//! analysed for what it actually solves; the phases only give the output a
//! readable shape.

use serde::Serialize;

use crate::moves::{describe, resolve_token, MoveDetail};
use crate::MoveSequence;

/// The four phases, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PhaseKind {
    /// Bottom-layer edges.
    Cross,
    /// Bottom and middle layers.
    FirstTwoLayers,
    /// Last-layer orientation.
    OrientLastLayer,
    /// Last-layer permutation.
    PermuteLastLayer,
}

impl PhaseKind {
    /// Every phase, in the order they appear in a solution.
    pub const ALL: [PhaseKind; 4] = [
        PhaseKind::Cross,
        PhaseKind::FirstTwoLayers,
        PhaseKind::OrientLastLayer,
        PhaseKind::PermuteLastLayer,
    ];

    /// Display name, e.g. `"OLL (Orient Last Layer)"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Cross => "Cross",
            Self::FirstTwoLayers => "F2L (First Two Layers)",
            Self::OrientLastLayer => "OLL (Orient Last Layer)",
            Self::PermuteLastLayer => "PLL (Permute Last Layer)",
        }
    }

    /// One-sentence summary of what the phase achieves.
    pub fn description(self) -> &'static str {
        match self {
            Self::Cross => "Create the white cross on the bottom",
            Self::FirstTwoLayers => "Solve the first two layers",
            Self::OrientLastLayer => "Orient all pieces on the last layer",
            Self::PermuteLastLayer => "Permute all pieces on the last layer",
        }
    }
}

/// One non-empty phase of a solution.
///
/// `move_details[i]` and `move_descriptions[i]` describe `moves[i]`; a
/// `None` detail marks a token that could not be interpreted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    #[serde(skip)]
    pub kind: PhaseKind,
    pub name: &'static str,
    pub description: &'static str,
    pub moves: Vec<String>,
    pub move_details: Vec<Option<MoveDetail>>,
    pub move_descriptions: Vec<String>,
}

impl Phase {
    fn new(kind: PhaseKind, moves: Vec<String>) -> Self {
        Self {
            kind,
            name: kind.name(),
            description: kind.description(),
            move_details: moves.iter().map(|m| resolve_token(m)).collect(),
            move_descriptions: moves.iter().map(|m| describe(m)).collect(),
            moves,
        }
    }
}

/// Splits `sequence` into at most four phases.
///
/// With `n` moves, each phase takes `ceil(n / 4)` moves and the last phase
/// takes whatever remains. Phases left empty (only when `n < 4`) are dropped.
pub fn segment(sequence: &MoveSequence) -> Vec<Phase> {
    let tokens = sequence.tokens();
    if tokens.is_empty() {
        return Vec::new();
    }

    let phase_count = PhaseKind::ALL.len();
    let per_phase = tokens.len().div_ceil(phase_count);
    let mut buckets: Vec<Vec<String>> = vec![Vec::new(); phase_count];
    for (i, token) in tokens.iter().enumerate() {
        buckets[(i / per_phase).min(phase_count - 1)].push(token.clone());
    }

    PhaseKind::ALL
        .into_iter()
        .zip(buckets)
        .filter(|(_, moves)| !moves.is_empty())
        .map(|(kind, moves)| Phase::new(kind, moves))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(n: usize) -> MoveSequence {
        ["R", "U'", "F2", "L", "D", "B'"].iter().cycle().take(n).copied().collect()
    }

    fn sizes(phases: &[Phase]) -> Vec<usize> {
        phases.iter().map(|p| p.moves.len()).collect()
    }

    #[test]
    fn test_empty_sequence_has_no_phases() {
        assert!(segment(&MoveSequence::default()).is_empty());
    }

    #[test]
    fn test_twenty_moves_split_evenly() {
        let phases = segment(&sequence(20));
        assert_eq!(sizes(&phases), vec![5, 5, 5, 5]);
        let kinds: Vec<PhaseKind> = phases.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, PhaseKind::ALL.to_vec());
    }

    #[test]
    fn test_three_moves_fill_three_phases() {
        // perPhase = ceil(3 / 4) = 1 -> 1, 1, 1 and PLL is dropped
        let phases = segment(&sequence(3));
        assert_eq!(sizes(&phases), vec![1, 1, 1]);
        let kinds: Vec<PhaseKind> = phases.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PhaseKind::Cross,
                PhaseKind::FirstTwoLayers,
                PhaseKind::OrientLastLayer
            ]
        );
    }

    #[test]
    fn test_remainder_lands_in_earlier_phases() {
        // perPhase = ceil(21 / 4) = 6 -> 6, 6, 6, 3
        assert_eq!(sizes(&segment(&sequence(21))), vec![6, 6, 6, 3]);
        // perPhase = ceil(5 / 4) = 2 -> 2, 2, 1
        assert_eq!(sizes(&segment(&sequence(5))), vec![2, 2, 1]);
    }

    #[test]
    fn test_phases_preserve_order_and_contents() {
        let seq = sequence(11);
        let flattened: Vec<String> = segment(&seq).into_iter().flat_map(|p| p.moves).collect();
        assert_eq!(flattened, seq.tokens());
    }

    #[test]
    fn test_segmentation_is_deterministic() {
        let seq = sequence(17);
        assert_eq!(segment(&seq), segment(&seq));
    }

    #[test]
    fn test_unknown_token_keeps_its_slot() {
        let seq: MoveSequence = ["R", "Q", "U"].into_iter().collect();
        let phases = segment(&seq);
        let moves: Vec<String> = phases.iter().flat_map(|p| p.moves.clone()).collect();
        let details: Vec<Option<MoveDetail>> =
            phases.iter().flat_map(|p| p.move_details.clone()).collect();
        let descriptions: Vec<String> = phases
            .iter()
            .flat_map(|p| p.move_descriptions.clone())
            .collect();
        assert_eq!(moves, vec!["R", "Q", "U"]);
        assert!(details[0].is_some());
        assert!(details[1].is_none());
        assert!(details[2].is_some());
        assert_eq!(descriptions[1], "Unknown move");
    }

    #[test]
    fn test_phase_serializes_for_clients() {
        let value = serde_json::to_value(&segment(&sequence(1))[0]).unwrap();
        assert_eq!(value["name"], "Cross");
        assert_eq!(value["moves"][0], "R");
        assert_eq!(value["moveDetails"][0]["axis"], "x");
        assert!(value.get("kind").is_none());
    }
}
