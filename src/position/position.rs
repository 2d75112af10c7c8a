//! Core incremental board state.
//!
//! `Position` is the single authoritative model mutated in place by
//! make/unmake during search. It stores piece bitboards, occupancy caches,
//! side/rights/en-passant flags, clocks, the incrementally maintained
//! Zobrist key, and the stacks supporting repetition detection and undo.

use crate::position::chess_rules::STARTING_POSITION_FEN;
use crate::position::piece_types::*;
use crate::position::undo_record::UndoRecord;
use crate::utils::fen_parser::{parse_fen, FenError};
use crate::utils::fen_writer::write_fen;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    /// Piece occupancy, `[color][piece_kind]`.
    pub pieces: [[u64; 6]; 2],

    pub occupancy_by_color: [u64; 2],
    pub occupancy_all: u64,

    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant_square: Option<Square>,

    pub halfmove_clock: u16,
    pub fullmove_number: u16,

    pub zobrist_key: u64,

    /// Half-moves played since the root position this state was built from.
    pub ply: u16,
    /// Zobrist keys of every position reached, current included.
    pub repetition_history: Vec<u64>,
    pub undo_stack: Vec<UndoRecord>,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            pieces: [[0; 6]; 2],
            occupancy_by_color: [0; 2],
            occupancy_all: 0,
            side_to_move: Color::White,
            castling_rights: 0,
            en_passant_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            zobrist_key: 0,
            ply: 0,
            repetition_history: Vec::new(),
            undo_stack: Vec::new(),
        }
    }
}

impl Position {
    #[inline]
    pub fn new_empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn new_game() -> Self {
        parse_fen(STARTING_POSITION_FEN).expect("starting FEN should always parse")
    }

    #[inline]
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        parse_fen(fen)
    }

    #[inline]
    pub fn to_fen(&self) -> String {
        write_fen(self)
    }

    /// Locate the piece occupying `square`, if any.
    pub fn piece_on_square(&self, square: Square) -> Option<(Color, PieceKind)> {
        let mask = 1u64 << square;
        for color in [Color::White, Color::Black] {
            if (self.occupancy_by_color[color.index()] & mask) == 0 {
                continue;
            }
            for kind in PieceKind::ALL {
                if (self.pieces[color.index()][kind.index()] & mask) != 0 {
                    return Some((color, kind));
                }
            }
        }
        None
    }

    /// Rebuild both occupancy caches from the piece bitboards.
    pub fn recalc_occupancy(&mut self) {
        for color in [Color::White, Color::Black] {
            self.occupancy_by_color[color.index()] = self.pieces[color.index()]
                .iter()
                .copied()
                .fold(0u64, |acc, bb| acc | bb);
        }
        self.occupancy_all = self.occupancy_by_color[Color::White.index()]
            | self.occupancy_by_color[Color::Black.index()];
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        let kings = self.pieces[color.index()][PieceKind::King.index()];
        if kings == 0 {
            None
        } else {
            Some(kings.trailing_zeros() as Square)
        }
    }

    /// Debug-build invariant audit: piece masks pairwise disjoint and the
    /// occupancy caches equal to their union.
    pub fn debug_assert_consistent(&self) {
        #[cfg(debug_assertions)]
        {
            let mut seen = 0u64;
            for color in [Color::White, Color::Black] {
                let mut union = 0u64;
                for kind in PieceKind::ALL {
                    let bb = self.pieces[color.index()][kind.index()];
                    debug_assert_eq!(seen & bb, 0, "overlapping piece bitboards");
                    seen |= bb;
                    union |= bb;
                }
                debug_assert_eq!(union, self.occupancy_by_color[color.index()]);
            }
            debug_assert_eq!(seen, self.occupancy_all);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Position;
    use crate::position::piece_types::{Color, PieceKind};

    #[test]
    fn new_game_places_thirty_two_pieces() {
        let pos = Position::new_game();
        assert_eq!(pos.occupancy_all.count_ones(), 32);
        assert_eq!(pos.side_to_move, Color::White);
        assert_eq!(pos.castling_rights, 0b1111);
        pos.debug_assert_consistent();
    }

    #[test]
    fn piece_on_square_finds_kings() {
        let pos = Position::new_game();
        assert_eq!(pos.piece_on_square(4), Some((Color::White, PieceKind::King)));
        assert_eq!(pos.piece_on_square(60), Some((Color::Black, PieceKind::King)));
        assert_eq!(pos.piece_on_square(27), None);
    }

    #[test]
    fn king_square_reports_missing_king() {
        let pos = Position::new_empty();
        assert_eq!(pos.king_square(Color::White), None);
    }
}
