use crate::movegen::move_encoding::Move;
use crate::position::piece_types::*;

/// Everything `unmake_move_in_place` needs that the move value alone cannot
/// re-derive. One record is pushed per make and popped by the matching
/// unmake, strictly LIFO.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UndoRecord {
    pub mv: Move,
    pub captured_piece: Option<PieceKind>,

    pub prev_castling_rights: CastlingRights,
    pub prev_en_passant_square: Option<Square>,
    pub prev_halfmove_clock: u16,
    pub prev_zobrist_key: u64,
}
