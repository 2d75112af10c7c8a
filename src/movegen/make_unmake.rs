//! Reversible in-place move application.
//!
//! `make_move_in_place` mutates the position and pushes an `UndoRecord`;
//! `unmake_move_in_place` pops it and restores the prior state bit for bit,
//! hash included. `MoveGuard` wraps the pair so the LIFO discipline is
//! enforced structurally on every exit path of a search frame.

use crate::movegen::move_encoding::*;
use crate::movegen::move_generation::MoveGenError;
use crate::position::chess_rules::*;
use crate::position::piece_types::*;
use crate::position::position::Position;
use crate::position::undo_record::UndoRecord;
use crate::search::zobrist::{
    castling_key, en_passant_file_key, piece_square_key, side_to_move_key,
};

/// Apply `mv` to `position`, updating the Zobrist key incrementally.
pub fn make_move_in_place(position: &mut Position, mv: Move) -> Result<(), MoveGenError> {
    let from = move_from(mv);
    let to = move_to(mv);
    let mover = position.side_to_move;
    let enemy = mover.opponent();
    let moved = moved_piece(mv).ok_or_else(|| {
        MoveGenError::InvalidState("move carries an invalid moved-piece code".to_owned())
    })?;

    let from_mask = 1u64 << from;
    let to_mask = 1u64 << to;
    if position.pieces[mover.index()][moved.index()] & from_mask == 0 {
        return Err(MoveGenError::InvalidState(format!(
            "no {moved:?} of the side to move on square {from}"
        )));
    }

    position.undo_stack.push(UndoRecord {
        mv,
        captured_piece: captured_piece(mv),
        prev_castling_rights: position.castling_rights,
        prev_en_passant_square: position.en_passant_square,
        prev_halfmove_clock: position.halfmove_clock,
        prev_zobrist_key: position.zobrist_key,
    });

    let mut key = position.zobrist_key;

    // Lift the moving piece off its origin.
    position.pieces[mover.index()][moved.index()] &= !from_mask;
    key ^= piece_square_key(mover, moved, from);

    // Remove any captured piece. En passant removes a pawn that is not on
    // the destination square.
    if (mv & FLAG_EN_PASSANT) != 0 {
        let capture_sq = en_passant_victim_square(mover, to);
        position.pieces[enemy.index()][PieceKind::Pawn.index()] &= !(1u64 << capture_sq);
        key ^= piece_square_key(enemy, PieceKind::Pawn, capture_sq);
    } else if (mv & FLAG_CAPTURE) != 0 {
        let captured = captured_piece(mv).ok_or_else(|| {
            MoveGenError::InvalidState("capture flag set without a captured piece".to_owned())
        })?;
        position.pieces[enemy.index()][captured.index()] &= !to_mask;
        key ^= piece_square_key(enemy, captured, to);
    }

    // Land the piece, promoted if the move says so.
    let placed = promotion_piece(mv).unwrap_or(moved);
    position.pieces[mover.index()][placed.index()] |= to_mask;
    key ^= piece_square_key(mover, placed, to);

    // Relocate the rook on castling.
    if (mv & (FLAG_CASTLE_KINGSIDE | FLAG_CASTLE_QUEENSIDE)) != 0 {
        let (rook_from, rook_to) = castling_rook_path(mover, mv);
        let rooks = &mut position.pieces[mover.index()][PieceKind::Rook.index()];
        *rooks &= !(1u64 << rook_from);
        *rooks |= 1u64 << rook_to;
        key ^= piece_square_key(mover, PieceKind::Rook, rook_from);
        key ^= piece_square_key(mover, PieceKind::Rook, rook_to);
    }

    // Castling rights decay when kings or rooks leave home, or a rook dies
    // on its home square.
    let new_rights = castling_rights_after(position.castling_rights, mover, moved, from, to);
    key ^= castling_key(position.castling_rights);
    key ^= castling_key(new_rights);
    position.castling_rights = new_rights;

    // En-passant target: set only directly behind a double push.
    if let Some(old_ep) = position.en_passant_square {
        key ^= en_passant_file_key(old_ep % 8);
    }
    position.en_passant_square = if (mv & FLAG_DOUBLE_PAWN_PUSH) != 0 {
        let ep_square = (from + to) / 2;
        key ^= en_passant_file_key(ep_square % 8);
        Some(ep_square)
    } else {
        None
    };

    if moved == PieceKind::Pawn || (mv & (FLAG_CAPTURE | FLAG_EN_PASSANT)) != 0 {
        position.halfmove_clock = 0;
    } else {
        position.halfmove_clock = position.halfmove_clock.saturating_add(1);
    }
    if mover == Color::Black {
        position.fullmove_number = position.fullmove_number.saturating_add(1);
    }

    position.side_to_move = enemy;
    key ^= side_to_move_key();

    position.zobrist_key = key;
    position.ply = position.ply.saturating_add(1);
    position.recalc_occupancy();
    position.repetition_history.push(key);
    position.debug_assert_consistent();

    Ok(())
}

/// Reverse the most recent `make_move_in_place`.
pub fn unmake_move_in_place(position: &mut Position) -> Result<(), MoveGenError> {
    let undo = position.undo_stack.pop().ok_or_else(|| {
        MoveGenError::InvalidState("unmake without a matching make".to_owned())
    })?;
    let mv = undo.mv;

    let from = move_from(mv);
    let to = move_to(mv);
    let mover = position.side_to_move.opponent();
    let enemy = position.side_to_move;
    let moved = moved_piece(mv).ok_or_else(|| {
        MoveGenError::InvalidState("undo record carries an invalid move".to_owned())
    })?;

    let from_mask = 1u64 << from;
    let to_mask = 1u64 << to;

    // Take the landed piece back off the destination and restore the mover.
    let placed = promotion_piece(mv).unwrap_or(moved);
    position.pieces[mover.index()][placed.index()] &= !to_mask;
    position.pieces[mover.index()][moved.index()] |= from_mask;

    // Resurrect any captured piece where it actually stood.
    if (mv & FLAG_EN_PASSANT) != 0 {
        let capture_sq = en_passant_victim_square(mover, to);
        position.pieces[enemy.index()][PieceKind::Pawn.index()] |= 1u64 << capture_sq;
    } else if let Some(captured) = undo.captured_piece {
        if (mv & FLAG_CAPTURE) != 0 {
            position.pieces[enemy.index()][captured.index()] |= to_mask;
        }
    }

    // Walk the castling rook home.
    if (mv & (FLAG_CASTLE_KINGSIDE | FLAG_CASTLE_QUEENSIDE)) != 0 {
        let (rook_from, rook_to) = castling_rook_path(mover, mv);
        let rooks = &mut position.pieces[mover.index()][PieceKind::Rook.index()];
        *rooks &= !(1u64 << rook_to);
        *rooks |= 1u64 << rook_from;
    }

    position.castling_rights = undo.prev_castling_rights;
    position.en_passant_square = undo.prev_en_passant_square;
    position.halfmove_clock = undo.prev_halfmove_clock;
    position.zobrist_key = undo.prev_zobrist_key;
    if mover == Color::Black {
        position.fullmove_number = position.fullmove_number.saturating_sub(1);
    }

    position.side_to_move = mover;
    position.ply = position.ply.saturating_sub(1);
    position.repetition_history.pop();
    position.recalc_occupancy();
    position.debug_assert_consistent();

    Ok(())
}

/// Scope guard binding a make to its unmake: the unmake runs on drop, so
/// every early return of a search frame still restores the position.
pub struct MoveGuard<'a> {
    position: &'a mut Position,
}

impl<'a> MoveGuard<'a> {
    pub fn apply(position: &'a mut Position, mv: Move) -> Result<Self, MoveGenError> {
        make_move_in_place(position, mv)?;
        Ok(Self { position })
    }

    #[inline]
    pub fn position(&mut self) -> &mut Position {
        self.position
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        let result = unmake_move_in_place(self.position);
        debug_assert!(result.is_ok(), "unmake failed inside MoveGuard");
    }
}

/// State needed to reverse a null move (side passes without moving).
#[derive(Debug, Clone, Copy)]
pub struct NullMoveUndo {
    prev_en_passant_square: Option<Square>,
    prev_halfmove_clock: u16,
    prev_zobrist_key: u64,
}

/// Flip the side to move without touching the board. The resulting key is
/// deliberately kept out of the repetition history.
pub fn make_null_move(position: &mut Position) -> NullMoveUndo {
    let undo = NullMoveUndo {
        prev_en_passant_square: position.en_passant_square,
        prev_halfmove_clock: position.halfmove_clock,
        prev_zobrist_key: position.zobrist_key,
    };

    if let Some(ep) = position.en_passant_square {
        position.zobrist_key ^= en_passant_file_key(ep % 8);
    }
    position.en_passant_square = None;
    position.side_to_move = position.side_to_move.opponent();
    position.zobrist_key ^= side_to_move_key();
    position.halfmove_clock = position.halfmove_clock.saturating_add(1);
    position.ply = position.ply.saturating_add(1);

    undo
}

pub fn unmake_null_move(position: &mut Position, undo: NullMoveUndo) {
    position.side_to_move = position.side_to_move.opponent();
    position.en_passant_square = undo.prev_en_passant_square;
    position.halfmove_clock = undo.prev_halfmove_clock;
    position.zobrist_key = undo.prev_zobrist_key;
    position.ply = position.ply.saturating_sub(1);
}

#[inline]
fn en_passant_victim_square(mover: Color, to: Square) -> Square {
    match mover {
        Color::White => to - 8,
        Color::Black => to + 8,
    }
}

#[inline]
fn castling_rook_path(mover: Color, mv: Move) -> (Square, Square) {
    if (mv & FLAG_CASTLE_KINGSIDE) != 0 {
        match mover {
            Color::White => (WHITE_KINGSIDE_ROOK, 5),
            Color::Black => (BLACK_KINGSIDE_ROOK, 61),
        }
    } else {
        match mover {
            Color::White => (WHITE_QUEENSIDE_ROOK, 3),
            Color::Black => (BLACK_QUEENSIDE_ROOK, 59),
        }
    }
}

fn castling_rights_after(
    rights: CastlingRights,
    mover: Color,
    moved: PieceKind,
    from: Square,
    to: Square,
) -> CastlingRights {
    let mut rights = rights;

    if moved == PieceKind::King {
        rights &= match mover {
            Color::White => !(CASTLE_WHITE_KINGSIDE | CASTLE_WHITE_QUEENSIDE),
            Color::Black => !(CASTLE_BLACK_KINGSIDE | CASTLE_BLACK_QUEENSIDE),
        };
    }

    for square in [from, to] {
        rights &= match square {
            WHITE_QUEENSIDE_ROOK => !CASTLE_WHITE_QUEENSIDE,
            WHITE_KINGSIDE_ROOK => !CASTLE_WHITE_KINGSIDE,
            BLACK_QUEENSIDE_ROOK => !CASTLE_BLACK_QUEENSIDE,
            BLACK_KINGSIDE_ROOK => !CASTLE_BLACK_KINGSIDE,
            _ => CastlingRights::MAX,
        };
    }

    rights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::move_generation::legal_moves;
    use crate::position::position::Position;
    use crate::search::zobrist::compute_zobrist_key;

    fn assert_round_trip(fen: &str) {
        let mut position = Position::from_fen(fen).expect("FEN should parse");
        let reference = position.clone();
        let moves = legal_moves(&mut position).expect("generation should succeed");
        assert!(!moves.is_empty(), "expected legal moves in {fen}");

        for mv in moves {
            make_move_in_place(&mut position, mv).expect("make should succeed");
            assert_eq!(
                position.zobrist_key,
                compute_zobrist_key(&position),
                "incremental hash diverged after {mv:#x} in {fen}"
            );
            unmake_move_in_place(&mut position).expect("unmake should succeed");

            assert_eq!(position.pieces, reference.pieces, "pieces differ in {fen}");
            assert_eq!(position.occupancy_all, reference.occupancy_all);
            assert_eq!(position.castling_rights, reference.castling_rights);
            assert_eq!(position.en_passant_square, reference.en_passant_square);
            assert_eq!(position.halfmove_clock, reference.halfmove_clock);
            assert_eq!(position.fullmove_number, reference.fullmove_number);
            assert_eq!(position.zobrist_key, reference.zobrist_key);
        }
    }

    #[test]
    fn make_unmake_round_trips_startpos() {
        assert_round_trip("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    }

    #[test]
    fn make_unmake_round_trips_kiwipete() {
        assert_round_trip("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 0");
    }

    #[test]
    fn make_unmake_round_trips_en_passant_and_promotion() {
        assert_round_trip("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
        assert_round_trip("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8");
    }

    #[test]
    fn double_push_sets_and_clears_en_passant_target() {
        let mut position = Position::new_game();
        let e2e4 = pack_move(12, 28, PieceKind::Pawn, None, None, FLAG_DOUBLE_PAWN_PUSH);
        make_move_in_place(&mut position, e2e4).expect("make should succeed");
        assert_eq!(position.en_passant_square, Some(20));
        unmake_move_in_place(&mut position).expect("unmake should succeed");
        assert_eq!(position.en_passant_square, None);
    }

    #[test]
    fn castling_moves_both_king_and_rook() {
        let mut position =
            Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("FEN should parse");
        let castle = pack_move(4, 6, PieceKind::King, None, None, FLAG_CASTLE_KINGSIDE);
        make_move_in_place(&mut position, castle).expect("make should succeed");
        assert_eq!(position.king_square(Color::White), Some(6));
        assert_ne!(
            position.pieces[Color::White.index()][PieceKind::Rook.index()] & (1u64 << 5),
            0
        );
        assert_eq!(position.castling_rights & CASTLE_WHITE_KINGSIDE, 0);
        assert_eq!(position.castling_rights & CASTLE_WHITE_QUEENSIDE, 0);
        unmake_move_in_place(&mut position).expect("unmake should succeed");
        assert_eq!(position.king_square(Color::White), Some(4));
        assert_ne!(position.castling_rights & CASTLE_WHITE_KINGSIDE, 0);
    }

    #[test]
    fn move_guard_unmakes_on_drop() {
        let mut position = Position::new_game();
        let reference = position.clone();
        let e2e3 = pack_move(12, 20, PieceKind::Pawn, None, None, 0);
        {
            let mut guard = MoveGuard::apply(&mut position, e2e3).expect("make should succeed");
            assert_eq!(guard.position().side_to_move, Color::Black);
        }
        assert_eq!(position.zobrist_key, reference.zobrist_key);
        assert_eq!(position.pieces, reference.pieces);
    }

    #[test]
    fn null_move_round_trips() {
        let mut position =
            Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 3").expect("FEN should parse");
        let reference = position.clone();
        let undo = make_null_move(&mut position);
        assert_eq!(position.side_to_move, Color::Black);
        assert_eq!(position.en_passant_square, None);
        unmake_null_move(&mut position, undo);
        assert_eq!(position.zobrist_key, reference.zobrist_key);
        assert_eq!(position.en_passant_square, reference.en_passant_square);
        assert_eq!(position.halfmove_clock, reference.halfmove_clock);
    }
}
