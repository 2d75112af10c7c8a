//! Long-algebraic move codec (`e2e4`, `a7a8q`).
//!
//! Parsing is two-stage: `long_algebraic_to_move` reconstructs the packed
//! move from board context, and `parse_uci_move` additionally demands the
//! move be legal, returning `None` (the protocol's "no move" sentinel)
//! instead of an error for anything malformed or illegal.

use crate::movegen::move_encoding::*;
use crate::movegen::move_generation::legal_moves;
use crate::position::piece_types::*;
use crate::position::position::Position;
use crate::utils::algebraic::{algebraic_to_square, square_to_algebraic};

pub fn move_to_long_algebraic(mv: Move) -> String {
    if mv == NULL_MOVE {
        return "0000".to_owned();
    }

    let mut out = String::with_capacity(5);
    out.push_str(&square_to_algebraic(move_from(mv)).unwrap_or_else(|_| "??".to_owned()));
    out.push_str(&square_to_algebraic(move_to(mv)).unwrap_or_else(|_| "??".to_owned()));
    if let Some(promo) = promotion_piece(mv) {
        out.push(match promo {
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            _ => 'q',
        });
    }
    out
}

/// Rebuild the fully classified move a LAN string denotes in `position`.
pub fn long_algebraic_to_move(text: &str, position: &Position) -> Result<Move, String> {
    let bytes = text.as_bytes();
    if bytes.len() != 4 && bytes.len() != 5 {
        return Err(format!("invalid long algebraic move: {text}"));
    }

    let from = algebraic_to_square(&text[0..2])?;
    let to = algebraic_to_square(&text[2..4])?;

    let (mover_color, moved) = position
        .piece_on_square(from)
        .ok_or_else(|| format!("no piece on from-square {}", &text[0..2]))?;
    if mover_color != position.side_to_move {
        return Err("from-square piece does not belong to the side to move".to_owned());
    }

    let target = position.piece_on_square(to);
    let mut captured = target.map(|(_, piece)| piece);
    let mut flags = 0u64;
    if captured.is_some() {
        flags |= FLAG_CAPTURE;
    }

    if moved == PieceKind::Pawn && from.abs_diff(to) == 16 {
        flags |= FLAG_DOUBLE_PAWN_PUSH;
    }

    if moved == PieceKind::King && from.abs_diff(to) == 2 {
        flags |= if to > from {
            FLAG_CASTLE_KINGSIDE
        } else {
            FLAG_CASTLE_QUEENSIDE
        };
    }

    if moved == PieceKind::Pawn
        && position.en_passant_square == Some(to)
        && square_file(from) != square_file(to)
        && target.is_none()
    {
        captured = Some(PieceKind::Pawn);
        flags |= FLAG_CAPTURE | FLAG_EN_PASSANT;
    }

    let promotion = if bytes.len() == 5 {
        if moved != PieceKind::Pawn {
            return Err("only pawns may promote".to_owned());
        }
        let rank = square_rank(to);
        if rank != 0 && rank != 7 {
            return Err("promotion move must end on a back rank".to_owned());
        }
        Some(match bytes[4].to_ascii_lowercase() {
            b'n' => PieceKind::Knight,
            b'b' => PieceKind::Bishop,
            b'r' => PieceKind::Rook,
            b'q' => PieceKind::Queen,
            other => return Err(format!("invalid promotion piece: {}", other as char)),
        })
    } else {
        if moved == PieceKind::Pawn {
            let rank = square_rank(to);
            if rank == 0 || rank == 7 {
                return Err(format!("missing promotion piece in move: {text}"));
            }
        }
        None
    };

    Ok(pack_move(from, to, moved, captured, promotion, flags))
}

/// Protocol-boundary parse: anything malformed, or any move the side to
/// move cannot actually play, comes back as `None`, never a panic.
pub fn parse_uci_move(position: &mut Position, text: &str) -> Option<Move> {
    let candidate = long_algebraic_to_move(text, position).ok()?;
    let legal = legal_moves(position).ok()?;
    legal.into_iter().find(|&mv| mv == candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::position::Position;

    #[test]
    fn round_trips_a_double_push() {
        let position = Position::new_game();
        let mv = long_algebraic_to_move("e2e4", &position).expect("move should parse");
        assert_ne!(mv & FLAG_DOUBLE_PAWN_PUSH, 0);
        assert_eq!(move_to_long_algebraic(mv), "e2e4");
    }

    #[test]
    fn round_trips_a_promotion() {
        let position = Position::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").expect("FEN should parse");
        let mv = long_algebraic_to_move("a7a8q", &position).expect("move should parse");
        assert_eq!(promotion_piece(mv), Some(PieceKind::Queen));
        assert_eq!(move_to_long_algebraic(mv), "a7a8q");
    }

    #[test]
    fn classifies_castling_and_en_passant() {
        let castle_pos =
            Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("FEN should parse");
        let kingside = long_algebraic_to_move("e1g1", &castle_pos).expect("castle should parse");
        assert_ne!(kingside & FLAG_CASTLE_KINGSIDE, 0);
        let queenside = long_algebraic_to_move("e1c1", &castle_pos).expect("castle should parse");
        assert_ne!(queenside & FLAG_CASTLE_QUEENSIDE, 0);

        let ep_pos =
            Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").expect("FEN should parse");
        let ep = long_algebraic_to_move("e5d6", &ep_pos).expect("en passant should parse");
        assert_ne!(ep & FLAG_EN_PASSANT, 0);
        assert_eq!(captured_piece(ep), Some(PieceKind::Pawn));
    }

    #[test]
    fn null_move_renders_as_protocol_sentinel() {
        assert_eq!(move_to_long_algebraic(NULL_MOVE), "0000");
    }

    #[test]
    fn uci_parse_rejects_garbage_and_illegal_moves_as_none() {
        let mut position = Position::new_game();
        assert_eq!(parse_uci_move(&mut position, "zz99"), None);
        assert_eq!(parse_uci_move(&mut position, "e2e"), None);
        // Legal shape, but the knight cannot reach e5 from g1.
        assert_eq!(parse_uci_move(&mut position, "g1e5"), None);
        // Moving the opponent's piece is not ours to play.
        assert_eq!(parse_uci_move(&mut position, "e7e5"), None);
        // A real move parses.
        assert!(parse_uci_move(&mut position, "g1f3").is_some());
    }
}
