//! FEN-to-Position parser.
//!
//! Builds a fully populated incremental position from a Forsyth-Edwards
//! Notation string: bitboards, rights, clocks, occupancies, and the
//! Zobrist key, with the repetition history seeded from the parsed state.

use thiserror::Error;

use crate::position::piece_types::*;
use crate::position::position::Position;
use crate::search::zobrist::compute_zobrist_key;
use crate::utils::algebraic::algebraic_to_square;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("missing {0} field in FEN")]
    MissingField(&'static str),
    #[error("FEN has extra trailing fields")]
    TrailingFields,
    #[error("invalid board layout: {0}")]
    BadBoard(String),
    #[error("invalid side-to-move field: {0}")]
    BadSideToMove(String),
    #[error("invalid castling rights character: {0}")]
    BadCastling(char),
    #[error("invalid en-passant field: {0}")]
    BadEnPassant(String),
    #[error("invalid clock field: {0}")]
    BadClock(String),
}

pub fn parse_fen(fen: &str) -> Result<Position, FenError> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or(FenError::MissingField("board"))?;
    let side_part = parts.next().ok_or(FenError::MissingField("side-to-move"))?;
    let castling_part = parts.next().ok_or(FenError::MissingField("castling"))?;
    let en_passant_part = parts.next().ok_or(FenError::MissingField("en-passant"))?;
    let halfmove_part = parts.next().ok_or(FenError::MissingField("halfmove clock"))?;
    let fullmove_part = parts.next().ok_or(FenError::MissingField("fullmove number"))?;
    if parts.next().is_some() {
        return Err(FenError::TrailingFields);
    }

    let mut position = Position::new_empty();

    parse_board(board_part, &mut position)?;
    position.side_to_move = match side_part {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(FenError::BadSideToMove(other.to_owned())),
    };
    position.castling_rights = parse_castling_rights(castling_part)?;
    position.en_passant_square = match en_passant_part {
        "-" => None,
        text => Some(
            algebraic_to_square(text).map_err(|_| FenError::BadEnPassant(text.to_owned()))?,
        ),
    };
    position.halfmove_clock = halfmove_part
        .parse::<u16>()
        .map_err(|_| FenError::BadClock(halfmove_part.to_owned()))?;
    position.fullmove_number = fullmove_part
        .parse::<u16>()
        .map_err(|_| FenError::BadClock(fullmove_part.to_owned()))?;

    position.recalc_occupancy();
    position.zobrist_key = compute_zobrist_key(&position);
    position.repetition_history.push(position.zobrist_key);

    Ok(position)
}

fn parse_board(board_part: &str, position: &mut Position) -> Result<(), FenError> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::BadBoard("expected 8 ranks".to_owned()));
    }

    for (fen_rank_idx, rank_text) in ranks.iter().enumerate() {
        let board_rank = 7 - fen_rank_idx;
        let mut file = 0usize;

        for ch in rank_text.chars() {
            if let Some(step) = ch.to_digit(10) {
                if !(1..=8).contains(&step) {
                    return Err(FenError::BadBoard(format!("empty-square count '{ch}'")));
                }
                file += step as usize;
                continue;
            }

            let (color, piece) = piece_from_fen_char(ch)
                .ok_or_else(|| FenError::BadBoard(format!("piece character '{ch}'")))?;
            if file >= 8 {
                return Err(FenError::BadBoard("rank overflows 8 files".to_owned()));
            }
            let square = board_rank * 8 + file;
            position.pieces[color.index()][piece.index()] |= 1u64 << square;
            file += 1;
        }

        if file != 8 {
            return Err(FenError::BadBoard("rank does not sum to 8 files".to_owned()));
        }
    }

    Ok(())
}

fn parse_castling_rights(castling_part: &str) -> Result<CastlingRights, FenError> {
    if castling_part == "-" {
        return Ok(0);
    }
    let mut rights: CastlingRights = 0;
    for ch in castling_part.chars() {
        rights |= match ch {
            'K' => CASTLE_WHITE_KINGSIDE,
            'Q' => CASTLE_WHITE_QUEENSIDE,
            'k' => CASTLE_BLACK_KINGSIDE,
            'q' => CASTLE_BLACK_QUEENSIDE,
            _ => return Err(FenError::BadCastling(ch)),
        };
    }
    Ok(rights)
}

pub(crate) fn piece_from_fen_char(ch: char) -> Option<(Color, PieceKind)> {
    let color = if ch.is_ascii_uppercase() {
        Color::White
    } else if ch.is_ascii_lowercase() {
        Color::Black
    } else {
        return None;
    };

    let piece = match ch.to_ascii_lowercase() {
        'p' => PieceKind::Pawn,
        'n' => PieceKind::Knight,
        'b' => PieceKind::Bishop,
        'r' => PieceKind::Rook,
        'q' => PieceKind::Queen,
        'k' => PieceKind::King,
        _ => return None,
    };

    Some((color, piece))
}

#[cfg(test)]
mod tests {
    use super::{parse_fen, FenError};
    use crate::position::chess_rules::STARTING_POSITION_FEN;
    use crate::position::piece_types::Color;

    #[test]
    fn parses_the_starting_position() {
        let position = parse_fen(STARTING_POSITION_FEN).expect("starting FEN should parse");
        assert_eq!(position.side_to_move, Color::White);
        assert_eq!(position.fullmove_number, 1);
        assert_eq!(position.halfmove_clock, 0);
        assert_eq!(position.occupancy_all.count_ones(), 32);
        assert_ne!(position.zobrist_key, 0);
        assert_eq!(position.repetition_history, vec![position.zobrist_key]);
    }

    #[test]
    fn rejects_malformed_inputs() {
        assert_eq!(parse_fen(""), Err(FenError::MissingField("board")));
        assert!(matches!(
            parse_fen("8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::BadBoard(_))
        ));
        assert!(matches!(
            parse_fen("8/8/8/8/8/8/8/8 x - - 0 1"),
            Err(FenError::BadSideToMove(_))
        ));
        assert_eq!(
            parse_fen("8/8/8/8/8/8/8/8 w Z - 0 1"),
            Err(FenError::BadCastling('Z'))
        );
        assert!(matches!(
            parse_fen("8/8/8/8/8/8/8/8 w - e9 0 1"),
            Err(FenError::BadEnPassant(_))
        ));
        assert!(matches!(
            parse_fen("8/8/8/8/8/8/8/8 w - - x 1"),
            Err(FenError::BadClock(_))
        ));
        assert_eq!(
            parse_fen("8/8/8/8/8/8/8/8 w - - 0 1 extra"),
            Err(FenError::TrailingFields)
        );
    }
}
