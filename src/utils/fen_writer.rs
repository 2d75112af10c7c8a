//! Position-to-FEN serializer, the inverse of `fen_parser`.

use crate::position::piece_types::*;
use crate::position::position::Position;
use crate::utils::algebraic::square_to_algebraic;

pub fn write_fen(position: &Position) -> String {
    format!(
        "{} {} {} {} {} {}",
        board_field(position),
        match position.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        },
        castling_field(position.castling_rights),
        en_passant_field(position.en_passant_square),
        position.halfmove_clock,
        position.fullmove_number
    )
}

fn board_field(position: &Position) -> String {
    let mut out = String::new();

    for rank in (0..8).rev() {
        let mut empty_run = 0u8;
        for file in 0..8 {
            let square = (rank * 8 + file) as Square;
            match position.piece_on_square(square) {
                Some((color, piece)) => {
                    if empty_run > 0 {
                        out.push(char::from(b'0' + empty_run));
                        empty_run = 0;
                    }
                    out.push(piece_to_fen_char(color, piece));
                }
                None => empty_run += 1,
            }
        }
        if empty_run > 0 {
            out.push(char::from(b'0' + empty_run));
        }
        if rank > 0 {
            out.push('/');
        }
    }

    out
}

fn piece_to_fen_char(color: Color, piece: PieceKind) -> char {
    let base = match piece {
        PieceKind::Pawn => 'p',
        PieceKind::Knight => 'n',
        PieceKind::Bishop => 'b',
        PieceKind::Rook => 'r',
        PieceKind::Queen => 'q',
        PieceKind::King => 'k',
    };
    match color {
        Color::White => base.to_ascii_uppercase(),
        Color::Black => base,
    }
}

fn castling_field(rights: CastlingRights) -> String {
    let mut out = String::new();
    if (rights & CASTLE_WHITE_KINGSIDE) != 0 {
        out.push('K');
    }
    if (rights & CASTLE_WHITE_QUEENSIDE) != 0 {
        out.push('Q');
    }
    if (rights & CASTLE_BLACK_KINGSIDE) != 0 {
        out.push('k');
    }
    if (rights & CASTLE_BLACK_QUEENSIDE) != 0 {
        out.push('q');
    }
    if out.is_empty() {
        out.push('-');
    }
    out
}

fn en_passant_field(square: Option<Square>) -> String {
    match square {
        Some(square) => square_to_algebraic(square).unwrap_or_else(|_| "-".to_owned()),
        None => "-".to_owned(),
    }
}
