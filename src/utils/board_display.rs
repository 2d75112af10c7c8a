//! ASCII board rendering for logs and the UCI `display` debugging command.

use crate::position::piece_types::*;
use crate::position::position::Position;

pub fn render_position(position: &Position) -> String {
    let mut out = String::new();

    for rank in (0..8).rev() {
        out.push(char::from(b'1' + rank as u8));
        out.push(' ');
        for file in 0..8 {
            let square = (rank * 8 + file) as Square;
            let glyph = match position.piece_on_square(square) {
                Some((color, piece)) => piece_glyph(color, piece),
                None => '.',
            };
            out.push(glyph);
            out.push(' ');
        }
        out.push('\n');
    }
    out.push_str("  a b c d e f g h\n");
    out.push_str(&format!(
        "side: {} castling: {:04b} hash: {:#018x}\n",
        match position.side_to_move {
            Color::White => "white",
            Color::Black => "black",
        },
        position.castling_rights,
        position.zobrist_key
    ));

    out
}

fn piece_glyph(color: Color, piece: PieceKind) -> char {
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

#[cfg(test)]
mod tests {
    use super::render_position;
    use crate::position::position::Position;

    #[test]
    fn startpos_renders_both_back_ranks() {
        let text = render_position(&Position::new_game());
        assert!(text.contains("R N B Q K B N R"));
        assert!(text.contains("r n b q k b n r"));
        assert!(text.contains("side: white"));
    }
}
