//! Coordinate text conversions (`e4` style) shared by FEN and UCI codecs.

use crate::position::piece_types::Square;

/// Parse a two-character coordinate such as `e4` into a square index.
#[inline]
pub fn algebraic_to_square(text: &str) -> Result<Square, String> {
    let bytes = text.as_bytes();
    if bytes.len() != 2 {
        return Err(format!("invalid algebraic square: {text}"));
    }

    let file = bytes[0];
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) {
        return Err(format!("invalid algebraic file: {}", file as char));
    }
    if !(b'1'..=b'8').contains(&rank) {
        return Err(format!("invalid algebraic rank: {}", rank as char));
    }

    Ok((rank - b'1') * 8 + (file - b'a'))
}

/// Render a square index as coordinate text.
#[inline]
pub fn square_to_algebraic(square: Square) -> Result<String, String> {
    if square > 63 {
        return Err(format!("square index out of bounds: {square}"));
    }
    let file = char::from(b'a' + square % 8);
    let rank = char::from(b'1' + square / 8);
    Ok(format!("{file}{rank}"))
}
