//! Zobrist hashing for position identity, the transposition table, and
//! repetition tracking.
//!
//! Keys come from a fixed-seed generator so hashes are identical across
//! runs, which keeps tests and cross-run debugging deterministic.

use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::position::piece_types::*;
use crate::position::position::Position;

const ZOBRIST_SEED: u64 = 0xA20C_6E14_8B72_D9F3;

#[derive(Debug)]
struct ZobristKeys {
    piece_square: [[[u64; 64]; 6]; 2],
    side_to_move: u64,
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

static KEYS: OnceLock<ZobristKeys> = OnceLock::new();

#[inline]
fn keys() -> &'static ZobristKeys {
    KEYS.get_or_init(build_keys)
}

fn build_keys() -> ZobristKeys {
    let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);

    let mut piece_square = [[[0u64; 64]; 6]; 2];
    for color in &mut piece_square {
        for piece in color.iter_mut() {
            for square in piece.iter_mut() {
                *square = rng.random();
            }
        }
    }

    let side_to_move = rng.random();

    let mut castling = [0u64; 16];
    for key in &mut castling {
        *key = rng.random();
    }

    let mut en_passant_file = [0u64; 8];
    for key in &mut en_passant_file {
        *key = rng.random();
    }

    ZobristKeys {
        piece_square,
        side_to_move,
        castling,
        en_passant_file,
    }
}

/// Key for a `(color, piece, square)` occupancy term.
#[inline]
pub fn piece_square_key(color: Color, piece: PieceKind, square: Square) -> u64 {
    keys().piece_square[color.index()][piece.index()][square as usize]
}

/// Key contribution of a castling-rights mask (`0..=15`).
#[inline]
pub fn castling_key(castling_rights: CastlingRights) -> u64 {
    keys().castling[(castling_rights & 0x0F) as usize]
}

/// Key contribution of a valid en-passant file.
#[inline]
pub fn en_passant_file_key(file: u8) -> u64 {
    keys().en_passant_file[(file & 0x07) as usize]
}

/// Side-to-move toggle key (xor in when Black is to move).
#[inline]
pub fn side_to_move_key() -> u64 {
    keys().side_to_move
}

/// Full position key computed from scratch. The incremental key maintained
/// by make/unmake must always equal this.
pub fn compute_zobrist_key(position: &Position) -> u64 {
    let mut key = 0u64;

    for color in [Color::White, Color::Black] {
        for piece in PieceKind::ALL {
            let mut bb = position.pieces[color.index()][piece.index()];
            while bb != 0 {
                let square = bb.trailing_zeros() as Square;
                key ^= piece_square_key(color, piece, square);
                bb &= bb - 1;
            }
        }
    }

    if position.side_to_move == Color::Black {
        key ^= side_to_move_key();
    }
    key ^= castling_key(position.castling_rights);
    if let Some(ep_square) = position.en_passant_square {
        key ^= en_passant_file_key(ep_square % 8);
    }

    key
}
