//! Move-count oracle.
//!
//! `perft` walks the legal move tree to a fixed depth and counts leaf
//! nodes; `perft_divide` breaks the count down per root move so a mismatch
//! against the reference table can be pinned to a move category.

use crate::movegen::make_unmake::{make_move_in_place, unmake_move_in_place};
use crate::movegen::move_encoding::Move;
use crate::movegen::move_generation::{legal_moves, MoveGenError};
use crate::position::position::Position;

pub fn perft(position: &mut Position, depth: u8) -> Result<u64, MoveGenError> {
    if depth == 0 {
        return Ok(1);
    }

    let moves = legal_moves(position)?;
    if depth == 1 {
        return Ok(moves.len() as u64);
    }

    let mut nodes = 0u64;
    for mv in moves {
        make_move_in_place(position, mv)?;
        nodes += perft(position, depth - 1)?;
        unmake_move_in_place(position)?;
    }
    Ok(nodes)
}

/// Per-root-move node counts, for diagnosing a perft mismatch.
pub fn perft_divide(
    position: &mut Position,
    depth: u8,
) -> Result<Vec<(Move, u64)>, MoveGenError> {
    let moves = legal_moves(position)?;
    let mut breakdown = Vec::with_capacity(moves.len());
    for mv in moves {
        make_move_in_place(position, mv)?;
        let nodes = if depth <= 1 {
            1
        } else {
            perft(position, depth - 1)?
        };
        unmake_move_in_place(position)?;
        breakdown.push((mv, nodes));
    }
    Ok(breakdown)
}

#[cfg(test)]
mod tests {
    use super::{perft, perft_divide};
    use crate::position::position::Position;

    fn assert_perft(fen: &str, expected: &[u64]) {
        let mut position = Position::from_fen(fen).expect("FEN should parse");
        for (depth_idx, &nodes) in expected.iter().enumerate() {
            let depth = (depth_idx + 1) as u8;
            assert_eq!(
                perft(&mut position, depth).expect("perft should run"),
                nodes,
                "perft depth {depth} mismatch for {fen}"
            );
        }
    }

    #[test]
    fn perft_startpos() {
        assert_perft("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", &[20, 400, 8902]);
    }

    #[test]
    fn perft_kiwipete() {
        assert_perft(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 0",
            &[48, 2039],
        );
    }

    #[test]
    fn perft_rook_endgame_with_en_passant() {
        assert_perft("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", &[14, 191, 2812]);
    }

    #[test]
    fn perft_promotion_tangle() {
        assert_perft("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8", &[44, 1486]);
    }

    #[test]
    fn divide_sums_to_perft() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 0";
        let mut position = Position::from_fen(fen).expect("FEN should parse");
        let breakdown = perft_divide(&mut position, 2).expect("divide should run");
        assert_eq!(breakdown.len(), 48);
        let total: u64 = breakdown.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 2039);
    }
}
