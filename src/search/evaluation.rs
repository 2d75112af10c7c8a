//! Static position evaluation.
//!
//! `TaperedScorer` is the canonical evaluator: material plus piece-square
//! tables interpolated between middlegame and endgame by a phase counter,
//! with mobility, king safety, pawn structure, bishop pair, rook files,
//! knight outposts, and a small contempt term. Scores are centipawns from
//! the side to move's perspective, clamped well below the mate band.

use crate::attacks::leaper_tables::{knight_attacks, pawn_attacks};
use crate::attacks::magic_tables::{bishop_attacks, queen_attacks, rook_attacks};
use crate::movegen::attack_checks::is_square_attacked;
use crate::position::piece_types::*;
use crate::position::position::Position;

pub const MATE_SCORE: i32 = 30000;
pub const EVAL_CLAMP: i32 = 5000;

const CONTEMPT: i32 = 12;
const FULL_PHASE: i32 = 24;

pub const PIECE_VALUES: [i32; 6] = [100, 320, 333, 500, 900, 20000];

#[inline]
pub const fn piece_value(piece: PieceKind) -> i32 {
    PIECE_VALUES[piece.index()]
}

pub trait BoardScorer: Send + Sync {
    /// Score from the perspective of the side to move.
    fn score(&self, position: &Position) -> i32;
}

/// Bare material count; the scorer search tests lean on.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialScorer;

impl BoardScorer for MaterialScorer {
    fn score(&self, position: &Position) -> i32 {
        let mut white_minus_black = 0i32;
        for piece in PieceKind::ALL {
            let white = position.pieces[0][piece.index()].count_ones() as i32;
            let black = position.pieces[1][piece.index()].count_ones() as i32;
            white_minus_black += (white - black) * piece_value(piece);
        }
        perspective(position, white_minus_black)
    }
}

/// The engine's evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaperedScorer;

impl BoardScorer for TaperedScorer {
    fn score(&self, position: &Position) -> i32 {
        let phase = game_phase(position);
        let mut mg = 0i32;
        let mut eg = 0i32;

        for color in [Color::White, Color::Black] {
            let sign = if color == Color::White { 1 } else { -1 };

            let (piece_mg, piece_eg) = material_and_placement(position, color);
            mg += sign * piece_mg;
            eg += sign * piece_eg;

            mg += sign * mobility(position, color) / 5;
            mg += sign * king_safety(position, color, phase);

            let minors = sign * minor_piece_terms(position, color);
            mg += minors;
            eg += minors;

            let bishops =
                position.pieces[color.index()][PieceKind::Bishop.index()].count_ones() as i32;
            if bishops >= 2 {
                mg += sign * 50;
                eg += sign * 70;
            }
        }

        let pawns = pawn_structure(position);
        mg += pawns;
        eg += pawns;

        let white_minus_black = (mg * phase + eg * (FULL_PHASE - phase)) / FULL_PHASE;
        let clamped = white_minus_black.clamp(-EVAL_CLAMP, EVAL_CLAMP);
        perspective(position, clamped) + CONTEMPT
    }
}

#[inline]
fn perspective(position: &Position, white_minus_black: i32) -> i32 {
    match position.side_to_move {
        Color::White => white_minus_black,
        Color::Black => -white_minus_black,
    }
}

/// Phase counter: 0 = bare-kings endgame, 24 = full middlegame.
pub fn game_phase(position: &Position) -> i32 {
    let mut phase = 0i32;
    for color in [Color::White, Color::Black] {
        let idx = color.index();
        phase += position.pieces[idx][PieceKind::Knight.index()].count_ones() as i32;
        phase += position.pieces[idx][PieceKind::Bishop.index()].count_ones() as i32;
        phase += position.pieces[idx][PieceKind::Rook.index()].count_ones() as i32 * 2;
        phase += position.pieces[idx][PieceKind::Queen.index()].count_ones() as i32 * 4;
    }
    phase.min(FULL_PHASE)
}

/// Material plus piece-square placement for one color, middlegame and
/// endgame variants. Tables are written from White's side; Black mirrors
/// ranks with `square ^ 56`.
fn material_and_placement(position: &Position, color: Color) -> (i32, i32) {
    let mut mg = 0i32;
    let mut eg = 0i32;

    for piece in PieceKind::ALL {
        let value = piece_value(piece);
        let (mg_table, eg_table) = tables_for(piece);
        let mut bb = position.pieces[color.index()][piece.index()];
        while bb != 0 {
            let square = bb.trailing_zeros() as usize;
            bb &= bb - 1;
            let table_square = match color {
                Color::White => square,
                Color::Black => square ^ 56,
            };
            mg += value + mg_table[table_square];
            eg += value + eg_table[table_square];
        }
    }

    (mg, eg)
}

fn tables_for(piece: PieceKind) -> (&'static [i32; 64], &'static [i32; 64]) {
    match piece {
        PieceKind::Pawn => (&MG_PAWN_TABLE, &EG_PAWN_TABLE),
        PieceKind::Knight => (&KNIGHT_TABLE, &KNIGHT_TABLE),
        PieceKind::Bishop => (&BISHOP_TABLE, &BISHOP_TABLE),
        PieceKind::Rook => (&ROOK_TABLE, &ROOK_TABLE),
        PieceKind::Queen => (&QUEEN_TABLE, &QUEEN_TABLE),
        PieceKind::King => (&MG_KING_TABLE, &EG_KING_TABLE),
    }
}

/// Weighted count of pseudo-attacked, non-own squares. Minor pieces weigh
/// more than rooks and queens.
fn mobility(position: &Position, color: Color) -> i32 {
    let idx = color.index();
    let occ = position.occupancy_all;
    let not_own = !position.occupancy_by_color[idx];
    let mut score = 0i32;

    for (piece, weight) in [
        (PieceKind::Knight, 4),
        (PieceKind::Bishop, 3),
        (PieceKind::Rook, 2),
        (PieceKind::Queen, 1),
    ] {
        let mut bb = position.pieces[idx][piece.index()];
        while bb != 0 {
            let square = bb.trailing_zeros() as Square;
            bb &= bb - 1;
            let attacks = match piece {
                PieceKind::Knight => knight_attacks(square),
                PieceKind::Bishop => bishop_attacks(square, occ),
                PieceKind::Rook => rook_attacks(square, occ),
                _ => queen_attacks(square, occ),
            };
            score += (attacks & not_own).count_ones() as i32 * weight;
        }
    }

    score
}

fn king_safety(position: &Position, color: Color, phase: i32) -> i32 {
    let Some(king_sq) = position.king_square(color) else {
        return 0;
    };
    let enemy = color.opponent();
    let king_file = i32::from(square_file(king_sq));
    let king_rank = i32::from(square_rank(king_sq));
    let own_pawns = position.pieces[color.index()][PieceKind::Pawn.index()];
    let mut score = 0i32;

    // Penalty per rank the king has strayed from its back rank.
    let ranks_forward = match color {
        Color::White => king_rank,
        Color::Black => 7 - king_rank,
    };
    score -= ranks_forward * 50;

    // Pawn shield directly in front.
    let shield_rank = match color {
        Color::White => king_rank + 1,
        Color::Black => king_rank - 1,
    };
    if (0..8).contains(&shield_rank) {
        for file in (king_file - 1).max(0)..=(king_file + 1).min(7) {
            let square = (shield_rank * 8 + file) as Square;
            if (own_pawns & (1u64 << square)) != 0 {
                score += 20;
            }
        }
    }

    // Enemy pressure on the 3x3 king zone.
    let mut attacked_zone = 0i32;
    for dr in -1..=1 {
        for df in -1..=1 {
            let rank = king_rank + dr;
            let file = king_file + df;
            if (0..8).contains(&rank) && (0..8).contains(&file) {
                let square = (rank * 8 + file) as Square;
                if is_square_attacked(position, square, enemy) {
                    attacked_zone += 1;
                }
            }
        }
    }
    score -= attacked_zone * 15;

    // Open files beside the king invite heavy pieces in.
    for file in (king_file - 1).max(0)..=(king_file + 1).min(7) {
        if (own_pawns & file_mask(file as u8)) == 0 {
            score -= 30;
        }
    }

    // Unspent castling rights keep options open.
    let (kingside, queenside) = match color {
        Color::White => (CASTLE_WHITE_KINGSIDE, CASTLE_WHITE_QUEENSIDE),
        Color::Black => (CASTLE_BLACK_KINGSIDE, CASTLE_BLACK_QUEENSIDE),
    };
    if (position.castling_rights & kingside) != 0 {
        score += 15;
    }
    if (position.castling_rights & queenside) != 0 {
        score += 15;
    }

    // A king wandering the central 4x4 while armies remain on the board.
    if phase > 12 {
        let center_dist = king_file
            .min(7 - king_file)
            .min(king_rank)
            .min(7 - king_rank);
        if center_dist >= 2 {
            score -= 100;
        }
    }

    score
}

/// Rook file bonuses and knight outposts, phase-independent.
fn minor_piece_terms(position: &Position, color: Color) -> i32 {
    let idx = color.index();
    let enemy = color.opponent();
    let own_pawns = position.pieces[idx][PieceKind::Pawn.index()];
    let enemy_pawns = position.pieces[enemy.index()][PieceKind::Pawn.index()];
    let all_pawns = own_pawns | enemy_pawns;
    let mut score = 0i32;

    let mut rooks = position.pieces[idx][PieceKind::Rook.index()];
    while rooks != 0 {
        let square = rooks.trailing_zeros() as Square;
        rooks &= rooks - 1;
        let mask = file_mask(square_file(square));
        if (all_pawns & mask) == 0 {
            score += 16;
        } else if (own_pawns & mask) == 0 {
            score += 8;
        }
    }

    let mut knights = position.pieces[idx][PieceKind::Knight.index()];
    while knights != 0 {
        let square = knights.trailing_zeros() as Square;
        knights &= knights - 1;
        if is_knight_outpost(color, square, own_pawns, enemy_pawns) {
            score += 24;
        }
    }

    score
}

/// An outpost is an advanced knight a friendly pawn defends and no enemy
/// pawn can ever drive away.
fn is_knight_outpost(color: Color, square: Square, own_pawns: u64, enemy_pawns: u64) -> bool {
    let rank = square_rank(square);
    let advanced = match color {
        Color::White => (3..=5).contains(&rank),
        Color::Black => (2..=4).contains(&rank),
    };
    if !advanced {
        return false;
    }

    // Defended by one of our pawns (attack symmetry).
    if pawn_attacks(color.opponent(), square) & own_pawns == 0 {
        return false;
    }

    // No enemy pawn on an adjacent file ahead of the knight.
    let file = i32::from(square_file(square));
    for f in [file - 1, file + 1] {
        if !(0..8).contains(&f) {
            continue;
        }
        let mut bb = enemy_pawns & file_mask(f as u8);
        while bb != 0 {
            let pawn_sq = bb.trailing_zeros() as Square;
            bb &= bb - 1;
            let ahead = match color {
                Color::White => square_rank(pawn_sq) > rank,
                Color::Black => square_rank(pawn_sq) < rank,
            };
            if ahead {
                return false;
            }
        }
    }

    true
}

const PASSED_PAWN_BONUS: [i32; 8] = [0, 10, 30, 50, 75, 100, 150, 200];

/// Doubled, isolated, and passed pawns; white-minus-black.
fn pawn_structure(position: &Position) -> i32 {
    let white_pawns = position.pieces[Color::White.index()][PieceKind::Pawn.index()];
    let black_pawns = position.pieces[Color::Black.index()][PieceKind::Pawn.index()];
    let mut score = 0i32;

    for (pawns, enemy_pawns, color, sign) in [
        (white_pawns, black_pawns, Color::White, 1),
        (black_pawns, white_pawns, Color::Black, -1),
    ] {
        for file in 0u8..8 {
            let on_file = (pawns & file_mask(file)).count_ones() as i32;
            if on_file >= 2 {
                score -= sign * 25 * (on_file - 1);
            }
            if on_file > 0 {
                let left = file.checked_sub(1).map_or(0, |f| pawns & file_mask(f));
                let right = if file < 7 { pawns & file_mask(file + 1) } else { 0 };
                if left == 0 && right == 0 {
                    score -= sign * 20;
                }
            }
        }

        let mut bb = pawns;
        while bb != 0 {
            let square = bb.trailing_zeros() as Square;
            bb &= bb - 1;
            if is_passed_pawn(color, square, enemy_pawns) {
                let relative_rank = match color {
                    Color::White => square_rank(square),
                    Color::Black => 7 - square_rank(square),
                } as usize;
                score += sign * PASSED_PAWN_BONUS[relative_rank];
            }
        }
    }

    score
}

/// No enemy pawn ahead on this or an adjacent file.
pub fn is_passed_pawn(color: Color, square: Square, enemy_pawns: u64) -> bool {
    let file = i32::from(square_file(square));
    let rank = square_rank(square);

    for f in (file - 1).max(0)..=(file + 1).min(7) {
        let mut bb = enemy_pawns & file_mask(f as u8);
        while bb != 0 {
            let pawn_sq = bb.trailing_zeros() as Square;
            bb &= bb - 1;
            let ahead = match color {
                Color::White => square_rank(pawn_sq) > rank,
                Color::Black => square_rank(pawn_sq) < rank,
            };
            if ahead {
                return false;
            }
        }
    }
    true
}

#[inline]
pub const fn file_mask(file: u8) -> u64 {
    0x0101_0101_0101_0101u64 << (file & 7)
}

// Piece-square tables, index 0 = a1, White's orientation.

#[rustfmt::skip]
const MG_PAWN_TABLE: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10,-20,-20, 10, 10,  5,
     5, -5,-10,  0,  0,-10, -5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5,  5, 10, 25, 25, 10,  5,  5,
    10, 10, 20, 30, 30, 20, 10, 10,
    50, 50, 50, 50, 50, 50, 50, 50,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const EG_PAWN_TABLE: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    10, 20, 20, 30, 30, 20, 20, 10,
    10, 10, 20, 30, 30, 20, 10, 10,
    20, 20, 30, 40, 40, 30, 20, 20,
    30, 30, 40, 50, 50, 40, 30, 30,
    40, 40, 50, 60, 60, 50, 40, 40,
    80, 80, 80, 80, 80, 80, 80, 80,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_TABLE: [i32; 64] = [
   -50,-40,-30,-30,-30,-30,-40,-50,
   -40,-20,  0,  0,  0,  0,-20,-40,
   -30,  0, 10, 15, 15, 10,  0,-30,
   -30,  5, 15, 20, 20, 15,  5,-30,
   -30,  0, 15, 20, 20, 15,  0,-30,
   -30,  5, 10, 15, 15, 10,  5,-30,
   -40,-20,  0,  5,  5,  0,-20,-40,
   -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
const BISHOP_TABLE: [i32; 64] = [
   -20,-10,-10,-10,-10,-10,-10,-20,
   -10,  5,  0,  0,  0,  0,  5,-10,
   -10, 10, 10, 10, 10, 10, 10,-10,
   -10,  0, 10, 10, 10, 10,  0,-10,
   -10,  5,  5, 10, 10,  5,  5,-10,
   -10,  0,  5, 10, 10,  5,  0,-10,
   -10,  0,  0,  0,  0,  0,  0,-10,
   -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_TABLE: [i32; 64] = [
     0,  0,  0,  5,  5,  0,  0,  0,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     5, 10, 10, 10, 10, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_TABLE: [i32; 64] = [
   -20,-10,-10, -5, -5,-10,-10,-20,
   -10,  0,  0,  0,  0,  0,  0,-10,
   -10,  0,  5,  5,  5,  5,  0,-10,
    -5,  0,  5,  5,  5,  5,  0, -5,
    -5,  0,  5,  5,  5,  5,  0, -5,
   -10,  0,  5,  5,  5,  5,  0,-10,
   -10,  0,  0,  0,  0,  0,  0,-10,
   -20,-10,-10, -5, -5,-10,-10,-20,
];

#[rustfmt::skip]
const MG_KING_TABLE: [i32; 64] = [
    20, 30, 10,  0,  0, 10, 30, 20,
    20, 20,  0,  0,  0,  0, 20, 20,
   -10,-20,-20,-20,-20,-20,-20,-10,
   -20,-30,-30,-40,-40,-30,-30,-20,
   -30,-40,-40,-50,-50,-40,-40,-30,
   -30,-40,-40,-50,-50,-40,-40,-30,
   -30,-40,-40,-50,-50,-40,-40,-30,
   -30,-40,-40,-50,-50,-40,-40,-30,
];

#[rustfmt::skip]
const EG_KING_TABLE: [i32; 64] = [
   -50,-30,-30,-30,-30,-30,-30,-50,
   -30,-30,  0,  0,  0,  0,-30,-30,
   -30,-10, 20, 30, 30, 20,-10,-30,
   -30,-10, 30, 40, 40, 30,-10,-30,
   -30,-10, 30, 40, 40, 30,-10,-30,
   -30,-10, 20, 30, 30, 20,-10,-30,
   -30,-20,-10,  0,  0,-10,-20,-30,
   -50,-40,-30,-20,-20,-30,-40,-50,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::position::Position;

    #[test]
    fn material_scorer_reflects_side_to_move_perspective() {
        let white_up =
            Position::from_fen("4k3/8/8/8/8/8/8/4KQ2 w - - 0 1").expect("FEN should parse");
        let black_view =
            Position::from_fen("4k3/8/8/8/8/8/8/4KQ2 b - - 0 1").expect("FEN should parse");
        let scorer = MaterialScorer;
        assert_eq!(scorer.score(&white_up), 900);
        assert_eq!(scorer.score(&black_view), -900);
    }

    #[test]
    fn tapered_scorer_is_antisymmetric_up_to_contempt() {
        let fen = "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQ1RK1 w kq - 4 6";
        let as_white = Position::from_fen(fen).expect("FEN should parse");
        let as_black = Position::from_fen(&fen.replace(" w ", " b ")).expect("FEN should parse");
        let scorer = TaperedScorer;
        // The contempt term follows the mover; everything else flips sign.
        assert_eq!(
            scorer.score(&as_white) - CONTEMPT,
            -(scorer.score(&as_black) - CONTEMPT)
        );
    }

    #[test]
    fn central_knight_outscores_rim_knight() {
        let center =
            Position::from_fen("4k3/8/8/3N4/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let rim = Position::from_fen("4k3/8/8/N7/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let scorer = TaperedScorer;
        assert!(scorer.score(&center) > scorer.score(&rim));
    }

    #[test]
    fn phase_counter_spans_the_expected_range() {
        assert_eq!(game_phase(&Position::new_game()), 24);
        let bare =
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        assert_eq!(game_phase(&bare), 0);
        let rook_ending =
            Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").expect("FEN should parse");
        assert_eq!(game_phase(&rook_ending), 2);
    }

    #[test]
    fn advanced_passed_pawn_outscores_home_passed_pawn() {
        let advanced =
            Position::from_fen("4k3/8/4P3/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let home = Position::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").expect("FEN should parse");
        let scorer = TaperedScorer;
        assert!(scorer.score(&advanced) > scorer.score(&home));
    }

    #[test]
    fn doubled_and_isolated_pawns_are_penalized() {
        let clean =
            Position::from_fen("4k3/8/8/8/8/8/PP6/4K3 w - - 0 1").expect("FEN should parse");
        let doubled =
            Position::from_fen("4k3/8/8/8/8/P7/P7/4K3 w - - 0 1").expect("FEN should parse");
        let scorer = TaperedScorer;
        assert!(scorer.score(&clean) > scorer.score(&doubled));
    }

    #[test]
    fn bishop_pair_beats_lone_bishop() {
        let pair =
            Position::from_fen("4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1").expect("FEN should parse");
        let single =
            Position::from_fen("4k3/8/8/8/8/8/8/2B1K3 w - - 0 1").expect("FEN should parse");
        let scorer = TaperedScorer;
        assert!(scorer.score(&pair) > scorer.score(&single) + 300);
    }

    #[test]
    fn rook_prefers_the_open_file() {
        let open = Position::from_fen("4k3/5ppp/8/8/8/8/5PPP/R3K3 w - - 0 1")
            .expect("FEN should parse");
        let closed = Position::from_fen("4k3/5ppp/8/8/8/8/5PPP/4KR2 w - - 0 1")
            .expect("FEN should parse");
        let scorer = TaperedScorer;
        assert!(scorer.score(&open) > scorer.score(&closed));
    }

    #[test]
    fn protected_advanced_knight_counts_as_outpost() {
        assert!(is_knight_outpost(
            Color::White,
            35, // d5
            1u64 << 26, // c4 pawn defends it
            0,
        ));
        assert!(!is_knight_outpost(
            Color::White,
            35,
            1u64 << 26,
            1u64 << 44, // e6 black pawn can chase it
        ));
    }

    #[test]
    fn evaluation_stays_inside_the_clamp_band() {
        let lopsided =
            Position::from_fen("4k3/8/8/8/8/8/QQQQQQQQ/QQQQKQQQ w - - 0 1").expect("FEN parse");
        let scorer = TaperedScorer;
        let score = scorer.score(&lopsided);
        assert!(score <= EVAL_CLAMP + CONTEMPT);
        assert!(score >= -EVAL_CLAMP - CONTEMPT);
    }
}
