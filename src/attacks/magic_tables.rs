//! Magic-multiplication lookup for sliding-piece attacks.
//!
//! Each square owns a relevant-occupancy mask, a magic multiplier, a shift,
//! and a dense attack table. The multiplier is found at initialization by a
//! fixed-seed random search and verified collision-free over every occupancy
//! subset of the mask, then the table is populated by brute-force ray
//! casting. The whole structure is built once behind a `OnceLock` and is
//! read-only afterwards, so it can be shared freely.

use std::sync::OnceLock;
use std::time::Instant;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MAGIC_SEARCH_SEED: u64 = 0x2F6B_79A5_19D4_C3E1;

struct SquareMagic {
    mask: u64,
    magic: u64,
    shift: u32,
    attacks: Vec<u64>,
}

struct SliderTables {
    rook: Vec<SquareMagic>,
    bishop: Vec<SquareMagic>,
}

static TABLES: OnceLock<SliderTables> = OnceLock::new();

/// Squares a rook on `square` attacks given `occupancy`. Out-of-range
/// squares attack nothing.
#[inline]
pub fn rook_attacks(square: u8, occupancy: u64) -> u64 {
    if square >= 64 {
        return 0;
    }
    lookup(&tables().rook[square as usize], occupancy)
}

/// Squares a bishop on `square` attacks given `occupancy`. Out-of-range
/// squares attack nothing.
#[inline]
pub fn bishop_attacks(square: u8, occupancy: u64) -> u64 {
    if square >= 64 {
        return 0;
    }
    lookup(&tables().bishop[square as usize], occupancy)
}

/// Queen attacks are the union of rook and bishop attacks from `square`.
#[inline]
pub fn queen_attacks(square: u8, occupancy: u64) -> u64 {
    rook_attacks(square, occupancy) | bishop_attacks(square, occupancy)
}

#[inline]
fn lookup(entry: &SquareMagic, occupancy: u64) -> u64 {
    let index = ((occupancy & entry.mask).wrapping_mul(entry.magic) >> entry.shift) as usize;
    entry.attacks[index]
}

#[inline]
fn tables() -> &'static SliderTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> SliderTables {
    let started = Instant::now();
    let mut rng = StdRng::seed_from_u64(MAGIC_SEARCH_SEED);

    let rook = (0u8..64)
        .map(|sq| find_square_magic(rook_relevant_mask(sq), |occ| rook_ray_attacks(sq, occ), &mut rng))
        .collect();
    let bishop = (0u8..64)
        .map(|sq| {
            find_square_magic(bishop_relevant_mask(sq), |occ| bishop_ray_attacks(sq, occ), &mut rng)
        })
        .collect();

    debug!("slider attack tables built in {:?}", started.elapsed());
    SliderTables { rook, bishop }
}

/// Search for a multiplier that perfectly hashes every occupancy subset of
/// `mask`, then fill the attack table for it.
fn find_square_magic(mask: u64, ray_attacks: impl Fn(u64) -> u64, rng: &mut StdRng) -> SquareMagic {
    let bits = mask.count_ones();
    let shift = 64 - bits;
    let table_len = 1usize << bits;

    let occupancies = enumerate_subsets(mask);
    let reference: Vec<u64> = occupancies.iter().map(|&occ| ray_attacks(occ)).collect();

    let mut attacks = vec![0u64; table_len];
    let mut stamped = vec![0u32; table_len];
    let mut epoch = 0u32;

    loop {
        // Sparse candidates converge far faster than uniform ones.
        let magic = rng.random::<u64>() & rng.random::<u64>() & rng.random::<u64>();
        if (mask.wrapping_mul(magic) >> 56).count_ones() < 6 {
            continue;
        }

        epoch += 1;
        let mut collided = false;
        for (i, &occ) in occupancies.iter().enumerate() {
            let index = (occ.wrapping_mul(magic) >> shift) as usize;
            if stamped[index] != epoch {
                stamped[index] = epoch;
                attacks[index] = reference[i];
            } else if attacks[index] != reference[i] {
                collided = true;
                break;
            }
        }

        if !collided {
            return SquareMagic {
                mask,
                magic,
                shift,
                attacks,
            };
        }
    }
}

/// Enumerate every subset of `mask` (carry-rippler), the empty set included.
fn enumerate_subsets(mask: u64) -> Vec<u64> {
    let mut subsets = Vec::with_capacity(1usize << mask.count_ones());
    let mut subset = 0u64;
    loop {
        subsets.push(subset);
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            break;
        }
    }
    subsets
}

/// Relevant blocker mask for a rook: its rays minus the board edges.
fn rook_relevant_mask(square: u8) -> u64 {
    let file = i32::from(square % 8);
    let rank = i32::from(square / 8);
    let mut mask = 0u64;
    for r in (rank + 1)..7 {
        mask |= 1u64 << (r * 8 + file);
    }
    for r in 1..rank {
        mask |= 1u64 << (r * 8 + file);
    }
    for f in (file + 1)..7 {
        mask |= 1u64 << (rank * 8 + f);
    }
    for f in 1..file {
        mask |= 1u64 << (rank * 8 + f);
    }
    mask
}

/// Relevant blocker mask for a bishop: its diagonals minus the board edges.
fn bishop_relevant_mask(square: u8) -> u64 {
    let mut mask = 0u64;
    for (df, dr) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
        let mut f = i32::from(square % 8) + df;
        let mut r = i32::from(square / 8) + dr;
        while (1..7).contains(&f) && (1..7).contains(&r) {
            mask |= 1u64 << (r * 8 + f);
            f += df;
            r += dr;
        }
    }
    mask
}

/// Ray-cast rook attacks, used to populate and cross-check the tables.
pub fn rook_ray_attacks(square: u8, occupancy: u64) -> u64 {
    trace_rays(square, occupancy, &[(0, 1), (0, -1), (1, 0), (-1, 0)])
}

/// Ray-cast bishop attacks, used to populate and cross-check the tables.
pub fn bishop_ray_attacks(square: u8, occupancy: u64) -> u64 {
    trace_rays(square, occupancy, &[(1, 1), (1, -1), (-1, 1), (-1, -1)])
}

fn trace_rays(square: u8, occupancy: u64, directions: &[(i32, i32)]) -> u64 {
    let mut attacks = 0u64;
    for &(df, dr) in directions {
        let mut f = i32::from(square % 8) + df;
        let mut r = i32::from(square / 8) + dr;
        while (0..8).contains(&f) && (0..8).contains(&r) {
            let bit = 1u64 << (r * 8 + f);
            attacks |= bit;
            if (occupancy & bit) != 0 {
                break;
            }
            f += df;
            r += dr;
        }
    }
    attacks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rook_on_a1_empty_board_attacks_fourteen_squares() {
        assert_eq!(rook_attacks(0, 0).count_ones(), 14);
    }

    #[test]
    fn rook_blocker_stops_the_ray() {
        let blocker_on_a4 = 1u64 << 24;
        let attacks = rook_attacks(0, blocker_on_a4);
        assert_ne!(attacks & (1u64 << 24), 0);
        assert_eq!(attacks & (1u64 << 32), 0);
    }

    #[test]
    fn bishop_on_d4_empty_board_attacks_thirteen_squares() {
        assert_eq!(bishop_attacks(27, 0).count_ones(), 13);
    }

    #[test]
    fn queen_is_union_of_rook_and_bishop() {
        let occ = (1u64 << 36) | (1u64 << 11);
        assert_eq!(
            queen_attacks(27, occ),
            rook_attacks(27, occ) | bishop_attacks(27, occ)
        );
    }

    #[test]
    fn magic_lookup_matches_ray_casting_for_sampled_occupancies() {
        // Dense pseudo-random occupancies across every square.
        let mut occ = 0x9E37_79B9_7F4A_7C15u64;
        for sq in 0u8..64 {
            for _ in 0..16 {
                occ = occ
                    .rotate_left(13)
                    .wrapping_mul(0xBF58_476D_1CE4_E5B9)
                    .wrapping_add(u64::from(sq));
                assert_eq!(rook_attacks(sq, occ), rook_ray_attacks(sq, occ));
                assert_eq!(bishop_attacks(sq, occ), bishop_ray_attacks(sq, occ));
            }
        }
    }

    #[test]
    fn out_of_range_square_attacks_nothing() {
        assert_eq!(rook_attacks(64, 0), 0);
        assert_eq!(bishop_attacks(99, u64::MAX), 0);
    }
}
