//! Perfect ranking of partial tile placements.
//!
//! A pattern state places `len` distinguishable tiles on distinct cells of
//! a board with `cell_count` cells. Walking the tiles in group order and
//! emitting each cell's rank among the still-unused cells yields a bijection
//! onto `0..P(cell_count, len)`, which indexes the dense cost tables.
//!
//! The ranking must stay byte-for-byte stable: persisted tables are laid
//! out in rank order, so builder and runtime have to agree forever.

/// Number of ways to place `len` distinguishable tiles on `cell_count`
/// cells, the falling factorial `P(cell_count, len)`.
#[must_use]
pub(crate) fn arrangement_count(cell_count: u8, len: u8) -> u64 {
    debug_assert!(len <= cell_count);
    let cell_count = u64::from(cell_count);
    (cell_count - u64::from(len) + 1..=cell_count).product()
}

/// Ranks a sequence of distinct cell indices into
/// `0..arrangement_count(cell_count, cells.len())`.
#[must_use]
pub(crate) fn rank(cells: &[u8], cell_count: u8) -> u64 {
    let mut used = 0u32;
    let mut rank = 0u64;
    let mut remaining = u64::from(cell_count);
    for &cell in cells {
        debug_assert!(cell < cell_count);
        debug_assert!(used & (1 << cell) == 0, "cells must be distinct");
        let below = u64::from((used & ((1u32 << cell) - 1)).count_ones());
        rank = rank * remaining + u64::from(cell) - below;
        used |= 1 << cell;
        remaining -= 1;
    }
    rank
}

/// Inverse of [`rank`]: fills `out` with the cell sequence of `rank`.
#[expect(clippy::cast_possible_truncation)]
pub(crate) fn unrank(mut rank: u64, out: &mut [u8], cell_count: u8) {
    // Peel the mixed-radix digits off, least significant first.
    for i in (0..out.len()).rev() {
        let radix = u64::from(cell_count) - i as u64;
        out[i] = (rank % radix) as u8;
        rank /= radix;
    }
    debug_assert_eq!(rank, 0, "rank out of range");
    // Each digit is the position of its cell among the unused ones.
    let mut used = 0u32;
    for slot in out.iter_mut() {
        let mut skip = *slot;
        let mut cell = 0u8;
        loop {
            if used & (1 << cell) == 0 {
                if skip == 0 {
                    break;
                }
                skip -= 1;
            }
            cell += 1;
        }
        *slot = cell;
        used |= 1 << cell;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_arrangement_count() {
        assert_eq!(arrangement_count(16, 0), 1);
        assert_eq!(arrangement_count(16, 1), 16);
        assert_eq!(arrangement_count(16, 3), 16 * 15 * 14);
        assert_eq!(arrangement_count(9, 5), 9 * 8 * 7 * 6 * 5);
    }

    #[test]
    fn test_rank_is_lexicographic() {
        // The all-smallest placement ranks first, the all-largest last.
        assert_eq!(rank(&[0, 1, 2], 16), 0);
        assert_eq!(rank(&[15, 14, 13], 16), arrangement_count(16, 3) - 1);
        // Adjacent placements rank adjacently.
        assert_eq!(rank(&[0, 1, 3], 16), 1);
    }

    #[test]
    fn test_exhaustive_round_trip_small() {
        // Every rank of three tiles on six cells maps to a distinct,
        // distinct-celled placement and back to itself.
        let total = arrangement_count(6, 3);
        let mut seen = vec![false; usize::try_from(total).unwrap()];
        for value in 0..total {
            let mut cells = [0u8; 3];
            unrank(value, &mut cells, 6);
            assert!(cells.iter().all(|&c| c < 6));
            assert_eq!(rank(&cells, 6), value);
            let index = usize::try_from(value).unwrap();
            assert!(!seen[index]);
            seen[index] = true;
        }
    }

    proptest! {
        // unrank then rank is the identity on the valid range.
        #[test]
        fn prop_rank_round_trip(
            (cell_count, len) in (4u8..=25).prop_flat_map(|m| (Just(m), 1u8..=m.min(9))),
            seed in any::<u64>(),
        ) {
            let value = seed % arrangement_count(cell_count, len);
            let mut cells = vec![0u8; usize::from(len)];
            unrank(value, &mut cells, cell_count);
            prop_assert_eq!(rank(&cells, cell_count), value);
        }
    }
}
