//! Breadth-first construction of pattern tables.
//!
//! Each group is enumerated independently, starting from its goal
//! placement with the blank on its goal cell. States are *augmented* with
//! the blank position during the walk: sliding a non-group tile moves only
//! the blank and costs nothing, sliding a group tile costs one move. This
//! is a shortest-path search with 0/1 edge weights, so a deque with
//! cost-0 successors pushed to the front and cost-1 successors to the back
//! finalises every augmented state the first time it is popped.
//!
//! The stored table forgets the blank: a pattern slot keeps the minimum
//! cost over every blank position that reaches the same tile placement.

use std::collections::VecDeque;

use quince_core::{Direction, Pos};
use rayon::prelude::*;

use super::{MAX_GROUP, Partition, PatternGroup, PdbError, ranking};

/// Sentinel for slots the enumeration has not reached.
///
/// Every pattern placement is reachable when at least two non-group tiles
/// are free to absorb the permutation parity, so a finished table contains
/// no sentinel and a persisted one with a sentinel is rejected as corrupt.
pub(crate) const UNFILLED: u8 = 0xFF;

const PROGRESS_INTERVAL: u64 = 1 << 20;

/// An augmented enumeration state: the group's tile cells, the blank cell,
/// and the group-move cost paid to reach it.
#[derive(Debug, Clone, Copy)]
struct Node {
    tiles: [u8; MAX_GROUP],
    blank: u8,
    cost: u8,
}

impl Node {
    fn augmented_rank(&self, len: usize, area: u8) -> u64 {
        let mut cells = [0u8; MAX_GROUP + 1];
        cells[..len].copy_from_slice(&self.tiles[..len]);
        cells[len] = self.blank;
        ranking::rank(&cells[..=len], area)
    }
}

/// Builds the tables of every group of `partition`, in partition order.
///
/// Groups are independent, so they build in parallel; `workers` caps the
/// pool, defaulting to one worker per core.
pub(crate) fn build_tables(
    partition: &Partition,
    workers: Option<usize>,
) -> Result<Vec<Vec<u8>>, PdbError> {
    let side = partition.side();
    let build_all = || {
        partition
            .groups()
            .par_iter()
            .map(|group| build_group_table(side, group))
            .collect::<Vec<_>>()
    };
    let tables = match workers {
        None => build_all(),
        Some(count) => rayon::ThreadPoolBuilder::new()
            .num_threads(count)
            .build()?
            .install(build_all),
    };
    Ok(tables)
}

/// Enumerates one group and returns its dense cost table.
pub(crate) fn build_group_table(side: u8, group: &PatternGroup) -> Vec<u8> {
    let area = side * side;
    let len = group.len();
    #[expect(clippy::cast_possible_truncation)]
    let table_len = ranking::arrangement_count(area, len as u8);
    let mut table = vec![UNFILLED; usize::try_from(table_len).expect("table too large")];
    #[expect(clippy::cast_possible_truncation)]
    let mut visited = BitSet::new(ranking::arrangement_count(area, len as u8 + 1));

    // Goal placement: tile `t` on cell `t - 1`, blank on the last cell.
    let mut start = Node {
        tiles: [0; MAX_GROUP],
        blank: area - 1,
        cost: 0,
    };
    for (slot, &label) in start.tiles.iter_mut().zip(group.labels()) {
        *slot = label - 1;
    }

    let mut deque = VecDeque::new();
    deque.push_back(start);
    let mut expanded: u64 = 0;

    while let Some(node) = deque.pop_front() {
        let augmented = node.augmented_rank(len, area);
        if visited.test(augmented) {
            continue;
        }
        visited.set(augmented);

        // Several blank positions share one tile placement; keep the
        // cheapest.
        let pattern = usize::try_from(ranking::rank(&node.tiles[..len], area)).unwrap();
        if table[pattern] > node.cost {
            table[pattern] = node.cost;
        }

        expanded += 1;
        if expanded % PROGRESS_INTERVAL == 0 {
            log::debug!(
                "group {:?}: {expanded} states expanded, {} queued",
                group.labels(),
                deque.len()
            );
        }

        let blank = Pos::from_index(node.blank, side);
        for direction in Direction::ALL {
            let Some(target) = blank.step(direction, side) else {
                continue;
            };
            let target = target.index(side);
            let mut next = node;
            next.blank = target;
            if let Some(moved) = node.tiles[..len].iter().position(|&cell| cell == target) {
                // A group tile slides into the old blank cell: pays a move.
                next.tiles[moved] = node.blank;
                next.cost = node.cost.checked_add(1).expect("group cost overflowed");
                assert!(next.cost < UNFILLED, "group cost overflowed");
                if !visited.test(next.augmented_rank(len, area)) {
                    deque.push_back(next);
                }
            } else {
                // Only the blank wanders: free.
                if !visited.test(next.augmented_rank(len, area)) {
                    deque.push_front(next);
                }
            }
        }
    }

    log::debug!(
        "group {:?}: finished after {expanded} states, {} table entries",
        group.labels(),
        table.len()
    );
    debug_assert!(table.iter().all(|&cost| cost != UNFILLED));
    table
}

/// Flat bitset over augmented-state ranks.
struct BitSet {
    words: Vec<u64>,
}

impl BitSet {
    fn new(len: u64) -> Self {
        let words = usize::try_from(len.div_ceil(64)).expect("bitset too large");
        Self {
            words: vec![0; words],
        }
    }

    #[inline]
    fn test(&self, index: u64) -> bool {
        let word = usize::try_from(index / 64).unwrap();
        self.words[word] & (1 << (index % 64)) != 0
    }

    #[inline]
    fn set(&mut self, index: u64) {
        let word = usize::try_from(index / 64).unwrap();
        self.words[word] |= 1 << (index % 64);
    }
}
