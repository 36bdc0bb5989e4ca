use super::{MAX_GROUP, PdbError};

/// A non-empty set of tile labels tracked together by one pattern table.
///
/// Labels are kept in ascending order; the order fixes how a board is
/// projected onto the group and therefore how pattern states are ranked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternGroup {
    labels: Vec<u8>,
}

impl PatternGroup {
    /// Creates a group from the given labels, sorting and deduplicating.
    #[must_use]
    pub fn new(labels: impl IntoIterator<Item = u8>) -> Self {
        let mut labels: Vec<u8> = labels.into_iter().collect();
        labels.sort_unstable();
        labels.dedup();
        Self { labels }
    }

    /// The labels in ascending order.
    #[must_use]
    #[inline]
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Number of tiles in the group.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the group is empty.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Disjoint tile groups covering every tile of one board side.
///
/// The group order is fixed at construction and preserved through
/// persistence, so a database's tables always line up with its partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    side: u8,
    groups: Vec<PatternGroup>,
}

impl Partition {
    /// Validates and creates a partition for boards of the given side.
    ///
    /// # Errors
    ///
    /// Returns [`PdbError::InvalidPartition`] when a group is empty or
    /// oversized, a label is out of range or repeated across groups, or
    /// the groups do not cover every tile `1..side²`.
    pub fn new(side: u8, groups: Vec<PatternGroup>) -> Result<Self, PdbError> {
        let invalid = |reason: String| PdbError::InvalidPartition { reason };
        if !(2..=quince_core::MAX_SIDE).contains(&side) {
            return Err(invalid(format!("unsupported board side {side}")));
        }
        let area = u16::from(side) * u16::from(side);
        let mut seen = 0u32;
        for group in &groups {
            if group.is_empty() {
                return Err(invalid("empty group".to_owned()));
            }
            if group.len() > MAX_GROUP {
                return Err(invalid(format!(
                    "group of {} tiles exceeds the supported maximum of {MAX_GROUP}",
                    group.len()
                )));
            }
            for &label in group.labels() {
                if label == 0 || u16::from(label) >= area {
                    return Err(invalid(format!("label {label} is not a tile of side {side}")));
                }
                if seen & (1 << label) != 0 {
                    return Err(invalid(format!("label {label} appears in two groups")));
                }
                seen |= 1 << label;
            }
        }
        // All of 1..area, as a mask with bit 0 clear.
        let expected = ((1u32 << area) - 1) & !1;
        if seen != expected {
            return Err(invalid("groups do not cover every tile".to_owned()));
        }
        Ok(Self { side, groups })
    }

    /// Board side this partition describes.
    #[must_use]
    #[inline]
    pub const fn side(&self) -> u8 {
        self.side
    }

    /// The groups, in declaration order.
    #[must_use]
    #[inline]
    pub fn groups(&self) -> &[PatternGroup] {
        &self.groups
    }

    /// The classic 6-6-3 split of the 15-puzzle.
    ///
    /// Quick to build, with two column-shaped six-tile groups and the top
    /// row's remainder.
    #[must_use]
    pub fn standard_663() -> Self {
        Self::new(
            4,
            vec![
                PatternGroup::new([1, 5, 6, 9, 10, 13]),
                PatternGroup::new([7, 8, 11, 12, 14, 15]),
                PatternGroup::new([2, 3, 4]),
            ],
        )
        .unwrap()
    }

    /// The balanced 5-5-5 split of the 15-puzzle.
    #[must_use]
    pub fn standard_555() -> Self {
        Self::new(
            4,
            vec![
                PatternGroup::new([1, 2, 3, 4, 7]),
                PatternGroup::new([5, 6, 9, 10, 13]),
                PatternGroup::new([8, 11, 12, 14, 15]),
            ],
        )
        .unwrap()
    }

    /// The strong but slow-to-build 7-8 split of the 15-puzzle.
    #[must_use]
    pub fn standard_78() -> Self {
        Self::new(
            4,
            vec![
                PatternGroup::new([1, 2, 3, 4, 5, 6, 7, 8]),
                PatternGroup::new([9, 10, 11, 12, 13, 14, 15]),
            ],
        )
        .unwrap()
    }

    /// A reasonable default partition for the given side, if one exists.
    ///
    /// Side 3 gets a 4-4 split, side 4 the balanced 5-5-5. Other sides
    /// have no default and need an explicit partition.
    #[must_use]
    pub fn default_for(side: u8) -> Option<Self> {
        match side {
            3 => Some(
                Self::new(
                    3,
                    vec![
                        PatternGroup::new([1, 2, 3, 4]),
                        PatternGroup::new([5, 6, 7, 8]),
                    ],
                )
                .unwrap(),
            ),
            4 => Some(Self::standard_555()),
            _ => None,
        }
    }
}
