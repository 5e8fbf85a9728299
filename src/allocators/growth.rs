/// How many slots the next chunk of a [`BlockPool`](super::BlockPool) gets.
///
/// Chunk numbers are 1-indexed: the chunk allocated at construction is chunk 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GrowthPolicy {
    /// Chunk `n` holds `n * block_size` slots.
    #[default]
    Linear,
    /// Every chunk holds `block_size` slots.
    Fixed,
    /// Chunk `n` holds `block_size * 2^(n - 1)` slots.
    Doubling,
}

impl GrowthPolicy {
    /// Slot count for chunk number `n`, or `None` on overflow.
    #[inline]
    pub fn chunk_capacity(self, n: usize, block_size: usize) -> Option<usize> {
        debug_assert!(n > 0);

        match self {
            GrowthPolicy::Linear => n.checked_mul(block_size),
            GrowthPolicy::Fixed => Some(block_size),
            GrowthPolicy::Doubling => {
                let shift = u32::try_from(n - 1).ok()?;
                1usize
                    .checked_shl(shift)
                    .and_then(|factor| factor.checked_mul(block_size))
            }
        }
    }

    /// Total slots held by the first `n` chunks, or `None` on overflow.
    pub fn cumulative_capacity(self, n: usize, block_size: usize) -> Option<usize> {
        (1..=n).try_fold(0usize, |acc, i| {
            acc.checked_add(self.chunk_capacity(i, block_size)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_grows_by_block_size() {
        let sizes: Vec<_> = (1..=4)
            .map(|n| GrowthPolicy::Linear.chunk_capacity(n, 32).unwrap())
            .collect();

        assert_eq!(sizes, [32, 64, 96, 128]);
        assert_eq!(GrowthPolicy::Linear.cumulative_capacity(4, 32), Some(320));
    }

    #[test]
    fn fixed_never_grows() {
        for n in 1..10 {
            assert_eq!(GrowthPolicy::Fixed.chunk_capacity(n, 8), Some(8));
        }
        assert_eq!(GrowthPolicy::Fixed.cumulative_capacity(5, 8), Some(40));
    }

    #[test]
    fn doubling_is_geometric() {
        let sizes: Vec<_> = (1..=5)
            .map(|n| GrowthPolicy::Doubling.chunk_capacity(n, 3).unwrap())
            .collect();

        assert_eq!(sizes, [3, 6, 12, 24, 48]);
        assert_eq!(GrowthPolicy::Doubling.cumulative_capacity(5, 3), Some(93));
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(GrowthPolicy::Linear.chunk_capacity(usize::MAX, 2), None);
        assert_eq!(
            GrowthPolicy::Doubling.chunk_capacity(usize::BITS as usize + 1, 1),
            None
        );
        assert_eq!(GrowthPolicy::Doubling.chunk_capacity(usize::BITS as usize, 2), None);
    }
}
