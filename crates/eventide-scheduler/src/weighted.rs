//! Cumulative-weight random selection.

use rand::Rng;

/// A cumulative-weight table over a list of options.
///
/// Memory is proportional to the number of options, never to the total
/// weight. A draw is a uniform pick in `[0, total)` followed by a binary
/// search for the first cumulative weight above it, so an option with
/// weight 3 is selected three times as often as one with weight 1.
#[derive(Debug, Clone)]
pub struct WeightedTable {
    cumulative: Vec<u64>,
    total: u64,
}

impl WeightedTable {
    /// Builds the table. Returns `None` when there are no options or all
    /// weights are zero.
    pub fn new(weights: impl IntoIterator<Item = u32>) -> Option<Self> {
        let mut cumulative = Vec::new();
        let mut total = 0u64;
        for weight in weights {
            total += u64::from(weight);
            cumulative.push(total);
        }
        if total == 0 {
            return None;
        }
        Some(Self { cumulative, total })
    }

    /// Draws one option index.
    pub fn pick(&self, rng: &mut impl Rng) -> usize {
        let draw = rng.random_range(0..self.total);
        self.cumulative.partition_point(|&c| c <= draw)
    }

    pub fn total_weight(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }
}
