//! Partner-selection policies: which pool members supply the non-head stems.

use crate::train::Train;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Policy selecting which pool members supply partner particles.
///
/// Every policy is deterministic for a frozen input, so rerunning the same
/// table with the same configuration yields an identical output dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixPolicy {
    /// Partners are the most recently inserted eligible pool entries,
    /// newest first.
    Recent,
    /// Like [`MixPolicy::Recent`], but the starting offset advances by one
    /// per processed record, spreading pairings across the train.
    Rotating,
    /// Partners drawn from a seeded permutation of the pool; the same seed
    /// and input reproduce the same output.
    Seeded(u64),
}

impl Default for MixPolicy {
    fn default() -> Self {
        MixPolicy::Recent
    }
}

/// Per-run selector state producing the pool-visit order for each record.
pub(crate) struct PartnerSelector {
    policy: MixPolicy,
    cursor: usize,
    rng: Option<StdRng>,
}

impl PartnerSelector {
    pub(crate) fn new(policy: MixPolicy) -> Self {
        let rng = match policy {
            MixPolicy::Seeded(seed) => Some(StdRng::seed_from_u64(seed)),
            _ => None,
        };
        Self { policy, cursor: 0, rng }
    }

    /// Fill `order` with pool slots in the order partner candidates are
    /// tried for the current record.
    pub(crate) fn visit_order(&mut self, train: &Train, order: &mut Vec<usize>) {
        order.clear();
        order.extend(train.newest_first());
        match self.policy {
            MixPolicy::Recent => {}
            MixPolicy::Rotating => {
                if !order.is_empty() {
                    let offset = self.cursor % order.len();
                    order.rotate_left(offset);
                }
            }
            MixPolicy::Seeded(_) => {
                let rng = self.rng.as_mut().expect("seeded policy constructed without rng");
                order.shuffle(rng);
            }
        }
    }

    /// Advance per-record state (the rotating cursor).
    pub(crate) fn advance(&mut self) {
        self.cursor = self.cursor.wrapping_add(1);
    }
}
