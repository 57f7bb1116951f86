use itertools::Itertools;
use rand::seq::index;
use rand::Rng;
use thiserror::Error;

use crate::model::slot::SlotPool;

pub type Index = usize;

/// Exchange of the tents held by two slots. Applying it twice is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swap(pub Index, pub Index);

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ActionError {
    #[error("Invalid position {0}")]
    InvalidPosition(Index),
    #[error("Every slot belongs to the same tent")]
    NoDistinctLabels,
}

impl Swap {
    pub fn apply(&self, slots: &mut SlotPool) -> Result<(), ActionError> {
        let Swap(a, b) = *self;
        if let Some(&bad) = [a, b].iter().find(|&&position| position >= slots.len()) {
            return Err(ActionError::InvalidPosition(bad));
        }
        slots.swap(a, b);
        Ok(())
    }

    /// Picks two distinct slots holding different tents. The second index is
    /// redrawn until the tents differ.
    pub fn random<R: Rng + ?Sized>(slots: &SlotPool, rng: &mut R) -> Result<Swap, ActionError> {
        let tents = slots.as_slice();
        if tents.iter().all_equal() {
            return Err(ActionError::NoDistinctLabels);
        }
        let picked = index::sample(rng, tents.len(), 2);
        let first = picked.index(0);
        let mut second = picked.index(1);
        while tents[first] == tents[second] {
            second = rng.gen_range(0..tents.len());
        }
        Ok(Swap(first, second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::slot::TentCapacity;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn pool() -> SlotPool {
        SlotPool::build(&[
            TentCapacity::new("x", 3),
            TentCapacity::new("y", 2),
            TentCapacity::new("z", 1),
        ])
        .unwrap()
    }

    #[test]
    fn apply_twice_restores() {
        let mut slots = pool();
        let before = slots.clone();
        let swap = Swap(0, 5);
        swap.apply(&mut slots).unwrap();
        assert_eq!(slots.as_slice(), [2, 0, 0, 1, 1, 0]);
        swap.apply(&mut slots).unwrap();
        assert_eq!(slots, before);
    }

    #[test]
    fn out_of_range_swap_is_rejected() {
        let mut slots = pool();
        assert_eq!(Swap(1, 6).apply(&mut slots), Err(ActionError::InvalidPosition(6)));
        assert_eq!(slots, pool());
    }

    #[test]
    fn random_swap_moves_two_different_tents() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut slots = pool();
        for _ in 0..200 {
            let before = slots.clone();
            let swap = Swap::random(&slots, &mut rng).unwrap();
            swap.apply(&mut slots).unwrap();

            let changed = before
                .as_slice()
                .iter()
                .zip(slots.as_slice())
                .filter(|(a, b)| a != b)
                .count();
            assert_eq!(changed, 2);
            assert_ne!(before.as_slice()[swap.0], before.as_slice()[swap.1]);
            assert_eq!(before.label_counts(), slots.label_counts());
        }
    }

    #[test]
    fn random_swap_needs_two_tents() {
        let mut rng = SmallRng::seed_from_u64(1);
        let single = SlotPool::build(&[TentCapacity::new("x", 4)]).unwrap();
        assert_eq!(Swap::random(&single, &mut rng), Err(ActionError::NoDistinctLabels));
        let empty = SlotPool::build(&[]).unwrap();
        assert_eq!(Swap::random(&empty, &mut rng), Err(ActionError::NoDistinctLabels));
    }
}
