//! Policy boundary
//!
//! Anything that maps an observation to an action index can drive the
//! environment. Trained models live outside this crate; the baselines here
//! exist for smoke runs and for comparing a model against something.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::env::{Action, Observation, NUM_ACTIONS};

/// Decision maker consuming observations
#[cfg_attr(test, mockall::automock)]
pub trait Policy {
    /// Return an action index (0 = LONG, 1 = SHORT)
    fn act(&mut self, observation: &Observation) -> usize;

    /// Called after every reset
    fn on_reset(&mut self) {}
}

/// Uniformly random actions
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _observation: &Observation) -> usize {
        self.rng.gen_range(0..NUM_ACTIONS)
    }
}

/// Always the same side (LONG is buy-and-hold)
pub struct FixedPolicy(pub Action);

impl Policy for FixedPolicy {
    fn act(&mut self, _observation: &Observation) -> usize {
        self.0.to_index()
    }
}

/// Flips side every step, starting LONG
#[derive(Default)]
pub struct AlternatingPolicy {
    next: usize,
}

impl Policy for AlternatingPolicy {
    fn act(&mut self, _observation: &Observation) -> usize {
        let action = self.next;
        self.next = (self.next + 1) % NUM_ACTIONS;
        action
    }

    fn on_reset(&mut self) {
        self.next = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation() -> Observation {
        Observation {
            scalars: [1.0, 0.0, 0.0],
            window: vec![[0.0, 0.0]],
        }
    }

    #[test]
    fn test_random_policy_stays_in_action_space() {
        let mut policy = RandomPolicy::new(Some(1));
        let obs = observation();
        let mut seen = [false; NUM_ACTIONS];
        for _ in 0..100 {
            let action = policy.act(&obs);
            assert!(action < NUM_ACTIONS);
            seen[action] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_alternating_policy_restarts_on_reset() {
        let mut policy = AlternatingPolicy::default();
        let obs = observation();
        assert_eq!(policy.act(&obs), 0);
        assert_eq!(policy.act(&obs), 1);
        assert_eq!(policy.act(&obs), 0);

        policy.on_reset();
        assert_eq!(policy.act(&obs), 0);
    }

    #[test]
    fn test_fixed_policy() {
        let mut policy = FixedPolicy(Action::Short);
        assert_eq!(policy.act(&observation()), 1);
    }
}
