//! Non-learning decision sources

use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};

use super::{action::Action, engine::Observation};
use crate::{Error, Result, ports::DecisionSource, utils::build_rng};

/// Always picks the same action. The reference opponent always attacks.
#[derive(Debug, Clone)]
pub struct FixedPolicy {
    action: Action,
    name: String,
}

impl FixedPolicy {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            name: format!("Always-{action}"),
        }
    }

    pub fn always_attack() -> Self {
        Self::new(Action::Attack)
    }
}

impl DecisionSource for FixedPolicy {
    fn decide(&mut self, _observation: Observation) -> Result<Action> {
        Ok(self.action)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Picks uniformly among all actions every turn
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
    name: String,
}

impl RandomPolicy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            rng: build_rng(None),
            name: name.into(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl DecisionSource for RandomPolicy {
    fn decide(&mut self, _observation: Observation) -> Result<Action> {
        Action::ALL
            .choose(&mut self.rng)
            .copied()
            .ok_or(Error::NoActionsAvailable)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.rng = StdRng::seed_from_u64(seed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_policy_ignores_observation() {
        let mut policy = FixedPolicy::always_attack();
        for hp in [0, 5, 20] {
            let action = policy.decide(Observation::new(hp, 50)).unwrap();
            assert_eq!(action, Action::Attack);
        }
        assert_eq!(policy.name(), "Always-Attack");
    }

    #[test]
    fn test_random_policy_uses_both_actions() {
        let mut policy = RandomPolicy::new("Random").with_seed(3);
        let mut heals = 0;
        for _ in 0..200 {
            if policy.decide(Observation::new(20, 50)).unwrap() == Action::Heal {
                heals += 1;
            }
        }
        assert!(heals > 60 && heals < 140, "heals = {heals}");
    }
}
