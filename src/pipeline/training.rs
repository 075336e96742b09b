//! Training and evaluation episode loops

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    battle::{Action, Observation, StepOutcome},
    ports::{DecisionSource, Environment, Observer},
    q_learning::{QLearningAgent, StateDiscretizer},
    utils::rate,
};

/// Configuration for one run of episodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of episodes to play
    pub episodes: usize,

    /// Random seed handed to the learner / decision source
    pub seed: Option<u64>,

    /// Turns after which an unfinished episode is abandoned
    pub max_turns: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 1000,
            seed: None,
            max_turns: 500,
        }
    }
}

/// How an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EpisodeResult {
    Victory,
    Defeat,
    /// Turn cap reached before either combatant fell
    Truncated,
}

/// Summary of a single episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeOutcome {
    pub result: EpisodeResult,
    /// Turns played, equal to the engine's final turn number when the
    /// episode ended in a terminal state
    pub turns: usize,
    pub total_reward: f64,
}

impl EpisodeOutcome {
    pub fn is_victory(&self) -> bool {
        self.result == EpisodeResult::Victory
    }
}

/// Result of a training or evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Total episodes played
    pub total_episodes: usize,

    /// Number of victories
    pub wins: usize,

    /// Number of defeats
    pub losses: usize,

    /// Number of episodes cut off at the turn cap
    pub truncated: usize,

    pub win_rate: f64,

    pub loss_rate: f64,

    /// Mean turns over all episodes
    pub mean_turns: f64,

    /// Mean turns needed to win, over won episodes only
    pub mean_turns_to_win: Option<f64>,
}

impl TrainingResult {
    fn from_outcomes(outcomes: &[EpisodeOutcome]) -> Self {
        let total_episodes = outcomes.len();
        let mut wins = 0;
        let mut losses = 0;
        let mut truncated = 0;
        let mut turns = 0;
        let mut turns_to_win = 0;
        for outcome in outcomes {
            turns += outcome.turns;
            match outcome.result {
                EpisodeResult::Victory => {
                    wins += 1;
                    turns_to_win += outcome.turns;
                }
                EpisodeResult::Defeat => losses += 1,
                EpisodeResult::Truncated => truncated += 1,
            }
        }

        Self {
            total_episodes,
            wins,
            losses,
            truncated,
            win_rate: rate(wins, total_episodes),
            loss_rate: rate(losses, total_episodes),
            mean_turns: rate(turns, total_episodes),
            mean_turns_to_win: (wins > 0).then(|| rate(turns_to_win, wins)),
        }
    }
}

/// What the episode loop asks of whoever controls the controllable combatant
trait Controller {
    fn choose(&mut self, observation: Observation) -> Result<Action>;

    fn learn(
        &mut self,
        _observation: Observation,
        _action: Action,
        _outcome: &StepOutcome,
    ) -> Result<()> {
        Ok(())
    }

    fn end_episode(&mut self) {}
}

struct Learning<'a> {
    agent: &'a mut QLearningAgent,
    discretizer: &'a StateDiscretizer,
}

impl Controller for Learning<'_> {
    fn choose(&mut self, observation: Observation) -> Result<Action> {
        let state = self.discretizer.discretize(observation);
        self.agent.select_action(state, &Action::ALL)
    }

    fn learn(
        &mut self,
        observation: Observation,
        action: Action,
        outcome: &StepOutcome,
    ) -> Result<()> {
        let state = self.discretizer.discretize(observation);
        let next_state = self.discretizer.discretize(outcome.observation);
        self.agent
            .update(state, action, outcome.reward, next_state)
            .map(|_| ())
    }

    fn end_episode(&mut self) {
        self.agent.decay_epsilon();
    }
}

struct Acting<'a> {
    policy: &'a mut dyn DecisionSource,
}

impl Controller for Acting<'_> {
    fn choose(&mut self, observation: Observation) -> Result<Action> {
        self.policy.decide(observation)
    }
}

/// Runs episodes against an environment and reports to observers
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Train `agent` with one Q-learning update per turn.
    ///
    /// Each episode resets the environment, then repeats select → step →
    /// update until the environment reports `done` or the turn cap is hit.
    /// ε decays (per the agent's schedule) after every episode.
    pub fn train(
        &mut self,
        env: &mut dyn Environment,
        agent: &mut QLearningAgent,
        discretizer: &StateDiscretizer,
    ) -> Result<TrainingResult> {
        if let Some(seed) = self.config.seed {
            agent.set_rng_seed(seed);
        }
        let mut controller = Learning { agent, discretizer };
        self.run(env, &mut controller)
    }

    /// Play episodes with `policy` choosing every action; nothing is learned.
    ///
    /// To evaluate a trained agent, wrap it in a
    /// [`crate::q_learning::LearnedPolicy`] after setting its evaluation ε.
    pub fn evaluate(
        &mut self,
        env: &mut dyn Environment,
        policy: &mut dyn DecisionSource,
    ) -> Result<TrainingResult> {
        if let Some(seed) = self.config.seed {
            policy.set_rng_seed(seed)?;
        }
        let mut controller = Acting { policy };
        self.run(env, &mut controller)
    }

    fn run(
        &mut self,
        env: &mut dyn Environment,
        controller: &mut dyn Controller,
    ) -> Result<TrainingResult> {
        for observer in &mut self.observers {
            observer.on_training_start(self.config.episodes)?;
        }

        let mut outcomes = Vec::with_capacity(self.config.episodes);
        for episode in 0..self.config.episodes {
            let outcome = self.play_episode(episode, env, controller)?;
            controller.end_episode();

            for observer in &mut self.observers {
                observer.on_episode_end(episode, &outcome)?;
            }
            outcomes.push(outcome);
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        Ok(TrainingResult::from_outcomes(&outcomes))
    }

    fn play_episode(
        &mut self,
        episode: usize,
        env: &mut dyn Environment,
        controller: &mut dyn Controller,
    ) -> Result<EpisodeOutcome> {
        let mut observation = env.reset();
        for observer in &mut self.observers {
            observer.on_episode_start(episode)?;
        }

        let mut turns = 0;
        let mut total_reward = 0.0;
        while turns < self.config.max_turns {
            let action = controller.choose(observation)?;
            let outcome = env.step(action)?;
            turns += 1;
            total_reward += outcome.reward;

            controller.learn(observation, action, &outcome)?;
            for observer in &mut self.observers {
                observer.on_turn(episode, turns, action, &outcome)?;
            }

            observation = outcome.observation;
            if outcome.done {
                let result = if outcome.reward > 0.0 {
                    EpisodeResult::Victory
                } else {
                    EpisodeResult::Defeat
                };
                return Ok(EpisodeOutcome {
                    result,
                    turns,
                    total_reward,
                });
            }
        }

        Ok(EpisodeOutcome {
            result: EpisodeResult::Truncated,
            turns,
            total_reward,
        })
    }
}
