//! Tests for the training and evaluation pipelines

use std::sync::{Arc, Mutex};

use qbattle::{
    Result,
    app::BattleConfig,
    battle::{Action, BattleEngine, FixedPolicy, RandomPolicy, StepOutcome},
    pipeline::{
        EpisodeObservation, EpisodeOutcome, EpisodeResult, JsonlObserver, MetricsObserver,
        Observer, TrainingConfig, TrainingPipeline,
    },
    q_learning::{LearnedPolicy, QLearningAgent, StateDiscretizer},
};
use tempfile::tempdir;

/// Records the order of observer callbacks
#[derive(Clone, Default)]
struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    fn entries(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, entry: String) {
        self.calls.lock().unwrap().push(entry);
    }
}

impl Observer for CallLog {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        self.push(format!("start:{total_episodes}"));
        Ok(())
    }

    fn on_episode_start(&mut self, episode: usize) -> Result<()> {
        self.push(format!("episode:{episode}"));
        Ok(())
    }

    fn on_turn(
        &mut self,
        _episode: usize,
        turn: usize,
        action: Action,
        _outcome: &StepOutcome,
    ) -> Result<()> {
        self.push(format!("turn:{turn}:{action}"));
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, outcome: &EpisodeOutcome) -> Result<()> {
        self.push(format!("end:{episode}:{:?}", outcome.result));
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.push("finish".to_string());
        Ok(())
    }
}

fn reference_engine(seed: u64) -> BattleEngine {
    BattleEngine::new(BattleConfig::default())
        .unwrap()
        .with_seed(seed)
}

#[test]
fn test_observer_event_sequence() {
    let log = CallLog::default();
    let config = TrainingConfig {
        episodes: 2,
        seed: Some(1),
        max_turns: 50,
    };
    let mut pipeline = TrainingPipeline::new(config).with_observer(Box::new(log.clone()));
    let mut env = reference_engine(1);
    let mut policy = FixedPolicy::new(Action::Attack);

    let result = pipeline.evaluate(&mut env, &mut policy).unwrap();

    // Attacking every turn loses the reference battle in exactly 5 turns
    assert_eq!(result.losses, 2);
    assert_eq!(result.mean_turns, 5.0);

    let entries = log.entries();
    let mut expected = vec!["start:2".to_string()];
    for episode in 0..2 {
        expected.push(format!("episode:{episode}"));
        for turn in 1..=5 {
            expected.push(format!("turn:{turn}:Attack"));
        }
        expected.push(format!("end:{episode}:Defeat"));
    }
    expected.push("finish".to_string());
    assert_eq!(entries, expected);
}

#[test]
fn test_random_baseline_accounts_for_every_episode() {
    let config = TrainingConfig {
        episodes: 40,
        seed: Some(7),
        max_turns: 300,
    };
    let mut pipeline = TrainingPipeline::new(config);
    let mut env = reference_engine(7);
    let mut policy = RandomPolicy::new("Random");

    let result = pipeline.evaluate(&mut env, &mut policy).unwrap();

    assert_eq!(result.total_episodes, 40);
    assert_eq!(result.wins + result.losses + result.truncated, 40);
    assert!(result.win_rate >= 0.0 && result.win_rate <= 1.0);
}

#[test]
fn test_seeded_training_is_reproducible() {
    let run = || {
        let discretizer = StateDiscretizer::new(10, 20, 50).unwrap();
        let mut agent = QLearningAgent::new(0.1, 0.9, 0.2, discretizer.state_count());
        let mut env = reference_engine(5);
        let mut pipeline = TrainingPipeline::new(TrainingConfig {
            episodes: 50,
            seed: Some(5),
            max_turns: 200,
        });
        let result = pipeline.train(&mut env, &mut agent, &discretizer).unwrap();
        (result.wins, result.losses, agent.q_table().sorted_rows())
    };

    assert_eq!(run(), run());
}

#[test]
fn test_greedy_evaluation_leaves_agent_unchanged() {
    let discretizer = StateDiscretizer::new(10, 20, 50).unwrap();
    let mut agent = QLearningAgent::new(0.1, 0.9, 0.2, discretizer.state_count());
    let mut env = reference_engine(12);

    TrainingPipeline::new(TrainingConfig {
        episodes: 30,
        seed: Some(12),
        max_turns: 200,
    })
    .train(&mut env, &mut agent, &discretizer)
    .unwrap();
    let learned = agent.q_table().sorted_rows();

    agent.set_epsilon(0.0);
    let mut policy = LearnedPolicy::new(agent, discretizer);
    let result = TrainingPipeline::new(TrainingConfig {
        episodes: 10,
        seed: Some(13),
        max_turns: 200,
    })
    .evaluate(&mut env, &mut policy)
    .unwrap();

    assert_eq!(result.total_episodes, 10);
    assert_eq!(policy.agent().q_table().sorted_rows(), learned);
}

#[test]
fn test_metrics_and_jsonl_observers() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("episodes.jsonl");

    let config = TrainingConfig {
        episodes: 3,
        seed: Some(2),
        max_turns: 20,
    };
    let mut pipeline = TrainingPipeline::new(config)
        .with_observer(Box::new(MetricsObserver::new()))
        .with_observer(Box::new(JsonlObserver::new(&path).unwrap()));
    let mut env = reference_engine(2);
    let mut policy = FixedPolicy::new(Action::Heal);

    let result = pipeline.evaluate(&mut env, &mut policy).unwrap();
    assert_eq!(result.truncated, 3);
    drop(pipeline);

    let contents = std::fs::read_to_string(&path).unwrap();
    let episodes: Vec<EpisodeObservation> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(episodes.len(), 3);
    for (index, episode) in episodes.iter().enumerate() {
        assert_eq!(episode.episode, index);
        assert_eq!(episode.result, EpisodeResult::Truncated);
        assert_eq!(episode.total_turns, 20);
        assert_eq!(episode.turns.len(), 20);
        assert!(episode.turns.iter().all(|turn| turn.action == Action::Heal));
        assert!(episode.turns.iter().all(|turn| !turn.events.is_empty()));
    }
}
