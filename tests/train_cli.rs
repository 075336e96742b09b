use clap::Parser;
use qbattle::{
    cli::commands::{
        evaluate::{self, EvaluateArgs},
        inspect::{self, InspectArgs},
        train::{self, TrainArgs},
    },
    q_learning::SavedQAgent,
};
use tempfile::tempdir;

#[test]
fn train_writes_agent_and_summary() {
    let tmp = tempdir().unwrap();
    let agent_path = tmp.path().join("agent.msgpack");
    let summary_stem = tmp.path().join("run_overview");

    let args = TrainArgs::parse_from([
        "qbattle-train",
        "--episodes",
        "20",
        "--eval-episodes",
        "5",
        "--max-turns",
        "100",
        "--seed",
        "42",
        "--baseline",
        "--output",
        agent_path.to_str().unwrap(),
        "--summary",
        summary_stem.to_str().unwrap(),
    ]);

    train::execute(args).expect("training should succeed");

    let summary_path = summary_stem.with_extension("json");
    assert!(
        summary_path.exists(),
        "expected summary at {}",
        summary_path.display()
    );
    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(summary["training"]["total_episodes"], 20);
    assert_eq!(summary["evaluation"]["total_episodes"], 5);
    assert_eq!(summary["baseline"]["total_episodes"], 5);
    assert_eq!(summary["metadata"]["seed"], 42);
    assert_eq!(summary["metadata"]["buckets"], 10);

    let saved = SavedQAgent::load_from_file(&agent_path).unwrap();
    assert_eq!(saved.metadata.episodes_trained, Some(20));
    assert_eq!(saved.metadata.seed, Some(42));
    assert_eq!(saved.discretizer.state_count(), 100);
    let agent = saved.to_agent().unwrap();
    assert!(!agent.q_table().is_empty());
    // training ε is restored before saving
    assert_eq!(agent.epsilon(), 0.2);
}

#[test]
fn saved_agent_can_be_evaluated_and_inspected() {
    let tmp = tempdir().unwrap();
    let agent_path = tmp.path().join("agent.msgpack");
    let export_path = tmp.path().join("evaluation.json");
    let observations = tmp.path().join("training.jsonl");

    let args = TrainArgs::parse_from([
        "qbattle-train",
        "--episodes",
        "10",
        "--eval-episodes",
        "2",
        "--max-turns",
        "50",
        "--seed",
        "3",
        "--output",
        agent_path.to_str().unwrap(),
        "--observations",
        observations.to_str().unwrap(),
    ]);
    train::execute(args).unwrap();

    let lines = std::fs::read_to_string(&observations).unwrap();
    assert_eq!(lines.lines().count(), 10);

    let args = EvaluateArgs::parse_from([
        "qbattle-evaluate",
        agent_path.to_str().unwrap(),
        "--episodes",
        "4",
        "--max-turns",
        "50",
        "--show-log",
        "1",
        "--export",
        export_path.to_str().unwrap(),
    ]);
    evaluate::execute(args).unwrap();

    let export: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&export_path).unwrap()).unwrap();
    assert_eq!(export["result"]["total_episodes"], 4);
    assert_eq!(export["episodes_trained"], 10);

    let args = InspectArgs::parse_from(["qbattle-inspect", agent_path.to_str().unwrap(), "--all"]);
    inspect::execute(args).unwrap();

    let args = InspectArgs::parse_from([
        "qbattle-inspect",
        agent_path.to_str().unwrap(),
        "--from",
        "90",
        "--to",
        "120",
    ]);
    assert!(inspect::execute(args).is_err());
}
