//! Inspect command - Dump Q-values of a saved agent

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;

use crate::{
    StateIndex,
    battle::Action,
    cli::output::{print_kv, print_section},
    q_learning::{SavedQAgent, greedy_action},
};

#[derive(Parser, Debug)]
#[command(about = "Print the Q-table of a trained agent")]
pub struct InspectArgs {
    /// Path to trained agent file
    pub agent: PathBuf,

    /// First state index to print
    #[arg(long, default_value_t = 50)]
    pub from: usize,

    /// One past the last state index to print
    #[arg(long, default_value_t = 60)]
    pub to: usize,

    /// Print every visited state instead of a range
    #[arg(long, default_value_t = false)]
    pub all: bool,
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let saved = SavedQAgent::load_from_file(&args.agent)?;
    let agent = saved.to_agent()?;
    let table = agent.q_table();
    let discretizer = saved.discretizer;

    print_section("Q-Table");
    print_kv("States", &table.state_count().to_string());
    print_kv("Visited", &table.len().to_string());

    let states: Vec<StateIndex> = if args.all {
        table.sorted_rows().into_iter().map(|(state, _)| state).collect()
    } else {
        if args.from > args.to || args.to > table.state_count() {
            return Err(anyhow!(
                "State range {}..{} is outside 0..{}",
                args.from,
                args.to,
                table.state_count()
            ));
        }
        (args.from..args.to).map(StateIndex::new).collect()
    };

    println!(
        "\n{:>5}  {:>7}  {:>7}  {:>9}  {:>9}  {:>7}",
        "state", "hero", "enemy", "Attack", "Heal", "greedy"
    );
    for state in states {
        let (controllable, opponent) = discretizer.buckets_of(state)?;
        let row = table.values(state)?;
        let greedy = if row.iter().any(|q| *q != 0.0) {
            greedy_action(&row, &Action::ALL).map_or("-", Action::label)
        } else {
            "-"
        };
        println!(
            "{:>5}  {:>7}  {:>7}  {:>9.4}  {:>9.4}  {:>7}",
            state.to_string(),
            controllable,
            opponent,
            row[Action::Attack.index()],
            row[Action::Heal.index()],
            greedy
        );
    }

    Ok(())
}
