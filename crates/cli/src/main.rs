use anyhow::{anyhow, bail, Context};
use cardplan_core::{MissionId, PriceMode, ResolvedMission};
use cardplan_data::load_snapshot;
use cardplan_planner::{candidate_pool, plan, ObjectiveResult, ObjectiveStrategy};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const USAGE: &str = "usage: cardplan <snapshot.json> [--strategy KEY] [--budget N] \
                     [--anchor ID] [--mode market|sell] [--json]";

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    snapshot: PathBuf,
    strategy: Option<ObjectiveStrategy>,
    budget: Option<f64>,
    anchor: Option<String>,
    mode: Option<PriceMode>,
    json: bool,
}

fn parse_cli_options(args: &[String]) -> anyhow::Result<CliOptions> {
    let mut snapshot = None;
    let mut strategy = None;
    let mut budget = None;
    let mut anchor = None;
    let mut mode = None;
    let mut json = false;
    let mut idx = 0usize;
    while idx < args.len() {
        let arg = args[idx].as_str();
        match arg {
            "--json" => json = true,
            "--strategy" | "-s" | "--budget" | "-b" | "--anchor" | "-a" | "--mode" => {
                let value = args
                    .get(idx + 1)
                    .ok_or_else(|| anyhow!("{arg} needs a value"))?;
                idx += 1;
                match arg {
                    "--strategy" | "-s" => strategy = Some(value.parse::<ObjectiveStrategy>()?),
                    "--budget" | "-b" => {
                        let parsed = value
                            .parse::<f64>()
                            .with_context(|| format!("budget {value}"))?;
                        budget = Some(parsed);
                    }
                    "--anchor" | "-a" => anchor = Some(value.clone()),
                    _ => {
                        mode = Some(
                            PriceMode::from_key(value)
                                .ok_or_else(|| anyhow!("unknown price mode {value}"))?,
                        )
                    }
                }
            }
            other if other.starts_with('-') => bail!("unknown option {other}\n{USAGE}"),
            other => {
                if snapshot.is_some() {
                    bail!("unexpected argument {other}\n{USAGE}");
                }
                snapshot = Some(PathBuf::from(other));
            }
        }
        idx += 1;
    }
    let snapshot = snapshot.ok_or_else(|| anyhow!(USAGE))?;
    Ok(CliOptions {
        snapshot,
        strategy,
        budget,
        anchor,
        mode,
        json,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CARDPLAN_LOG").unwrap_or_else(|_| {
        EnvFilter::new("cardplan=warn,cardplan_core=warn,cardplan_planner=warn")
    });
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}

#[derive(Serialize)]
struct Report<'a> {
    missions: &'a BTreeMap<MissionId, ResolvedMission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<&'a ObjectiveResult>,
}

fn money(value: Option<f64>) -> String {
    value.map_or_else(|| "?".to_string(), |value| format!("{value:.2}"))
}

fn print_missions(missions: &BTreeMap<MissionId, ResolvedMission>) {
    println!(
        "{:<24} {:<6} {:>10} {:>10} {:>10}  progress",
        "mission", "done", "cost", "reward", "value"
    );
    for mission in missions.values() {
        println!(
            "{:<24} {:<6} {:>10} {:>10} {:>10}  {}",
            mission.id,
            if mission.completed { "yes" } else { "no" },
            money(mission.cost()),
            money(mission.reward_value),
            money(mission.mission_value),
            mission.progress
        );
    }
}

fn print_plan(result: &ObjectiveResult, budget: Option<f64>) {
    println!();
    println!(
        "plan: {} (budget {})",
        result.strategy.label(),
        budget.map_or_else(|| "unlimited".to_string(), |value| format!("{value:.2}"))
    );
    for (idx, id) in result.selected_ids.iter().enumerate() {
        println!("  {}. {}", idx + 1, id);
    }
    if result.is_empty() {
        println!("  (nothing selected)");
    }
    println!(
        "eligible {} | cost {:.2} | reward {:.2} | net {:.2} | budget sufficient: {}",
        result.eligible_pool_size,
        result.total_cost,
        result.total_reward,
        result.net_gain,
        result.budget_sufficient
    );
    if !result.skipped_ids.is_empty() {
        println!("over budget: {}", result.skipped_ids.join(", "));
    }
    if !result.unpriced_ids.is_empty() {
        println!("no known cost: {}", result.unpriced_ids.join(", "));
    }
}

fn run(options: &CliOptions) -> anyhow::Result<()> {
    let mut snapshot = load_snapshot(&options.snapshot)?;
    if let Some(mode) = options.mode {
        snapshot.set_price_mode(mode);
    }
    let missions = snapshot.evaluate();
    tracing::debug!(missions = missions.len(), "snapshot evaluated");
    let result = match options.strategy {
        Some(strategy) => {
            let pool = candidate_pool(&missions);
            Some(plan(
                strategy,
                &pool,
                options.budget,
                options.anchor.as_deref(),
            )?)
        }
        None => None,
    };

    if options.json {
        let report = Report {
            missions: &missions,
            plan: result.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    print_missions(&missions);
    if let Some(result) = &result {
        print_plan(result, options.budget);
    }
    Ok(())
}

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let outcome = parse_cli_options(&args).and_then(|options| run(&options));
    if let Err(err) = outcome {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
