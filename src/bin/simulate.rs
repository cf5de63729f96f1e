use chrono::{SecondsFormat, Utc};
use clap::Parser;
use maze_chase_core::config::ChaseConfig;
use maze_chase_core::constants::DEFAULT_PLAYER_SPAWN;
use maze_chase_core::engine::ChaseEngine;
use maze_chase_core::error::MapError;
use maze_chase_core::grid_map::GridMap;
use maze_chase_core::rng::Rng;
use maze_chase_core::types::{AgentEvent, Direction, GhostView, PlayerSnapshot, Vec2};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Ticks the scripted player spends on each cell.
const PLAYER_STEP_TICKS: u64 = 8;
const PLAYER_SEED_SALT: u32 = 0x9e37_79b9;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    ticks: Option<u64>,
    #[arg(long)]
    level: Option<u32>,
    #[arg(long, default_value_t = 3)]
    lives: u32,
    /// Power-item trigger period in ticks; 0 disables it.
    #[arg(long, default_value_t = 600)]
    frighten_every: u64,
    #[arg(long, env = "CHASE_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    seed: u32,
    ticks: u64,
    level: u32,
    lives: u32,
    #[serde(rename = "frightenEvery")]
    frighten_every: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum RunOutcome {
    TickLimit,
    OutOfLives,
}

impl RunOutcome {
    fn key(self) -> &'static str {
        match self {
            RunOutcome::TickLimit => "tick_limit",
            RunOutcome::OutOfLives => "out_of_lives",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    level: u32,
    outcome: RunOutcome,
    ticks: u64,
    captures: u32,
    #[serde(rename = "playerDeaths")]
    player_deaths: u32,
    #[serde(rename = "arrivedHome")]
    arrived_home: u32,
    #[serde(rename = "powerItems")]
    power_items: u32,
    #[serde(rename = "livesLeft")]
    lives_left: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "generatedAt")]
    generated_at: String,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageTicks")]
    average_ticks: u64,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

/// Player life counter. Losing a life at zero is a logic error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Lives {
    remaining: u32,
}

impl Lives {
    fn new(count: u32) -> Self {
        Self { remaining: count }
    }

    fn lose(&mut self) {
        assert!(self.remaining > 0, "cannot lose a life with none left");
        self.remaining -= 1;
    }

    fn is_out(&self) -> bool {
        self.remaining == 0
    }
}

/// Random-walks the maze one cell at a time and only reverses at dead ends.
struct ScriptedPlayer {
    spawn: Vec2,
    cell: Vec2,
    facing: Direction,
    rng: Rng,
}

impl ScriptedPlayer {
    fn new(spawn: Vec2, seed: u32) -> Self {
        Self {
            spawn,
            cell: spawn,
            facing: Direction::Left,
            rng: Rng::new(seed ^ PLAYER_SEED_SALT),
        }
    }

    fn respawn(&mut self) {
        self.cell = self.spawn;
        self.facing = Direction::Left;
    }

    fn advance(&mut self, map: &GridMap) {
        let reverse = self.facing.opposite();
        let options: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|dir| *dir != reverse && map.is_walkable_toward(self.cell, *dir))
            .collect();
        let dir = match self.rng.pick(&options) {
            Some(dir) => dir,
            None if map.is_walkable_toward(self.cell, reverse) => reverse,
            None => return,
        };
        self.cell = self.cell.step(dir, 1);
        self.facing = dir;
    }

    fn snapshot(&self, map: &GridMap) -> PlayerSnapshot {
        PlayerSnapshot {
            cell: self.cell,
            facing: self.facing,
            center: map.col_row_to_center(self.cell),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match cli.config.as_deref().map(ChaseConfig::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            error!(path = ?cli.config, error = %err, "config load failed");
            std::process::exit(2);
        }
    };
    if let Some(level) = cli.level {
        config.level = level;
    }
    if let Err(err) = config.validate() {
        error!(error = %err, "invalid config");
        std::process::exit(2);
    }

    let scenarios = resolve_scenarios(&cli, &config);
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed_hint, Utc::now().timestamp_millis()));
    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_ticks = 0u64;
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        info!(
            match_id = %match_id,
            scenario = %scenario.name,
            seed = scenario.seed,
            level = scenario.level,
            ticks = scenario.ticks,
            "scenario started"
        );
        let scenario_config = ChaseConfig {
            level: scenario.level,
            ..config.clone()
        };
        let scenario_run = match run_scenario(&scenario, &scenario_config) {
            Ok(run) => run,
            Err(err) => {
                error!(scenario = %scenario.name, error = %err, "maze construction failed");
                std::process::exit(2);
            }
        };

        for anomaly in &scenario_run.anomaly_records {
            warn!(
                scenario = %scenario.name,
                tick = anomaly.tick,
                message = %anomaly.message,
                "anomaly detected"
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        total_ticks += scenario_run.result.ticks;
        *outcome_counts
            .entry(scenario_run.result.outcome.key().to_string())
            .or_insert(0) += 1;

        info!(
            scenario = %scenario.name,
            outcome = scenario_run.result.outcome.key(),
            ticks = scenario_run.result.ticks,
            captures = scenario_run.result.captures,
            deaths = scenario_run.result.player_deaths,
            anomalies = scenario_run.anomaly_records.len(),
            "scenario finished"
        );

        println!(
            "{}",
            serde_json::to_string(&scenario_run.result).expect("scenario result should serialize")
        );
        scenario_results.push(scenario_run.result);
    }

    let summary = build_run_summary(
        match_id.clone(),
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        scenario_results,
        outcome_counts,
        total_anomalies,
        total_ticks,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(err) = write_summary(path, &summary) {
            error!(path = %path.display(), error = %err, "summary write failed");
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    info!(
        match_id = %match_id,
        scenarios = summary.scenario_count,
        anomalies = summary.anomaly_count,
        average_ticks = summary.average_ticks,
        summary_out = ?summary_out_written,
        "run finished"
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_scenario(scenario: &Scenario, config: &ChaseConfig) -> Result<ScenarioRunResult, MapError> {
    let mut engine = ChaseEngine::with_default_maze(config.clone(), scenario.seed)?;
    let mut player = ScriptedPlayer::new(DEFAULT_PLAYER_SPAWN, scenario.seed);
    let mut lives = Lives::new(scenario.lives.max(1));
    let dt = config.tick_secs();
    let tolerance = config.center_tolerance();

    let mut outcome = RunOutcome::TickLimit;
    let mut captures = 0;
    let mut player_deaths = 0;
    let mut arrived_home = 0;
    let mut power_items = 0;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut last_tick = 0u64;

    for tick in 0..scenario.ticks {
        if tick > 0 && tick % PLAYER_STEP_TICKS == 0 {
            player.advance(engine.map());
        }
        let snapshot = player.snapshot(engine.map());
        engine.set_player(Some(snapshot));
        if scenario.frighten_every > 0 && tick % scenario.frighten_every == scenario.frighten_every - 1
        {
            engine.frighten_all();
            power_items += 1;
        }

        engine.step(dt);
        let snapshot = engine.build_snapshot(true);
        last_tick = snapshot.tick;
        for message in collect_view_anomalies(engine.map(), &snapshot.ghosts, tolerance) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }

        let mut died = false;
        for event in &snapshot.events {
            match event {
                AgentEvent::Captured => captures += 1,
                AgentEvent::ArrivedHome => arrived_home += 1,
                AgentEvent::PlayerDied => died = true,
            }
        }
        if died {
            player_deaths += 1;
            lives.lose();
            if lives.is_out() {
                outcome = RunOutcome::OutOfLives;
                break;
            }
            engine.reset();
            player.respawn();
        }
    }

    Ok(ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            level: scenario.level,
            outcome,
            ticks: last_tick,
            captures,
            player_deaths,
            arrived_home,
            power_items,
            lives_left: lives.remaining,
            anomalies,
        },
        anomaly_records,
    })
}

/// Ghosts must sit inside a walkable cell and on their travel centerline.
fn collect_view_anomalies(map: &GridMap, views: &[GhostView], tolerance: f32) -> Vec<String> {
    let mut anomalies = Vec::new();
    for view in views {
        let center = view.aabb.center();
        let cell = map.coords_to_col_row(center);
        if !map.is_walkable(cell) {
            anomalies.push(format!(
                "{:?} inside non-walkable cell ({}, {})",
                view.kind, cell.x, cell.y
            ));
        }
        let line = map.col_row_to_center(cell);
        let drift = if view.dir.is_horizontal() {
            (center.y - line.y).abs()
        } else {
            (center.x - line.x).abs()
        };
        if drift > tolerance {
            anomalies.push(format!("{:?} off centerline by {drift:.2}", view.kind));
        }
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli, config: &ChaseConfig) -> Vec<Scenario> {
    let seed = normalize_seed(cli.seed.unwrap_or_else(|| rand::random::<u32>() as u64));
    let frighten_every = cli.frighten_every;
    let lives = cli.lives.max(1);

    if cli.ticks.is_some() || cli.level.is_some() {
        let ticks = cli.ticks.unwrap_or(config.tick_rate as u64 * 60);
        return vec![Scenario {
            name: format!("custom-l{}", config.level),
            seed,
            ticks,
            level: config.level,
            lives,
            frighten_every,
        }];
    }

    vec![
        Scenario {
            name: "quick-check".to_string(),
            seed,
            ticks: config.tick_rate as u64 * 60,
            level: config.level,
            lives,
            frighten_every,
        },
        Scenario {
            name: "late-level".to_string(),
            seed: normalize_seed(seed as u64 + 1),
            ticks: config.tick_rate as u64 * 120,
            level: config.level.max(1) + 9,
            lives,
            frighten_every,
        },
    ]
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: i64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    generated_at: String,
    scenarios: Vec<ScenarioResultLine>,
    outcome_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
    total_ticks: u64,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let average_ticks = if scenario_count == 0 {
        0
    } else {
        total_ticks / scenario_count as u64
    };
    RunSummary {
        match_id,
        generated_at,
        scenario_count,
        anomaly_count,
        average_ticks,
        outcome_counts,
        scenarios,
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}
