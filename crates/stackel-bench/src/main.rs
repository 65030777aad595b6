use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, create_dir_all};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use stackel_bilevel::BilevelSolverSession;
use stackel_core::{Bounds, Model, Sense, Variable};
use stackel_expr::Expr;
use stackel_milp::BranchAndBound;
use stackel_solver::{SolveOptions, SolverRegistry, Subsolver};

mod measure;

use measure::{MeasurementRecorder, StageMeasurement, capture_rss_bytes, rss_delta};

const DEFAULT_CASES: [usize; 4] = [1, 10, 50, 200];
const SCHEMA_VERSION: u32 = 1;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Stackel benchmark runner and reporting interface"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute benchmark scenarios and save JSONL artifacts
    Run(RunArgs),
    /// Render benchmark artifact summaries
    Report(ReportArgs),
    /// Compare two benchmark artifacts and optionally enforce thresholds
    Compare(CompareArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Benchmark scenarios to execute
    #[arg(
        long = "scenario",
        value_enum,
        value_delimiter = ',',
        default_value = "linear-chain"
    )]
    scenarios: Vec<Scenario>,

    /// Comma-separated list of follower-pair counts
    #[arg(long, value_delimiter = ',')]
    cases: Option<Vec<usize>>,

    /// Run a single case with this follower-pair count
    #[arg(long)]
    pairs: Option<usize>,

    /// Number of repetitions per case
    #[arg(long, default_value_t = 1)]
    repetitions: u32,

    /// Time limit handed to the sub-solver, in seconds
    #[arg(long)]
    time_limit: Option<f64>,

    /// Big-M magnitude for the complementarity reformulation
    #[arg(long)]
    big_m: Option<f64>,

    /// JSONL output artifact path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Parser, Debug)]
struct ReportArgs {
    /// Input JSONL benchmark artifact
    #[arg(long)]
    input: PathBuf,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Parser, Debug)]
struct CompareArgs {
    /// Baseline JSONL benchmark artifact
    #[arg(long)]
    baseline: PathBuf,

    /// Candidate JSONL benchmark artifact
    #[arg(long)]
    candidate: PathBuf,

    /// Stage filter for comparison (for example, total)
    #[arg(long, default_value = "total")]
    stage: String,

    /// Fail if duration regression exceeds this percentage
    #[arg(long)]
    duration_threshold_pct: Option<f64>,

    /// Fail if memory regression exceeds this percentage
    #[arg(long)]
    memory_threshold_pct: Option<f64>,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Ndjson,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum Scenario {
    /// Linear leader and follower objectives coupled through one row per pair
    LinearChain,
    /// Quadratic follower objective, resolved by stationarity alone
    QuadraticTracking,
}

impl Scenario {
    fn as_str(self) -> &'static str {
        match self {
            Scenario::LinearChain => "linear-chain",
            Scenario::QuadraticTracking => "quadratic-tracking",
        }
    }
}

#[derive(Debug, Clone)]
struct CaseConfig {
    name: String,
    pairs: usize,
}

#[derive(Debug, Clone)]
struct CaseExecution {
    variables: usize,
    constraints: usize,
    termination: String,
    objective: Option<f64>,
    stage_measurements: Vec<StageMeasurement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BenchRecord {
    schema_version: u32,
    run_id: String,
    scenario: String,
    case_name: String,
    repetition: u32,
    variables: usize,
    constraints: usize,
    termination: String,
    objective: Option<f64>,
    stage: String,
    duration_ms: f64,
    rss_before_bytes: Option<u64>,
    rss_after_bytes: Option<u64>,
    rss_delta_bytes: Option<i64>,
}

#[derive(Debug, Clone, Eq, Ord, PartialEq, PartialOrd)]
struct SummaryKey {
    scenario: String,
    case_name: String,
    stage: String,
}

#[derive(Debug, Clone, Serialize)]
struct SummaryRow {
    scenario: String,
    case_name: String,
    stage: String,
    samples: usize,
    mean_duration_ms: f64,
    max_duration_ms: f64,
    mean_rss_delta_bytes: Option<f64>,
    max_rss_after_bytes: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
struct CompareRow {
    scenario: String,
    case_name: String,
    stage: String,
    baseline_mean_duration_ms: f64,
    candidate_mean_duration_ms: f64,
    duration_change_pct: Option<f64>,
    baseline_mean_rss_delta_bytes: Option<f64>,
    candidate_mean_rss_delta_bytes: Option<f64>,
    rss_change_pct: Option<f64>,
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run_command(args),
        Command::Report(args) => report_command(args),
        Command::Compare(args) => compare_command(args),
    }
}

fn run_command(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.repetitions == 0 {
        return Err(boxed_input_error("repetitions must be greater than zero"));
    }

    let registry = build_registry();
    let run_id = build_run_id()?;
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("artifacts/bench/{}.jsonl", run_id.as_str())));

    let mut records = Vec::new();

    for scenario in &args.scenarios {
        let cases = resolve_cases(&args);
        for case in cases {
            for rep_idx in 0..args.repetitions {
                let execution = execute_case(&registry, *scenario, case.pairs, &args)?;
                records.extend(case_records(
                    &run_id,
                    *scenario,
                    &case.name,
                    rep_idx + 1,
                    &execution,
                ));
            }
        }
    }

    write_records_jsonl(&output_path, &records)?;
    render_output(args.format, &records)?;
    println!("artifact: {}", output_path.display());

    Ok(())
}

fn report_command(args: ReportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let records = load_records_jsonl(&args.input)?;
    render_output(args.format, &records)?;
    Ok(())
}

fn compare_command(args: CompareArgs) -> Result<(), Box<dyn std::error::Error>> {
    let baseline_records = load_records_jsonl(&args.baseline)?;
    let candidate_records = load_records_jsonl(&args.candidate)?;

    let baseline_summary = summarize_records(&baseline_records);
    let candidate_summary = summarize_records(&candidate_records);
    let rows = build_comparison_rows(&baseline_summary, &candidate_summary, &args.stage);

    if rows.is_empty() {
        return Err(boxed_input_error(
            "no overlapping scenario/case/stage rows to compare",
        ));
    }

    render_compare_output(args.format, &rows)?;
    if has_regressions(
        &rows,
        args.duration_threshold_pct,
        args.memory_threshold_pct,
    ) {
        return Err(boxed_input_error(
            "regression threshold violated (see compare output)",
        ));
    }

    Ok(())
}

fn build_registry() -> SolverRegistry {
    let mut registry = SolverRegistry::new();
    registry.register(BranchAndBound::NAME, || {
        Box::new(BranchAndBound::new()) as Box<dyn Subsolver>
    });
    registry
}

fn resolve_cases(args: &RunArgs) -> Vec<CaseConfig> {
    if let Some(pairs) = args.pairs {
        return vec![CaseConfig {
            name: format!("pairs_{}", pairs),
            pairs,
        }];
    }

    args.cases
        .clone()
        .unwrap_or_else(|| DEFAULT_CASES.to_vec())
        .into_iter()
        .map(|pairs| CaseConfig {
            name: format!("pairs_{}", pairs),
            pairs,
        })
        .collect()
}

fn solve_options(args: &RunArgs) -> SolveOptions {
    let mut options = SolveOptions::new().with_solver(BranchAndBound::NAME);
    if let Some(limit) = args.time_limit {
        options = options.with_time_limit(limit);
    }
    if let Some(big_m) = args.big_m {
        options = options.with_big_m(big_m);
    }
    options
}

/// Build and solve one synthetic bilevel program with `pairs` coupled
/// leader/follower variable pairs.
fn execute_case(
    registry: &SolverRegistry,
    scenario: Scenario,
    pairs: usize,
    args: &RunArgs,
) -> Result<CaseExecution, Box<dyn std::error::Error>> {
    let pairs = pairs.max(1);
    let mut recorder = MeasurementRecorder::new();

    let total_started = Instant::now();
    let total_rss_before = capture_rss_bytes();

    let stage_start = recorder.begin_stage("build");
    let mut model = build_program(scenario, pairs)?;
    recorder.end_stage(stage_start);

    let stage_start = recorder.begin_stage("solve");
    let mut session = BilevelSolverSession::new(&mut model, solve_options(args));
    let result = session.solve(registry)?;
    recorder.end_stage(stage_start);
    tracing::debug!(
        component = "bench",
        operation = "execute_case",
        status = "success",
        scenario = scenario.as_str(),
        pairs,
        termination = %result.termination,
        "Case solved"
    );

    let total_rss_after = capture_rss_bytes();
    let mut stages = recorder.stages().to_vec();
    stages.push(StageMeasurement {
        stage: "total".to_string(),
        duration: total_started.elapsed(),
        rss_before_bytes: total_rss_before,
        rss_after_bytes: total_rss_after,
        rss_delta_bytes: rss_delta(total_rss_before, total_rss_after),
    });

    Ok(CaseExecution {
        variables: result.statistics.variables,
        constraints: result.statistics.constraints,
        termination: result.termination.to_string(),
        objective: result.objective_value,
        stage_measurements: stages,
    })
}

/// `pairs` leader variables x[i] in [0, 2] and follower variables y[i].
///
/// linear-chain couples each pair through x[i] + y[i] >= 3 with the follower
/// minimizing sum y[i]; quadratic-tracking drops the rows and lets the
/// follower's stationarity pin each y[i] at 2.
fn build_program(scenario: Scenario, pairs: usize) -> Result<Model, Box<dyn std::error::Error>> {
    let mut model = Model::new();
    let elements: Vec<String> = (0..pairs).map(|idx| idx.to_string()).collect();
    let set = model.add_index_set("pairs", elements);

    let leaders = model.add_variable_family(
        None,
        set,
        Variable::continuous(Bounds::new(0.0, 2.0)),
        "x",
    )?;
    let sub = model.add_submodel("lower")?;

    match scenario {
        Scenario::LinearChain => {
            let followers = model.add_variable_family(
                Some(sub),
                set,
                Variable::continuous(Bounds::non_negative()),
                "y",
            )?;
            for (x, y) in leaders.iter().zip(&followers) {
                model.add_block_constraint_expr(
                    sub,
                    (Expr::var(*x) + Expr::var(*y)).ge_scalar(3.0),
                )?;
            }
            let follower_cost: Vec<_> = followers.iter().map(|y| (*y, 1.0)).collect();
            model.add_block_objective(sub, Sense::Minimize, Expr::new(follower_cost, 0.0))?;

            let mut leader_cost = Vec::with_capacity(pairs * 2);
            leader_cost.extend(leaders.iter().map(|x| (*x, 1.0)));
            leader_cost.extend(followers.iter().map(|y| (*y, -1.0)));
            model.minimize(Expr::new(leader_cost, 0.0))?;
        }
        Scenario::QuadraticTracking => {
            let followers = model.add_variable_family(
                Some(sub),
                set,
                Variable::continuous(Bounds::new(0.0, 10.0)),
                "y",
            )?;
            let mut follower_cost = Expr::new_empty();
            for y in &followers {
                follower_cost = follower_cost
                    .add(&Expr::product(*y, *y, 1.0))
                    .add(&Expr::term(*y, -4.0))
                    .add_constant(4.0);
            }
            model.add_block_objective(sub, Sense::Minimize, follower_cost)?;

            let mut leader_cost = Vec::with_capacity(pairs * 2);
            leader_cost.extend(leaders.iter().map(|x| (*x, 1.0)));
            leader_cost.extend(followers.iter().map(|y| (*y, 1.0)));
            model.minimize(Expr::new(leader_cost, 0.0))?;
        }
    }

    Ok(model)
}

fn case_records(
    run_id: &str,
    scenario: Scenario,
    case_name: &str,
    repetition: u32,
    execution: &CaseExecution,
) -> Vec<BenchRecord> {
    execution
        .stage_measurements
        .iter()
        .map(|measurement| BenchRecord {
            schema_version: SCHEMA_VERSION,
            run_id: run_id.to_string(),
            scenario: scenario.as_str().to_string(),
            case_name: case_name.to_string(),
            repetition,
            variables: execution.variables,
            constraints: execution.constraints,
            termination: execution.termination.clone(),
            objective: execution.objective,
            stage: measurement.stage.clone(),
            duration_ms: measurement.duration.as_secs_f64() * 1000.0,
            rss_before_bytes: measurement.rss_before_bytes,
            rss_after_bytes: measurement.rss_after_bytes,
            rss_delta_bytes: measurement.rss_delta_bytes,
        })
        .collect()
}

fn render_output(
    format: OutputFormat,
    records: &[BenchRecord],
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Table => {
            let rows = summarize_records(records);
            print_summary_table(&rows);
            Ok(())
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
            Ok(())
        }
        OutputFormat::Ndjson => {
            for record in records {
                println!("{}", serde_json::to_string(record)?);
            }
            Ok(())
        }
    }
}

fn render_compare_output(
    format: OutputFormat,
    rows: &[CompareRow],
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Table => {
            print_compare_table(rows);
            Ok(())
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows)?);
            Ok(())
        }
        OutputFormat::Ndjson => {
            for row in rows {
                println!("{}", serde_json::to_string(row)?);
            }
            Ok(())
        }
    }
}

fn summarize_records(records: &[BenchRecord]) -> Vec<SummaryRow> {
    #[derive(Default)]
    struct Acc {
        samples: usize,
        duration_sum: f64,
        duration_max: f64,
        rss_delta_sum: f64,
        rss_delta_count: usize,
        rss_after_max: Option<u64>,
    }

    let mut groups: BTreeMap<SummaryKey, Acc> = BTreeMap::new();
    for record in records {
        let key = SummaryKey {
            scenario: record.scenario.clone(),
            case_name: record.case_name.clone(),
            stage: record.stage.clone(),
        };
        let entry = groups.entry(key).or_default();
        entry.samples += 1;
        entry.duration_sum += record.duration_ms;
        if record.duration_ms > entry.duration_max {
            entry.duration_max = record.duration_ms;
        }
        if let Some(delta) = record.rss_delta_bytes {
            entry.rss_delta_sum += delta as f64;
            entry.rss_delta_count += 1;
        }
        entry.rss_after_max = match (entry.rss_after_max, record.rss_after_bytes) {
            (Some(current), Some(next)) => Some(current.max(next)),
            (None, Some(next)) => Some(next),
            (current, None) => current,
        };
    }

    groups
        .into_iter()
        .map(|(key, acc)| SummaryRow {
            scenario: key.scenario,
            case_name: key.case_name,
            stage: key.stage,
            samples: acc.samples,
            mean_duration_ms: if acc.samples == 0 {
                0.0
            } else {
                acc.duration_sum / acc.samples as f64
            },
            max_duration_ms: acc.duration_max,
            mean_rss_delta_bytes: if acc.rss_delta_count == 0 {
                None
            } else {
                Some(acc.rss_delta_sum / acc.rss_delta_count as f64)
            },
            max_rss_after_bytes: acc.rss_after_max,
        })
        .collect()
}

fn build_comparison_rows(
    baseline_summary: &[SummaryRow],
    candidate_summary: &[SummaryRow],
    stage_filter: &str,
) -> Vec<CompareRow> {
    let mut baseline_map: BTreeMap<SummaryKey, &SummaryRow> = BTreeMap::new();
    for row in baseline_summary {
        if row.stage == stage_filter {
            let key = SummaryKey {
                scenario: row.scenario.clone(),
                case_name: row.case_name.clone(),
                stage: row.stage.clone(),
            };
            baseline_map.insert(key, row);
        }
    }

    let mut rows = Vec::new();
    for candidate in candidate_summary {
        if candidate.stage != stage_filter {
            continue;
        }
        let key = SummaryKey {
            scenario: candidate.scenario.clone(),
            case_name: candidate.case_name.clone(),
            stage: candidate.stage.clone(),
        };
        let Some(baseline) = baseline_map.get(&key) else {
            continue;
        };
        rows.push(CompareRow {
            scenario: key.scenario,
            case_name: key.case_name,
            stage: key.stage,
            baseline_mean_duration_ms: baseline.mean_duration_ms,
            candidate_mean_duration_ms: candidate.mean_duration_ms,
            duration_change_pct: percent_change(
                baseline.mean_duration_ms,
                candidate.mean_duration_ms,
            ),
            baseline_mean_rss_delta_bytes: baseline.mean_rss_delta_bytes,
            candidate_mean_rss_delta_bytes: candidate.mean_rss_delta_bytes,
            rss_change_pct: match (
                baseline.mean_rss_delta_bytes,
                candidate.mean_rss_delta_bytes,
            ) {
                (Some(base), Some(next)) => percent_change(base, next),
                _ => None,
            },
        });
    }

    rows
}

fn has_regressions(
    rows: &[CompareRow],
    duration_threshold_pct: Option<f64>,
    memory_threshold_pct: Option<f64>,
) -> bool {
    rows.iter().any(|row| {
        let duration_failed = duration_threshold_pct
            .is_some_and(|threshold| row.duration_change_pct.is_some_and(|pct| pct > threshold));
        let memory_failed = memory_threshold_pct
            .is_some_and(|threshold| row.rss_change_pct.is_some_and(|pct| pct > threshold));
        duration_failed || memory_failed
    })
}

fn percent_change(baseline: f64, candidate: f64) -> Option<f64> {
    if baseline.abs() <= f64::EPSILON {
        return None;
    }
    Some(((candidate - baseline) / baseline.abs()) * 100.0)
}

fn print_summary_table(rows: &[SummaryRow]) {
    println!(
        "{:<20} {:<12} {:<8} {:>7} {:>12} {:>12} {:>14} {:>14}",
        "scenario", "case", "stage", "samples", "mean_ms", "max_ms", "mean_rss_mb", "max_rss_mb"
    );
    for row in rows {
        println!(
            "{:<20} {:<12} {:<8} {:>7} {:>12.3} {:>12.3} {:>14} {:>14}",
            row.scenario,
            row.case_name,
            row.stage,
            row.samples,
            row.mean_duration_ms,
            row.max_duration_ms,
            format_option_mb_f64(row.mean_rss_delta_bytes),
            format_option_mb_u64(row.max_rss_after_bytes),
        );
    }
}

fn print_compare_table(rows: &[CompareRow]) {
    println!(
        "{:<20} {:<12} {:<8} {:>12} {:>12} {:>10} {:>12} {:>12} {:>10}",
        "scenario",
        "case",
        "stage",
        "base_ms",
        "cand_ms",
        "dur_%",
        "base_rss_mb",
        "cand_rss_mb",
        "rss_%"
    );
    for row in rows {
        println!(
            "{:<20} {:<12} {:<8} {:>12.3} {:>12.3} {:>10} {:>12} {:>12} {:>10}",
            row.scenario,
            row.case_name,
            row.stage,
            row.baseline_mean_duration_ms,
            row.candidate_mean_duration_ms,
            format_option_pct(row.duration_change_pct),
            format_option_mb_f64(row.baseline_mean_rss_delta_bytes),
            format_option_mb_f64(row.candidate_mean_rss_delta_bytes),
            format_option_pct(row.rss_change_pct),
        );
    }
}

fn format_option_mb_f64(value: Option<f64>) -> String {
    value.map_or_else(
        || "-".to_string(),
        |bytes| format!("{:.3}", bytes / (1024.0 * 1024.0)),
    )
}

fn format_option_mb_u64(value: Option<u64>) -> String {
    value.map_or_else(
        || "-".to_string(),
        |bytes| format!("{:.3}", bytes as f64 / (1024.0 * 1024.0)),
    )
}

fn format_option_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |pct| format!("{:.2}", pct))
}

fn write_records_jsonl(
    path: &Path,
    records: &[BenchRecord],
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

fn load_records_jsonl(path: &Path) -> Result<Vec<BenchRecord>, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str::<BenchRecord>(&line)?);
    }
    Ok(records)
}

fn build_run_id() -> Result<String, Box<dyn std::error::Error>> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| std::io::Error::other(err.to_string()))?
        .as_millis();
    Ok(format!("bench_{}", millis))
}

fn boxed_input_error(message: &str) -> Box<dyn std::error::Error> {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        message.to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(left: f64, right: f64) {
        assert!((left - right).abs() < 1e-9, "left={left}, right={right}");
    }

    fn record(case_name: &str, stage: &str, duration_ms: f64) -> BenchRecord {
        BenchRecord {
            schema_version: SCHEMA_VERSION,
            run_id: "run".to_string(),
            scenario: "linear-chain".to_string(),
            case_name: case_name.to_string(),
            repetition: 1,
            variables: 4,
            constraints: 2,
            termination: "optimal".to_string(),
            objective: Some(-6.0),
            stage: stage.to_string(),
            duration_ms,
            rss_before_bytes: Some(1_000),
            rss_after_bytes: Some(2_000),
            rss_delta_bytes: Some(1_000),
        }
    }

    #[test]
    fn summarize_records_groups_and_averages() {
        let mut second = record("pairs_2", "total", 30.0);
        second.repetition = 2;
        second.rss_after_bytes = Some(3_000);
        second.rss_delta_bytes = Some(1_500);
        let records = vec![record("pairs_2", "total", 10.0), second];

        let summary = summarize_records(&records);
        assert_eq!(summary.len(), 1);
        let row = &summary[0];
        assert_eq!(row.samples, 2);
        approx_eq(row.mean_duration_ms, 20.0);
        approx_eq(row.max_duration_ms, 30.0);
        match row.mean_rss_delta_bytes {
            Some(mean) => approx_eq(mean, 1_250.0),
            None => panic!("mean RSS delta should be present"),
        }
        assert_eq!(row.max_rss_after_bytes, Some(3_000));
    }

    #[test]
    fn compare_detects_regressions() {
        let baseline = vec![SummaryRow {
            scenario: "linear-chain".to_string(),
            case_name: "pairs_10".to_string(),
            stage: "total".to_string(),
            samples: 2,
            mean_duration_ms: 100.0,
            max_duration_ms: 110.0,
            mean_rss_delta_bytes: Some(1_000.0),
            max_rss_after_bytes: Some(20_000),
        }];
        let candidate = vec![SummaryRow {
            scenario: "linear-chain".to_string(),
            case_name: "pairs_10".to_string(),
            stage: "total".to_string(),
            samples: 2,
            mean_duration_ms: 120.0,
            max_duration_ms: 130.0,
            mean_rss_delta_bytes: Some(1_300.0),
            max_rss_after_bytes: Some(21_000),
        }];

        let rows = build_comparison_rows(&baseline, &candidate, "total");
        assert_eq!(rows.len(), 1);
        match rows[0].duration_change_pct {
            Some(duration_change) => approx_eq(duration_change, 20.0),
            None => panic!("duration change should be present"),
        }

        assert!(has_regressions(&rows, Some(10.0), Some(20.0)));
        assert!(!has_regressions(&rows, Some(25.0), Some(35.0)));
    }

    #[test]
    fn linear_chain_solves_per_pair() {
        let registry = build_registry();
        for pairs in [1usize, 3] {
            let mut model = build_program(Scenario::LinearChain, pairs).unwrap();
            let mut session =
                BilevelSolverSession::new(&mut model, SolveOptions::new().with_solver("milp.bb"));
            let result = session.solve(&registry).unwrap();
            // Each pair contributes x = 0, y = 3.
            approx_eq(result.objective_value.unwrap(), -3.0 * pairs as f64);
        }
    }

    #[test]
    fn quadratic_tracking_pins_followers() {
        let registry = build_registry();
        let mut model = build_program(Scenario::QuadraticTracking, 2).unwrap();
        let mut session =
            BilevelSolverSession::new(&mut model, SolveOptions::new().with_solver("milp.bb"));
        let result = session.solve(&registry).unwrap();
        // x = 0 and y = 2 per pair.
        approx_eq(result.objective_value.unwrap(), 4.0);
        let y0 = model.get_variable_by_name("y[0]").unwrap();
        approx_eq(model.variable_value(y0).unwrap().unwrap(), 2.0);
    }
}
