//! Seatwise - exam integrity tracking and seating CLI
//!
//! The `seatwise` command manages one exam session stored as a JSON
//! snapshot (`--state`, default `seatwise-state.json`).
//!
//! ## Commands
//!
//! - `student add|list|history`: manage the roster
//! - `hall add|list`: manage exam halls
//! - `violation record`: record an integrity violation
//! - `dashboard`: risk tier counts
//! - `generate`: produce a seating arrangement

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, Level};

use seatwise_core::metrics::METRICS;
use seatwise_core::{
    ArrangementPayload, ArrangementResult, EngineConfig, Envelope, ExamService, HallModel,
    HallOrder, HallPayload, HallsPayload, HistoryPayload, NewHall, NewStudent, StudentId,
    StudentPayload, StudentView, StudentsPayload, ViolationKind, ViolationRequest,
};
use seatwise_state::FsSnapshotStore;

#[derive(Parser)]
#[command(name = "seatwise")]
#[command(author = "Seatwise Maintainers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Exam credibility tracking and conflict-aware seating", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Session snapshot file
    #[arg(
        long,
        global = true,
        env = "SEATWISE_STATE",
        default_value = "seatwise-state.json"
    )]
    state: PathBuf,

    /// Output format for command results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(flatten)]
    engine: EngineArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Engine overrides. Unset flags fall back to `SEATWISE_*` variables, then
/// to built-in defaults.
#[derive(clap::Args, Debug, Default)]
struct EngineArgs {
    /// Hall filling order (largest-first or as-given)
    #[arg(long, global = true, env = "SEATWISE_HALL_ORDER")]
    hall_order: Option<HallOrder>,

    /// Maximum swap evaluations per generation
    #[arg(long, global = true, env = "SEATWISE_MAX_MOVES")]
    max_moves: Option<u64>,

    /// Wall-clock budget per generation, in milliseconds
    #[arg(long, global = true, env = "SEATWISE_TIME_BUDGET_MS")]
    time_budget_ms: Option<u64>,
}

impl EngineArgs {
    fn config(&self) -> EngineConfig {
        let mut config = EngineConfig::from_env();
        if let Some(order) = self.hall_order {
            config = config.with_hall_order(order);
        }
        if let Some(moves) = self.max_moves {
            config = config.with_max_moves(moves);
        }
        if let Some(ms) = self.time_budget_ms {
            config = config.with_time_budget(Duration::from_millis(ms));
        }
        config
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the student roster
    Student {
        #[command(subcommand)]
        action: StudentAction,
    },

    /// Manage exam halls
    Hall {
        #[command(subcommand)]
        action: HallAction,
    },

    /// Record integrity violations
    Violation {
        #[command(subcommand)]
        action: ViolationAction,
    },

    /// Show risk tier counts
    Dashboard,

    /// Generate a seating arrangement for the current roster
    Generate,
}

#[derive(Subcommand)]
enum StudentAction {
    /// Register a student
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        roll_no: String,

        #[arg(long)]
        subject: String,
    },

    /// List every student with credibility and risk
    List,

    /// Show the violation history of a student
    History {
        /// Student id
        id: StudentId,
    },
}

#[derive(Subcommand)]
enum HallAction {
    /// Register a hall (rows and cols must be between 3 and 100)
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        rows: u32,

        #[arg(long)]
        cols: u32,
    },

    /// List halls
    List,
}

#[derive(Subcommand)]
enum ViolationAction {
    /// Record a violation by kind or by point value
    Record {
        /// Student id
        student: StudentId,

        /// Peeking, Communication, Copying or "Unauthorized Material"
        #[arg(long, conflicts_with = "points", required_unless_present = "points")]
        kind: Option<String>,

        /// Penalty points as sent by the web client (-5, -10, -15, -20)
        #[arg(long, allow_hyphen_values = true)]
        points: Option<i32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    seatwise_core::telemetry::init_tracing(cli.json, level);

    let store = FsSnapshotStore::new(&cli.state);
    let service = ExamService::load(&store, cli.engine.config())
        .await
        .with_context(|| format!("Failed to load session from {}", cli.state.display()))?;
    debug!(state = %cli.state.display(), "session loaded");

    let outcome = run(&service, cli.command, cli.format);
    METRICS.flush();

    if outcome? {
        let digest = service
            .persist(&store)
            .await
            .with_context(|| format!("Failed to save session to {}", cli.state.display()))?;
        debug!(digest = %digest.short(), "session saved");
    }
    Ok(())
}

/// Execute one command. Returns whether the session changed.
fn run(service: &ExamService, command: Commands, format: OutputFormat) -> Result<bool> {
    match command {
        Commands::Student { action } => match action {
            StudentAction::Add {
                name,
                roll_no,
                subject,
            } => cmd_student_add(service, NewStudent::new(name, roll_no, subject), format),
            StudentAction::List => cmd_student_list(service, format).map(|_| false),
            StudentAction::History { id } => {
                cmd_student_history(service, id, format).map(|_| false)
            }
        },
        Commands::Hall { action } => match action {
            HallAction::Add { name, rows, cols } => {
                cmd_hall_add(service, NewHall::new(name, rows, cols), format)
            }
            HallAction::List => cmd_hall_list(service, format).map(|_| false),
        },
        Commands::Violation { action } => match action {
            ViolationAction::Record {
                student,
                kind,
                points,
            } => cmd_violation_record(service, student, kind.as_deref(), points, format),
        },
        Commands::Dashboard => cmd_dashboard(service, format).map(|_| false),
        Commands::Generate => cmd_generate(service, format).map(|_| false),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a failed envelope in JSON mode, then surface the error.
fn fail<T: Serialize>(format: OutputFormat, envelope: Envelope<T>) -> Result<bool> {
    if format == OutputFormat::Json {
        print_json(&envelope)?;
    }
    Err(anyhow!(envelope
        .error
        .unwrap_or_else(|| "operation failed".to_string())))
}

fn cmd_student_add(service: &ExamService, new: NewStudent, format: OutputFormat) -> Result<bool> {
    match service.add_student(new) {
        Ok(student) => {
            match format {
                OutputFormat::Json => print_json(&Envelope::ok(StudentPayload {
                    student: student.clone(),
                }))?,
                OutputFormat::Text => println!(
                    "Added student {} ({}, {}) credibility {} risk {}",
                    student.id, student.name, student.roll_no, student.credibility, student.risk
                ),
            }
            Ok(true)
        }
        Err(e) => fail::<StudentPayload>(format, Envelope::failure(&e)),
    }
}

fn cmd_student_list(service: &ExamService, format: OutputFormat) -> Result<()> {
    let students = service.students();
    match format {
        OutputFormat::Json => print_json(&Envelope::ok(StudentsPayload { students }))?,
        OutputFormat::Text => {
            if students.is_empty() {
                println!("No students registered");
                return Ok(());
            }
            println!(
                "{:>4}  {:<20} {:<10} {:<14} {:>11}  RISK",
                "ID", "NAME", "ROLL", "SUBJECT", "CREDIBILITY"
            );
            for s in &students {
                println!(
                    "{:>4}  {:<20} {:<10} {:<14} {:>11}  {}",
                    s.id,
                    s.name,
                    s.roll_no,
                    s.subject,
                    s.credibility.to_string(),
                    s.risk
                );
            }
        }
    }
    Ok(())
}

fn cmd_student_history(service: &ExamService, id: StudentId, format: OutputFormat) -> Result<()> {
    let violations = match service.history(id) {
        Ok(v) => v,
        Err(e) => {
            fail::<HistoryPayload>(format, Envelope::failure(&e))?;
            return Ok(());
        }
    };
    match format {
        OutputFormat::Json => print_json(&Envelope::ok(HistoryPayload { violations }))?,
        OutputFormat::Text => {
            if violations.is_empty() {
                println!("No violations recorded for student {}", id);
            }
            for v in &violations {
                println!(
                    "{}  {:<22} {:>4}",
                    v.recorded_at.format("%Y-%m-%d %H:%M:%S UTC"),
                    v.kind,
                    v.penalty
                );
            }
        }
    }
    Ok(())
}

fn cmd_hall_add(service: &ExamService, new: NewHall, format: OutputFormat) -> Result<bool> {
    match service.add_hall(new) {
        Ok(hall) => {
            match format {
                OutputFormat::Json => {
                    print_json(&Envelope::ok(HallPayload { hall: hall.clone() }))?
                }
                OutputFormat::Text => println!(
                    "Added hall {} ({}, {}x{}, {} seats)",
                    hall.id, hall.name, hall.rows, hall.cols, hall.capacity
                ),
            }
            Ok(true)
        }
        Err(e) => fail::<HallPayload>(format, Envelope::failure(&e)),
    }
}

fn cmd_hall_list(service: &ExamService, format: OutputFormat) -> Result<()> {
    let halls = service.halls();
    match format {
        OutputFormat::Json => print_json(&Envelope::ok(HallsPayload { halls }))?,
        OutputFormat::Text => {
            if halls.is_empty() {
                println!("No halls registered");
            }
            for h in &halls {
                println!(
                    "{:>4}  {:<20} {}x{} ({} seats)",
                    h.id, h.name, h.rows, h.cols, h.capacity
                );
            }
        }
    }
    Ok(())
}

fn cmd_violation_record(
    service: &ExamService,
    student: StudentId,
    kind: Option<&str>,
    points: Option<i32>,
    format: OutputFormat,
) -> Result<bool> {
    let request = match kind.map(str::parse::<ViolationKind>).transpose() {
        Ok(kind) => ViolationRequest {
            student_id: student,
            kind,
            points,
        },
        Err(e) => return fail::<()>(format, Envelope::failure(&e)),
    };
    match service.record_violation_request(&request) {
        Ok(outcome) => {
            match format {
                OutputFormat::Json => print_json(&Envelope::ok(outcome))?,
                OutputFormat::Text => println!(
                    "Recorded {} ({}) for student {}: credibility {} risk {}",
                    outcome.kind,
                    outcome.kind.penalty(),
                    outcome.student_id,
                    outcome.credibility,
                    outcome.risk
                ),
            }
            Ok(true)
        }
        Err(e) => fail::<()>(format, Envelope::failure(&e)),
    }
}

fn cmd_dashboard(service: &ExamService, format: OutputFormat) -> Result<()> {
    let d = service.dashboard();
    match format {
        OutputFormat::Json => print_json(&Envelope::ok(d))?,
        OutputFormat::Text => {
            println!("Students:    {}", d.total_students);
            println!("  low:       {}", d.low_risk);
            println!("  medium:    {}", d.medium_risk);
            println!("  high:      {}", d.high_risk);
            println!("Halls:       {}", d.total_halls);
        }
    }
    Ok(())
}

fn cmd_generate(service: &ExamService, format: OutputFormat) -> Result<()> {
    let envelope = Envelope::arrangement(service.generate());
    if !envelope.success {
        fail(format, envelope)?;
        return Ok(());
    }
    match format {
        OutputFormat::Json => print_json(&envelope)?,
        OutputFormat::Text => {
            if let Some(ArrangementPayload { arrangement }) = &envelope.payload {
                print!(
                    "{}",
                    render_arrangement(arrangement, &service.hall_models(), &service.students())
                );
            }
            for w in &envelope.warnings {
                println!("warning: {}", w);
            }
        }
    }
    Ok(())
}

/// Draw each used hall as a grid of roll numbers, followed by the summary.
fn render_arrangement(
    arrangement: &ArrangementResult,
    halls: &[HallModel],
    students: &[StudentView],
) -> String {
    let label = |id: StudentId| {
        students
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.roll_no.clone())
            .unwrap_or_else(|| id.to_string())
    };
    let width = students
        .iter()
        .map(|s| s.roll_no.len())
        .max()
        .unwrap_or(1)
        .max(1);

    let mut out = String::new();
    for hall in halls {
        if arrangement.entries_for_hall(hall.id()).next().is_none() {
            continue;
        }
        out.push_str(&format!(
            "Hall {}: {} ({}x{})\n",
            hall.id(),
            hall.name(),
            hall.rows(),
            hall.cols()
        ));
        for row in arrangement.hall_grid(hall) {
            let cells: Vec<String> = row
                .into_iter()
                .map(|seat| match seat {
                    Some(id) => format!("{:<width$}", label(id)),
                    None => format!("{:<width$}", "."),
                })
                .collect();
            out.push_str("  ");
            out.push_str(cells.join(" ").trim_end());
            out.push('\n');
        }
        out.push('\n');
    }

    let s = arrangement.summary();
    out.push_str(&format!(
        "Placed {} students in {} hall(s); same-subject adjacencies: {}, high-risk adjacencies: {}\n",
        s.students_placed, s.halls_used, s.same_subject_adjacencies, s.high_risk_adjacencies
    ));
    out
}
