//! # Prereg CLI
//!
//! Entry point for the student pre-registration command line.

use clap::{Parser, Subcommand, ValueEnum};
use prereg::cli::{
    CliError, cmd_available, cmd_export, cmd_grade, cmd_import, cmd_init, cmd_login, cmd_profile,
    cmd_register, cmd_registered, cmd_roster, cmd_schools, cmd_stats, cmd_students, cmd_subjects,
    cmd_transcript,
};
use prereg::config::{AppConfig, DB_PATH_ENV, DEFAULT_DB_PATH, init_logging};
use prereg_core::SortKey;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "prereg", version, about = "Student pre-registration records and rules")]
struct Cli {
    /// Path of the registry database
    #[arg(long, global = true, env = DB_PATH_ENV, default_value = DEFAULT_DB_PATH)]
    db: PathBuf,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database and load the sample data
    Init {
        /// Overwrite an existing database
        #[arg(long)]
        force: bool,
        /// Skip the sample data
        #[arg(long)]
        empty: bool,
    },
    /// Load a JSON dataset into an empty database
    Import { file: PathBuf },
    /// Write the database to a JSON dataset
    Export { file: PathBuf },
    /// Check credentials
    Login { username: String, password: String },
    /// List students
    Students {
        /// Substring of first name, last name or id (case-sensitive)
        #[arg(long)]
        search: Option<String>,
        /// Substring of the school name (case-sensitive)
        #[arg(long)]
        school: Option<String>,
        #[arg(long, value_enum, default_value_t = SortArg::Name)]
        sort: SortArg,
    },
    /// List distinct schools
    Schools,
    /// List all subjects
    Subjects,
    /// Show a student's profile
    Profile { student: String },
    /// Subjects a student can still register for
    Available { student: String },
    /// Subjects a student is registered for
    Registered { student: String },
    /// Register a student for a subject
    Register { student: String, subject: String },
    /// Students registered for a subject
    Roster { subject: String },
    /// Record a grade (A, B+, B, C+, C, D+, D, F, IP)
    Grade {
        student: String,
        subject: String,
        grade: String,
    },
    /// Registered subjects with GPA and completed credits
    Transcript { student: String },
    /// Registration statistics
    Stats,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    Name,
    Age,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortKey::Name,
            SortArg::Age => SortKey::Age,
        }
    }
}

fn run(command: Command, config: &AppConfig) -> Result<(), CliError> {
    let db = config.db_path.as_path();
    let json = config.json;
    match command {
        Command::Init { force, empty } => cmd_init(db, force, empty),
        Command::Import { file } => cmd_import(db, &file),
        Command::Export { file } => cmd_export(db, &file),
        Command::Login { username, password } => cmd_login(db, json, &username, &password),
        Command::Students {
            search,
            school,
            sort,
        } => cmd_students(
            db,
            json,
            search.as_deref(),
            school.as_deref(),
            sort.into(),
        ),
        Command::Schools => cmd_schools(db, json),
        Command::Subjects => cmd_subjects(db, json),
        Command::Profile { student } => cmd_profile(db, json, &student),
        Command::Available { student } => cmd_available(db, json, &student),
        Command::Registered { student } => cmd_registered(db, json, &student),
        Command::Register { student, subject } => cmd_register(db, json, &student, &subject),
        Command::Roster { subject } => cmd_roster(db, json, &subject),
        Command::Grade {
            student,
            subject,
            grade,
        } => cmd_grade(db, json, &student, &subject, &grade),
        Command::Transcript { student } => cmd_transcript(db, json, &student),
        Command::Stats => cmd_stats(db, json),
    }
}

fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();
    let config = AppConfig::new(cli.db, cli.json);

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
