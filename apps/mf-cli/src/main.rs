use clap::{Parser, Subcommand};
use mf_project::{OwnershipDef, Project, ProjectError};
use mf_solver::{Problem, SolveOutcome, SolveProgressEvent};
use mf_system::{SystemError, VarVector};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mf-cli")]
#[command(about = "mdflow CLI - run hierarchical models once through", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project file (.yaml, .yml or .json)
        project_path: PathBuf,
    },
    /// List model inputs and outputs with their initial values
    Vars {
        /// Path to the project file (.yaml, .yml or .json)
        project_path: PathBuf,
    },
    /// Run the model once
    Run {
        /// Path to the project file (.yaml, .yml or .json)
        project_path: PathBuf,
        /// Override a value before running, e.g. --set source.u=2.5
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,
        /// Rank of this execution context (round-robin over root subsystems)
        #[arg(long, requires = "size")]
        rank: Option<usize>,
        /// Number of execution contexts
        #[arg(long, requires = "rank")]
        size: Option<usize>,
        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },
}

type CliResult<T> = Result<T, CliError>;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("Invalid --set '{arg}': expected NAME=VALUE with a numeric value")]
    BadAssignment { arg: String },

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    System(#[from] SystemError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct RunReport<'a> {
    project: &'a str,
    failed: bool,
    abs_error: f64,
    rel_error: f64,
    outputs: BTreeMap<&'a str, f64>,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Vars { project_path } => cmd_vars(&project_path),
        Commands::Run {
            project_path,
            set,
            rank,
            size,
            json,
        } => {
            let ownership = rank
                .zip(size)
                .map(|(rank, size)| OwnershipDef::RoundRobin { rank, size });
            cmd_run(&project_path, &set, ownership, json)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_project(path: &Path) -> CliResult<Project> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let project = if is_json {
        mf_project::load_json(path)?
    } else {
        mf_project::load_yaml(path)?
    };
    Ok(project)
}

fn cmd_validate(project_path: &Path) -> CliResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = load_project(project_path)?;
    mf_project::compile_project(&project)?;
    println!("✓ Project is valid");
    Ok(())
}

fn cmd_vars(project_path: &Path) -> CliResult<()> {
    let project = load_project(project_path)?;
    let problem = mf_project::compile_project(&project)?;

    print_vars("Inputs", problem.inputs());
    print_vars("Outputs", problem.outputs());
    Ok(())
}

fn print_vars(title: &str, vars: &VarVector) {
    if vars.is_empty() {
        println!("No {} in model", title.to_lowercase());
        return;
    }
    println!("{}:", title);
    let width = vars.names().iter().map(String::len).max().unwrap_or(0);
    for (name, value) in vars.iter() {
        println!("  {:<width$}  {}", name, value, width = width);
    }
}

fn parse_assignment(arg: &str) -> CliResult<(&str, f64)> {
    let bad = || CliError::BadAssignment {
        arg: arg.to_string(),
    };
    let (name, value) = arg.split_once('=').ok_or_else(bad)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(bad());
    }
    let value: f64 = value.trim().parse().map_err(|_| bad())?;
    if !value.is_finite() {
        return Err(bad());
    }
    Ok((name, value))
}

fn cmd_run(
    project_path: &Path,
    assignments: &[String],
    ownership: Option<OwnershipDef>,
    json: bool,
) -> CliResult<()> {
    let mut project = load_project(project_path)?;
    if let Some(ownership) = ownership {
        project.model.ownership = ownership;
        mf_project::validate_project(&project).map_err(ProjectError::from)?;
    }

    let mut problem = mf_project::compile_project(&project)?;
    for arg in assignments {
        let (name, value) = parse_assignment(arg)?;
        problem.set_val(name, value)?;
    }

    let mut visited = 0usize;
    let mut evaluated = 0usize;
    let outcome = problem.run_model_with_progress(Some(&mut |event: SolveProgressEvent| {
        visited += 1;
        if event.local {
            evaluated += 1;
        }
    }))?;
    info!(visited, evaluated, "run complete");

    if json {
        print_json(&project, &problem, &outcome)?;
    } else {
        println!(
            "✓ Ran {} subsystems ({} evaluated locally)",
            visited, evaluated
        );
        print_vars("Outputs", problem.outputs());
    }
    Ok(())
}

fn print_json(project: &Project, problem: &Problem, outcome: &SolveOutcome) -> CliResult<()> {
    let report = RunReport {
        project: &project.name,
        failed: outcome.failed,
        abs_error: outcome.abs_error,
        rel_error: outcome.rel_error,
        outputs: problem.outputs().iter().collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_parses_name_and_value() {
        assert_eq!(parse_assignment("a.x=2.5").unwrap(), ("a.x", 2.5));
        assert_eq!(parse_assignment(" a.x = -1 ").unwrap(), ("a.x", -1.0));
    }

    #[test]
    fn malformed_assignment_rejected() {
        for arg in ["a.x", "=1", "a.x=abc", "a.x=inf"] {
            assert!(matches!(
                parse_assignment(arg),
                Err(CliError::BadAssignment { .. })
            ));
        }
    }

    #[test]
    fn cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "mf-cli", "-vv", "run", "p.yaml", "--set", "a.x=1", "--rank", "0", "--size", "2",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run {
                set,
                rank,
                size,
                json,
                ..
            } => {
                assert_eq!(set, vec!["a.x=1".to_string()]);
                assert_eq!((rank, size), (Some(0), Some(2)));
                assert!(json);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn rank_requires_size() {
        assert!(Cli::try_parse_from(["mf-cli", "run", "p.yaml", "--rank", "1"]).is_err());
    }
}
