mod interactive;

use clap::{Parser, Subcommand};
use setlog_core::csv_export::export_workouts;
use setlog_core::*;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "setlog")]
#[command(about = "Workout set logger with rest timer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List available workout templates
    Templates,

    /// Browse the exercise library
    Exercises {
        /// Only exercises whose name contains this text
        query: Option<String>,

        /// Filter by body part (arms, back, core, legs, shoulders, chest)
        #[arg(long)]
        body_part: Option<String>,

        /// Filter by category (barbell, dumbbell, bodyweight, machine, cable, duration, weighted-bodyweight)
        #[arg(long)]
        category: Option<String>,
    },

    /// Start a workout from a template
    Start {
        /// Template id or name (a name prefix is enough)
        template: String,
    },

    /// Continue the workout in progress
    Resume,

    /// Discard the workout in progress
    Abandon,

    /// Show finished workouts, newest first
    History {
        /// Only show the most recent N workouts
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Delete a finished workout
    Delete {
        /// Workout id as shown by `history`
        id: String,
    },

    /// Export finished workouts to CSV
    Export {
        /// Destination CSV file
        path: PathBuf,
    },

    /// Plates to load per side for a total weight
    Plates {
        /// Total weight including the bar
        weight: f64,
    },
}

/// Where everything lives under the data directory
struct Paths {
    workouts: PathBuf,
    live: PathBuf,
}

impl Paths {
    fn new(data_dir: &std::path::Path) -> Self {
        Self {
            workouts: data_dir.join("workouts.jsonl"),
            live: data_dir.join("session").join("active.json"),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Interactive output goes to stdout; keep logs quiet unless asked
    setlog_core::logging::init_with_level(if cli.verbose { "debug" } else { "warn" });

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    let paths = Paths::new(&data_dir);

    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Other("Invalid catalog".into()));
    }

    match cli.command {
        Commands::Templates => cmd_templates(&config),
        Commands::Exercises {
            query,
            body_part,
            category,
        } => cmd_exercises(query, body_part.as_deref(), category.as_deref()),
        Commands::Start { template } => cmd_start(&paths, &config, &template),
        Commands::Resume => cmd_resume(&paths, &config),
        Commands::Abandon => cmd_abandon(&paths),
        Commands::History { limit } => cmd_history(&paths, limit),
        Commands::Delete { id } => cmd_delete(&paths, &id),
        Commands::Export { path } => cmd_export(&paths, &path),
        Commands::Plates { weight } => cmd_plates(&config, weight),
    }
}

fn cmd_templates(config: &Config) -> Result<()> {
    let catalog = get_default_catalog();
    for template in config.all_templates() {
        println!("[{}] {}", template.id, template.name);
        for planned in &template.exercises {
            let name = catalog
                .find(&planned.exercise_id)
                .map(|d| d.name.as_str())
                .unwrap_or("(unknown exercise)");
            let target = match (&planned.duration, planned.reps, planned.weight) {
                (Some(duration), _, _) => format!("{} × {}", planned.sets, duration),
                (None, Some(reps), Some(weight)) => {
                    format!("{} × {} @ {}", planned.sets, reps, weight)
                }
                (None, Some(reps), None) => format!("{} × {}", planned.sets, reps),
                (None, None, _) => format!("{} sets", planned.sets),
            };
            println!("    {:<28} {}", name, target);
        }
        let unknown = template.unknown_exercises(catalog);
        if !unknown.is_empty() {
            println!("    ! unknown exercise ids: {}", unknown.join(", "));
        }
    }
    Ok(())
}

fn cmd_exercises(
    query: Option<String>,
    body_part: Option<&str>,
    category: Option<&str>,
) -> Result<()> {
    let filter = ExerciseFilter {
        query,
        body_part: body_part.map(str::parse).transpose()?,
        category: category.map(str::parse).transpose()?,
    };

    let matches = get_default_catalog().search(&filter);
    if matches.is_empty() {
        println!("No exercises match.");
        return Ok(());
    }
    for def in matches {
        let default = match (&def.default_duration, def.default_reps, def.default_weight) {
            (Some(duration), _, _) => duration.clone(),
            (None, Some(reps), Some(weight)) => format!("{} × {}", weight, reps),
            (None, Some(reps), None) => format!("× {}", reps),
            (None, None, _) => String::new(),
        };
        println!(
            "[{:>2}] {:<24} {:<10} {:<20} {}",
            def.id,
            def.name,
            def.body_part.to_string(),
            def.category.to_string(),
            default
        );
    }
    Ok(())
}

fn cmd_start(paths: &Paths, config: &Config, query: &str) -> Result<()> {
    let mut live = ActiveSessionFile::new(&paths.live);
    if live.exists() {
        return Err(Error::Other(
            "A workout is already in progress. Run `setlog resume` to continue it or `setlog abandon` to discard it."
                .into(),
        ));
    }

    let templates = config.all_templates();
    let template = find_template(&templates, query)
        .ok_or_else(|| Error::Other(format!("No template matches '{}'", query)))?;

    live.stage(template)?;
    let session = WorkoutSession::start(&live, get_default_catalog(), config.timer.rest_seconds)?;
    live.checkpoint(&session.checkpoint())?;

    println!("Started {}", session.name());
    interactive::run(session, live, JsonlWorkoutStore::new(&paths.workouts))
}

fn cmd_resume(paths: &Paths, config: &Config) -> Result<()> {
    let live = ActiveSessionFile::new(&paths.live);
    let checkpoint = live.load().ok_or(Error::MissingSession)?;
    let session =
        WorkoutSession::resume(checkpoint, get_default_catalog(), config.timer.rest_seconds);

    println!("Resumed {}", session.name());
    interactive::run(session, live, JsonlWorkoutStore::new(&paths.workouts))
}

fn cmd_abandon(paths: &Paths) -> Result<()> {
    let mut live = ActiveSessionFile::new(&paths.live);
    if !live.exists() {
        println!("No workout in progress.");
        return Ok(());
    }
    live.clear()?;
    println!("✓ Workout abandoned");
    Ok(())
}

fn cmd_history(paths: &Paths, limit: Option<usize>) -> Result<()> {
    let store = JsonlWorkoutStore::new(&paths.workouts);
    let workouts = store.list()?;
    if workouts.is_empty() {
        println!("No workouts yet.");
        return Ok(());
    }

    let catalog = get_default_catalog();
    for workout in workouts.iter().take(limit.unwrap_or(usize::MAX)) {
        let summary = summarize(workout, catalog);
        println!("{}  {}", summary.name, summary.completed_at.format("%a, %b %-d %Y"));
        println!("  id: {}", summary.id);
        println!(
            "  volume {} lb · {} reps · max {} lb",
            summary.total_volume, summary.total_reps, summary.max_weight
        );
        for exercise in &summary.exercises {
            let best = exercise
                .best
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".into());
            println!(
                "    {}× {:<28} {}",
                exercise.completed_sets, exercise.name, best
            );
        }
        println!();
    }
    Ok(())
}

fn cmd_delete(paths: &Paths, id: &str) -> Result<()> {
    let id = uuid::Uuid::parse_str(id.trim())
        .map_err(|e| Error::Other(format!("Invalid workout id '{}': {}", id, e)))?;
    let mut store = JsonlWorkoutStore::new(&paths.workouts);
    store.delete(id)?;
    println!("✓ Deleted workout {}", id);
    Ok(())
}

fn cmd_export(paths: &Paths, path: &std::path::Path) -> Result<()> {
    let store = JsonlWorkoutStore::new(&paths.workouts);
    let workouts = store.list()?;
    let rows = export_workouts(&workouts, path)?;
    println!(
        "✓ Exported {} sets from {} workouts to {}",
        rows,
        workouts.len(),
        path.display()
    );
    Ok(())
}

fn cmd_plates(config: &Config, weight: f64) -> Result<()> {
    let load = plates_per_side(weight, config.plates.bar_weight, &config.plates.available)?;
    println!("Bar weight: {}lb", load.bar_weight);
    println!("Plates per side: {}", load);
    if !load.is_exact() {
        println!(
            "Closest load is {}lb ({}lb per side short)",
            load.loaded_total(),
            load.remainder
        );
    }
    Ok(())
}
