//! treino - Personal weekly workout planner and logbook

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use treino::config::{self, Config};
use treino::plan::Weekday;
use treino::tui::App;
use treino::{Planner, web};

#[derive(Parser)]
#[command(name = "treino")]
#[command(author, version, about = "Personal weekly workout planner and logbook")]
struct Cli {
    #[command(flatten)]
    storage: StorageArgs,

    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct StorageArgs {
    /// Directory holding the JSON documents and uploaded videos
    #[arg(long, global = true, env = "TREINO_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    #[arg(long, global = true, default_value = config::PLAN_FILE)]
    plan_file: String,

    #[arg(long, global = true, default_value = config::LOG_FILE)]
    log_file: String,

    #[arg(long, global = true, default_value = config::VIDEOS_FILE)]
    videos_file: String,

    #[arg(long, global = true, default_value = config::VIDEO_DIR)]
    video_dir: String,
}

impl StorageArgs {
    fn config(&self) -> Config {
        Config::with_names(
            &self.data_dir,
            &self.plan_file,
            &self.log_file,
            &self.videos_file,
            &self.video_dir,
        )
    }
}

/// Web server settings, shared by `serve` and the bare invocation
#[derive(Args)]
struct ServeArgs {
    /// Address to listen on
    #[arg(short, long, global = true, env = "TREINO_BIND", default_value = DEFAULT_BIND)]
    bind: String,

    /// Largest accepted video upload, in megabytes
    #[arg(long, global = true, env = "TREINO_MAX_UPLOAD_MB", default_value = "512")]
    max_upload_mb: usize,
}

impl ServeArgs {
    fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(MB)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the planner page (default)
    Serve,

    /// Open TUI dashboard
    Tui,

    /// Add an exercise to a weekday
    Add {
        /// Weekday (e.g. "monday" or "segunda")
        day: Weekday,

        /// Exercise name
        name: String,

        /// Sets and reps (e.g. "4x12")
        sets_reps: String,

        /// Reference video link
        #[arg(short, long, default_value = "")]
        video: String,
    },

    /// Show the plan for one weekday, or the whole week
    Plan {
        day: Option<Weekday>,
    },

    /// Record a completed exercise
    Log {
        /// Weekday the exercise belongs to
        day: Weekday,

        /// Exercise name
        exercise: String,

        /// Weight used (free-form, e.g. "60kg")
        #[arg(short, long, default_value = "")]
        weight: String,

        /// Optional notes
        #[arg(short, long, default_value = "")]
        notes: String,

        /// Session date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List session history
    History {
        /// Only show the most recent records
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Upload a video file
    Upload {
        /// Video file (mp4, mov or avi)
        file: PathBuf,

        /// What the video shows
        #[arg(short, long)]
        description: String,
    },

    /// List uploaded videos, newest first
    Videos,
}

const DEFAULT_BIND: &str = "127.0.0.1:8501";
const MB: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut planner = Planner::open(cli.storage.config())?;

    match cli.command {
        Some(Commands::Serve) | None => {
            web::serve(planner, &cli.serve.bind, cli.serve.max_upload_bytes()).await?;
        }

        Some(Commands::Tui) => {
            let mut app = App::new(planner);
            app.run()?;
        }

        Some(Commands::Add { day, name, sets_reps, video }) => {
            let exercise = planner.add_exercise(day, &name, &sets_reps, &video)?;
            println!("Added: {} - {} to {}", exercise.name, exercise.sets_reps, day.label());
        }

        Some(Commands::Plan { day }) => {
            let days = match day {
                Some(day) => vec![day],
                None => Weekday::all().to_vec(),
            };
            for day in days {
                println!("{}", day.label());
                let exercises = planner.list_exercises(day);
                if exercises.is_empty() {
                    println!("  (no exercises)");
                }
                for (i, ex) in exercises.iter().enumerate() {
                    if ex.video_url.is_empty() {
                        println!("  {}. {} - {}", i + 1, ex.name, ex.sets_reps);
                    } else {
                        println!("  {}. {} - {} ({})", i + 1, ex.name, ex.sets_reps, ex.video_url);
                    }
                }
            }
        }

        Some(Commands::Log { day, exercise, weight, notes, date }) => {
            let record = planner.record_session(date, day, &exercise, &weight, &notes)?;
            println!("Logged: {} on {} ({})", record.exercise_name, record.date, record.weight_used);
        }

        Some(Commands::History { limit }) => {
            let history = planner.history();
            let skip = limit.map_or(0, |n| history.len().saturating_sub(n));
            println!("Training history:");
            println!("{:-<72}", "");
            for r in &history[skip..] {
                println!(
                    "{} | {:9} | {:20} | {:8} | {}",
                    r.date.format("%Y-%m-%d"),
                    r.day_label(),
                    r.exercise_name,
                    r.weight_used,
                    if r.notes.is_empty() { "-" } else { r.notes.as_str() }
                );
            }
        }

        Some(Commands::Upload { file, description }) => {
            let original = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .context("upload path has no file name")?;
            let handle = File::open(&file)
                .with_context(|| format!("cannot open {}", file.display()))?;
            let entry = planner.store_video(&mut BufReader::new(handle), &original, &description)?;
            println!("Uploaded: {} ({})", entry.stored_filename, entry.description);
        }

        Some(Commands::Videos) => {
            let videos = planner.list_videos();
            if videos.is_empty() {
                println!("No videos uploaded yet.");
            }
            for v in videos {
                let marker = if v.present { "" } else { " [missing]" };
                println!("{} | {} | {}{}", v.entry.date, v.entry.description, v.path.display(), marker);
            }
        }
    }

    Ok(())
}
