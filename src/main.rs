use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use review_engine::database::db;
use review_engine::export::json::{export_topic_from_db, import_json_into};
use review_engine::{
    Clock, Concept, EngineConfig, RecordUpdateResult, ReviewEngine, ReviewError, SimulatedClock,
    SystemClock,
};
use rusqlite::Connection;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "quizme-review",
    about = "Spaced repetition reviews for QuizMe concepts",
    version
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = "quizme.toml")]
    config: PathBuf,

    /// Override the database path from the config
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Learner whose records are used
    #[arg(long, global = true, default_value = "local")]
    learner: String,

    /// Which clock decides what is due
    #[arg(long, global = true, value_enum, default_value = "simulated")]
    clock: ClockKind,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ClockKind {
    /// Wall-clock time
    System,
    /// Date stored in the database, moved with `advance-day`
    Simulated,
}

#[derive(Subcommand)]
enum Command {
    /// Add a concept to the catalogue
    Add {
        #[arg(long)]
        topic: String,
        #[arg(long)]
        prompt: String,
        #[arg(long)]
        answer: String,
        #[arg(long)]
        example: Option<String>,
    },

    /// Import a topic JSON file into the catalogue
    Import {
        path: PathBuf,
        /// Also introduce every imported concept to the learner
        #[arg(long)]
        introduce: bool,
    },

    /// Export a topic from the catalogue to a JSON file
    Export { topic: String, path: PathBuf },

    /// List topics in the catalogue
    Topics,

    /// Start tracking concepts for the learner
    Introduce {
        /// Concept ids
        ids: Vec<i64>,
        /// Introduce every concept of a topic
        #[arg(long)]
        topic: Option<String>,
    },

    /// List concepts due for review
    Due {
        #[arg(long)]
        limit: Option<usize>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run an interactive review session over the due concepts
    Review {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Move the simulated date forward by one day
    AdvanceDay,

    /// Show the learner's total XP
    Xp,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = EngineConfig::load(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    let db_path = cli
        .database
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.database));
    let conn = db::init_database(&db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;

    let simulated = SimulatedClock::new(&conn);
    let clock: &dyn Clock = match cli.clock {
        ClockKind::System => &SystemClock,
        ClockKind::Simulated => &simulated,
    };
    let engine = ReviewEngine::new(&conn, &conn, clock, &config)?;

    match cli.command {
        Command::Add {
            topic,
            prompt,
            answer,
            example,
        } => {
            let mut concept = Concept::new(&topic, &prompt, &answer);
            concept.example = example;
            let id = db::add_concept(&concept, &conn)?;
            println!("Concept {} saved in '{}'", id, topic);
        }
        Command::Import { path, introduce } => {
            let (topic, ids) = import_json_into(&path, &conn)?;
            println!("Imported {} concepts into '{}'", ids.len(), topic.name);
            if introduce {
                for id in &ids {
                    engine.introduce_concept(&cli.learner, *id)?;
                }
                println!("Introduced them to {}", cli.learner);
            }
        }
        Command::Export { topic, path } => {
            let exported = export_topic_from_db(&topic, &path, &conn)?;
            println!(
                "Exported {} concepts to {}",
                exported.concepts.len(),
                path.display()
            );
        }
        Command::Topics => {
            for topic in db::get_all_topics(&conn)? {
                let count = db::get_concepts_for_topic(&topic, &conn)?.len();
                println!("{} ({} concepts)", topic, count);
            }
        }
        Command::Introduce { mut ids, topic } => {
            if let Some(topic) = topic {
                ids.extend(
                    db::get_concepts_for_topic(&topic, &conn)?
                        .into_iter()
                        .map(|c| c.id),
                );
            }
            for id in ids {
                let record = engine.introduce_concept(&cli.learner, id)?;
                println!("Concept {} due {}", id, record.next_review_at.format("%Y-%m-%d"));
            }
        }
        Command::Due { limit, json } => {
            let due = engine.get_due_concepts(&cli.learner, clock.now()?, limit)?;
            if json {
                let rows: Vec<_> = due
                    .iter()
                    .map(|item| {
                        serde_json::json!({
                            "concept": item.concept,
                            "record": item.record,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if due.is_empty() {
                println!("Nothing due. Come back later.");
            } else {
                for item in &due {
                    println!(
                        "[{}] {} (due {}, lapses {})",
                        item.concept.id,
                        item.concept.prompt,
                        item.record.next_review_at.format("%Y-%m-%d"),
                        item.record.lapse_count
                    );
                }
            }
        }
        Command::Review { limit } => run_review(&engine, &cli.learner, clock, limit)?,
        Command::AdvanceDay => {
            let date = simulated.advance_day()?;
            println!("Simulated date is now {}", date.format("%Y-%m-%d"));
        }
        Command::Xp => {
            println!("{} has {} XP", cli.learner, db::total_xp(&cli.learner, &conn)?);
        }
    }

    Ok(())
}

fn prompt_line(input: &mut impl BufRead, message: &str) -> anyhow::Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn run_review<C: Clock + ?Sized>(
    engine: &ReviewEngine<'_, Connection, Connection, C>,
    learner: &str,
    clock: &C,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let due = engine.get_due_concepts(learner, clock.now()?, limit)?;
    if due.is_empty() {
        println!("Nothing due. Come back later.");
        return Ok(());
    }

    let mut session = engine.start_session(learner, &due.concept_ids())?;
    let stdin = io::stdin();
    let mut input = stdin.lock();

    for item in &due {
        println!("\n{}", session.progress_message());
        println!("Q: {}", item.concept.prompt);
        if prompt_line(&mut input, "(press Enter to reveal) ")?.is_none() {
            println!("\nSession abandoned.");
            return Ok(());
        }
        println!("A: {}", item.concept.answer);
        if let Some(example) = &item.concept.example {
            println!("   e.g. {}", example);
        }

        loop {
            let answer = prompt_line(
                &mut input,
                "How well did you recall it? [forgot/vague/clear] ",
            )?;
            let Some(raw) = answer else {
                println!("\nSession abandoned.");
                return Ok(());
            };
            match engine.submit_rating(&mut session, item.concept.id, &raw) {
                Ok(RecordUpdateResult::Updated { record, .. }) => {
                    println!("Next review in {} day(s)", record.interval_days);
                    break;
                }
                Ok(RecordUpdateResult::NotUpdated { error, .. }) => {
                    println!("Not updated: {}", error);
                    break;
                }
                Err(ReviewError::InvalidRating(raw)) => {
                    println!("'{}' is not a rating, try again", raw);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    let summary = engine.complete_session(&mut session)?;
    println!(
        "\nReviewed {} concepts, recalled {} ({:.0}%). +{} XP",
        summary.reviewed_count,
        summary.correct_like_count,
        summary.accuracy * 100.0,
        summary.xp_earned
    );
    Ok(())
}
