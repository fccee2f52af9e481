use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use orbit_lib::checkins::CheckInDraft;
use orbit_lib::commands;
use orbit_lib::config::{self, OrbitConfig};
use orbit_lib::focus::FocusSessionDraft;
use orbit_lib::learn::{self, QuizScore};
use orbit_lib::progression::milestones::milestone_by_id;
use orbit_lib::rescue::{suggestion_for_need, QUICK_ACTIONS};

#[derive(Parser)]
#[command(name = "orbit")]
#[command(about = "Track streaks, focus growth and milestones")]
#[command(version)]
struct Cli {
    /// Path to orbit.toml (defaults to the app data directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory for stored records (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show streak, orbs, level and progress
    Status,
    /// Mark today as a completed day
    Complete,
    /// Record a relapse and reset the streak
    Relapse,
    /// Log a daily check-in
    Checkin {
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        mood: u8,
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
        urge: u8,
        #[arg(long = "trigger")]
        triggers: Vec<String>,
        #[arg(long = "win")]
        wins: Vec<String>,
        #[arg(long)]
        relapse: bool,
        #[arg(long)]
        note: Option<String>,
    },
    /// Record an urge resisted with the rescue flow
    Rescue {
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
        urge: u8,
        #[arg(long = "trigger")]
        triggers: Vec<String>,
        /// Underlying need (rest, connection, achievement, comfort, relief)
        #[arg(long)]
        need: Option<String>,
    },
    /// Record a focus session
    Focus {
        /// Planned session length in minutes
        #[arg(long)]
        preset: u32,
        /// Minutes actually focused
        #[arg(long)]
        elapsed: u32,
        #[arg(long = "distraction")]
        distractions: Vec<String>,
        #[arg(long, default_value_t = 0)]
        pull: u8,
        /// Checklist actions taken before starting
        #[arg(long, default_value_t = 0)]
        actions: u32,
    },
    /// Complete a lesson, or list lessons when no id is given
    Lesson {
        id: Option<String>,
        /// Quiz result as correct/total, e.g. 1/1
        #[arg(long)]
        score: Option<String>,
        #[arg(long)]
        response: Option<String>,
    },
    /// Show the seed garden and today's reflection
    Garden,
    /// Delete all stored progress
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

fn parse_score(raw: &str) -> Result<QuizScore> {
    let (correct, total) = raw
        .split_once('/')
        .with_context(|| format!("score must look like 1/1, got '{}'", raw))?;
    Ok(QuizScore {
        correct: correct.trim().parse().context("invalid correct count")?,
        total: total.trim().parse().context("invalid total count")?,
    })
}

fn load_config(cli: &Cli) -> Result<OrbitConfig> {
    let mut config = match &cli.config {
        Some(path) => config::load_config_from(path)?,
        None => config::get_config()?.clone(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if cli.verbose {
        config.log_level = "debug".to_string();
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let state = orbit_lib::init(config)?;
    let now = Local::now();

    match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => {
            let dash = commands::dashboard(&state, &now)?;
            println!("Streak:   {} day(s) (longest {})", dash.streak, dash.longest);
            println!("Orbs:     {}", dash.orbs);
            println!("Free since {}", dash.free_since.with_timezone(&Local).format("%b %e, %Y"));
            println!("Today:    {}", if dash.done_today { "done" } else { "not yet" });
            println!(
                "Level {} ({}, {:.0}% through stage, {} XP to next level)",
                dash.level,
                dash.stage,
                dash.stage_progress * 100.0,
                dash.xp_to_next_level
            );
            println!(
                "Distractions defeated: {}  Focus this week: {} min  Urges resisted: {}",
                dash.total_distractions_defeated, dash.focus_minutes_this_week, dash.urges_resisted
            );
            for id in &dash.milestones_unlocked {
                if let Some(m) = milestone_by_id(id) {
                    println!("  * {}", m.title);
                }
            }
            if let Some(next) = dash.next_lesson {
                println!("Next lesson: {}", next);
            }
        }
        Commands::Complete => {
            let outcome = commands::mark_complete(&state, &now)?;
            if outcome.counted {
                println!("Day complete. Streak {} / orbs {}", outcome.streak.current, outcome.streak.orbs);
            } else {
                println!("Already completed today. Streak {}", outcome.streak.current);
            }
        }
        Commands::Relapse => {
            let streak = commands::relapse_reset(&state, &now)?;
            println!("Streak reset. Orbs {}. Tomorrow is a new start.", streak.orbs);
        }
        Commands::Checkin { mood, urge, triggers, wins, relapse, note } => {
            let draft = CheckInDraft { mood, urge, triggers, wins, relapse, note };
            let outcome = commands::submit_checkin(&state, draft, &now)?;
            println!("Check-in {} saved. Streak {}", outcome.checkin.id, outcome.streak.current);
        }
        Commands::Rescue { urge, triggers, need } => {
            let outcome = commands::complete_rescue(&state, urge, triggers, &now)?;
            println!("Urge resisted. Orbs {}", outcome.streak.orbs);
            if let Some(need) = need {
                println!("{}", suggestion_for_need(&need));
            }
            println!("Quick actions:");
            for action in QUICK_ACTIONS.iter() {
                println!("  - {}", action);
            }
        }
        Commands::Focus { preset, elapsed, distractions, pull, actions } => {
            let draft = FocusSessionDraft {
                preset_min: preset,
                elapsed_seconds: u64::from(elapsed) * 60,
                distraction_types: distractions,
                pull_level: pull,
                actions_taken: actions,
            };
            let outcome = commands::complete_focus_session(&state, draft, &now)?;
            if !outcome.event.completed {
                println!("Session logged ({} min), not completed.", outcome.event.duration_min);
            } else {
                println!(
                    "Session complete: {} min, +{} orbs, level {}",
                    outcome.event.duration_min,
                    outcome.orbs_awarded,
                    outcome.growth.level()
                );
                if outcome.leveled_up {
                    println!("Level up! Stage: {}", outcome.growth.stage());
                }
                for id in &outcome.newly_unlocked {
                    if let Some(m) = milestone_by_id(id) {
                        println!("Milestone unlocked: {} ({})", m.title, m.description);
                    }
                }
            }
        }
        Commands::Lesson { id: None, .. } => {
            let progress = learn::load(state.store())?;
            for lesson in learn::LESSONS.iter() {
                let mark = if progress.is_completed(lesson.id) { "x" } else { " " };
                println!("[{}] {:<14} {} ({} min)", mark, lesson.id, lesson.title, lesson.minutes);
            }
        }
        Commands::Lesson { id: Some(id), score, response } => {
            let quiz = score.as_deref().map(parse_score).transpose()?;
            let outcome = commands::complete_lesson(&state, &id, response, quiz, &now)?;
            if outcome.first_time {
                println!("Lesson complete, +{} orbs", outcome.orbs_awarded);
            } else {
                println!("Lesson already completed; progress updated");
            }
        }
        Commands::Garden => {
            let view = commands::garden(&state, &now)?;
            let reflection = commands::daily_reflection(&state, &now)?;
            println!(
                "{} - day {} ({:.0}% of stage, {} day(s) to next)",
                view.stage.name, view.streak, view.progress_percent, view.days_to_next
            );
            if let Some(m) = view.milestone_today {
                println!("Milestone today: {} ({})", m.title, m.description);
            }
            println!("\"{}\"", reflection.text);
        }
        Commands::Reset { yes } => {
            if !yes {
                bail!("refusing to reset without --yes");
            }
            commands::reset_all_progress(&state)?;
            println!("All progress removed.");
        }
    }

    Ok(())
}
