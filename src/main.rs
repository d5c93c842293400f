mod assistant;
mod config;
mod dashboard;
mod error;
mod form;
mod models;
mod storage;
mod store;
mod tui;

use anyhow::{anyhow, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use config::Config;
use dashboard::DashboardSummary;
use models::{Candidate, CandidateFields, CandidatePatch, Status, parse_skills};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use storage::SqliteStorage;
use store::{CandidateStore, SystemClock};

#[derive(Parser)]
#[command(name = "vertexhire")]
#[command(about = "Recruitment tracking - candidates, pipeline stats and a scripted assistant")]
struct Cli {
    /// Path to the database file
    #[arg(long, global = true, env = "VERTEXHIRE_DB")]
    db: Option<PathBuf>,

    /// Delay before the assistant reply appears in the UI, in milliseconds
    #[arg(long, global = true, env = "VERTEXHIRE_REPLY_DELAY_MS", default_value_t = config::DEFAULT_REPLY_DELAY_MS)]
    reply_delay_ms: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the full-screen interface (default)
    Tui,

    /// List candidates
    List,

    /// Show candidate details
    Show {
        /// Candidate ID
        id: String,
    },

    /// Add a candidate
    Add {
        #[command(flatten)]
        fields: CandidateArgs,
    },

    /// Edit a candidate; only the given fields change
    Edit {
        /// Candidate ID
        id: String,

        #[command(flatten)]
        fields: CandidateArgs,
    },

    /// Change a candidate's pipeline status
    Status {
        /// Candidate ID
        id: String,

        /// New status (new, screening, interview, offer, hired, rejected)
        status: Status,
    },

    /// Delete a candidate
    Delete {
        /// Candidate ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show pipeline statistics
    Dashboard,

    /// Ask the assistant a question
    Ask {
        /// Question text
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Print the database location
    Path,
}

#[derive(Args, Debug, Default)]
struct CandidateArgs {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    position: Option<String>,

    /// Pipeline status (default: new)
    #[arg(long)]
    status: Option<Status>,

    #[arg(long)]
    experience: Option<String>,

    /// Comma-separated skills
    #[arg(long)]
    skills: Option<String>,

    #[arg(long)]
    notes: Option<String>,

    #[arg(long)]
    resume_url: Option<String>,
}

impl CandidateArgs {
    fn into_fields(self) -> CandidateFields {
        CandidateFields {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            position: self.position.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            experience: self.experience.unwrap_or_default(),
            skills: self.skills.as_deref().map(parse_skills).unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
            resume_url: self.resume_url.filter(|u| !u.trim().is_empty()),
        }
    }

    fn into_patch(self) -> CandidatePatch {
        CandidatePatch {
            name: self.name,
            email: self.email,
            phone: self.phone,
            position: self.position,
            status: self.status,
            experience: self.experience,
            skills: self.skills.as_deref().map(parse_skills),
            notes: self.notes,
            resume_url: self.resume_url.map(|u| Some(u).filter(|u| !u.trim().is_empty())),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.db, cli.reply_delay_ms);
    let command = cli.command.unwrap_or(Commands::Tui);

    if matches!(command, Commands::Tui) {
        config::init_file_logging(&config.log_path())?;
    } else {
        config::init_stderr_logging();
    }

    if let Commands::Path = command {
        println!("{}", config.db_path.display());
        return Ok(());
    }

    let storage = SqliteStorage::open(&config.db_path)?;
    let mut store = CandidateStore::load(storage, Box::new(SystemClock))?;

    match command {
        Commands::Tui => {
            tui::run(store, config.reply_delay)?;
        }

        Commands::List => {
            let candidates = store.candidates();
            if candidates.is_empty() {
                println!("No candidates yet. Add one with 'vertexhire add'.");
            } else {
                println!(
                    "{:<15} {:<4} {:<22} {:<24} {:<10} {:<30} {:>12}",
                    "ID", "", "NAME", "POSITION", "STATUS", "SKILLS", "APPLIED"
                );
                println!("{}", "-".repeat(123));
                for c in candidates {
                    println!(
                        "{:<15} {:<4} {:<22} {:<24} {:<10} {:<30} {:>12}",
                        truncate(&c.id, 15),
                        c.initials(),
                        truncate(&c.name, 22),
                        truncate(&c.position, 24),
                        c.status.label(),
                        truncate(&c.skills_summary().join(", "), 30),
                        c.applied_local().format("%b %-d, %Y")
                    );
                }
            }
        }

        Commands::Show { id } => match store.get(&id) {
            Some(c) => print_candidate(c),
            None => println!("Candidate {} not found.", id),
        },

        Commands::Add { fields } => {
            let fields = fields.into_fields();
            form::validate(&fields)?;
            let created = store.create(fields)?;
            println!("Added candidate {} ({})", created.name, created.id);
        }

        Commands::Edit { id, fields } => {
            let Some(existing) = store.get(&id) else {
                println!("Candidate {} not found.", id);
                return Ok(());
            };
            let patch = fields.into_patch();
            let mut merged = existing.clone();
            patch.clone().apply_to(&mut merged);
            form::validate(&fields_of(&merged))?;

            store.update(&id, patch)?;
            println!("Updated candidate {}", id);
        }

        Commands::Status { id, status } => {
            if store.set_status(&id, status)? {
                println!("Moved candidate {} to {}.", id, status.label());
            } else {
                println!("Candidate {} not found.", id);
            }
        }

        Commands::Delete { id, yes } => {
            let Some(c) = store.get(&id) else {
                println!("Candidate {} not found.", id);
                return Ok(());
            };
            let prompt = format!("Are you sure you want to delete {}?", c.name);
            if !yes && !confirm(&prompt)? {
                println!("Cancelled.");
                return Ok(());
            }
            store.remove(&id)?;
            println!("Deleted candidate {}.", id);
        }

        Commands::Dashboard => print_dashboard(&store),

        Commands::Ask { query } => {
            let query = query.join(" ");
            println!("{}", assistant::respond(&query, store.candidates()));
        }

        Commands::Path => unreachable!("handled before the store is opened"),
    }

    Ok(())
}

fn fields_of(c: &Candidate) -> CandidateFields {
    CandidateFields {
        name: c.name.clone(),
        email: c.email.clone(),
        phone: c.phone.clone(),
        position: c.position.clone(),
        status: c.status,
        experience: c.experience.clone(),
        skills: c.skills.clone(),
        notes: c.notes.clone(),
        resume_url: c.resume_url.clone(),
    }
}

fn print_candidate(c: &Candidate) {
    println!("{} [{}]", c.name, c.initials());
    println!("ID: {}", c.id);
    println!("Position: {}", c.position);
    println!("Status: {}", c.status.label());
    println!("Experience: {}", c.experience);
    println!("Email: {}", c.email);
    println!("Phone: {}", c.phone);
    if !c.skills.is_empty() {
        println!("Skills: {}", c.skills.join(", "));
    }
    if let Some(url) = &c.resume_url {
        println!("Resume: {}", url);
    }
    println!("Applied: {}", c.applied_local().format("%b %-d, %Y"));
    match c.last_contact {
        Some(last) => println!(
            "Last contact: {}",
            last.with_timezone(&Local).format("%b %-d, %Y %H:%M")
        ),
        None => println!("Last contact: never"),
    }
    if !c.notes.is_empty() {
        println!("\n--- Notes ---\n{}", c.notes);
    }
}

fn print_dashboard(store: &CandidateStore<SqliteStorage>) {
    let summary = DashboardSummary::build(store.candidates(), store.now());
    let counts = &summary.counts;

    println!(
        "Total Candidates: {}   New Applications: {}   In Interview: {}   Hired: {}",
        counts.total, counts.new, counts.interview, counts.hired
    );

    println!("\nPipeline Overview");
    for share in &summary.pipeline {
        let filled = (share.percentage / 5.0).round() as usize;
        println!(
            "  {:<10} [{:<20}] {:>3}  ({:.0}%)",
            share.status.label(),
            "#".repeat(filled),
            share.count,
            share.percentage
        );
    }

    println!("\nRecent Applications");
    if summary.recent.is_empty() {
        println!("  No recent candidates");
    }
    for c in &summary.recent {
        println!(
            "  {:<22} {:<24} {:<10} {}",
            truncate(&c.name, 22),
            truncate(&c.position, 24),
            c.status,
            c.applied_local().format("%b %-d")
        );
    }

    println!("\nNeeds Attention");
    if summary.attention.is_empty() {
        println!("  All caught up! No candidates need attention.");
    }
    for item in &summary.attention {
        println!(
            "  {:<22} {:<24} {}d ago",
            truncate(&item.candidate.name, 22),
            truncate(&item.candidate.position, 24),
            item.days_since_contact
        );
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| anyhow!("Failed to read confirmation: {}", e))?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
