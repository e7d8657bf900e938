//! Binary entry point for lessonforge.
//!
//! This binary provides the CLI interface for the lessonforge enrichment
//! facade.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use lessonforge::llm::OpenAiClient;
use lessonforge::observability;
use lessonforge::services::{DEFAULT_CONTENT_TYPE, DEFAULT_DIFFICULTY};
use lessonforge::{
    CompletionProvider, ContentEnrichmentService, GateDecision, LessonforgeConfig,
};
use secrecy::ExposeSecret;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Lessonforge - AI-assisted enrichment of educational content.
#[derive(Parser)]
#[command(name = "lessonforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Fetch videos, documents and exercises for a topic.
    Enrich {
        /// Topic, e.g. "Fractions".
        topic: String,
        /// Subject, e.g. "Math".
        subject: String,
        /// Grade level.
        #[arg(short, long, default_value = "all")]
        grade_level: String,
    },

    /// Build a learning path for a topic.
    LearningPath {
        /// Topic.
        topic: String,
        /// Subject.
        subject: String,
        /// Grade level.
        #[arg(short, long, default_value = "all")]
        grade_level: String,
    },

    /// Score content quality (reads stdin if no content is given).
    Quality {
        /// Content to assess.
        content: Option<String>,
    },

    /// Moderate content (reads stdin if no content is given).
    Analyze {
        /// Content to moderate.
        content: Option<String>,
        /// Content type named in the prompt.
        #[arg(short = 't', long, default_value = DEFAULT_CONTENT_TYPE)]
        content_type: String,
        /// Ask for a structured ok/flagged verdict.
        #[arg(long)]
        structured: bool,
        /// Fail if the verdict is rejected by the moderation gate.
        #[arg(long)]
        gate: bool,
    },

    /// Review an uploaded file for security risks.
    AnalyzeFile {
        /// File to review.
        path: PathBuf,
        /// Fail if the verdict is rejected by the file gate.
        #[arg(long)]
        gate: bool,
    },

    /// Build enrichment, learning path and exercises for a chapter.
    Chapter {
        /// Subject.
        subject: String,
        /// Topic.
        topic: String,
        /// Grade level.
        #[arg(short, long, default_value = "all")]
        grade_level: String,
    },

    /// Generate interactive exercises.
    Exercises {
        /// Topic.
        topic: String,
        /// Difficulty level.
        #[arg(short, long, default_value = DEFAULT_DIFFICULTY)]
        difficulty: String,
    },

    /// Find related papers, websites, courses, games and tools.
    Related {
        /// Content to match (reads stdin if omitted).
        content: Option<String>,
    },

    /// Gather teaching materials for a subject and topic.
    TeachingMaterials {
        /// Subject.
        subject: String,
        /// Topic.
        topic: String,
    },

    /// Summarize chapter content (reads stdin if omitted).
    Summary {
        /// Chapter content.
        content: Option<String>,
    },

    /// Write study questions for chapter content (reads stdin if omitted).
    Questions {
        /// Chapter content.
        content: Option<String>,
    },

    /// Write a progress report from student JSON.
    ProgressReport {
        /// JSON file with student data (reads stdin if omitted).
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Analyze the status of a service.
    MonitorService {
        /// Service name.
        service: String,
        /// Report this JSON status before analyzing.
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Run a system health check.
    Health,

    /// Review the security log.
    MonitorSecurity,

    /// Send a free-form prompt.
    Ask {
        /// Prompt text.
        prompt: String,
        /// System role override.
        #[arg(short, long)]
        role: Option<String>,
    },

    /// Show the resolved configuration.
    Config,

    /// Print shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_settings(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

fn load_config(path: Option<&Path>) -> Result<LessonforgeConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => LessonforgeConfig::load_from_file(path)?,
        None => LessonforgeConfig::load_default(),
    };
    Ok(config.with_env_overrides())
}

fn run_command(command: Commands, config: LessonforgeConfig) -> CliResult {
    match command {
        Commands::Config => return cmd_config(&config),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "lessonforge",
                &mut std::io::stdout(),
            );
            return Ok(());
        },
        _ => {},
    }

    let client = OpenAiClient::from_config(&config.llm);
    let service = ContentEnrichmentService::from_config(client, &config);

    let result = dispatch(&service, command);
    if result.is_err() {
        for event in service.security_events() {
            tracing::debug!(event_type = %event.event_type, details = %event.details, "Recorded security event");
        }
    }
    result
}

fn dispatch(service: &ContentEnrichmentService<OpenAiClient>, command: Commands) -> CliResult {
    match command {
        Commands::Enrich {
            topic,
            subject,
            grade_level,
        } => print_json(&service.enrich_content(&topic, &subject, &grade_level)?),

        Commands::LearningPath {
            topic,
            subject,
            grade_level,
        } => print_json(&service.generate_learning_path(&topic, &subject, &grade_level)?),

        Commands::Quality { content } => {
            let assessment = service.validate_content_quality(&content_or_stdin(content)?)?;
            print_json(&assessment)
        },

        Commands::Analyze {
            content,
            content_type,
            structured,
            gate,
        } => cmd_analyze(service, &content_or_stdin(content)?, &content_type, structured, gate),

        Commands::AnalyzeFile { path, gate } => {
            let verdict = service.analyze_file(&path)?;
            println!("{verdict}");
            if gate {
                service.gate().ensure_file_allowed(&verdict)?;
            }
            Ok(())
        },

        Commands::Chapter {
            subject,
            topic,
            grade_level,
        } => print_json(&service.generate_chapter_content(&subject, &topic, &grade_level)?),

        Commands::Exercises { topic, difficulty } => {
            print_json(&service.generate_interactive_exercises(&topic, &difficulty)?)
        },

        Commands::Related { content } => {
            print_json(&service.find_related_content(&content_or_stdin(content)?)?)
        },

        Commands::TeachingMaterials { subject, topic } => {
            print_json(&service.suggest_teaching_materials(&subject, &topic)?)
        },

        Commands::Summary { content } => {
            println!("{}", service.generate_chapter_summary(&content_or_stdin(content)?)?);
            Ok(())
        },

        Commands::Questions { content } => {
            println!("{}", service.generate_study_questions(&content_or_stdin(content)?)?);
            Ok(())
        },

        Commands::ProgressReport { file } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => read_stdin()?,
            };
            let student: serde_json::Value = serde_json::from_str(&raw)?;
            println!("{}", service.generate_progress_report(&student)?);
            Ok(())
        },

        Commands::MonitorService { service: name, status } => {
            if let Some(status) = status {
                service.update_service_status(&name, serde_json::from_str(&status)?);
            }
            println!("{}", service.monitor_service(&name)?);
            Ok(())
        },

        Commands::Health => {
            println!("{}", service.perform_system_health_check()?);
            Ok(())
        },

        Commands::MonitorSecurity => {
            println!("{}", service.monitor_security()?);
            Ok(())
        },

        Commands::Ask { prompt, role } => {
            println!(
                "{}",
                service.generate_assistant_response(&prompt, role.as_deref())?
            );
            Ok(())
        },

        Commands::Config | Commands::Completions { .. } => Ok(()),
    }
}

fn cmd_analyze<P: CompletionProvider>(
    service: &ContentEnrichmentService<P>,
    content: &str,
    content_type: &str,
    structured: bool,
    gate: bool,
) -> CliResult {
    if structured {
        let verdict = service.analyze_content_structured(content, content_type)?;
        print_json(&verdict)?;
        if gate && verdict.is_flagged() {
            return Err(format!("content flagged: {}", verdict.reason).into());
        }
        return Ok(());
    }

    let verdict = service.analyze_content(content, content_type)?;
    println!("{verdict}");
    if gate {
        gate_content_verdict(service, &verdict)?;
    }
    Ok(())
}

/// Applies the service's own moderation gate to a prose verdict.
fn gate_content_verdict<P: CompletionProvider>(
    service: &ContentEnrichmentService<P>,
    verdict: &str,
) -> CliResult {
    match service.gate().check_content(verdict) {
        GateDecision::Allow => Ok(()),
        GateDecision::Reject { marker } => {
            Err(format!("content rejected: verdict mentions '{marker}'").into())
        },
    }
}

fn cmd_config(config: &LessonforgeConfig) -> CliResult {
    let key_state = config
        .llm
        .api_key
        .as_ref()
        .map_or("(not set)", |k| {
            if k.expose_secret().is_empty() {
                "(empty)"
            } else {
                "(set)"
            }
        });

    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("LLM Configuration:");
    println!("  API URL: {}", config.llm.api_url);
    println!("  Model: {}", config.llm.model);
    println!("  API Key: {key_state}");
    println!();
    println!("Completion:");
    println!("  Temperature: {}", config.completion.temperature);
    println!("  Max Tokens: {}", config.completion.max_tokens);
    println!(
        "  Structured Max Tokens: {}",
        config.completion.structured_max_tokens
    );
    println!();
    println!("Limits:");
    println!("  Cache Capacity: {}", display_limit(config.cache.capacity));
    println!(
        "  Security Log Capacity: {}",
        display_limit(config.security.log_capacity)
    );
    println!(
        "  Max File Bytes: {}",
        display_limit(config.security.max_file_bytes)
    );

    Ok(())
}

fn display_limit<T: std::fmt::Display>(limit: Option<T>) -> String {
    limit.map_or_else(|| "(unbounded)".to_string(), |v| v.to_string())
}

fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn content_or_stdin(content: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    match content {
        Some(content) => Ok(content),
        None => read_stdin(),
    }
}

fn read_stdin() -> Result<String, Box<dyn std::error::Error>> {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}
