//! Backlog CLI - command-line interface for backlog-tools.

use std::path::PathBuf;

use anyhow::{bail, Context};
use backlog_client::{BacklogClient, BacklogRepository, Issue, SearchIssueQuery, Webhook};
use backlog_core::config::Config;
use backlog_core::{FieldValue, Value};
use backlog_storage::{ApiKeyStore, KeychainStore};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the stored API key.
const API_KEY_ENV: &str = "BACKLOG_API_KEY";

#[derive(Parser)]
#[command(name = "backlog")]
#[command(author, version, about = "Backlog issue tracker client", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Manage the API key of the configured space
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Read and update issues
    Issue {
        #[command(subcommand)]
        command: IssueCommands,
    },

    /// List the custom fields of a project
    Fields {
        /// Project id
        project_id: u64,
    },

    /// Decode webhook payloads
    Webhook {
        #[command(subcommand)]
        command: WebhookCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set a value (e.g. `backlog.space acme`)
    Set { key: String, value: String },
    /// Print a value
    Get { key: String },
    /// Show the current configuration
    Show,
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Store the API key in the OS keychain
    Login {
        #[arg(long)]
        api_key: String,
    },
    /// Remove the stored API key
    Logout,
}

#[derive(Subcommand)]
enum IssueCommands {
    /// Show an issue
    Get {
        /// Issue id or key (e.g. PROJ-12)
        id: String,
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Search issues
    Search {
        /// Project id (defaults to `backlog.project_id`)
        #[arg(long)]
        project: Option<u64>,
        /// Parent issue id
        #[arg(long)]
        parent: Option<u64>,
        /// Sort key (created, updated, status, ...)
        #[arg(long)]
        sort: Option<String>,
        /// Page size
        #[arg(long)]
        count: Option<u32>,
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a custom field and save the issue
    ///
    /// List fields take item labels. Without values the field is cleared.
    SetField {
        /// Issue id or key
        id: String,
        /// Custom field name
        field: String,
        /// New value(s)
        values: Vec<String>,
    },
}

#[derive(Subcommand)]
enum WebhookCommands {
    /// Decode a webhook payload file and show its issue
    Decode {
        file: PathBuf,
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Config { command }) => run_config(command)?,
        Some(Commands::Auth { command }) => run_auth(command)?,
        Some(Commands::Issue { command }) => run_issue(command).await?,
        Some(Commands::Fields { project_id }) => {
            let repo = open_repository()?;
            let catalog = repo.custom_field_catalog(project_id).await?;
            for field in &catalog {
                let required = if field.required { " (required)" } else { "" };
                println!(
                    "{:>8}  {:<14} {}{}",
                    field.id, field.field_type, field.name, required
                );
                for item in &field.items {
                    println!("{:>8}    - {}", item.id, item.name);
                }
            }
        }
        Some(Commands::Webhook {
            command: WebhookCommands::Decode { file, json },
        }) => {
            let contents = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let webhook = Webhook::from_json(&contents)?;
            tracing::debug!(id = webhook.id, event_type = webhook.event_type, "Decoded webhook");
            match webhook.into_issue() {
                Some(issue) if json => println!("{}", serde_json::to_string_pretty(&issue)?),
                Some(issue) => print_issue(&issue),
                None => println!("Webhook carries no issue"),
            }
        }
        None => {
            println!("Backlog issue tracker client");
            println!("Run with --help for usage information");
        }
    }

    Ok(())
}

fn run_config(command: ConfigCommands) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    match command {
        ConfigCommands::Set { key, value } => {
            config.set(&key, &value)?;
            config.save()?;
            tracing::info!(key = key, "Configuration updated");
        }
        ConfigCommands::Get { key } => match config.get(&key)? {
            Some(value) => println!("{}", value),
            None => println!("(not set)"),
        },
        ConfigCommands::Show => match &config.backlog {
            Some(backlog) => {
                println!("space:    {}", backlog.space);
                println!("domain:   {}", backlog.domain);
                println!("endpoint: {}", backlog.endpoint());
                if let Some(project_id) = backlog.project_id {
                    println!("project:  {}", project_id);
                }
            }
            None => println!("No Backlog space configured"),
        },
    }
    Ok(())
}

fn run_auth(command: AuthCommands) -> anyhow::Result<()> {
    let config = Config::load()?;
    let space = config.backlog()?.space.clone();
    let store = KeychainStore::new();
    match command {
        AuthCommands::Login { api_key } => {
            store.save(&space, &api_key)?;
            tracing::info!(space = space, "API key stored");
        }
        AuthCommands::Logout => {
            store.delete(&space)?;
            tracing::info!(space = space, "API key removed");
        }
    }
    Ok(())
}

async fn run_issue(command: IssueCommands) -> anyhow::Result<()> {
    let repo = open_repository()?;
    match command {
        IssueCommands::Get { id, json } => {
            let issue = repo.find_issue(&id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&issue)?);
            } else {
                print_issue(&issue);
            }
        }
        IssueCommands::Search {
            project,
            parent,
            sort,
            count,
            json,
        } => {
            let config = Config::load()?;
            let mut query = SearchIssueQuery::new();
            if let Some(project_id) = project.or(config.backlog()?.project_id) {
                query = query.project_id(project_id);
            }
            if let Some(parent_id) = parent {
                query = query.parent_issue_id(parent_id);
            }
            if let Some(sort) = &sort {
                query = query.sort(sort);
            }
            if let Some(count) = count {
                query = query.count(count);
            }

            let issues = repo.search_issues(&query).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&issues)?);
            } else {
                for issue in &issues {
                    println!("{:<12} {:<14} {}", issue.issue_key, issue.status, issue.summary);
                }
            }
        }
        IssueCommands::SetField { id, field, values } => {
            let mut issue = repo.find_issue(&id).await?;
            let catalog = repo.custom_field_catalog(issue.project_id).await?;
            let field_type = catalog.find_field_type(&field)?;
            let value = FieldValue::from_inputs(field, field_type, values)?;
            issue.custom_fields.set(value);

            let saved = repo.update_issue(&issue).await?;
            print_issue(&saved);
        }
    }
    Ok(())
}

fn open_repository() -> anyhow::Result<BacklogRepository<BacklogClient>> {
    let config = Config::load()?;
    let backlog = config.backlog()?;
    let api_key = resolve_api_key(
        std::env::var(API_KEY_ENV).ok(),
        &KeychainStore::new(),
        &backlog.space,
    )?;
    let client = BacklogClient::new(backlog, api_key)?;
    tracing::debug!(endpoint = client.base_url(), "Using Backlog endpoint");
    Ok(BacklogRepository::new(client))
}

/// The environment variable wins over the keychain.
fn resolve_api_key(
    from_env: Option<String>,
    store: &dyn ApiKeyStore,
    space: &str,
) -> anyhow::Result<String> {
    if let Some(key) = from_env.filter(|k| !k.is_empty()) {
        return Ok(key);
    }
    match store.get(space)? {
        Some(key) => Ok(key),
        None => bail!(
            "No API key for space '{}'. Set {} or run `backlog auth login --api-key <KEY>`",
            space,
            API_KEY_ENV
        ),
    }
}

fn print_issue(issue: &Issue) {
    println!("{} {}", issue.issue_key, issue.summary);
    println!("  status: {}", issue.status);
    if let Some(assignee) = &issue.assignee {
        println!("  assignee: {}", assignee.name);
    }
    if !issue.custom_fields.is_empty() {
        println!("  custom fields:");
        for field in &issue.custom_fields {
            println!(
                "    {} ({}): {}",
                field.name,
                field.field_type,
                display_value(field)
            );
        }
    }
}

fn display_value(field: &FieldValue) -> String {
    match &field.value {
        None => "(none)".to_string(),
        Some(Value::Single(s)) => s.clone(),
        Some(Value::Multiple(labels)) => labels.join(", "),
    }
}
