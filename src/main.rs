//! RelEye CLI
//!
//! Thin wrapper around releye-core and releye-server for command-line usage.
//!
//! ## Usage
//!
//! ```bash
//! # Run the API server
//! releye serve --bind 127.0.0.1:8787 --db releye.db
//!
//! # Create a workspace
//! releye workspace create "Family"
//!
//! # List all workspaces
//! releye workspace list
//!
//! # Add people to a workspace
//! releye person add <workspace_id> "Ada"
//!
//! # Connect two people
//! releye connect <workspace_id> <person_id> <person_id> --kind friend
//!
//! # Render a network report
//! releye report <workspace_id>
//!
//! # Export / import an encrypted vault
//! releye export <workspace_id> family.vault --passphrase "open sesame"
//! releye import family.vault --passphrase "open sesame"
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use releye_core::types::{ConnectionKind, GroupId, PersonId, WorkspaceId};
use releye_core::{RelEyeEngine, ReportOptions};
use releye_server::ServerConfig;

/// RelEye - relationship network workspaces
#[derive(Parser)]
#[command(name = "releye")]
#[command(version = "0.1.0")]
#[command(about = "RelEye - relationship network workspaces with encrypted export")]
struct Cli {
    /// Data directory for local storage (defaults to the platform data dir)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server
    Serve {
        /// Socket address to listen on
        #[arg(long)]
        bind: Option<String>,
        /// Path to the SQLite database
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Workspace management
    Workspace {
        #[command(subcommand)]
        action: WorkspaceAction,
    },
    /// Person management within a workspace
    Person {
        #[command(subcommand)]
        action: PersonAction,
    },
    /// Connect two people
    Connect {
        workspace: String,
        from: String,
        to: String,
        /// Relationship kind (family, friend, colleague, romantic,
        /// acquaintance, or any custom label)
        #[arg(long, default_value = "acquaintance")]
        kind: String,
    },
    /// Group management within a workspace
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },
    /// Render a markdown network report
    Report {
        workspace: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Include person and connection notes
        #[arg(long)]
        notes: bool,
    },
    /// Export a workspace as an encrypted vault file
    Export {
        workspace: String,
        path: PathBuf,
        #[arg(long, env = "RELEYE_PASSPHRASE")]
        passphrase: String,
    },
    /// Import a workspace from an encrypted vault file
    Import {
        path: PathBuf,
        #[arg(long, env = "RELEYE_PASSPHRASE")]
        passphrase: String,
    },
}

#[derive(Subcommand)]
enum WorkspaceAction {
    /// Create a new workspace
    Create { name: String },
    /// List all workspaces
    List,
    /// Delete a workspace and all its data
    Delete { workspace: String },
}

#[derive(Subcommand)]
enum PersonAction {
    /// Add a person
    Add { workspace: String, name: String },
    /// List people in a workspace
    List { workspace: String },
    /// Remove a person (and their connections)
    Remove { workspace: String, person: String },
}

#[derive(Subcommand)]
enum GroupAction {
    /// Create a group
    Create {
        workspace: String,
        name: String,
        /// Fill color as #rrggbb
        #[arg(long)]
        color: Option<String>,
    },
    /// Assign a person to a group
    Assign {
        workspace: String,
        person: String,
        group: String,
    },
    /// List groups and their members
    List { workspace: String },
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("releye")
}

fn parse_workspace(s: &str) -> Result<WorkspaceId> {
    WorkspaceId::from_base58(s).with_context(|| format!("invalid workspace id: {s}"))
}

fn parse_person(s: &str) -> Result<PersonId> {
    PersonId::from_string(s).with_context(|| format!("invalid person id: {s}"))
}

fn parse_group(s: &str) -> Result<GroupId> {
    GroupId::from_string(s).with_context(|| format!("invalid group id: {s}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);

    match cli.command {
        Command::Serve { bind, db } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(bind) = bind {
                config.bind = bind.parse().with_context(|| "invalid bind address")?;
            }
            if let Some(db) = db {
                config.db_path = db;
            }
            releye_server::serve(config).await?;
        }

        Command::Workspace { action } => {
            let mut engine = RelEyeEngine::new(&data_dir)?;
            match action {
                WorkspaceAction::Create { name } => {
                    let id = engine.create_workspace(&name)?;
                    println!("Created workspace: {}", id.to_base58());
                }
                WorkspaceAction::List => {
                    let workspaces = engine.list_workspaces()?;
                    if workspaces.is_empty() {
                        println!("No workspaces yet.");
                    }
                    for info in workspaces {
                        println!("{}  {}", info.id.to_base58(), info.name);
                    }
                }
                WorkspaceAction::Delete { workspace } => {
                    let id = parse_workspace(&workspace)?;
                    engine.delete_workspace(&id)?;
                    println!("Deleted workspace {workspace}");
                }
            }
        }

        Command::Person { action } => {
            let mut engine = RelEyeEngine::new(&data_dir)?;
            match action {
                PersonAction::Add { workspace, name } => {
                    let ws = parse_workspace(&workspace)?;
                    let id = engine.add_person(&ws, &name)?;
                    println!("Added {}: {}", name, id.to_string_repr());
                }
                PersonAction::List { workspace } => {
                    let ws = parse_workspace(&workspace)?;
                    let doc = engine.doc(&ws)?;
                    for person in doc.persons() {
                        let ties = doc.connections_of(&person.id).len();
                        println!(
                            "{}  {} ({} connection{})",
                            person.id.to_string_repr(),
                            person.name,
                            ties,
                            if ties == 1 { "" } else { "s" }
                        );
                    }
                }
                PersonAction::Remove { workspace, person } => {
                    let ws = parse_workspace(&workspace)?;
                    let id = parse_person(&person)?;
                    engine.remove_person(&ws, &id)?;
                    println!("Removed {person}");
                }
            }
        }

        Command::Connect {
            workspace,
            from,
            to,
            kind,
        } => {
            let Some(kind) = ConnectionKind::parse(&kind) else {
                bail!("invalid connection kind: {kind}");
            };
            let mut engine = RelEyeEngine::new(&data_dir)?;
            let ws = parse_workspace(&workspace)?;
            let id = engine.add_connection(&ws, &parse_person(&from)?, &parse_person(&to)?, kind)?;
            println!("Connected: {}", id.to_string_repr());
        }

        Command::Group { action } => {
            let mut engine = RelEyeEngine::new(&data_dir)?;
            match action {
                GroupAction::Create {
                    workspace,
                    name,
                    color,
                } => {
                    let ws = parse_workspace(&workspace)?;
                    let id = engine.add_group(&ws, &name, color.as_deref())?;
                    println!("Created group {}: {}", name, id.to_string_repr());
                }
                GroupAction::Assign {
                    workspace,
                    person,
                    group,
                } => {
                    let ws = parse_workspace(&workspace)?;
                    engine.assign_person_group(
                        &ws,
                        &parse_person(&person)?,
                        Some(parse_group(&group)?),
                    )?;
                    println!("Assigned {person} to {group}");
                }
                GroupAction::List { workspace } => {
                    let ws = parse_workspace(&workspace)?;
                    let doc = engine.doc(&ws)?;
                    for group in doc.groups() {
                        let members = doc.members_of(&group.id);
                        println!(
                            "{}  {} ({})",
                            group.id.to_string_repr(),
                            group.name,
                            group.color
                        );
                        for member in members {
                            println!("    {}", member.name);
                        }
                    }
                }
            }
        }

        Command::Report {
            workspace,
            output,
            notes,
        } => {
            let mut engine = RelEyeEngine::new(&data_dir)?;
            let ws = parse_workspace(&workspace)?;
            let options = ReportOptions {
                include_notes: notes,
                ..Default::default()
            };
            let report = engine.report(&ws, &options)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, report)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Report written to {}", path.display());
                }
                None => print!("{report}"),
            }
        }

        Command::Export {
            workspace,
            path,
            passphrase,
        } => {
            let mut engine = RelEyeEngine::new(&data_dir)?;
            let ws = parse_workspace(&workspace)?;
            engine.export_vault(&ws, &path, &passphrase)?;
            println!("Exported to {}", path.display());
        }

        Command::Import { path, passphrase } => {
            let mut engine = RelEyeEngine::new(&data_dir)?;
            let id = engine.import_vault(&path, &passphrase)?;
            println!("Imported workspace: {}", id.to_base58());
        }
    }

    Ok(())
}
