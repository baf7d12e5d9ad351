//! revcheck - Review Checklist Engine
//!
//! Diagnostic CLI over the checklist engine: load templates, inspect and
//! mutate per-context state, and manage options, all against a JSON file
//! store.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use revcheck::engine::ChecklistEngine;
use revcheck::keys::{scoped_item_key, section_key};
use revcheck::options::Theme;
use revcheck::state::{needs_attention, ChecklistState};
use revcheck::storage::FileStorage;
use revcheck::template::{fallback_template, Template};

#[derive(Parser)]
#[command(name = "revcheck")]
#[command(version = "0.1.0")]
#[command(about = "Review checklist engine - templates, state, and options", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Store file (defaults to the user config directory)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Use the built-in fallback template instead of fetching one
    #[arg(long, global = true)]
    offline: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and print a checklist template
    Template {
        /// Template URL (defaults to the configured one)
        url: Option<String>,
    },

    /// Inspect or mutate per-context checklist state
    State {
        #[command(subcommand)]
        action: StateAction,
    },

    /// Inspect or update engine options
    Options {
        #[command(subcommand)]
        action: OptionsAction,
    },

    /// Wipe all stored state and options
    Clear,
}

#[derive(Subcommand)]
enum StateAction {
    /// Show the checklist for a review context
    Show {
        /// Review context key, e.g. owner/repo#123
        key: String,
    },
    /// Check an item off
    Check {
        key: String,
        section: String,
        item: String,
    },
    /// Uncheck an item
    Uncheck {
        key: String,
        section: String,
        item: String,
    },
    /// Flag an item as needing attention
    Flag {
        key: String,
        section: String,
        item: String,
    },
    /// Remove an item's needs-attention flag
    Unflag {
        key: String,
        section: String,
        item: String,
    },
    /// Collapse a section
    Collapse { key: String, section: String },
    /// Expand a section
    Expand { key: String, section: String },
    /// Reset every item and section to defaults
    Reset { key: String },
}

#[derive(Subcommand)]
enum OptionsAction {
    /// Print the current options
    Show,
    /// Update one or both option fields
    Set {
        /// New default template URL
        #[arg(long)]
        template_url: Option<String>,

        /// Theme: light, dark, or auto
        #[arg(long)]
        theme: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "revcheck=debug,info"
    } else {
        "revcheck=info,warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let store_path = match &cli.store {
        Some(path) => path.clone(),
        None => default_store_path()?,
    };
    let engine = ChecklistEngine::new(FileStorage::new(&store_path));

    match cli.command {
        Commands::Template { url } => {
            let template = resolve_template(&engine, url, cli.offline).await;
            print_template(&template);
        }

        Commands::State { action } => run_state_action(&engine, action, cli.offline).await?,

        Commands::Options { action } => match action {
            OptionsAction::Show => {
                let options = engine.get_options().await;
                println!("{} {}", "template-url:".bold(), options.default_template_url);
                println!("{} {}", "theme:".bold(), options.theme);
            }
            OptionsAction::Set { template_url, theme } => {
                let mut options = engine.get_options().await;
                if let Some(url) = template_url {
                    options.default_template_url = url;
                }
                if let Some(theme) = theme {
                    options.theme = theme.parse::<Theme>()?;
                }
                engine.save_options(&options).await?;
                println!("{} options saved", "ok:".green().bold());
            }
        },

        Commands::Clear => {
            engine.clear().await?;
            println!("{} store cleared", "ok:".green().bold());
        }
    }

    Ok(())
}

async fn run_state_action(
    engine: &ChecklistEngine<FileStorage>,
    action: StateAction,
    offline: bool,
) -> anyhow::Result<()> {
    match action {
        StateAction::Show { key } => {
            let (template, url) = context_template(engine, offline).await;
            let state = engine.load_state(&key, &template, &url).await?;
            print_state(&template, &state);
        }
        StateAction::Check { key, section, item } => {
            set_item(engine, &key, &section, &item, offline, |state, k| {
                state.set_checked(k, true);
            })
            .await?;
        }
        StateAction::Uncheck { key, section, item } => {
            set_item(engine, &key, &section, &item, offline, |state, k| {
                state.set_checked(k, false);
            })
            .await?;
        }
        StateAction::Flag { key, section, item } => {
            set_item(engine, &key, &section, &item, offline, |state, k| {
                state.set_attention(k, true);
            })
            .await?;
        }
        StateAction::Unflag { key, section, item } => {
            set_item(engine, &key, &section, &item, offline, |state, k| {
                state.set_attention(k, false);
            })
            .await?;
        }
        StateAction::Collapse { key, section } => {
            set_section(engine, &key, &section, false, offline).await?;
        }
        StateAction::Expand { key, section } => {
            set_section(engine, &key, &section, true, offline).await?;
        }
        StateAction::Reset { key } => {
            let (template, url) = context_template(engine, offline).await;
            engine.reset_state(&key, &template, &url).await?;
            println!("{} state reset for {key}", "ok:".green().bold());
        }
    }
    Ok(())
}

async fn set_item(
    engine: &ChecklistEngine<FileStorage>,
    key: &str,
    section: &str,
    item: &str,
    offline: bool,
    mutate: impl FnOnce(&mut ChecklistState, &str),
) -> anyhow::Result<()> {
    let (template, url) = context_template(engine, offline).await;
    let mut state = engine.load_state(key, &template, &url).await?;
    let scoped = scoped_item_key(section, item);
    mutate(&mut state, &scoped);
    engine.save_state(key, &state).await?;
    println!("{} {scoped} updated", "ok:".green().bold());
    Ok(())
}

async fn set_section(
    engine: &ChecklistEngine<FileStorage>,
    key: &str,
    section: &str,
    expanded: bool,
    offline: bool,
) -> anyhow::Result<()> {
    let (template, url) = context_template(engine, offline).await;
    let mut state = engine.load_state(key, &template, &url).await?;
    state.set_section_expanded(&section_key(section), expanded);
    engine.save_state(key, &state).await?;
    println!("{} {} updated", "ok:".green().bold(), section_key(section));
    Ok(())
}

/// The template for the current context: built-in when offline, otherwise
/// fetched from the configured URL (total, falls back on failure).
async fn context_template(
    engine: &ChecklistEngine<FileStorage>,
    offline: bool,
) -> (Template, String) {
    if offline {
        return (fallback_template(), "builtin:fallback".to_string());
    }
    let url = engine.get_options().await.default_template_url;
    let template = engine.load_template(&url).await;
    (template, url)
}

async fn resolve_template(
    engine: &ChecklistEngine<FileStorage>,
    url: Option<String>,
    offline: bool,
) -> Template {
    if offline {
        return fallback_template();
    }
    match url {
        Some(url) => engine.load_template(&url).await,
        None => context_template(engine, false).await.0,
    }
}

fn print_template(template: &Template) {
    if let Some(title) = &template.title {
        println!("{}", title.bold().underline());
    }
    for section in &template.sections {
        println!("\n{}", section.name.cyan().bold());
        for item in &section.items {
            match &item.url {
                Some(url) => println!("  - {} ({})", item.name, url.dimmed()),
                None => println!("  - {}", item.name),
            }
        }
    }
}

fn print_state(template: &Template, state: &ChecklistState) {
    for section in &template.sections {
        let expanded = state.section_expanded(&section_key(&section.name));
        let marker = if expanded { "v" } else { ">" };
        println!("{} {}", marker.dimmed(), section.name.cyan().bold());
        if !expanded {
            continue;
        }
        for item in &section.items {
            let item_state = state.item(&scoped_item_key(&section.name, &item.name));
            let checkbox = if item_state.checked { "[x]" } else { "[ ]" };
            let flag = if item_state.needs_attention {
                " !".red().bold().to_string()
            } else {
                String::new()
            };
            println!("  {} {}{}", checkbox, item.name, flag);
        }
    }

    let flagged = needs_attention(state, template);
    if !flagged.is_empty() {
        println!("\n{}", "Needs attention:".red().bold());
        for entry in flagged {
            println!("  - {} / {}", entry.section, entry.item);
        }
    }
}

fn default_store_path() -> anyhow::Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("could not determine the user config directory"))?;
    Ok(base.join("revcheck").join("store.json"))
}
