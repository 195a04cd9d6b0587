//! CLI entry point for deskpilot.
//!
//! This binary provides the `deskpilot` command: run layouts, list, save
//! and delete them, try single pointer actions, and invoke free-text
//! commands.

mod cli;
mod config;
mod helpers;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use deskpilot_driver::{AutomationBackend, DriverChain, DryRunBackend};
use deskpilot_intent::{Workspace, WorkspaceOptions};
use deskpilot_store::{LayoutDir, LayoutFile, LayoutResolver};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::helpers::{init_tracing, print_json};

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    init_tracing(&config.log_level);
    debug!(?config, "configuration loaded");

    let verbose_flag = matches!(cli.command, Commands::Run { verbose: true, .. });
    let workspace = build_workspace(&config, cli.dry_run, verbose_flag);

    match cli.command {
        Commands::Run { layout, .. } => cmd_run(&workspace, &layout).await,
        Commands::List => cmd_list(&workspace).await,
        Commands::Do { phrase } => cmd_do(&workspace, &phrase.join(" ")).await,
        Commands::Commands => cmd_commands(&workspace),
        Commands::Save { id, file } => cmd_save(&workspace, &id, &file).await,
        Commands::Delete { id } => cmd_delete(&workspace, &id).await,
        Commands::Test { action } => cmd_test(&workspace, &action).await,
        Commands::Init => cmd_init(&workspace).await,
    }
}

fn build_workspace(config: &AppConfig, dry_run: bool, verbose: bool) -> Workspace {
    let resolver = LayoutResolver::new(
        LayoutFile::new(&config.store.user_file),
        LayoutDir::new(&config.store.local_dir),
    );

    let backend: Arc<dyn AutomationBackend> = if dry_run {
        info!("dry run: no automation will be performed");
        Arc::new(DryRunBackend::new())
    } else {
        Arc::new(DriverChain::system(config.driver.clone()))
    };

    let mut options = WorkspaceOptions::new().with_verbose(config.executor.verbose || verbose);
    if let Some(dir) = &config.executor.screenshot_dir {
        options = options.with_screenshot_dir(dir);
    }
    Workspace::new(resolver, backend, options)
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

async fn cmd_run(workspace: &Workspace, layout: &str) -> Result<()> {
    let result = workspace.execute(layout).await;
    print_json(&result)?;
    if !result.success {
        anyhow::bail!("workspace \"{layout}\" did not run");
    }
    Ok(())
}

async fn cmd_list(workspace: &Workspace) -> Result<()> {
    let layouts = workspace.list().await.context("failed to list layouts")?;
    if layouts.is_empty() {
        println!("No layouts found. Run `deskpilot init` to create the defaults.");
        return Ok(());
    }
    for layout in &layouts {
        println!(
            "  {:<16} {:<24} {:>2} actions  [{:?}]",
            layout.id,
            layout.name.as_deref().unwrap_or("-"),
            layout.action_count,
            layout.tier,
        );
        if let Some(description) = &layout.description {
            println!("  {:<16} {description}", "");
        }
    }
    Ok(())
}

async fn cmd_do(workspace: &Workspace, phrase: &str) -> Result<()> {
    let response = workspace.handle_command(phrase).await?;
    print_json(&response)?;
    if response.understood && !response.success {
        anyhow::bail!("command failed: {}", response.message);
    }
    Ok(())
}

fn cmd_commands(workspace: &Workspace) -> Result<()> {
    for command in workspace.commands() {
        println!("  {:<36} {}", command.description, command.triggers.join(", "));
    }
    println!("  {:<36} click at X, Y / double click at X, Y / right click at X, Y", "Pointer");
    Ok(())
}

async fn cmd_save(workspace: &Workspace, id: &str, file: &std::path::Path) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let layout: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("{} is not JSON", file.display()))?;
    let saved = workspace
        .save(id, layout)
        .await
        .with_context(|| format!("layout {id} was not saved"))?;
    println!("Layout \"{}\" saved successfully", saved.name);
    Ok(())
}

async fn cmd_delete(workspace: &Workspace, id: &str) -> Result<()> {
    let tiers = workspace
        .delete(id)
        .await
        .with_context(|| format!("layout {id} was not deleted"))?;
    debug!(?tiers, "layout removed");
    println!("Layout \"{id}\" deleted successfully");
    Ok(())
}

async fn cmd_test(workspace: &Workspace, action: &str) -> Result<()> {
    let raw: serde_json::Value =
        serde_json::from_str(action).context("test action is not JSON")?;
    let report = workspace
        .test_action(&raw)
        .await
        .context("invalid test action")?;
    print_json(&report)?;
    if !report.success {
        anyhow::bail!("{}", report.message);
    }
    Ok(())
}

async fn cmd_init(workspace: &Workspace) -> Result<()> {
    let seeded = workspace
        .seed_defaults()
        .await
        .context("failed to seed default layouts")?;
    if seeded.is_empty() {
        println!("Default layouts already present.");
    } else {
        println!("Added layouts: {}", seeded.join(", "));
    }
    Ok(())
}
