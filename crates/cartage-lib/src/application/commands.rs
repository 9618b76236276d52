//! Command execution handlers
//!
//! Handlers write their report to the given writer so that tests can
//! capture it; progress and diagnostics go through `tracing`.

use crate::application::project::Project;
use crate::application::{CliConfig, Commands};
use anyhow::{Context, Result, bail};
use std::io::Write;
use tracing::debug;

/// Execute a parsed command line against the live project
pub async fn execute_command(config: CliConfig) -> Result<()> {
    let mut out = std::io::stdout();

    let Some(command) = config.command else {
        writeln!(out, "cartage - source dependency resolution")?;
        writeln!(out, "Run 'cartage --help' for usage information")?;
        return Ok(());
    };

    if command == Commands::Version {
        return handle_version(&mut out);
    }

    let project = Project::live(&config.app_config).context("Failed to open project")?;
    execute_command_with_project(command, &project, &mut out).await
}

/// Execute a command against a provided project (for testing)
pub async fn execute_command_with_project(
    command: Commands,
    project: &Project,
    out: &mut (dyn Write + Send),
) -> Result<()> {
    if command.requires_cartfile() && !project.has_cartfile() {
        bail!(
            "No Cartfile or Cartfile.private in {}",
            project.directory().display()
        );
    }
    if command.requires_resolved() && !project.resolved_path().is_file() {
        bail!(
            "No Cartfile.resolved in {}; run `cartage update` first",
            project.directory().display()
        );
    }

    debug!(?command, directory = %project.directory().display(), "Executing command");
    match command {
        Commands::Update { dependencies } => handle_update(project, &dependencies, out).await,
        Commands::Outdated => handle_outdated(project, out).await,
        Commands::BuildOrder { dependencies } => {
            handle_build_order(project, &dependencies, out).await
        }
        Commands::Transitive { dependencies } => {
            handle_transitive(project, &dependencies, out).await
        }
        Commands::Version => handle_version(out),
    }
}

async fn handle_update(
    project: &Project,
    dependencies: &[String],
    out: &mut (dyn Write + Send),
) -> Result<()> {
    let resolved = project
        .update(dependencies)
        .await
        .context("Failed to resolve dependencies")?;

    for (dependency, version) in resolved.iter() {
        writeln!(out, "{dependency} {version}")?;
    }
    writeln!(
        out,
        "Resolved {} dependencies into {}",
        resolved.len(),
        project.resolved_path().display()
    )?;
    Ok(())
}

async fn handle_outdated(project: &Project, out: &mut (dyn Write + Send)) -> Result<()> {
    let outdated = project
        .outdated()
        .await
        .context("Failed to check for outdated dependencies")?;

    if outdated.is_empty() {
        writeln!(out, "All dependencies are up to date.")?;
        return Ok(());
    }

    writeln!(out, "The following dependencies are outdated:")?;
    for dependency in &outdated {
        writeln!(out, "{dependency}")?;
    }
    Ok(())
}

async fn handle_build_order(
    project: &Project,
    dependencies: &[String],
    out: &mut (dyn Write + Send),
) -> Result<()> {
    let order = project
        .build_order(dependencies)
        .await
        .context("Failed to compute build order")?;

    for (dependency, version) in order {
        writeln!(out, "{dependency} {version}")?;
    }
    Ok(())
}

async fn handle_transitive(
    project: &Project,
    dependencies: &[String],
    out: &mut (dyn Write + Send),
) -> Result<()> {
    let transitive = project
        .transitive_dependencies(dependencies)
        .await
        .context("Failed to collect transitive dependencies")?;

    for dependency in transitive {
        writeln!(out, "{dependency}")?;
    }
    Ok(())
}

fn handle_version(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "cartage {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "Target: {}-{}", std::env::consts::ARCH, std::env::consts::OS)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    include!("commands.test.rs");
}
