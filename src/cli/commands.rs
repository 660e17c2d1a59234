//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::{ReplayService, RevisionReport};
use crate::application::Fixture;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Replay { fixture, last }) => cmd_replay(cli, fixture, *last),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            cmd_completion(*shell);
            Ok(())
        }
        None => Err(CliError::Usage("no command given, see --help".into())),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    Ok(Settings::load(cli.config.as_deref())?)
}

#[instrument(skip(cli))]
fn cmd_replay(cli: &Cli, fixture_path: &Path, last: bool) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let fixture = Fixture::load(fixture_path)?;
    debug!("fixture: {} revisions", fixture.revisions.len());

    let service = ReplayService::new(settings);
    let report = service.replay(&fixture)?;

    output::detail(&report.flags.summary());
    let shown = if last {
        report.revisions.len().saturating_sub(1)
    } else {
        0
    };
    for revision in &report.revisions[shown..] {
        print_revision(revision);
    }
    Ok(())
}

fn print_revision(revision: &RevisionReport) {
    output::header(&format!("revision {} ({})", revision.number, revision.source));
    output::info(&revision.tree);

    for node in &revision.retired {
        if node.mounted {
            // replaced instance still flagged: propagation missed it
            output::warning(&format!("retired but mounted: {}", node.label));
        } else {
            output::failure(&node.label);
        }
    }

    for reference in &revision.references {
        let target = reference.target.as_deref().unwrap_or("-");
        if reference.current {
            output::success_detail(&format!("{} -> {}", reference.family, target));
        } else {
            output::detail(&format!("{} -> {} (stale)", reference.family, target));
        }
    }
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("no home directory, global config disabled"),
            }
            if let Some(local) = &cli.config {
                output::action("local", &local.display());
            }
        }
    }
    Ok(())
}

fn cmd_completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
