//! Command dispatch: `--list` and `--host`

use std::io::{self, Write};
use std::path::Path;

use serde_json::json;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Query};
use crate::cli::output;
use crate::cli::CliResult;
use crate::config::InventorySettings;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Run the CLI against the real filesystem, writing to stdout.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let container = ServiceContainer::new();
    let stdout = io::stdout();
    execute_with(cli, &container, &mut stdout.lock())
}

/// Run the CLI with the given services and output sink.
pub fn execute_with<W: Write>(
    cli: &Cli,
    container: &ServiceContainer,
    out: &mut W,
) -> CliResult<()> {
    match cli.query() {
        Query::Host(host) => cmd_host(host, out),
        Query::List => cmd_list(&cli.settings, container, out),
    }
}

/// Whole inventory. Nothing is written until every node file has loaded.
#[instrument(skip(container, out))]
fn cmd_list<W: Write>(settings_path: &Path, container: &ServiceContainer, out: &mut W) -> CliResult<()> {
    let settings = InventorySettings::load(container.fs.as_ref(), settings_path)?;
    debug!("settings: {:?}", settings);
    let inventory = container.inventory.build(&settings)?;
    output::write_json(out, &inventory).map_err(|e| InfraError::io("write inventory", e))?;
    Ok(())
}

/// Host variables. Groups carry no per-host variables, so this is always `{}`.
#[instrument(skip(out))]
fn cmd_host<W: Write>(host: &str, out: &mut W) -> CliResult<()> {
    output::write_json(out, &json!({})).map_err(|e| InfraError::io("write host variables", e))?;
    Ok(())
}
