//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};

use crate::config::DEFAULT_SETTINGS_PATH;

/// Ansible dynamic inventory: DNS names per environment and service from Hiera node files
#[derive(Parser, Debug)]
#[command(name = "hiera-inventory")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print the whole inventory (default)
    #[arg(long, conflicts_with = "host")]
    pub list: bool,

    /// Print variables of a single host (always empty)
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Settings file with dynInvEnv, dynInvServ, dynInvServIgnore and hieraFile
    #[arg(
        short,
        long,
        env = "HIERA_INVENTORY_SETTINGS",
        default_value = DEFAULT_SETTINGS_PATH,
        value_hint = ValueHint::FilePath
    )]
    pub settings: PathBuf,

    /// Log to stderr: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count)]
    pub debug: u8,

    /// Print shell completions and exit
    #[arg(long = "generate", value_enum)]
    pub generator: Option<clap_complete::Shell>,
}

impl Cli {
    /// Ansible asks for a single host with `--host`; anything else lists.
    pub fn query(&self) -> Query<'_> {
        match &self.host {
            Some(host) => Query::Host(host),
            None => Query::List,
        }
    }
}

/// What the inventory caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query<'a> {
    List,
    Host(&'a str),
}
