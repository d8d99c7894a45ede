//! Ansible dynamic inventory built from Hiera node files.
//!
//! Reads `group_vars/hieraData.yml`, resolves the Hiera data directory and
//! emits `"<environment>.<service>"` → DNS names as JSON.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
