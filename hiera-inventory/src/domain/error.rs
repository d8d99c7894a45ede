//! Domain-level errors (no I/O concerns)

use thiserror::Error;

/// Domain errors describe node documents whose shape cannot be turned into an inventory.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("service name must be a scalar, found {found}")]
    InvalidServiceName { found: &'static str },

    #[error("service '{service}' must be a sequence of DNS names, found {found}")]
    InvalidServiceValue {
        service: String,
        found: &'static str,
    },

    #[error("service '{service}' lists a non-scalar DNS name ({found})")]
    InvalidDnsName {
        service: String,
        found: &'static str,
    },
}
