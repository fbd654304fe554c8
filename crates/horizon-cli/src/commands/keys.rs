//! Key commands.

use std::io::Write;

use horizon_wireguard::{generate_keypair, validate_public_key};

use crate::error::CliError;
use crate::output::{GeneratedKeys, KeyValidation, OutputFormat};

/// Key command executor.
#[derive(Debug, Default)]
pub struct KeyCommand;

impl KeyCommand {
    /// Create a new key command.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Report whether `key` is a well-formed public key.
    ///
    /// The verdict is always written; an invalid key is also returned as an
    /// error so the exit status reflects it.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::InvalidArgument`] if the key is malformed.
    pub fn validate<W: Write>(&self, writer: &mut W, format: &OutputFormat, key: &str) -> Result<(), CliError> {
        let valid = validate_public_key(key);
        format.write(
            writer,
            &KeyValidation {
                key: key.to_string(),
                valid,
            },
        )?;
        if valid {
            Ok(())
        } else {
            Err(CliError::InvalidArgument(format!("'{key}' is not a valid WireGuard public key")))
        }
    }

    /// Generate and print a new key pair.
    ///
    /// # Errors
    ///
    /// Returns an error if output fails.
    pub fn generate<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let pair = generate_keypair();
        format.write(
            writer,
            &GeneratedKeys {
                private_key: pair.private_key,
                public_key: pair.public_key,
            },
        )
    }
}
