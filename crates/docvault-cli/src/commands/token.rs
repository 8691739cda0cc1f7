//! Bearer token commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use docvault_auth::JwtEncoder;
use docvault_core::config::AppConfig;
use docvault_core::error::AppError;
use docvault_database::repositories::PrincipalRepository;

use crate::output::{self, OutputFormat};

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Issue a bearer token for a principal
    Issue {
        /// Principal email
        #[arg(long)]
        email: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct TokenRow {
    email: String,
    expires_at: String,
    token: String,
}

/// Execute token commands
pub async fn execute(
    args: &TokenArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let principals = PrincipalRepository::new(pool.clone());

    match &args.command {
        TokenCommand::Issue { email } => {
            let principal = principals
                .find_by_email(email)
                .await?
                .ok_or_else(|| AppError::not_found(format!("User '{email}' not found")))?;
            if !principal.is_active {
                return Err(AppError::validation(format!(
                    "User '{}' is disabled",
                    principal.email
                )));
            }

            let issued = JwtEncoder::new(&config.auth).issue(&principal)?;
            output::print_item(
                &TokenRow {
                    email: principal.email,
                    expires_at: issued.expires_at.to_rfc3339(),
                    token: issued.token,
                },
                format,
            );
        }
    }

    pool.close().await;
    Ok(())
}
