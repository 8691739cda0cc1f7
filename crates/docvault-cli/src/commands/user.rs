//! Principal management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use docvault_core::config::AppConfig;
use docvault_core::error::AppError;
use docvault_database::repositories::PrincipalRepository;
use docvault_entity::principal::{CreatePrincipal, Principal};

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register a principal
    Create {
        /// Email address, unique across principals
        #[arg(long)]
        email: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Mark as staff
        #[arg(long)]
        staff: bool,
    },
    /// List all principals
    List,
    /// Enable a principal
    Enable {
        /// Email address
        email: String,
    },
    /// Disable a principal; its tokens stop working
    Disable {
        /// Email address
        email: String,
    },
}

/// Principal display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    /// Principal ID
    id: String,
    /// Email
    email: String,
    /// Display name
    name: String,
    /// Staff flag
    staff: bool,
    /// Status
    status: String,
    /// Created at
    created_at: String,
}

impl From<&Principal> for UserRow {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.id.to_string(),
            email: p.email.clone(),
            name: p.display_name.clone(),
            staff: p.is_staff,
            status: if p.is_active { "active" } else { "disabled" }.to_string(),
            created_at: p.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let principals = PrincipalRepository::new(pool.clone());

    match &args.command {
        UserCommand::Create { email, name, staff } => {
            let principal = principals
                .create(&CreatePrincipal {
                    email: email.clone(),
                    display_name: name.clone(),
                    is_staff: *staff,
                })
                .await?;
            output::print_item(&UserRow::from(&principal), format);
            output::print_success(&format!("Created user '{}'", principal.email));
        }
        UserCommand::List => {
            let rows: Vec<UserRow> = principals
                .find_all()
                .await?
                .iter()
                .map(UserRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        UserCommand::Enable { email } | UserCommand::Disable { email } => {
            let active = matches!(args.command, UserCommand::Enable { .. });
            let principal = principals
                .find_by_email(email)
                .await?
                .ok_or_else(|| AppError::not_found(format!("User '{email}' not found")))?;
            principals.set_active(principal.id, active).await?;
            let verb = if active { "Enabled" } else { "Disabled" };
            output::print_success(&format!("{verb} user '{}'", principal.email));
        }
    }

    pool.close().await;
    Ok(())
}
