//! Share a document from the command line, acting as its owner.

use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use docvault_auth::CapabilityResolver;
use docvault_core::config::AppConfig;
use docvault_core::error::AppError;
use docvault_core::types::NodeId;
use docvault_database::repositories::{GrantRepository, PrincipalRepository, VersionNodeRepository};
use docvault_service::RequestContext;
use docvault_service::SharingService;
use docvault_service::share::ShareRequest;

use crate::output::{self, OutputFormat};

/// Arguments for the share command
#[derive(Debug, Args)]
pub struct ShareArgs {
    /// Any version of the document
    #[arg(long)]
    pub file_id: NodeId,
    /// Recipient email
    #[arg(long)]
    pub email: String,
    /// Grant edit in addition to view
    #[arg(long)]
    pub can_edit: bool,
}

/// Grant display row
#[derive(Debug, Serialize, Tabled)]
struct GrantRow {
    /// Recipient email
    email: String,
    /// View granted
    view: bool,
    /// Edit granted
    edit: bool,
}

/// Execute the share command
pub async fn execute(
    args: &ShareArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let principals = Arc::new(PrincipalRepository::new(pool.clone()));
    let nodes = Arc::new(VersionNodeRepository::new(pool.clone()));

    let node = nodes
        .find_by_id(args.file_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Document {} not found", args.file_id)))?;
    let owner = principals
        .find_by_id(node.owner_id)
        .await?
        .ok_or_else(|| AppError::internal(format!("Owner of {} is missing", node.id)))?;

    let sharing = SharingService::new(
        nodes,
        Arc::clone(&principals),
        Arc::new(GrantRepository::new(pool.clone())),
        Arc::new(CapabilityResolver::new(GrantRepository::new(pool.clone()))),
    );

    let caps = sharing
        .grant(
            &RequestContext::new(&owner),
            ShareRequest {
                node_id: args.file_id,
                target_email: args.email.clone(),
                can_edit: args.can_edit,
            },
        )
        .await?;

    output::print_item(
        &GrantRow {
            email: args.email.trim().to_lowercase(),
            view: caps.view,
            edit: caps.edit,
        },
        format,
    );
    output::print_success(&format!(
        "Shared '{}' owned by {} with {}",
        node.virtual_path, owner.email, args.email
    ));

    pool.close().await;
    Ok(())
}
