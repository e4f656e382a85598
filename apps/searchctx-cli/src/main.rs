//! searchctx - provision and resync the access-control context of
//! Organizations and Spaces in the search backend.
//!
//! Configuration is read from the environment (and `.env`), see
//! `ContextConfig`.

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use searchctx_client::AccessControlSession;
use searchctx_core::{Organization, RoleTemplates, Space};
use searchctx_reconcile::{ContextConfig, ContextService};
use tracing_subscriber::EnvFilter;

mod error;

use error::{CliError, CliResult};

/// searchctx - search backend access-control contexts
#[derive(Parser)]
#[command(name = "searchctx")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the context of an Organization
    Org(OrgArgs),

    /// Manage the context of a Space
    Space(SpaceArgs),

    /// Recreate the context of every Organization and Space
    Sync,
}

#[derive(Args)]
struct OrgArgs {
    #[command(subcommand)]
    action: OrgAction,
}

#[derive(Subcommand)]
enum OrgAction {
    /// Create tenant, roles and role mappings
    Create {
        /// Organization id in the directory
        id: i64,
    },
    /// Recreate roles and role mappings
    Update {
        /// Organization id in the directory
        id: i64,
    },
    /// Delete role mappings, roles and tenant
    Delete {
        /// Organization name
        name: String,
    },
}

#[derive(Args)]
struct SpaceArgs {
    #[command(subcommand)]
    action: SpaceAction,
}

#[derive(Subcommand)]
enum SpaceAction {
    /// Create tenant, roles, role mappings and measurement index
    Create {
        /// Id of the owning Organization in the directory
        organization_id: i64,
        /// Space name
        space: String,
    },
    /// Recreate roles and role mappings; the measurement index is kept
    Update {
        /// Id of the owning Organization in the directory
        organization_id: i64,
        /// Space name
        space: String,
    },
    /// Delete role mappings, roles and tenant
    Delete {
        /// Organization name
        organization: String,
        /// Space name
        space: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,searchctx=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = ContextConfig::from_env()?;
    tracing::info!(
        cluster = %config.opensearch_url,
        security_path = %config.security_path,
        "connecting to search backend"
    );

    let http_client = config.http_client()?;
    let auth = config.service_auth(http_client.clone());
    let service = ContextService::new(
        RoleTemplates::load()?,
        Arc::new(config.directory(http_client)),
    );

    // One token for the whole command.
    let session = config
        .access_control_client()?
        .session(auth.access_token().await?);

    match cli.command {
        Commands::Org(args) => org(&service, &session, args.action).await,
        Commands::Space(args) => space(&service, &session, args.action).await,
        Commands::Sync => {
            let report = service.sync_all(&session).await?;
            println!(
                "Resynced {} organizations and {} spaces",
                report.organizations, report.spaces
            );
            Ok(())
        }
    }
}

async fn org(
    service: &ContextService,
    session: &AccessControlSession,
    action: OrgAction,
) -> CliResult<()> {
    match action {
        OrgAction::Create { id } => {
            let organization = organization(service, session, id).await?;
            service
                .create_organization_context(session, &organization)
                .await?;
            println!("Created context of organization '{}'", organization.name);
        }
        OrgAction::Update { id } => {
            let organization = organization(service, session, id).await?;
            service
                .update_organization_context(session, &organization)
                .await?;
            println!("Updated context of organization '{}'", organization.name);
        }
        OrgAction::Delete { name } => {
            service.delete_organization_context(session, &name).await?;
            println!("Deleted context of organization '{name}'");
        }
    }
    Ok(())
}

async fn space(
    service: &ContextService,
    session: &AccessControlSession,
    action: SpaceAction,
) -> CliResult<()> {
    match action {
        SpaceAction::Create {
            organization_id,
            space,
        } => {
            let space = find_space(service, session, organization_id, &space).await?;
            service.create_space_context(session, &space).await?;
            println!(
                "Created context of space '{}' in organization '{}'",
                space.name, space.organization.name
            );
        }
        SpaceAction::Update {
            organization_id,
            space,
        } => {
            let space = find_space(service, session, organization_id, &space).await?;
            service.update_space_context(session, &space).await?;
            println!(
                "Updated context of space '{}' in organization '{}'",
                space.name, space.organization.name
            );
        }
        SpaceAction::Delete {
            organization,
            space,
        } => {
            service
                .delete_space_context(session, &organization, &space)
                .await?;
            println!("Deleted context of space '{space}' in organization '{organization}'");
        }
    }
    Ok(())
}

async fn organization(
    service: &ContextService,
    session: &AccessControlSession,
    id: i64,
) -> CliResult<Organization> {
    Ok(service
        .directory()
        .organization(session.token(), id)
        .await?)
}

async fn find_space(
    service: &ContextService,
    session: &AccessControlSession,
    organization_id: i64,
    name: &str,
) -> CliResult<Space> {
    let organization = organization(service, session, organization_id).await?;
    service
        .directory()
        .space_by_name(session.token(), &organization, name)
        .await?
        .ok_or_else(|| {
            CliError::NotFound(format!(
                "space '{name}' in organization '{}'",
                organization.name
            ))
        })
}
