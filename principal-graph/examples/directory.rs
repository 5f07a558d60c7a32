// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command line tool managing users and nested groups in a SQLite database.
//!
//! ```bash
//! cargo run --example directory -- create-group cam staff "All staff"
//! cargo run --example directory -- create-user cam ada Ada Lovelace
//! cargo run --example directory -- add g:cam:staff u:cam:ada
//! cargo run --example directory -- users g:cam:staff
//! ```
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use principal_graph::{Directory, DirectoryConfig};
use principal_graph_core::{PrincipalId, Tenant};
use principal_graph_store::SqliteStoreBuilder;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub fn setup_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();
}

#[derive(Parser)]
struct Args {
    /// SQLite database URL, created when it doesn't exist yet.
    #[arg(
        short = 'd',
        long,
        value_name = "URL",
        default_value = "sqlite://directory.sqlite3"
    )]
    database_url: String,

    /// Deadline for every single database round trip in milliseconds.
    #[arg(short = 't', long, value_name = "MILLIS", default_value_t = 5000)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a group inside a tenant.
    CreateGroup {
        tenant: String,
        name: String,
        #[arg(default_value = "")]
        description: String,
    },

    /// Create a user inside a tenant.
    CreateUser {
        tenant: String,
        name: String,
        first_name: String,
        last_name: String,
    },

    /// Add users or groups as members of a group.
    Add {
        group_id: String,
        #[arg(required = true)]
        members: Vec<String>,
    },

    /// List the direct members of a group.
    Members { group_id: PrincipalId },

    /// List all users of a group, including members of nested groups.
    Users { group_id: PrincipalId },

    /// List all groups a user or group is part of.
    MemberOf { principal_id: PrincipalId },

    /// Repair the reverse index below a group.
    Reconcile { group_id: PrincipalId },
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let args = Args::parse();

    let store = SqliteStoreBuilder::new()
        .database_url(&args.database_url)
        .max_connections(4)
        .build()
        .await?;

    let config = DirectoryConfig {
        round_trip_timeout: Duration::from_millis(args.timeout),
        ..Default::default()
    };
    let directory = Directory::with_config(store, config);

    match args.command {
        Command::CreateGroup {
            tenant,
            name,
            description,
        } => {
            let tenant = Tenant::new(&tenant, &tenant);
            let group_id = directory.create_group(&tenant, &name, &description).await?;
            println!("{group_id}");
        }
        Command::CreateUser {
            tenant,
            name,
            first_name,
            last_name,
        } => {
            let tenant = Tenant::new(&tenant, &tenant);
            let user_id = directory
                .create_user(&tenant, &name, &first_name, &last_name)
                .await?;
            println!("{user_id}");
        }
        Command::Add { group_id, members } => {
            directory
                .add_members_by_id(&group_id, members.as_slice())
                .await?;
            info!(%group_id, members = members.len(), "members added");
        }
        Command::Members { group_id } => {
            for principal in directory.group_members_metadata(&group_id).await? {
                println!("{}", serde_json::to_string(&principal)?);
            }
        }
        Command::Users { group_id } => {
            let mut users = Vec::from_iter(directory.group_users(&group_id).await?);
            users.sort();
            for user_id in users {
                println!("{user_id}");
            }
        }
        Command::MemberOf { principal_id } => {
            for group_id in directory.member_of(&principal_id).await? {
                println!("{group_id}");
            }
        }
        Command::Reconcile { group_id } => {
            let repaired = directory.reconcile(&group_id).await?;
            println!("repaired {repaired} reverse index rows");
        }
    }

    Ok(())
}
