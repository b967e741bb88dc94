use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::open_store;
use crate::services::UserService;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a regular user")]
    Create {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Display name", default_value = "")]
        name: String,
        #[arg(long, help = "Password (omit to create an account that cannot log in)")]
        password: Option<String>,
    },

    #[command(about = "Create a staff superuser")]
    CreateSuperuser {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Display name", default_value = "")]
        name: String,
        #[arg(long, help = "Password")]
        password: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = open_store(config()).await.context("failed to open store")?;
    let users = UserService::new(Arc::clone(&store));

    let (user, kind) = match cmd {
        UserCommands::Create { email, name, password } => {
            let user = users.create_user(&email, password.as_deref(), &name).await?;
            (user, "User")
        }
        UserCommands::CreateSuperuser { email, name, password } => {
            let user = users.create_superuser(&email, &password, &name).await?;
            (user, "Superuser")
        }
    };

    output_success(
        &output_format,
        &format!("{} '{}' created", kind, user),
        Some(json!({
            "id": user.id,
            "email": user.email,
            "is_staff": user.is_staff,
            "is_superuser": user.is_superuser,
        })),
    )
}
