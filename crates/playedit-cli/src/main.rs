mod cli;
mod commands;
mod config;
mod images;
mod loader;
mod observability;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use playedit_client::{AccessToken, Authenticator, PlayClient, ServiceAccount, build_http_client};
use tracing::debug;

use cli::{Cli, Commands, ConfigCommands, EditCommands};
use config::Settings;
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::resolve(&cli, config::load_profile(&cli.profile)?);
    observability::init_tracing_with_level(&settings.log_level);
    debug!(profile = %settings.profile, "Settings resolved");

    match &cli.command {
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show => commands::config::show(&cli.profile)?,
            ConfigCommands::Set(set_args) => commands::config::set(&cli.profile, set_args)?,
        },
        Commands::Edit(args) => {
            let client = make_client(&settings).await?;
            match &args.command {
                EditCommands::Insert(a) => commands::edit::insert(&client, &settings, a).await?,
                EditCommands::Sync(a) => commands::edit::sync(&client, &settings, a).await?,
                EditCommands::List(a) => commands::edit::list(&client, &a.id).await?,
                EditCommands::Commit(a) => commands::edit::commit(&client, &a.id).await?,
                EditCommands::Validate(a) => commands::edit::validate(&client, &a.id).await?,
                EditCommands::Delete(a) => commands::edit::delete(&client, &a.id).await?,
            }
        }
    }

    Ok(())
}

async fn make_client(settings: &Settings) -> Result<PlayClient> {
    let package = settings.package_name()?;
    let http = build_http_client(&settings.http)?;

    let token = if let Some(path) = &settings.account {
        let account = ServiceAccount::from_file(path).context("Unable to load service account")?;
        Authenticator::new(http.clone())
            .authenticate(&account)
            .await
            .context("Unable to authenticate")?
    } else if let Some(token) = &settings.token {
        AccessToken::bearer(token.clone())
    } else {
        anyhow::bail!(
            "Neither a service account nor an access token was given. Use --account or --token"
        );
    };

    if settings.print_token {
        eprintln!(
            "Access Token: {}\nExpires in: {}",
            token.access_token, token.expires_in
        );
    }

    Ok(PlayClient::new(http, &token, package))
}
