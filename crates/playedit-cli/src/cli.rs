use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use playedit_store::ImageType;

#[derive(Parser)]
#[command(name = "playedit")]
#[command(about = "playedit - sync store listings and screenshots through edits")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Application package name (e.g. com.example.app)
    #[arg(long, global = true, env = "PLAYEDIT_PACKAGE_NAME")]
    pub package_name: Option<String>,

    /// Path to a service account JSON key
    #[arg(long, global = true, env = "PLAYEDIT_ACCOUNT")]
    pub account: Option<PathBuf>,

    /// Pre-obtained access token (used when no service account is given)
    #[arg(long, global = true, env = "PLAYEDIT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Print the access token and its lifetime to stderr
    #[arg(long, global = true)]
    pub print_token: bool,

    /// Proxy URL for all requests
    #[arg(long, global = true, env = "PLAYEDIT_PROXY")]
    pub proxy: Option<String>,

    /// Skip TLS certificate verification when using a proxy
    #[arg(long, global = true)]
    pub proxy_insecure: bool,

    /// Config profile name
    #[arg(short, long, global = true, env = "PLAYEDIT_PROFILE", default_value = "default")]
    pub profile: String,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, global = true, env = "PLAYEDIT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Seconds to wait for the next image from a producer (0 disables the limit)
    #[arg(long, global = true, env = "PLAYEDIT_HANDOFF_TIMEOUT")]
    pub handoff_timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Work with edits
    Edit(EditArgs),
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct EditArgs {
    #[command(subcommand)]
    pub command: EditCommands,
}

#[derive(Subcommand)]
pub enum EditCommands {
    /// Create a new edit and upsert listings and images (never deletes listings)
    Insert(InsertArgs),
    /// Reconcile listings and images of an edit with local files
    Sync(SyncArgs),
    /// Show an edit with its listings and images
    List(EditIdArgs),
    /// Commit an edit
    Commit(EditIdArgs),
    /// Validate an edit without committing it
    Validate(EditIdArgs),
    /// Delete an edit
    Delete(EditIdArgs),
}

#[derive(clap::Args)]
pub struct InsertArgs {
    /// Listings file (.csv, .yaml, .yml or .json)
    pub listings: PathBuf,

    #[command(flatten)]
    pub images: ImageDirArgs,
}

#[derive(clap::Args)]
pub struct SyncArgs {
    /// Listings file (.csv, .yaml, .yml or .json)
    pub listings: PathBuf,

    /// Existing edit to work in (a new edit is created otherwise)
    #[arg(long)]
    pub edit: Option<String>,

    /// Delete remote listings whose locale is not in the listings file
    #[arg(long)]
    pub prune: bool,

    /// Delete remote images left over after the local images run out
    #[arg(long)]
    pub prune_trailing_images: bool,

    /// Commit the edit after a successful sync
    #[arg(long)]
    pub commit: bool,

    /// Read the remote state but only log changes
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub images: ImageDirArgs,
}

#[derive(clap::Args)]
pub struct ImageDirArgs {
    /// Image directory per type as TYPE=DIR, with one subdirectory per locale
    #[arg(long = "images", value_name = "TYPE=DIR", value_parser = parse_image_dir)]
    pub images: Vec<(ImageType, PathBuf)>,

    /// Directory with phone screenshots, one subdirectory per locale
    #[arg(long, value_name = "DIR")]
    pub phone_screenshots: Option<PathBuf>,
}

impl ImageDirArgs {
    /// Root directory per image type; `--images` wins over the shorthand.
    pub fn roots(&self) -> BTreeMap<ImageType, PathBuf> {
        let mut roots = BTreeMap::new();
        if let Some(dir) = &self.phone_screenshots {
            roots.insert(ImageType::PhoneScreenshots, dir.clone());
        }
        roots.extend(self.images.iter().cloned());
        roots
    }
}

fn parse_image_dir(s: &str) -> Result<(ImageType, PathBuf), String> {
    let (kind, dir) = s
        .split_once('=')
        .ok_or_else(|| format!("expected TYPE=DIR, got '{s}'"))?;
    let kind = kind.parse::<ImageType>().map_err(|e| e.to_string())?;
    if dir.is_empty() {
        return Err(format!("missing directory for {kind}"));
    }
    Ok((kind, PathBuf::from(dir)))
}

#[derive(clap::Args)]
pub struct EditIdArgs {
    /// Edit ID
    pub id: String,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (package-name, account, proxy, proxy-insecure, log-level, handoff-timeout)
    pub key: String,
    /// Value
    pub value: String,
}
