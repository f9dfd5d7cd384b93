use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigSetArgs;
use crate::config;
use crate::output::print_success;

pub fn show(profile: &str) -> Result<()> {
    let cfg = config::load_profile(profile)?;
    let unset = || "(not set)".to_string();
    println!("{}: {}", "Profile".cyan(), profile);
    println!(
        "{}: {}",
        "Package name".cyan(),
        cfg.package_name.unwrap_or_else(unset)
    );
    println!(
        "{}: {}",
        "Account".cyan(),
        cfg.account
            .map(|p| p.display().to_string())
            .unwrap_or_else(unset)
    );
    println!("{}: {}", "Proxy".cyan(), cfg.proxy.unwrap_or_else(unset));
    println!(
        "{}: {}",
        "Proxy insecure".cyan(),
        cfg.proxy_insecure.unwrap_or(false)
    );
    println!(
        "{}: {}",
        "Log level".cyan(),
        cfg.log_level.as_deref().unwrap_or(config::DEFAULT_LOG_LEVEL)
    );
    let handoff = cfg.handoff_timeout.unwrap_or(config::DEFAULT_HANDOFF_TIMEOUT_SECS);
    println!(
        "{}: {}",
        "Handoff timeout".cyan(),
        match config::handoff_timeout(handoff) {
            Some(t) => format!("{}s", t.as_secs()),
            None => "none".to_string(),
        }
    );
    Ok(())
}

pub fn set(profile: &str, args: &ConfigSetArgs) -> Result<()> {
    let mut cfg = config::load_profile(profile)?;
    cfg.set(&args.key, &args.value)?;
    config::save_profile(profile, &cfg)?;
    print_success(&format!("Set {} = {}", args.key, args.value));
    Ok(())
}
