//! Configuration commands.

use std::path::Path;

use founderos_google::Service;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Dump the effective configuration to stdout.
pub fn dump(config: &ClientConfig, config_path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("# config.toml ({})", config_path.display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig, tz_override: Option<&str>) -> ClientResult<()> {
    config.validate()?;
    let tz = config.resolve_timezone(tz_override)?;
    println!("Time zone: {}", tz.name());

    match config.oauth_credentials() {
        Ok(_) => println!("Google credentials are valid."),
        Err(e) => println!("Google credentials not usable yet: {e}"),
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file and data locations.
pub fn path(config: &ClientConfig, config_path: &Path) -> ClientResult<()> {
    let credentials_dir = config.credentials_dir();
    println!("config:      {}", config_path.display());
    println!("credentials: {}", credentials_dir.display());
    for service in [Service::Gmail, Service::Calendar] {
        println!(
            "{:<12} {}",
            format!("{}:", service.as_str()),
            credentials_dir.join(service.token_file_name()).display()
        );
    }
    println!("inbox:       {}", config.inbox_dir().display());
    Ok(())
}
