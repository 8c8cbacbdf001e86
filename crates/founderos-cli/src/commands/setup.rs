//! Interactive first-time setup.

use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use chrono_tz::Tz;
use founderos_core::parse_timezone;
use founderos_google::auth::CLIENT_SECRET_FILE;
use founderos_google::{CalendarClient, EventQuery, GmailClient, OAuthCredentials, Service};
use inquire::validator::Validation;
use inquire::{Confirm, CustomUserError, Select, Text};
use tracing::info;

use super::auth;
use crate::config::{self, ClientConfig, expand_home};
use crate::error::{ClientError, ClientResult};

/// Offered before falling back to free-form entry.
pub const COMMON_TIMEZONES: &[&str] = &[
    "Europe/London",
    "America/New_York",
    "America/Los_Angeles",
    "Asia/Tokyo",
    "Australia/Sydney",
];

const OTHER_TIMEZONE: &str = "Other...";

const GOOGLE_CLOUD_INSTRUCTIONS: &str = "\
Gmail and Calendar access needs a Google Cloud project with an OAuth client.

1. Create a project (any name, e.g. \"Founder OS\"):
   https://console.cloud.google.com/projectcreate

2. Enable the Gmail API and the Google Calendar API:
   https://console.cloud.google.com/apis/library

3. Configure the OAuth consent screen:
   https://console.cloud.google.com/apis/credentials/consent
   - User type \"External\"
   - Add your own address as a test user

4. Create credentials:
   https://console.cloud.google.com/apis/credentials
   - \"Create Credentials\" > \"OAuth client ID\" > \"Desktop app\"
   - Download the JSON file";

pub async fn run(config: &ClientConfig, config_path: &Path) -> ClientResult<()> {
    header("founderos setup");

    step(1, "Google Cloud project");
    println!("{GOOGLE_CLOUD_INSTRUCTIONS}");
    println!();

    let ready = Confirm::new("Have you downloaded the OAuth client JSON file?")
        .with_default(false)
        .prompt()?;
    if !ready {
        println!();
        println!("Complete the steps above, then run `founderos setup` again.");
        return Ok(());
    }

    step(2, "OAuth client");
    let credentials_dir = config.credentials_dir();
    loop {
        let input = Text::new("Path to the downloaded JSON file:").prompt()?;
        let source = expand_home(Path::new(input.trim()));
        match install_client_secret(&source, &credentials_dir) {
            Ok(dest) => {
                println!("Saved to {}", dest.display());
                break;
            }
            Err(e) => {
                println!("  {e}");
                println!("  Check the path and try again.");
            }
        }
    }

    step(3, "Gmail authentication");
    println!("A browser window will open. Sign in with your Google account.");
    auth::login(config, Service::Gmail, false).await?;

    step(4, "Calendar authentication");
    println!("A browser window will open. Sign in with the same Google account.");
    auth::login(config, Service::Calendar, false).await?;

    step(5, "Your details");
    let name = Text::new("Your name:")
        .with_default(config.name.as_deref().unwrap_or_default())
        .prompt()?;
    let tz = prompt_timezone(config)?;
    config::save_user_details(config_path, name.trim(), tz.name())?;
    println!("Saved to {}", config_path.display());

    step(6, "Test connections");
    test_connections(config, tz).await;

    header("Setup complete!");
    println!(
        "\
Try these commands:
  founderos gmail fetch
  founderos calendar list
  founderos calendar availability {}
",
        Utc::now().with_timezone(&tz).format("%Y-%m-%d")
    );
    info!("setup complete");
    Ok(())
}

/// Validates the Google Cloud download at `source` and copies it to
/// `<credentials_dir>/client_secret.json`.
pub fn install_client_secret(source: &Path, credentials_dir: &Path) -> ClientResult<PathBuf> {
    if !source.is_file() {
        return Err(ClientError::Config(format!(
            "file not found: {}",
            source.display()
        )));
    }

    let content = std::fs::read_to_string(source)?;
    let credentials = OAuthCredentials::from_json(&content)?;
    credentials
        .validate()
        .map_err(|e| ClientError::Config(format!("invalid credentials file: {e}")))?;

    std::fs::create_dir_all(credentials_dir)?;
    let dest = credentials_dir.join(CLIENT_SECRET_FILE);
    if same_file(source, &dest) {
        return Ok(dest);
    }
    std::fs::write(&dest, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(0o600))?;
    }

    info!("installed OAuth client at {}", dest.display());
    Ok(dest)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn prompt_timezone(config: &ClientConfig) -> ClientResult<Tz> {
    let mut options: Vec<&str> = COMMON_TIMEZONES.to_vec();
    options.push(OTHER_TIMEZONE);
    let cursor = config
        .timezone
        .as_deref()
        .and_then(|current| options.iter().position(|o| *o == current))
        .unwrap_or(0);

    let choice = Select::new("Your time zone:", options)
        .with_starting_cursor(cursor)
        .prompt()?;
    if choice != OTHER_TIMEZONE {
        return Ok(parse_timezone(choice)?);
    }

    let entered = Text::new("Time zone (IANA name, e.g. Europe/Berlin):")
        .with_validator(validate_timezone)
        .prompt()?;
    Ok(parse_timezone(&entered)?)
}

fn validate_timezone(input: &str) -> Result<Validation, CustomUserError> {
    Ok(match parse_timezone(input) {
        Ok(_) => Validation::Valid,
        Err(e) => Validation::Invalid(e.to_string().into()),
    })
}

async fn test_connections(config: &ClientConfig, tz: Tz) {
    println!("Testing Gmail...");
    match unread_count(config).await {
        Ok(count) => println!("  Gmail working: found {count} unread emails"),
        Err(e) => println!("  Gmail test failed: {e}"),
    }

    println!("Testing Calendar...");
    match upcoming_count(config, tz).await {
        Ok(count) => println!("  Calendar working: found {count} events in the next 7 days"),
        Err(e) => println!("  Calendar test failed: {e}"),
    }
}

async fn unread_count(config: &ClientConfig) -> ClientResult<usize> {
    let gmail = GmailClient::new(auth::connect(config, Service::Gmail).await?);
    Ok(gmail.list_messages("is:unread", 5).await?.len())
}

async fn upcoming_count(config: &ClientConfig, tz: Tz) -> ClientResult<usize> {
    let api = auth::connect(config, Service::Calendar).await?;
    let calendar = CalendarClient::new(api, config.google.calendar_id.clone());
    let now = Utc::now().with_timezone(&tz);
    let query = EventQuery::between(now, now + Duration::days(7)).with_max_results(10);
    Ok(calendar.list_events(&query).await?.len())
}

fn header(text: &str) {
    println!();
    println!("{}", "=".repeat(50));
    println!("  {text}");
    println!("{}", "=".repeat(50));
}

fn step(num: u8, text: &str) {
    println!();
    println!("Step {num}: {text}");
    println!("{}", "-".repeat(40));
}
