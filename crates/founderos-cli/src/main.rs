//! founderos CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use founderos_core::{TracingConfig, init_tracing};
use founderos_google::Service;

use founderos_cli::cli::{CalendarAction, Cli, Command, ConfigAction, GmailAction};
use founderos_cli::commands::{self, calendar::EventDetails};
use founderos_cli::config::ClientConfig;
use founderos_cli::error::ClientResult;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            if let Some(hint) = e.hint() {
                eprintln!("hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = ClientConfig::load(cli.config.as_deref())?;
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let tz_override = cli.tz.as_deref();

    match cli.command {
        Command::Gmail { action } => match action {
            GmailAction::Fetch { max, query, output } => {
                let tz = config.resolve_timezone(tz_override)?;
                commands::gmail::fetch(&config, tz, max, &query, output).await
            }
            GmailAction::Draft {
                to,
                subject,
                body,
                reply_to,
                cc,
            } => {
                commands::gmail::draft(
                    &config,
                    &to,
                    &subject,
                    &body,
                    reply_to.as_deref(),
                    cc.as_deref(),
                )
                .await
            }
            GmailAction::Archive { ids } => commands::gmail::archive(&config, &ids).await,
            GmailAction::Attachments { id, output } => {
                commands::gmail::attachments(&config, &id, output).await
            }
            GmailAction::Auth { force } => {
                commands::auth::login(&config, Service::Gmail, force).await
            }
        },
        Command::Calendar { action } => {
            let tz = config.resolve_timezone(tz_override)?;
            match action {
                CalendarAction::List { days, max, output } => {
                    commands::calendar::list(&config, tz, days, max, output).await
                }
                CalendarAction::Create {
                    title,
                    start,
                    end,
                    duration,
                    description,
                    location,
                    attendees,
                } => {
                    let details = EventDetails {
                        description,
                        location,
                        attendees,
                    };
                    commands::calendar::create(
                        &config,
                        tz,
                        &title,
                        &start,
                        end.as_deref(),
                        duration,
                        details,
                    )
                    .await
                }
                CalendarAction::Availability {
                    date,
                    start_hour,
                    end_hour,
                    json,
                    output,
                } => {
                    commands::calendar::availability(
                        &config, tz, &date, start_hour, end_hour, json, output,
                    )
                    .await
                }
                CalendarAction::Delete { event_id } => {
                    commands::calendar::delete(&config, &event_id).await
                }
                CalendarAction::Auth { force } => {
                    commands::auth::login(&config, Service::Calendar, force).await
                }
            }
        }
        Command::Setup => commands::setup::run(&config, &config_path).await,
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config, tz_override),
            ConfigAction::Path => commands::config::path(&config, &config_path),
        },
    }
}
