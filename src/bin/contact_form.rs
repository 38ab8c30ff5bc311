use anyhow::Context;
use clap::Parser;
use contact_relay::client_config::{load_client_config, ClientConfig, ConfigSource};
use contact_relay::controller::{ContactFormController, FormStatus, SubmitOutcome};
use contact_relay::gateway::GraphQlGateway;
use contact_relay::telemetry::{get_subscriber, init_subscriber};
use std::process::ExitCode;

/// Submit the website contact form from the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Client configuration: a local JSON file or an http(s) URL.
    #[arg(long, default_value = "contact_outputs.json")]
    config: String,

    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    message: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let subscriber = get_subscriber("contact_form".into(), "warn".into(), std::io::stderr);
    init_subscriber(subscriber);

    let cli = Cli::parse();

    let source = ConfigSource::parse(&cli.config).context("Invalid --config location")?;
    let controller = match load_client_config(&source).await? {
        ClientConfig::Configured(settings) => {
            ContactFormController::new(GraphQlGateway::from_settings(&settings.api))
        }
        ClientConfig::Unconfigured => ContactFormController::unconfigured(),
    };

    controller.set_name(cli.name);
    controller.set_email(cli.email);
    controller.set_message(cli.message);

    match controller.submit().await {
        SubmitOutcome::Invalid(e) => {
            eprintln!("Please fill in every field: {}", e);
            return Ok(ExitCode::FAILURE);
        }
        SubmitOutcome::Ignored if controller.status() == FormStatus::Unconfigured => {
            eprintln!("The contact form is not configured yet ({}).", cli.config);
            return Ok(ExitCode::FAILURE);
        }
        SubmitOutcome::Ignored | SubmitOutcome::Completed(_) => {}
    }

    let banner = controller.banner().unwrap_or_default();
    if controller.status() == FormStatus::Success {
        println!("{}", banner);
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{}", banner);
        Ok(ExitCode::FAILURE)
    }
}
