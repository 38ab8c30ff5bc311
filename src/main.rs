use contact_relay::{configuration::get_configuration, startup::Application, telemetry::*};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    //setting the subscriber (telemetry)
    let subscriber = get_subscriber("contact_relay".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration().expect("Failed to load configuration file");

    let application = Application::build(configuration).await?;
    tracing::info!(port = application.port(), "Contact relay listening");
    application.run_until_stopped().await?;

    Ok(())
}
