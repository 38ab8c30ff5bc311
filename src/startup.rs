use crate::configuration::{EmailClientSettings, Settings, TransportKind};
use crate::dispatcher::MailDispatcher;
use crate::email_client::{EmailClient, MailTransport, SmtpEmailClient};
use crate::routes::{graphql, graphql_json_error, health_check, send_email, ApiKey};
use actix_web::{dev::Server, web, App, HttpServer};
use anyhow::Context;
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let dispatcher = build_dispatcher(&configuration.email_client)?;
        let api_key = ApiKey(configuration.application.api_key);

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind {}", address))?;
        let port = listener.local_addr()?.port();
        let server = run(listener, dispatcher, api_key)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn build_transport(
    settings: &EmailClientSettings,
) -> Result<Arc<dyn MailTransport>, anyhow::Error> {
    let transport: Arc<dyn MailTransport> = match settings.transport {
        TransportKind::Http => {
            let base_url = reqwest::Url::parse(&settings.base_url)
                .context("Invalid email provider base URL")?;
            Arc::new(EmailClient::new(
                base_url,
                settings.authorization_token.clone(),
                settings.timeout(),
            ))
        }
        TransportKind::Smtp => Arc::new(SmtpEmailClient::new(
            &settings.base_url,
            settings.smtp_username.clone(),
            settings.authorization_token.clone(),
            settings.timeout(),
        )?),
    };
    Ok(transport)
}

pub fn build_dispatcher(settings: &EmailClientSettings) -> Result<MailDispatcher, anyhow::Error> {
    let sender = settings.sender().context("Invalid sender email address")?;
    let recipient = settings
        .recipient()
        .context("Invalid recipient email address")?;
    Ok(MailDispatcher::new(
        build_transport(settings)?,
        sender,
        recipient,
    ))
}

pub fn run(
    listener: TcpListener,
    dispatcher: MailDispatcher,
    api_key: ApiKey,
) -> Result<Server, std::io::Error> {
    let dispatcher = web::Data::new(dispatcher);
    let api_key = web::Data::new(api_key);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::resource("/graphql")
                    .app_data(web::JsonConfig::default().error_handler(graphql_json_error))
                    .route(web::post().to(graphql)),
            )
            .route("/send-email", web::post().to(send_email))
            .app_data(dispatcher.clone())
            .app_data(api_key.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
