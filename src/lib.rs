pub mod client_config;
pub mod configuration;
pub mod controller;
pub mod dispatcher;
pub mod domain;
pub mod email_client;
pub mod gateway;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod templates;
