mod graphql;
mod health_check;
mod send_email;

pub use graphql::*;
pub use health_check::*;
pub use send_email::*;

use actix_web::HttpRequest;
use secrecy::{ExposeSecret, Secret};

pub const API_KEY_HEADER: &str = "x-api-key";

/// The static credential every caller of the remote operations must present.
pub struct ApiKey(pub Secret<String>);

impl ApiKey {
    pub fn is_presented_by(&self, request: &HttpRequest) -> bool {
        request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value == self.0.expose_secret())
            .unwrap_or(false)
    }
}
