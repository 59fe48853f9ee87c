use actix_governor::governor::middleware::StateInformationMiddleware;
use actix_governor::{
    GovernorConfig, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError,
};
use actix_web::dev::ServiceRequest;

use crate::configuration::RateLimitingSettings;

pub type RateLimitingConf = GovernorConfig<ClientAddress, StateInformationMiddleware>;

/// Rate limit the clients by their IP address.
///
/// Forwarding headers are client controlled, they are only read when a proxy is trusted to set them.
#[derive(Clone)]
pub struct ClientAddress {
    trust_proxy: bool,
}

impl KeyExtractor for ClientAddress {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        if self.trust_proxy {
            if let Some(address) = req.connection_info().realip_remote_addr() {
                return Ok(address.to_owned());
            }
        }

        req.peer_addr()
            .map(|address| address.ip().to_string())
            .ok_or_else(|| SimpleKeyExtractionError::new("Can't extract client address"))
    }
}

pub fn build_rate_limiting_conf(settings: &RateLimitingSettings) -> anyhow::Result<RateLimitingConf> {
    GovernorConfigBuilder::default()
        .per_second(settings.fill_rate)
        .burst_size(settings.bucket_size)
        .key_extractor(ClientAddress {
            trust_proxy: settings.trust_proxy,
        })
        .use_headers()
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Rate limiting fill rate and bucket size must not be zero"))
}
