//! Mojang profile API client

use super::{IdentityResolver, ResolutionError, ResolvedIdentity};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wlsync_types::{DisplayName, IdentityKey};

/// Resolver settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.mojang.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Profile {
    id: String,
    name: String,
}

/// Resolves names against `GET /users/profiles/minecraft/{name}?at={unix}`
pub struct MojangResolver {
    client: Client,
    base_url: String,
}

impl MojangResolver {
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolutionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ResolutionError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl IdentityResolver for MojangResolver {
    async fn resolve(
        &self,
        name: &DisplayName,
        as_of: DateTime<Utc>,
    ) -> Result<ResolvedIdentity, ResolutionError> {
        let url = format!("{}/users/profiles/minecraft/{}", self.base_url, name);
        let response = self
            .client
            .get(&url)
            .query(&[("at", as_of.timestamp())])
            .send()
            .await
            .map_err(|e| ResolutionError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => {
                return Err(ResolutionError::Unknown(name.clone()));
            }
            status => return Err(ResolutionError::Service(status.to_string())),
        }

        let profile: Profile = response
            .json()
            .await
            .map_err(|e| ResolutionError::InvalidResponse(e.to_string()))?;

        let identity = IdentityKey::parse(&profile.id)
            .map_err(|e| ResolutionError::InvalidResponse(format!("id {}: {e}", profile.id)))?;
        let display_name = DisplayName::parse(&profile.name)
            .map_err(|e| ResolutionError::InvalidResponse(e.to_string()))?;

        tracing::debug!(requested = %name, resolved = %display_name, %identity, "resolved profile");
        Ok(ResolvedIdentity {
            display_name,
            identity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn resolver(server: &MockServer) -> MojangResolver {
        MojangResolver::new(&ResolverConfig {
            base_url: server.uri(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn name(s: &str) -> DisplayName {
        DisplayName::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_resolves_canonical_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/profiles/minecraft/notch"))
            .and(query_param("at", "1600000000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "069a79f444e94726a5befca90e38aaf5",
                "name": "Notch"
            })))
            .mount(&server)
            .await;

        let as_of = Utc.timestamp_opt(1_600_000_000, 0).unwrap();
        let resolved = resolver(&server)
            .await
            .resolve(&name("notch"), as_of)
            .await
            .unwrap();

        assert_eq!(resolved.display_name, name("Notch"));
        assert_eq!(
            resolved.identity.to_string(),
            "069a79f4-44e9-4726-a5be-fca90e38aaf5"
        );
    }

    #[tokio::test]
    async fn test_unknown_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let err = resolver(&server)
            .await
            .resolve(&name("Nobody"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::Unknown(_)));
    }

    #[tokio::test]
    async fn test_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = resolver(&server)
            .await
            .resolve(&name("Steve"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::Service(_)));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "not-a-uuid",
                "name": "Steve"
            })))
            .mount(&server)
            .await;

        let err = resolver(&server)
            .await
            .resolve(&name("Steve"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let resolver = MojangResolver::new(&ResolverConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 1,
        })
        .unwrap();

        let err = resolver.resolve(&name("Steve"), Utc::now()).await.unwrap_err();
        assert!(matches!(err, ResolutionError::Transport(_)));
    }
}
