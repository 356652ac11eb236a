//! # Remote API Client
//!
//! Thin reqwest wrapper over the two read-only endpoints a record is built
//! from: the entity by id and the species document by URL.
//!
//! Status mapping:
//! - 404 on the entity endpoint is `NotFound`
//! - any other non-success status, transport failure or undecodable body is
//!   `Upstream`

use pokedex_core::{DexError, PokemonId, PokemonPayload, SpeciesPayload};
use serde::de::DeserializeOwned;

/// HTTP client for a PokeAPI-compatible server.
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl PokeApiClient {
    /// Create a client for the API rooted at `base_url` (e.g. `https://pokeapi.co/api/v2`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a GET and handle connection errors.
    async fn send(&self, url: &str) -> Result<reqwest::Response, DexError> {
        tracing::debug!(url = %url, "remote request");
        self.http
            .get(url)
            .send()
            .await
            .map_err(|e| DexError::Upstream(format!("{}: {}", url, e)))
    }

    /// Check the status and decode the JSON body.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        url: &str,
        resp: reqwest::Response,
    ) -> Result<T, DexError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(DexError::Upstream(format!("{} returned {}", url, status)));
        }
        resp.json::<T>()
            .await
            .map_err(|e| DexError::Upstream(format!("{}: invalid body: {}", url, e)))
    }

    /// GET /pokemon/{id}
    pub async fn pokemon(&self, id: PokemonId) -> Result<PokemonPayload, DexError> {
        let url = format!("{}/pokemon/{}", self.base_url, id.0);
        let resp = self.send(&url).await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(DexError::NotFound(id));
        }
        self.handle_response(&url, resp).await
    }

    /// GET the species document at the URL embedded in an entity.
    pub async fn species(&self, url: &str) -> Result<SpeciesPayload, DexError> {
        let resp = self.send(url).await?;
        self.handle_response(url, resp).await
    }

    /// GET /pokemon-species/{id}
    pub async fn species_by_id(&self, id: PokemonId) -> Result<SpeciesPayload, DexError> {
        let url = format!("{}/pokemon-species/{}", self.base_url, id.0);
        self.species(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_trimmed() {
        let client = PokeApiClient::new("http://localhost:9000/api/v2/");
        assert_eq!(client.base_url(), "http://localhost:9000/api/v2");
    }

    #[tokio::test]
    async fn unreachable_host_is_upstream() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|l| l.local_addr())
            .expect("bind")
            .port();
        // Listener is dropped, so the port refuses connections
        let client = PokeApiClient::new(format!("http://127.0.0.1:{}", port));
        let result = client.pokemon(PokemonId(1)).await;
        assert!(matches!(result, Err(DexError::Upstream(_))));
    }
}
