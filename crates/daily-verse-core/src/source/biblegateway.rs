use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{PassageSource, VerseOfTheDay};

const DEFAULT_BASE_URL: &str = "https://www.biblegateway.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9,ru;q=0.8";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct VotdResponse {
    votd: VerseOfTheDay,
}

#[derive(Clone)]
pub struct BibleGatewayClient {
    client: Client,
    base_url: String,
}

impl BibleGatewayClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for BibleGatewayClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PassageSource for BibleGatewayClient {
    async fn verse_of_the_day(&self, translation: &str) -> Result<VerseOfTheDay> {
        let url = format!("{}/votd/get/", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("version", translation)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Bible Gateway votd error {}: {}", status, text));
        }

        let votd_response: VotdResponse = response.json().await?;
        if votd_response.votd.display_ref.trim().is_empty() {
            return Err(anyhow!("Bible Gateway votd response has no display_ref"));
        }
        Ok(votd_response.votd)
    }

    async fn passage_html(&self, reference: &str, translation: &str) -> Result<String> {
        let url = format!("{}/passage/", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("search", reference), ("version", translation)])
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Bible Gateway passage request failed with status: {}",
                response.status()
            ));
        }

        Ok(response.text().await?)
    }
}
