use crate::wttr::{summarize, Report};
use anyhow::{anyhow, bail, Context, Result};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const BASE_URL: &str = "https://wttr.in";

pub trait HttpGet: Send + Sync {
    fn get(&self, url: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct ReqwestHttp {
    client: reqwest::blocking::Client,
}

impl ReqwestHttp {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pidash/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build http client")?;
        Ok(Self { client })
    }
}

impl HttpGet for ReqwestHttp {
    fn get(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("request to {url} was rejected"))?;
        response
            .text()
            .with_context(|| format!("failed to read body from {url}"))
    }
}

pub trait SummarySource: Send + Sync {
    fn fetch_summary(&self) -> Result<String>;
}

/// wttr.in summary: the JSON report first, then the one-line text format.
#[derive(Debug, Clone)]
pub struct WeatherSource<H> {
    http: H,
    location: String,
}

impl<H: HttpGet> WeatherSource<H> {
    pub fn new(http: H, location: &str) -> Self {
        Self {
            http,
            location: location.trim().replace(' ', "+"),
        }
    }

    pub fn structured_url(&self) -> String {
        format!("{BASE_URL}/{}?format=j1", self.location)
    }

    pub fn text_url(&self) -> String {
        format!("{BASE_URL}/{}?format=%C+%t+%h", self.location)
    }

    pub fn fetch_structured(&self) -> Result<String> {
        let body = self.http.get(&self.structured_url())?;
        let report: Report =
            serde_json::from_str(&body).context("weather report is not valid json")?;
        Ok(summarize(&report))
    }

    pub fn fetch_text(&self) -> Result<String> {
        let body = self.http.get(&self.text_url())?;
        let line = body
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| anyhow!("weather text response was empty"))?;

        if line.starts_with('<') || line.to_ascii_lowercase().contains("unknown location") {
            bail!("weather text response was not a summary: {line}");
        }

        Ok(line.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

impl<H: HttpGet> SummarySource for WeatherSource<H> {
    fn fetch_summary(&self) -> Result<String> {
        match self.fetch_structured() {
            Ok(summary) if !summary.is_empty() => return Ok(summary),
            Ok(_) => debug!("weather report carried no usable fields"),
            Err(err) => debug!("structured weather fetch failed: {err:#}"),
        }

        self.fetch_text().context("both weather tiers failed")
    }
}
