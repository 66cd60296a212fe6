use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use nt_core::Error;

pub const DEFAULT_SOURCES_URL: &str = "http://localhost:8002";
pub const DEFAULT_SCRAPER_URL: &str = "http://localhost:8000";
pub const SOURCES_TIMEOUT: Duration = Duration::from_secs(30);
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Which routes a process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Scraper,
    Sources,
    Coordinator,
    All,
}

impl Service {
    pub fn default_port(&self) -> u16 {
        match self {
            Service::Scraper | Service::All => 8000,
            Service::Sources => 8002,
            Service::Coordinator => 8003,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Scraper => "scraper",
            Service::Sources => "sources",
            Service::Coordinator => "coordinator",
            Service::All => "all",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scraper" => Ok(Service::Scraper),
            "sources" => Ok(Service::Sources),
            "coordinator" => Ok(Service::Coordinator),
            "all" => Ok(Service::All),
            other => Err(Error::Config(format!(
                "Unknown service '{}'. Expected scraper, sources, coordinator or all",
                other
            ))),
        }
    }
}

/// Wiring between services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the sources service used by the coordinator.
    pub sources_url: String,
    /// Base URL of the scraper service used by the coordinator.
    pub scraper_url: String,
    /// Markdown system prompt for source generation.
    pub sources_prompt: PathBuf,
    pub sources_timeout: Duration,
    pub search_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            sources_url: DEFAULT_SOURCES_URL.to_string(),
            scraper_url: DEFAULT_SCRAPER_URL.to_string(),
            sources_prompt: PathBuf::from(nt_inference::sources::DEFAULT_PROMPT_FILE),
            sources_timeout: SOURCES_TIMEOUT,
            search_timeout: SEARCH_TIMEOUT,
        }
    }
}

impl ServiceConfig {
    /// Defaults for a process serving `service` on `port`. A process serving
    /// every route sends coordinator calls to itself.
    pub fn for_service(service: Service, port: u16) -> Self {
        let mut config = Self::default();
        if service == Service::All {
            let local = format!("http://localhost:{}", port);
            config.sources_url = local.clone();
            config.scraper_url = local;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_ports() {
        assert_eq!("sources".parse::<Service>().unwrap().default_port(), 8002);
        assert_eq!("Coordinator".parse::<Service>().unwrap().default_port(), 8003);
        assert_eq!(Service::Scraper.default_port(), 8000);
        assert!("proxy".parse::<Service>().is_err());
    }

    #[test]
    fn test_all_service_calls_itself() {
        let config = ServiceConfig::for_service(Service::All, Service::All.default_port());
        assert_eq!(config.sources_url, "http://localhost:8000");
        assert_eq!(config.scraper_url, "http://localhost:8000");

        let config = ServiceConfig::for_service(Service::All, 9100);
        assert!(config.sources_url.ends_with(":9100"));

        let config = ServiceConfig::for_service(Service::Coordinator, 8003);
        assert_eq!(config.sources_url, DEFAULT_SOURCES_URL);
        assert_eq!(config.scraper_url, DEFAULT_SCRAPER_URL);
    }
}
