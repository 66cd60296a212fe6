use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use nt_core::{Extraction, InferenceModel, SearchMethod, WebSearch};
use nt_inference::{ArticleExtractor, SourceFinder};
use nt_scrappers::cli::{handle_command, ScraperArgs};
use nt_scrappers::fetch::DEFAULT_FETCH_TIMEOUT;
use nt_scrappers::logging::init_logging;
use nt_scrappers::{ContentAcquirer, PageFetcher, SerperSearch};
use nt_web::{AppState, Service, ServiceConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(
        long,
        env = "NT_MODEL",
        default_value = "groq",
        help = "Model provider to use for inference. Available providers: groq (default), deepseek, ollama"
    )]
    model: String,
    #[arg(long, env = "NT_MODEL_URL")]
    model_url: Option<String>,
    /// Model identifier passed to the provider, e.g. llama-3.3-70b-versatile
    #[arg(long)]
    model_id: Option<String>,
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "SERPER_API_KEY", hide_env_values = true)]
    serper_api_key: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run one service, or all of them in one process
    Serve {
        #[arg(long, default_value = "all", help = "scraper, sources, coordinator or all")]
        service: Service,
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Defaults to 8000 for scraper and all, 8002 for sources, 8003 for coordinator
        #[arg(long)]
        port: Option<u16>,
        /// Defaults to this process for all, otherwise http://localhost:8002
        #[arg(long, env = "NT_SOURCES_URL")]
        sources_url: Option<String>,
        /// Defaults to this process for all, otherwise http://localhost:8000
        #[arg(long, env = "NT_SCRAPER_URL")]
        scraper_url: Option<String>,
        /// Directory holding news_sources.md
        #[arg(long, env = "NT_PROMPTS_DIR", default_value = "prompts")]
        prompts_dir: PathBuf,
    },
    /// Search one site for articles matching a query
    Search {
        url: String,
        query: String,
        #[arg(long, default_value = "combined", help = "direct_scrape, serper or combined")]
        method: SearchMethod,
    },
    /// Suggest news sources for a question
    Sources {
        question: String,
        #[arg(long, env = "NT_PROMPTS_DIR", default_value = "prompts")]
        prompts_dir: PathBuf,
    },
    /// Inspect a site without a model
    Scrape(ScraperArgs),
}

impl Cli {
    fn inference_config(&self) -> nt_inference::Config {
        nt_inference::Config {
            api_key: self.api_key.clone(),
            model_name: Some(self.model.clone()),
            model_url: self.model_url.clone(),
            model_id: self.model_id.clone(),
        }
    }

    async fn inference(&self) -> anyhow::Result<Arc<dyn InferenceModel>> {
        let inference = nt_inference::create_model(Some(self.inference_config())).await?;
        info!("🧠 Inference model initialized successfully (using {})", inference.name());
        Ok(inference)
    }

    fn web_search(&self, fetcher: &PageFetcher) -> Option<Arc<dyn WebSearch>> {
        SerperSearch::from_key(fetcher.client().clone(), self.serper_api_key.clone())
            .map(|search| Arc::new(search) as Arc<dyn WebSearch>)
    }
}

fn prompt_file(prompts_dir: &Path) -> PathBuf {
    prompts_dir.join("news_sources.md")
}

fn service_config(
    service: Service,
    port: u16,
    sources_url: Option<&String>,
    scraper_url: Option<&String>,
    prompts_dir: &Path,
) -> ServiceConfig {
    let mut config = ServiceConfig::for_service(service, port);
    if let Some(url) = sources_url {
        config.sources_url = url.clone();
    }
    if let Some(url) = scraper_url {
        config.scraper_url = url.clone();
    }
    config.sources_prompt = prompt_file(prompts_dir);
    config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let fetcher = PageFetcher::new(DEFAULT_FETCH_TIMEOUT)?;

    match &cli.command {
        Commands::Serve {
            service,
            host,
            port,
            sources_url,
            scraper_url,
            prompts_dir,
        } => {
            let port = port.unwrap_or(service.default_port());
            let config = service_config(*service, port, sources_url.as_ref(), scraper_url.as_ref(), prompts_dir);
            let addr: SocketAddr = format!("{}:{}", host, port)
                .parse()
                .with_context(|| format!("Invalid listen address {}", host))?;

            let state = AppState::with_fetcher(fetcher.clone(), cli.inference().await?, cli.web_search(&fetcher), &config);
            nt_web::serve(state, *service, addr).await?;
        }
        Commands::Search { url, query, method } => {
            info!("🦗 Searching {} for '{}' ({})", url, query, method);
            let acquirer = ContentAcquirer::new(fetcher.clone(), cli.web_search(&fetcher));
            let domain = nt_core::domain::check_allowed(url)?;
            let acquired = acquirer.acquire(url, query, *method).await?;

            let extractor = ArticleExtractor::new(cli.inference().await?);
            match extractor.extract(&acquired.into_context(url, query, &domain)).await? {
                Extraction::Articles(articles) => println!("{}", serde_json::to_string_pretty(&articles)?),
                Extraction::NotFound(not_found) => println!("No articles found: {}", not_found.reason),
            }
        }
        Commands::Sources { question, prompts_dir } => {
            let finder = SourceFinder::from_prompt_file(cli.inference().await?, prompt_file(prompts_dir));
            let sources = finder.find(question).await?;
            println!("{}", serde_json::to_string_pretty(&sources)?);
        }
        Commands::Scrape(args) => {
            handle_command(args.clone(), &fetcher).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["nt", "serve", "--service", "sources", "--port", "9002"]).unwrap();
        match cli.command {
            Commands::Serve { service, port, .. } => {
                assert_eq!(service, Service::Sources);
                assert_eq!(port, Some(9002));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_default_serve_coordinates_with_itself() {
        let cli = Cli::try_parse_from(["nt", "serve", "--port", "9000"]).unwrap();
        match cli.command {
            Commands::Serve {
                service,
                port,
                sources_url,
                scraper_url,
                prompts_dir,
                ..
            } => {
                assert_eq!(service, Service::All);
                let port = port.unwrap_or(service.default_port());
                let config = service_config(service, port, sources_url.as_ref(), scraper_url.as_ref(), &prompts_dir);
                assert_eq!(config.sources_url, "http://localhost:9000");
                assert_eq!(config.scraper_url, "http://localhost:9000");
                assert_eq!(config.sources_prompt, PathBuf::from("prompts/news_sources.md"));
            }
            other => panic!("unexpected command {other:?}"),
        }

        let explicit = service_config(
            Service::All,
            8000,
            Some(&"http://sources:8002".to_string()),
            None,
            Path::new("prompts"),
        );
        assert_eq!(explicit.sources_url, "http://sources:8002");
        assert_eq!(explicit.scraper_url, "http://localhost:8000");
    }

    #[test]
    fn test_parse_search_method() {
        let cli = Cli::try_parse_from(["nt", "search", "https://www.example.com", "rates", "--method", "serper"]).unwrap();
        assert!(matches!(cli.command, Commands::Search { method: SearchMethod::Serper, .. }));

        assert!(Cli::try_parse_from(["nt", "search", "https://www.example.com", "rates", "--method", "both"]).is_err());
    }

    #[test]
    fn test_parse_scrape_subcommand() {
        let cli = Cli::try_parse_from(["nt", "scrape", "explore", "https://www.example.com"]).unwrap();
        assert!(matches!(cli.command, Commands::Scrape(_)));
    }
}
