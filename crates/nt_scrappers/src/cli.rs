use clap::{Args, Subcommand};
use nt_core::Result;

use crate::explore::explore;
use crate::fetch::PageFetcher;
use crate::text::scrape_text;

#[derive(Args, Clone, Debug)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ScraperCommands {
    /// Describe a site's links, sections and search form
    Explore {
        /// Homepage URL of the site
        url: String,
    },
    /// Print the visible text of a page
    Text {
        url: String,
    },
}

pub async fn handle_command(args: ScraperArgs, fetcher: &PageFetcher) -> Result<()> {
    match args.command {
        ScraperCommands::Explore { url } => {
            let (structure, _) = explore(fetcher, &url).await?;
            println!("{}", serde_json::to_string_pretty(&structure)?);
        }
        ScraperCommands::Text { url } => {
            let page = scrape_text(fetcher, &url).await?;
            println!("{} ({} characters)", page.url, page.length);
            println!("{}", page.text);
        }
    }
    Ok(())
}
