pub mod acquisition;
pub mod cli;
pub mod dates;
pub mod discovery;
pub mod explore;
pub mod fetch;
pub mod logging;
pub mod serper;
pub mod text;

pub use acquisition::{Acquired, AcquisitionPlan, ContentAcquirer, PageSource, Strategy};
pub use cli::{handle_command, ScraperArgs, ScraperCommands};
pub use fetch::PageFetcher;
pub use serper::SerperSearch;

pub mod prelude {
    pub use super::acquisition::ContentAcquirer;
    pub use super::fetch::PageFetcher;
    pub use nt_core::{Article, Error, Result, SearchMethod};
}
