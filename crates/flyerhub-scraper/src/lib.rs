pub mod chrome;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod pagination;
pub mod runner;
pub mod session;
pub mod stores;

#[cfg(test)]
pub(crate) mod testutil;

pub use chrome::{ChromeBrowser, LaunchOptions};
pub use error::ScraperError;
pub use runner::{collect_all, run_update};
pub use session::{BrowserSession, SessionError};
