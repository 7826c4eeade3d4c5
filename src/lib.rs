//! Fetch web pages without errors escaping across the API.
//!
//! Every call to [`Fetcher::get_page`] yields an [`Outcome`]: the page body,
//! a structured [`PageFailure`] such as a 404, or the captured transport fault.

pub mod config;
pub mod connector;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod middleware;
pub mod outcome;

pub use config::FetchConfig;
pub use error::{ConfigError, WrongVariantError};
pub use fetcher::Fetcher;
pub use http::{PageFailure, RawResponse, Target};
pub use outcome::{Outcome, PageOutcome};
