pub mod client;
pub mod config;
pub mod error;
pub mod models;
#[cfg(test)]
mod testutils;
pub mod utils;

pub use client::{VaultBackend, VaultClient};
pub use config::{ClientConfig, DEFAULT_API_HOST};
pub use error::{Result, VaultError};
pub use models::{
    ComplexResult, FileContents, FileStat, MatchSpan, ParsePeriodError, Period, QueryType,
    SearchMatch, SearchResult,
};
pub use utils::{date_path, dql_string, encode_vault_path};
