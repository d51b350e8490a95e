//! Legal-acts registry: search filters, wire types, and the HTTP client.
//!
//! A search is one GET against `{base}/acts/search`. Each raw item is
//! normalized into an [`ActRecord`] before the pipeline sees it.

pub mod act;
pub mod client;
pub mod filter;

pub use act::{ActRecord, RawAct, SearchResponse};
pub use client::{ActSource, DEFAULT_BASE_URL, DEFAULT_PUBLISHER, RegistryClient};
pub use filter::{DateRange, Period, SearchFilter, query_params};
