//! Law Digest: weekly digest of newly effective legal acts.

pub mod channels;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod registry;
pub mod summarizer;
