pub mod analysis;
pub mod args;
pub mod auth;
pub mod client;
pub mod error;
pub mod fetch;
pub mod http;
pub mod profile;
pub mod report;
pub mod utils;

pub use analysis::{analyze, AccountSet, AnalysisResult};
pub use args::Args;
pub use client::{InstagramClient, ProfileHandle, ProfileStats, Session};
pub use error::{AuthError, ClientError, FetchWarning, ResolveError};
pub use report::Report;
