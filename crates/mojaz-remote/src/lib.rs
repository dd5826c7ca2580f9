//! Remote analysis backends over HTTP: the objection-analysis proxy contract
//! and direct Gemini `generateContent` calls.

mod error;
pub mod gemini;
pub mod prompts;
pub mod proxy;

pub use error::RemoteError;
pub use gemini::{GeminiClient, GeminiConfig};
pub use proxy::ProxyClient;

#[cfg(test)]
pub(crate) mod test_server;
