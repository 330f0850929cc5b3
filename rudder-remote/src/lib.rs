//! Remote end of the WebDriver client: ships encoded commands over HTTP
//! and unwraps the `{"value": ...}` response envelope.
//!
//! - [`Transport`] is the seam between the codec and the wire. The stock
//!   implementation, [`ReqwestTransport`], anchors a reqwest client to a
//!   server base URL and preserves base paths such as `/wd/hub`.
//! - [`RemoteSession`] owns a codec plus a transport and threads the
//!   session id into every encoded path.
//!
//! ```no_run
//! # async fn demo() -> Result<(), rudder_remote::RemoteError> {
//! use rudder_remote::{RemoteSession, ReqwestTransport};
//! use serde_json::json;
//!
//! let transport = ReqwestTransport::new("http://localhost:9515")?;
//! let session = RemoteSession::start(transport, json!({ "alwaysMatch": {} })).await?;
//! session.goto("https://example.com").await?;
//! println!("{}", session.title().await?);
//! session.quit().await?;
//! # Ok(()) }
//! ```

use http::StatusCode;
use thiserror::Error;

mod session;
mod transport;

pub use session::RemoteSession;
pub use transport::{ReqwestTransport, Transport, WireResponse};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("invalid WebDriver URL: {0}")]
    Url(String),

    #[error("client build failed: {0}")]
    Build(String),

    #[error("codec error: {0}")]
    Codec(#[from] rudder_codec::CodecError),

    #[error("network error: {0}")]
    Network(String),

    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),

    /// The server answered with a non-2xx W3C error document.
    #[error("webdriver error {status}: [{error}] {message}")]
    WebDriver {
        status: StatusCode,
        error: String,
        message: String,
    },
}
