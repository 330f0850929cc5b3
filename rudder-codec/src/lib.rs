//! Command-to-HTTP translation for the W3C WebDriver wire protocol.
//!
//! - Registry of symbolic command names → HTTP method + path template
//! - Aliases for commands sharing an endpoint (validated at build time)
//! - Parameter amendment: legacy locators folded into CSS selectors,
//!   commands without a native endpoint emulated via injected scripts,
//!   keystrokes split per Unicode codepoint
//! - Path placeholders substituted and consumed, so identifiers never leak
//!   into request bodies
//!
//! The codec is purely computational: it turns `(command, parameters)` into
//! `(method, path, body)` and leaves the actual HTTP exchange to a transport
//! (see the `rudder-remote` crate).
//!
//! Example:
//! ```rust
//! use rudder_codec::{cmd, Command, W3cCodec};
//!
//! let codec = W3cCodec::new();
//! let request = codec.encode(
//!     &Command::new(cmd::GET_ELEMENT_DOM_ATTRIBUTE)
//!         .param("id", "e1")
//!         .param("name", "class"),
//!     Some("77aa"),
//! )?;
//! assert_eq!(request.method, http::Method::GET);
//! assert_eq!(request.path, "/session/77aa/element/e1/attribute/class");
//! assert!(request.body.is_none());
//! # Ok::<(), rudder_codec::CodecError>(())
//! ```

use http::Method;
use serde_json::{Map, Value};
use thiserror::Error;

mod amend;
pub mod atoms;
pub mod cmd;
mod element;
mod registry;
mod w3c;

pub use element::{to_wire_value, wire_element, ElementRef, ELEMENT_KEY, SHADOW_ROOT_KEY};
pub use registry::{CommandRegistry, CommandSpec};
pub use w3c::W3cCodec;

// ==============================
// Errors
// ==============================

/// Errors raised while translating a command.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The name is neither a registered command nor an alias. A programming
    /// error on the caller's side; never retried.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A `define` or `alias` tried to take a name that is already in use.
    #[error("command name already registered: {0}")]
    DuplicateCommand(String),

    /// A locator value cannot be expressed in the target selector dialect.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// An atom script was missing or unreadable. A deployment defect; the
    /// failure is reported on every use and never cached.
    #[error("failed to load atom {atom}: {source}")]
    AtomLoad {
        atom: String,
        #[source]
        source: std::io::Error,
    },

    /// A path placeholder had no usable value in the parameters (or no
    /// session was supplied for a session-scoped command).
    #[error("missing path parameter :{placeholder} for {command}")]
    MissingPathParameter { placeholder: String, command: String },
}

// ==============================
// Commands and wire requests
// ==============================

/// A logical command: a name plus its parameter mapping.
///
/// ```rust
/// use rudder_codec::{cmd, Command};
///
/// let command = Command::new(cmd::FIND_ELEMENT)
///     .param("using", "css selector")
///     .param("value", "#login");
/// assert_eq!(command.name(), "findElement");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: String,
    parameters: Map<String, Value>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Map::new(),
        }
    }

    /// Build a command around an existing parameter mapping.
    pub fn with_parameters(name: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    /// Add one parameter, replacing any previous value under the same key.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }
}

/// The HTTP request a command encodes to, ready for a transport.
///
/// `path` is absolute relative to the WebDriver server root; `body` is
/// `Some` exactly for POST requests (possibly an empty JSON object, which
/// remote ends require over a missing body).
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn command_builder_collects_parameters() {
        let command = Command::new("setTimeout").param("type", "implicit").param("ms", 500);
        assert_eq!(
            Value::Object(command.parameters().clone()),
            json!({ "type": "implicit", "ms": 500 })
        );
    }

    #[test]
    fn param_replaces_earlier_values() {
        let command = Command::new("get").param("url", "a").param("url", "b");
        assert_eq!(command.parameters()["url"], "b");
    }
}
