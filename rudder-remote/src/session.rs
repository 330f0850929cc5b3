//! Session facade: encodes commands, ships them, and unwraps the
//! `{"value": ...}` envelope that every W3C response carries.

use serde::Deserialize;
use serde_json::Value;

use rudder_codec::atoms::DirAtoms;
use rudder_codec::{Command, ElementRef, W3cCodec, cmd};
use rudder_common::RemoteConfig;

use crate::RemoteError;
use crate::transport::{ReqwestTransport, Transport, WireResponse};

/// A live WebDriver session bound to one codec and one transport.
///
/// Every call goes through [`RemoteSession::execute`], so vendor commands
/// registered on the codec are driven the same way as the stock table.
pub struct RemoteSession<T: Transport> {
    codec: W3cCodec,
    transport: T,
    session_id: Option<String>,
}

impl<T: Transport> RemoteSession<T> {
    /// Open a new session on the remote end.
    ///
    /// `capabilities` is the W3C capabilities request, i.e. the object with
    /// `alwaysMatch` / `firstMatch` members.
    pub async fn start(transport: T, capabilities: Value) -> Result<Self, RemoteError> {
        Self::boot(W3cCodec::new(), transport, capabilities).await
    }

    async fn boot(codec: W3cCodec, transport: T, capabilities: Value) -> Result<Self, RemoteError> {
        let mut session = Self {
            codec,
            transport,
            session_id: None,
        };
        let value = session
            .execute(Command::new(cmd::NEW_SESSION).param("capabilities", capabilities))
            .await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                RemoteError::Decode(
                    "newSession response lacks a sessionId".to_string(),
                    snip_value(&value),
                )
            })?
            .to_string();
        tracing::info!(session_id = %session_id, "webdriver.session.started");
        session.session_id = Some(session_id);
        Ok(session)
    }

    /// Adopt a session that is already running on the server.
    pub fn attach(transport: T, session_id: impl Into<String>) -> Self {
        Self {
            codec: W3cCodec::new(),
            transport,
            session_id: Some(session_id.into()),
        }
    }

    /// Swap in a customised codec (vendor commands, on-disk atoms).
    pub fn with_codec(mut self, codec: W3cCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Encode `command`, send it, and return the envelope's `value`.
    pub async fn execute(&self, command: Command) -> Result<Value, RemoteError> {
        let request = self.codec.encode(&command, self.session_id.as_deref())?;
        let response = self.transport.send(&request).await?;
        decode_envelope(command.name(), response)
    }

    /// End the session on the remote end.
    pub async fn quit(self) -> Result<(), RemoteError> {
        self.execute(Command::new(cmd::QUIT)).await?;
        if let Some(id) = &self.session_id {
            tracing::info!(session_id = %id, "webdriver.session.ended");
        }
        Ok(())
    }

    // ========================================================================
    // Navigation & page state
    // ========================================================================

    /// Navigate to `url`.
    pub async fn goto(&self, url: &str) -> Result<(), RemoteError> {
        self.execute(Command::new(cmd::GET).param("url", url))
            .await?;
        Ok(())
    }

    /// Return the current page URL.
    pub async fn current_url(&self) -> Result<String, RemoteError> {
        let value = self.execute(Command::new(cmd::GET_CURRENT_URL)).await?;
        expect_string(cmd::GET_CURRENT_URL, value)
    }

    /// Return the page title.
    pub async fn title(&self) -> Result<String, RemoteError> {
        let value = self.execute(Command::new(cmd::GET_TITLE)).await?;
        expect_string(cmd::GET_TITLE, value)
    }

    /// Return the full page HTML, serialised in the browser.
    pub async fn page_source(&self) -> Result<String, RemoteError> {
        let value = self.execute(Command::new(cmd::GET_PAGE_SOURCE)).await?;
        expect_string(cmd::GET_PAGE_SOURCE, value)
    }

    /// Capture the viewport as a base64-encoded PNG.
    pub async fn screenshot(&self) -> Result<String, RemoteError> {
        let value = self.execute(Command::new(cmd::SCREENSHOT)).await?;
        expect_string(cmd::SCREENSHOT, value)
    }

    // ========================================================================
    // Elements
    // ========================================================================

    /// Find a single element. Legacy strategies such as `"id"` or
    /// `"class name"` are rewritten to CSS before hitting the wire.
    pub async fn find_element(
        &self,
        using: &str,
        value: &str,
    ) -> Result<ElementRef, RemoteError> {
        let answer = self
            .execute(
                Command::new(cmd::FIND_ELEMENT)
                    .param("using", using)
                    .param("value", value),
            )
            .await?;
        expect_element(cmd::FIND_ELEMENT, &answer)
    }

    /// Find zero or more elements.
    pub async fn find_elements(
        &self,
        using: &str,
        value: &str,
    ) -> Result<Vec<ElementRef>, RemoteError> {
        let answer = self
            .execute(
                Command::new(cmd::FIND_ELEMENTS)
                    .param("using", using)
                    .param("value", value),
            )
            .await?;
        let items = answer.as_array().ok_or_else(|| {
            RemoteError::Decode(
                format!("{} returned a non-array value", cmd::FIND_ELEMENTS),
                snip_value(&answer),
            )
        })?;
        items
            .iter()
            .map(|item| expect_element(cmd::FIND_ELEMENTS, item))
            .collect()
    }

    /// Click `element`.
    pub async fn click(&self, element: &ElementRef) -> Result<(), RemoteError> {
        self.execute(Command::new(cmd::CLICK_ELEMENT).param("id", element.id()))
            .await?;
        Ok(())
    }

    /// Clear a text input or content-editable element.
    pub async fn clear(&self, element: &ElementRef) -> Result<(), RemoteError> {
        self.execute(Command::new(cmd::CLEAR_ELEMENT).param("id", element.id()))
            .await?;
        Ok(())
    }

    /// Type `text` into `element`.
    pub async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), RemoteError> {
        self.execute(
            Command::new(cmd::SEND_KEYS_TO_ELEMENT)
                .param("id", element.id())
                .param("value", text),
        )
        .await?;
        Ok(())
    }

    /// Return the element's visible text.
    pub async fn element_text(&self, element: &ElementRef) -> Result<String, RemoteError> {
        let value = self
            .execute(Command::new(cmd::GET_ELEMENT_TEXT).param("id", element.id()))
            .await?;
        expect_string(cmd::GET_ELEMENT_TEXT, value)
    }

    /// Read an attribute the way Selenium historically did: the in-page
    /// script falls back from DOM properties to content attributes.
    pub async fn attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, RemoteError> {
        let value = self
            .execute(
                Command::new(cmd::GET_ELEMENT_ATTRIBUTE)
                    .param("id", element.id())
                    .param("name", name),
            )
            .await?;
        optional_string(cmd::GET_ELEMENT_ATTRIBUTE, value)
    }

    /// Read the content attribute exactly as written in the document.
    pub async fn dom_attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, RemoteError> {
        let value = self
            .execute(
                Command::new(cmd::GET_ELEMENT_DOM_ATTRIBUTE)
                    .param("id", element.id())
                    .param("name", name),
            )
            .await?;
        optional_string(cmd::GET_ELEMENT_DOM_ATTRIBUTE, value)
    }

    /// Whether the element is rendered visible.
    pub async fn is_displayed(&self, element: &ElementRef) -> Result<bool, RemoteError> {
        let value = self
            .execute(Command::new(cmd::IS_ELEMENT_DISPLAYED).param("id", element.id()))
            .await?;
        value.as_bool().ok_or_else(|| {
            RemoteError::Decode(
                format!("{} returned a non-boolean value", cmd::IS_ELEMENT_DISPLAYED),
                snip_value(&value),
            )
        })
    }

    // ========================================================================
    // Scripts, timeouts, alerts, storage
    // ========================================================================

    /// Run a script in the page and return its result.
    pub async fn execute_script(
        &self,
        script: &str,
        args: Vec<Value>,
    ) -> Result<Value, RemoteError> {
        self.execute(
            Command::new(cmd::EXECUTE_SCRIPT)
                .param("script", script)
                .param("args", args),
        )
        .await
    }

    /// Set one timeout, e.g. `("implicit", 5000)`.
    pub async fn set_timeout(&self, kind: &str, ms: u64) -> Result<(), RemoteError> {
        self.execute(
            Command::new(cmd::SET_TIMEOUT)
                .param("type", kind)
                .param("ms", ms),
        )
        .await?;
        Ok(())
    }

    /// Return the text of the open alert.
    pub async fn alert_text(&self) -> Result<String, RemoteError> {
        let value = self.execute(Command::new(cmd::GET_ALERT_TEXT)).await?;
        expect_string(cmd::GET_ALERT_TEXT, value)
    }

    /// Type `text` into the open prompt.
    pub async fn set_alert_text(&self, text: &str) -> Result<(), RemoteError> {
        self.execute(Command::new(cmd::SET_ALERT_VALUE).param("text", text))
            .await?;
        Ok(())
    }

    /// Accept the open alert.
    pub async fn accept_alert(&self) -> Result<(), RemoteError> {
        self.execute(Command::new(cmd::ACCEPT_ALERT)).await?;
        Ok(())
    }

    /// Dismiss the open alert.
    pub async fn dismiss_alert(&self) -> Result<(), RemoteError> {
        self.execute(Command::new(cmd::DISMISS_ALERT)).await?;
        Ok(())
    }

    /// Read one localStorage entry, emulated via script.
    pub async fn local_storage_item(&self, key: &str) -> Result<Option<String>, RemoteError> {
        let value = self
            .execute(Command::new(cmd::GET_LOCAL_STORAGE_ITEM).param("key", key))
            .await?;
        optional_string(cmd::GET_LOCAL_STORAGE_ITEM, value)
    }

    /// Write one localStorage entry, emulated via script.
    pub async fn set_local_storage_item(&self, key: &str, value: &str) -> Result<(), RemoteError> {
        self.execute(
            Command::new(cmd::SET_LOCAL_STORAGE_ITEM)
                .param("key", key)
                .param("value", value),
        )
        .await?;
        Ok(())
    }

    /// List localStorage keys, emulated via script.
    pub async fn local_storage_keys(&self) -> Result<Vec<String>, RemoteError> {
        let value = self.execute(Command::new(cmd::GET_LOCAL_STORAGE_KEYS)).await?;
        serde_json::from_value(value.clone()).map_err(|e| {
            RemoteError::Decode(
                format!("{}: {e}", cmd::GET_LOCAL_STORAGE_KEYS),
                snip_value(&value),
            )
        })
    }
}

impl RemoteSession<ReqwestTransport> {
    /// Open a session using connection settings from `config`: endpoint and
    /// timeouts feed the transport, and an `atom_dir` (if set) swaps the
    /// bundled atoms for on-disk copies.
    pub async fn start_with_config(
        config: &RemoteConfig,
        capabilities: Value,
    ) -> Result<Self, RemoteError> {
        let transport = ReqwestTransport::from_config(config)?;
        let codec = match &config.atom_dir {
            Some(dir) => W3cCodec::with_atoms(DirAtoms::new(dir)),
            None => W3cCodec::new(),
        };
        Self::boot(codec, transport, capabilities).await
    }
}

// ============================================================================
// Envelope decoding
// ============================================================================

/// Parse the response body, unwrap `value` on success, and turn a non-2xx
/// answer into a [`RemoteError::WebDriver`] with the server's error code.
fn decode_envelope(command: &str, response: WireResponse) -> Result<Value, RemoteError> {
    let snippet = snip_bytes(&response.body);
    let parsed: Value = serde_json::from_slice(&response.body).map_err(|e| {
        tracing::warn!(command, message = %e, body_snippet = %snippet, "webdriver.decode_error");
        RemoteError::Decode(e.to_string(), snippet.clone())
    })?;

    if response.status.is_success() {
        let value = match parsed {
            Value::Object(mut map) => map.remove("value").unwrap_or(Value::Null),
            _ => Value::Null,
        };
        return Ok(value);
    }

    let (error, message) = extract_error(&parsed);
    tracing::warn!(
        command,
        status = %response.status,
        error = %error,
        message = %message,
        "webdriver.error"
    );
    Err(RemoteError::WebDriver {
        status: response.status,
        error,
        message,
    })
}

/// Pull `(error, message)` out of an error document, probing the W3C
/// envelope first and a flat legacy shape second.
fn extract_error(body: &Value) -> (String, String) {
    #[derive(Deserialize)]
    struct Envelope {
        value: Detail,
    }
    #[derive(Deserialize)]
    struct Detail {
        #[serde(default)]
        error: String,
        #[serde(default)]
        message: String,
    }
    #[derive(Deserialize)]
    struct Flat {
        #[serde(default)]
        error: String,
        #[serde(default)]
        message: String,
    }

    if let Ok(doc) = serde_json::from_value::<Envelope>(body.clone()) {
        if !doc.value.error.is_empty() || !doc.value.message.is_empty() {
            return (doc.value.error, doc.value.message);
        }
    }
    if let Ok(doc) = serde_json::from_value::<Flat>(body.clone()) {
        if !doc.error.is_empty() || !doc.message.is_empty() {
            return (doc.error, doc.message);
        }
    }
    ("unknown error".to_string(), snip_value(body))
}

fn expect_string(command: &str, value: Value) -> Result<String, RemoteError> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        RemoteError::Decode(
            format!("{command} returned a non-string value"),
            snip_value(&value),
        )
    })
}

fn optional_string(command: &str, value: Value) -> Result<Option<String>, RemoteError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        other => Err(RemoteError::Decode(
            format!("{command} returned a non-string value"),
            snip_value(&other),
        )),
    }
}

fn expect_element(command: &str, value: &Value) -> Result<ElementRef, RemoteError> {
    ElementRef::from_wire(value).ok_or_else(|| {
        RemoteError::Decode(
            format!("{command} returned a value without an element id"),
            snip_value(value),
        )
    })
}

fn snip_bytes(body: &[u8]) -> String {
    let mut snippet = String::from_utf8_lossy(body).to_string();
    if snippet.len() > 500 {
        let cut = (0..=500).rev().find(|i| snippet.is_char_boundary(*i)).unwrap_or(0);
        snippet.truncate(cut);
        snippet.push_str("...");
    }
    snippet
}

fn snip_value(value: &Value) -> String {
    snip_bytes(value.to_string().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;

    fn ok_body(value: Value) -> WireResponse {
        WireResponse::new(StatusCode::OK, json!({ "value": value }).to_string())
    }

    #[test]
    fn success_unwraps_the_value_member() {
        let value = decode_envelope("getTitle", ok_body(json!("hello"))).unwrap();
        assert_eq!(value, json!("hello"));

        let value = decode_envelope("get", ok_body(Value::Null)).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn w3c_error_documents_surface_code_and_message() {
        let response = WireResponse::new(
            StatusCode::NOT_FOUND,
            json!({ "value": { "error": "no such element", "message": "nope", "stacktrace": "" } })
                .to_string(),
        );
        let err = decode_envelope("findElement", response).unwrap_err();
        match err {
            RemoteError::WebDriver {
                status,
                error,
                message,
            } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(error, "no such element");
                assert_eq!(message, "nope");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn flat_legacy_error_bodies_still_decode() {
        let response = WireResponse::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "message": "session deleted" }).to_string(),
        );
        let err = decode_envelope("getTitle", response).unwrap_err();
        match err {
            RemoteError::WebDriver { error, message, .. } => {
                assert_eq!(error, "");
                assert_eq!(message, "session deleted");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unparseable_bodies_become_decode_errors_with_a_snippet() {
        let response = WireResponse::new(StatusCode::BAD_GATEWAY, "<html>proxy error</html>");
        let err = decode_envelope("getTitle", response).unwrap_err();
        match err {
            RemoteError::Decode(_, snippet) => assert_eq!(snippet, "<html>proxy error</html>"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn long_snippets_are_truncated_on_a_char_boundary() {
        let body = "é".repeat(400);
        let snippet = snip_bytes(body.as_bytes());
        assert!(snippet.len() <= 503);
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn wire_values_convert_to_element_refs() {
        let wire = json!({ "element-6066-11e4-a52e-4f735466cecf": "e7" });
        let element = expect_element("findElement", &wire).unwrap();
        assert_eq!(element.id(), "e7");

        assert!(expect_element("findElement", &json!({ "id": "e7" })).is_err());
    }
}
