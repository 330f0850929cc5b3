//! The W3C WebDriver dialect: command table, aliases, and rewrite rules.

use std::collections::HashMap;

use http::Method;
use serde_json::{Map, Value};

use crate::amend::{Amendment, ScriptArg};
use crate::atoms::{AtomCache, AtomSource, BundledAtoms};
use crate::cmd;
use crate::registry::{CommandRegistry, CommandSpec};
use crate::{CodecError, Command, WireRequest};

/// Encoder for the W3C WebDriver wire protocol.
///
/// Holds the full command table plus the parameter-amendment rules and the
/// atom cache backing the script-emulated commands. The codec is stateless
/// per request: encoding never mutates the table, so one instance can be
/// shared freely across threads.
///
/// ```rust
/// use rudder_codec::{cmd, Command, W3cCodec};
///
/// let codec = W3cCodec::new();
/// let request = codec.encode(
///     &Command::new(cmd::GET).param("url", "https://example.com"),
///     Some("session-1"),
/// )?;
/// assert_eq!(request.method, http::Method::POST);
/// assert_eq!(request.path, "/session/session-1/url");
/// # Ok::<(), rudder_codec::CodecError>(())
/// ```
pub struct W3cCodec {
    registry: CommandRegistry,
    amendments: HashMap<String, Amendment>,
    atoms: AtomCache,
}

impl W3cCodec {
    /// Codec with the atoms compiled into the binary.
    pub fn new() -> Self {
        Self::with_atoms(BundledAtoms)
    }

    /// Codec loading atoms from a caller-supplied source, e.g.
    /// [`crate::atoms::DirAtoms`] over an unpacked Selenium distribution.
    pub fn with_atoms(source: impl AtomSource + 'static) -> Self {
        // The table is static, so a failure here is a bug caught by tests.
        Self::try_build(AtomCache::new(source)).expect("W3C command table is internally consistent")
    }

    fn try_build(atoms: AtomCache) -> Result<Self, CodecError> {
        let mut registry = CommandRegistry::new();
        register_commands(&mut registry)?;
        register_aliases(&mut registry)?;
        Ok(Self {
            registry,
            amendments: amendment_table(),
            atoms,
        })
    }

    /// Resolve `name` to its HTTP mapping, following at most one alias hop.
    pub fn resolve(&self, name: &str) -> Result<&CommandSpec, CodecError> {
        self.registry.resolve(name)
    }

    /// Apply the amendment rule for `name`, if any. The name must resolve;
    /// commands without a rule get their parameters back unchanged.
    pub fn amend(
        &self,
        name: &str,
        params: Map<String, Value>,
    ) -> Result<Map<String, Value>, CodecError> {
        self.registry.resolve(name)?;
        match self.amendments.get(name) {
            Some(rule) => rule.apply(&self.atoms, params),
            None => Ok(params),
        }
    }

    /// Translate a command into the HTTP request to put on the wire.
    ///
    /// Amendment runs first (keyed by the pre-alias name), then path
    /// placeholders are substituted and consumed, and finally the remaining
    /// parameters become the JSON body of POST requests. GET and DELETE
    /// requests never carry a body.
    pub fn encode(
        &self,
        command: &Command,
        session_id: Option<&str>,
    ) -> Result<WireRequest, CodecError> {
        let spec = self.registry.resolve(command.name())?;
        let mut params = self.amend(command.name(), command.parameters().clone())?;
        let path = spec.build_path(command.name(), session_id, &mut params)?;
        let body = if spec.method() == &Method::POST {
            Some(Value::Object(params))
        } else {
            None
        };
        tracing::debug!(
            command = command.name(),
            canonical = self.registry.canonical_name(command.name()),
            method = %spec.method(),
            path = %path,
            "codec.encode"
        );
        Ok(WireRequest {
            method: spec.method().clone(),
            path,
            body,
        })
    }

    /// Register a vendor-extension command, e.g. a `/goog/...` endpoint.
    pub fn define(&mut self, name: impl Into<String>, spec: CommandSpec) -> Result<(), CodecError> {
        self.registry.define(name, spec)
    }

    /// Intentionally replace an existing mapping.
    pub fn redefine(&mut self, name: impl Into<String>, spec: CommandSpec) {
        self.registry.redefine(name, spec)
    }

    /// Declare another name for an existing command.
    pub fn alias(&mut self, alias: impl Into<String>, target: &str) -> Result<(), CodecError> {
        self.registry.alias(alias, target)
    }

    /// Read access to the command table.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }
}

impl Default for W3cCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn register_commands(r: &mut CommandRegistry) -> Result<(), CodecError> {
    let session = "/session/:sessionId";
    let window = format!("{session}/window");
    let element = format!("{session}/element/:id");
    let alert = format!("{session}/alert");

    // Session lifecycle
    r.define(cmd::STATUS, CommandSpec::get("/status"))?;
    r.define(cmd::NEW_SESSION, CommandSpec::post("/session"))?;
    r.define(cmd::QUIT, CommandSpec::delete(session))?;
    r.define(cmd::GET_TIMEOUTS, CommandSpec::get(format!("{session}/timeouts")))?;
    r.define(cmd::SET_TIMEOUT, CommandSpec::post(format!("{session}/timeouts")))?;

    // Navigation
    r.define(cmd::GET, CommandSpec::post(format!("{session}/url")))?;
    r.define(cmd::GET_CURRENT_URL, CommandSpec::get(format!("{session}/url")))?;
    r.define(cmd::GO_BACK, CommandSpec::post(format!("{session}/back")))?;
    r.define(cmd::GO_FORWARD, CommandSpec::post(format!("{session}/forward")))?;
    r.define(cmd::REFRESH, CommandSpec::post(format!("{session}/refresh")))?;
    r.define(cmd::GET_TITLE, CommandSpec::get(format!("{session}/title")))?;

    // Windows
    r.define(cmd::GET_CURRENT_WINDOW_HANDLE, CommandSpec::get(&window))?;
    r.define(cmd::GET_WINDOW_HANDLES, CommandSpec::get(format!("{window}/handles")))?;
    r.define(cmd::CLOSE, CommandSpec::delete(&window))?;
    r.define(cmd::SWITCH_TO_WINDOW, CommandSpec::post(&window))?;
    r.define(cmd::SWITCH_TO_NEW_WINDOW, CommandSpec::post(format!("{window}/new")))?;
    r.define(cmd::GET_CURRENT_WINDOW_SIZE, CommandSpec::get(format!("{window}/rect")))?;
    r.define(cmd::SET_CURRENT_WINDOW_SIZE, CommandSpec::post(format!("{window}/rect")))?;
    r.define(cmd::MAXIMIZE_CURRENT_WINDOW, CommandSpec::post(format!("{window}/maximize")))?;
    r.define(cmd::MINIMIZE_CURRENT_WINDOW, CommandSpec::post(format!("{window}/minimize")))?;
    r.define(cmd::FULLSCREEN_CURRENT_WINDOW, CommandSpec::post(format!("{window}/fullscreen")))?;

    // Frames
    r.define(cmd::SWITCH_TO_FRAME, CommandSpec::post(format!("{session}/frame")))?;
    r.define(cmd::SWITCH_TO_PARENT_FRAME, CommandSpec::post(format!("{session}/frame/parent")))?;

    // Element lookup
    r.define(cmd::FIND_ELEMENT, CommandSpec::post(format!("{session}/element")))?;
    r.define(cmd::FIND_ELEMENTS, CommandSpec::post(format!("{session}/elements")))?;
    r.define(cmd::GET_ACTIVE_ELEMENT, CommandSpec::get(format!("{session}/element/active")))?;
    r.define(cmd::FIND_CHILD_ELEMENT, CommandSpec::post(format!("{element}/element")))?;
    r.define(cmd::FIND_CHILD_ELEMENTS, CommandSpec::post(format!("{element}/elements")))?;
    r.define(cmd::GET_ELEMENT_SHADOW_ROOT, CommandSpec::get(format!("{element}/shadow")))?;
    r.define(
        cmd::FIND_ELEMENT_FROM_SHADOW_ROOT,
        CommandSpec::post(format!("{session}/shadow/:shadowId/element")),
    )?;
    r.define(
        cmd::FIND_ELEMENTS_FROM_SHADOW_ROOT,
        CommandSpec::post(format!("{session}/shadow/:shadowId/elements")),
    )?;

    // Element interaction
    r.define(cmd::CLICK_ELEMENT, CommandSpec::post(format!("{element}/click")))?;
    r.define(cmd::CLEAR_ELEMENT, CommandSpec::post(format!("{element}/clear")))?;
    r.define(cmd::SEND_KEYS_TO_ELEMENT, CommandSpec::post(format!("{element}/value")))?;

    // Element state
    r.define(cmd::GET_ELEMENT_TEXT, CommandSpec::get(format!("{element}/text")))?;
    r.define(cmd::GET_ELEMENT_TAG_NAME, CommandSpec::get(format!("{element}/name")))?;
    r.define(cmd::GET_ELEMENT_RECT, CommandSpec::get(format!("{element}/rect")))?;
    r.define(cmd::IS_ELEMENT_SELECTED, CommandSpec::get(format!("{element}/selected")))?;
    r.define(cmd::IS_ELEMENT_ENABLED, CommandSpec::get(format!("{element}/enabled")))?;
    r.define(cmd::GET_ELEMENT_DOM_PROPERTY, CommandSpec::get(format!("{element}/property/:name")))?;
    r.define(cmd::GET_ELEMENT_DOM_ATTRIBUTE, CommandSpec::get(format!("{element}/attribute/:name")))?;
    r.define(
        cmd::GET_ELEMENT_VALUE_OF_CSS_PROPERTY,
        CommandSpec::get(format!("{element}/css/:name")),
    )?;
    r.define(cmd::GET_ELEMENT_ARIA_ROLE, CommandSpec::get(format!("{element}/computedrole")))?;
    r.define(cmd::GET_ELEMENT_ACCESSIBLE_NAME, CommandSpec::get(format!("{element}/computedlabel")))?;

    // Script execution
    r.define(cmd::EXECUTE_SCRIPT, CommandSpec::post(format!("{session}/execute/sync")))?;
    r.define(cmd::EXECUTE_ASYNC_SCRIPT, CommandSpec::post(format!("{session}/execute/async")))?;

    // Cookies
    r.define(cmd::GET_COOKIES, CommandSpec::get(format!("{session}/cookie")))?;
    r.define(cmd::GET_COOKIE, CommandSpec::get(format!("{session}/cookie/:name")))?;
    r.define(cmd::ADD_COOKIE, CommandSpec::post(format!("{session}/cookie")))?;
    r.define(cmd::DELETE_COOKIE, CommandSpec::delete(format!("{session}/cookie/:name")))?;
    r.define(cmd::DELETE_ALL_COOKIES, CommandSpec::delete(format!("{session}/cookie")))?;

    // Input actions
    r.define(cmd::ACTIONS, CommandSpec::post(format!("{session}/actions")))?;
    r.define(cmd::CLEAR_ACTION_STATE, CommandSpec::delete(format!("{session}/actions")))?;

    // Alerts
    r.define(cmd::ACCEPT_ALERT, CommandSpec::post(format!("{alert}/accept")))?;
    r.define(cmd::DISMISS_ALERT, CommandSpec::post(format!("{alert}/dismiss")))?;
    r.define(cmd::GET_ALERT_TEXT, CommandSpec::get(format!("{alert}/text")))?;
    r.define(cmd::SET_ALERT_VALUE, CommandSpec::post(format!("{alert}/text")))?;

    // Screenshots & printing
    r.define(cmd::SCREENSHOT, CommandSpec::get(format!("{session}/screenshot")))?;
    r.define(cmd::ELEMENT_SCREENSHOT, CommandSpec::get(format!("{element}/screenshot")))?;
    r.define(cmd::PRINT_PAGE, CommandSpec::post(format!("{session}/print")))?;

    // Selenium-dialect endpoints
    r.define(cmd::UPLOAD_FILE, CommandSpec::post(format!("{session}/se/file")))?;
    r.define(cmd::GET_LOG, CommandSpec::post(format!("{session}/se/log")))?;
    r.define(cmd::GET_AVAILABLE_LOG_TYPES, CommandSpec::get(format!("{session}/se/log/types")))?;

    // TODO: move uploadFile back to /se/file once chromedriver serves it.
    r.redefine(cmd::UPLOAD_FILE, CommandSpec::post(format!("{session}/file")));

    Ok(())
}

/// Script-emulated and renamed commands. Targets must be registered first.
fn register_aliases(r: &mut CommandRegistry) -> Result<(), CodecError> {
    r.alias(cmd::GET_ELEMENT_ATTRIBUTE, cmd::EXECUTE_SCRIPT)?;
    r.alias(cmd::GET_ELEMENT_LOCATION_ONCE_SCROLLED_INTO_VIEW, cmd::EXECUTE_SCRIPT)?;
    r.alias(cmd::IS_ELEMENT_DISPLAYED, cmd::EXECUTE_SCRIPT)?;
    r.alias(cmd::SUBMIT_ELEMENT, cmd::EXECUTE_SCRIPT)?;
    r.alias(cmd::GET_PAGE_SOURCE, cmd::EXECUTE_SCRIPT)?;

    r.alias(cmd::GET_ELEMENT_LOCATION, cmd::GET_ELEMENT_RECT)?;
    r.alias(cmd::GET_ELEMENT_SIZE, cmd::GET_ELEMENT_RECT)?;
    r.alias(cmd::GET_WINDOW_POSITION, cmd::GET_CURRENT_WINDOW_SIZE)?;
    r.alias(cmd::SET_WINDOW_POSITION, cmd::SET_CURRENT_WINDOW_SIZE)?;

    for name in [
        cmd::CLEAR_LOCAL_STORAGE,
        cmd::GET_LOCAL_STORAGE_KEYS,
        cmd::SET_LOCAL_STORAGE_ITEM,
        cmd::REMOVE_LOCAL_STORAGE_ITEM,
        cmd::GET_LOCAL_STORAGE_ITEM,
        cmd::GET_LOCAL_STORAGE_SIZE,
        cmd::CLEAR_SESSION_STORAGE,
        cmd::GET_SESSION_STORAGE_KEYS,
        cmd::SET_SESSION_STORAGE_ITEM,
        cmd::REMOVE_SESSION_STORAGE_ITEM,
        cmd::GET_SESSION_STORAGE_ITEM,
        cmd::GET_SESSION_STORAGE_SIZE,
    ] {
        r.alias(name, cmd::EXECUTE_SCRIPT)?;
    }
    Ok(())
}

fn amendment_table() -> HashMap<String, Amendment> {
    let mut t = HashMap::new();
    let mut put = |name: &str, rule: Amendment| {
        t.insert(name.to_string(), rule);
    };

    for name in [
        cmd::FIND_ELEMENT,
        cmd::FIND_ELEMENTS,
        cmd::FIND_CHILD_ELEMENT,
        cmd::FIND_CHILD_ELEMENTS,
    ] {
        put(name, Amendment::CssLocator);
    }

    put(
        cmd::GET_ELEMENT_ATTRIBUTE,
        Amendment::Atom {
            resource: "get-attribute.js",
            args: &[ScriptArg::Element("id"), ScriptArg::Param("name")],
        },
    );
    put(
        cmd::IS_ELEMENT_DISPLAYED,
        Amendment::Atom {
            resource: "is-displayed.js",
            args: &[ScriptArg::Element("id")],
        },
    );
    put(
        cmd::GET_ELEMENT_LOCATION_ONCE_SCROLLED_INTO_VIEW,
        Amendment::Script {
            body: crate::amend::SCROLL_INTO_VIEW_SCRIPT,
            args: &[ScriptArg::Element("id")],
        },
    );
    put(
        cmd::SUBMIT_ELEMENT,
        Amendment::Script {
            body: crate::amend::SUBMIT_FORM_SCRIPT,
            args: &[ScriptArg::Element("id")],
        },
    );
    put(
        cmd::GET_PAGE_SOURCE,
        Amendment::Script {
            body: crate::amend::PAGE_SOURCE_SCRIPT,
            args: &[],
        },
    );

    put(cmd::CLEAR_LOCAL_STORAGE, Amendment::Script { body: "localStorage.clear()", args: &[] });
    put(
        cmd::GET_LOCAL_STORAGE_KEYS,
        Amendment::Script { body: "return Object.keys(localStorage)", args: &[] },
    );
    put(
        cmd::SET_LOCAL_STORAGE_ITEM,
        Amendment::Script {
            body: "localStorage.setItem(arguments[0], arguments[1])",
            args: &[ScriptArg::Param("key"), ScriptArg::Param("value")],
        },
    );
    put(
        cmd::REMOVE_LOCAL_STORAGE_ITEM,
        Amendment::Script {
            body: "var item = localStorage.getItem(arguments[0]); localStorage.removeItem(arguments[0]); return item",
            args: &[ScriptArg::Param("key")],
        },
    );
    put(
        cmd::GET_LOCAL_STORAGE_ITEM,
        Amendment::Script {
            body: "return localStorage.getItem(arguments[0])",
            args: &[ScriptArg::Param("key")],
        },
    );
    put(
        cmd::GET_LOCAL_STORAGE_SIZE,
        Amendment::Script { body: "return localStorage.length", args: &[] },
    );

    put(cmd::CLEAR_SESSION_STORAGE, Amendment::Script { body: "sessionStorage.clear()", args: &[] });
    put(
        cmd::GET_SESSION_STORAGE_KEYS,
        Amendment::Script { body: "return Object.keys(sessionStorage)", args: &[] },
    );
    put(
        cmd::SET_SESSION_STORAGE_ITEM,
        Amendment::Script {
            body: "sessionStorage.setItem(arguments[0], arguments[1])",
            args: &[ScriptArg::Param("key"), ScriptArg::Param("value")],
        },
    );
    put(
        cmd::REMOVE_SESSION_STORAGE_ITEM,
        Amendment::Script {
            body: "var item = sessionStorage.getItem(arguments[0]); sessionStorage.removeItem(arguments[0]); return item",
            args: &[ScriptArg::Param("key")],
        },
    );
    put(
        cmd::GET_SESSION_STORAGE_ITEM,
        Amendment::Script {
            body: "return sessionStorage.getItem(arguments[0])",
            args: &[ScriptArg::Param("key")],
        },
    );
    put(
        cmd::GET_SESSION_STORAGE_SIZE,
        Amendment::Script { body: "return sessionStorage.length", args: &[] },
    );

    put(cmd::SEND_KEYS_TO_ELEMENT, Amendment::SpreadText);
    put(cmd::SET_ALERT_VALUE, Amendment::AlertText);
    put(cmd::SET_TIMEOUT, Amendment::TimeoutKey);

    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_dialect_table_builds() {
        W3cCodec::try_build(AtomCache::default()).unwrap();
    }

    #[test]
    fn every_name_resolves_to_a_concrete_mapping() {
        let codec = W3cCodec::new();
        let names: Vec<String> = codec
            .registry()
            .command_names()
            .chain(codec.registry().alias_names())
            .map(str::to_string)
            .collect();
        assert!(names.len() > 70, "expected the full dialect, got {}", names.len());
        for name in names {
            let spec = codec.resolve(&name).unwrap();
            assert!(!spec.path_template().is_empty());
            for placeholder in spec.placeholders() {
                assert!(
                    ["sessionId", "id", "name", "shadowId"].contains(&placeholder),
                    "unexpected placeholder :{placeholder} in {name}"
                );
            }
        }
    }

    #[test]
    fn aliases_share_their_targets_mapping() {
        let codec = W3cCodec::new();
        let rect = codec.resolve(cmd::GET_ELEMENT_RECT).unwrap().path_template().to_string();
        assert_eq!(codec.resolve(cmd::GET_ELEMENT_SIZE).unwrap().path_template(), rect);
        assert_eq!(codec.resolve(cmd::GET_ELEMENT_LOCATION).unwrap().path_template(), rect);

        let sync = codec.resolve(cmd::EXECUTE_SCRIPT).unwrap().path_template().to_string();
        assert_eq!(codec.resolve(cmd::GET_PAGE_SOURCE).unwrap().path_template(), sync);
        assert_eq!(codec.resolve(cmd::SET_LOCAL_STORAGE_ITEM).unwrap().path_template(), sync);
    }

    #[test]
    fn upload_file_points_at_the_compat_endpoint() {
        let codec = W3cCodec::new();
        let spec = codec.resolve(cmd::UPLOAD_FILE).unwrap();
        assert_eq!(spec.path_template(), "/session/:sessionId/file");
        assert_eq!(spec.method(), &Method::POST);
    }

    #[test]
    fn every_amendment_key_is_a_registered_name() {
        let codec = W3cCodec::new();
        for name in codec.amendments.keys() {
            assert!(codec.resolve(name).is_ok(), "amendment for unregistered {name}");
        }
    }

    #[test]
    fn vendor_commands_can_be_registered_and_encoded() {
        let mut codec = W3cCodec::new();
        codec
            .define(
                "launchApp",
                CommandSpec::post("/session/:sessionId/chromium/launch_app"),
            )
            .unwrap();
        let request = codec
            .encode(&Command::new("launchApp").param("id", "app"), Some("s1"))
            .unwrap();
        assert_eq!(request.path, "/session/s1/chromium/launch_app");
    }
}
