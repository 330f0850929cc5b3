//! Parameter rewrites applied before a command body goes on the wire.
//!
//! Most commands ship their parameters untouched. The rest fall into a small
//! set of rewrite families: legacy locator strategies folded into CSS
//! selectors, commands emulated through script injection, keystroke and
//! alert text exploded into per-codepoint arrays, and the timeout payload
//! reshaped onto the key the wire protocol expects.

use serde_json::{Map, Value};

use crate::atoms::AtomCache;
use crate::element;
use crate::CodecError;

/// Scrolls the element into view and reports its viewport position.
pub(crate) const SCROLL_INTO_VIEW_SCRIPT: &str = "var e = arguments[0]; e.scrollIntoView({behavior: 'instant', block: 'end', inline: 'nearest'}); var rect = e.getBoundingClientRect(); return {'x': rect.left, 'y': rect.top};";

/// Serializes the current document, falling back to `XMLSerializer` for
/// documents without an `outerHTML` (e.g. XML pages).
pub(crate) const PAGE_SOURCE_SCRIPT: &str = r#"var source = document.documentElement.outerHTML;
if (!source) { source = new XMLSerializer().serializeToString(document); }
return source;"#;

/// Walks up to the containing form and submits it, firing a cancelable
/// `submit` event first so page handlers get their say.
pub(crate) const SUBMIT_FORM_SCRIPT: &str = r#"var form = arguments[0];
while (form.nodeName != "FORM" && form.parentNode) {
  form = form.parentNode;
}
if (!form) { throw Error('Unable to find containing form element'); }
if (!form.ownerDocument) { throw Error('Unable to find owning document'); }
var e = form.ownerDocument.createEvent('Event');
e.initEvent('submit', true, true);
if (form.dispatchEvent(e)) { HTMLFormElement.prototype.submit.call(form) }
"#;

/// How one script argument is drawn from the command parameters.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ScriptArg {
    /// Parameter holding an element id, sent as a wire element object.
    Element(&'static str),
    /// Parameter forwarded as-is after wire normalization; `null` if absent.
    Param(&'static str),
}

/// One rewrite rule, keyed by pre-alias command name in the dispatch table.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Amendment {
    /// Rewrite `class name` / `id` / `name` locators into `css selector`.
    CssLocator,
    /// Replace the body with a `{script, args}` payload using a fixed script.
    Script {
        body: &'static str,
        args: &'static [ScriptArg],
    },
    /// Like [`Amendment::Script`], with the body loaded from an atom.
    Atom {
        resource: &'static str,
        args: &'static [ScriptArg],
    },
    /// Collapse `value` into `text` plus a per-codepoint array.
    SpreadText,
    /// Reduce the body to alert `text` plus its per-codepoint array.
    AlertText,
    /// Fold `{type, ms}` onto the key named by the timeout type.
    TimeoutKey,
}

impl Amendment {
    pub(crate) fn apply(
        &self,
        atoms: &AtomCache,
        params: Map<String, Value>,
    ) -> Result<Map<String, Value>, CodecError> {
        match self {
            Amendment::CssLocator => normalize_locator(params),
            Amendment::Script { body, args } => Ok(script_payload((*body).to_string(), args, &params)),
            Amendment::Atom { resource, args } => {
                let body = atoms.wrapped(resource)?;
                Ok(script_payload(body, args, &params))
            }
            Amendment::SpreadText => Ok(spread_text(params)),
            Amendment::AlertText => Ok(alert_text(params)),
            Amendment::TimeoutKey => Ok(fold_timeout(params)),
        }
    }
}

/// Build the `{script, args}` body sent to the script-execution endpoint.
fn script_payload(script: String, args: &[ScriptArg], params: &Map<String, Value>) -> Map<String, Value> {
    let args: Vec<Value> = args
        .iter()
        .map(|arg| match arg {
            ScriptArg::Element(key) => element_arg(params.get(*key)),
            ScriptArg::Param(key) => params
                .get(*key)
                .map(element::to_wire_value)
                .unwrap_or(Value::Null),
        })
        .collect();
    let mut payload = Map::new();
    payload.insert("script".to_string(), Value::String(script));
    payload.insert("args".to_string(), Value::Array(args));
    payload
}

fn element_arg(value: Option<&Value>) -> Value {
    match value {
        Some(Value::String(id)) => element::wire_element(id),
        Some(other) => element::to_wire_value(other),
        None => Value::Null,
    }
}

/// Rewrite legacy locator strategies to their CSS-selector equivalent.
/// Non-string values and unknown strategies pass through untouched.
fn normalize_locator(mut params: Map<String, Value>) -> Result<Map<String, Value>, CodecError> {
    let using = params.get("using").and_then(Value::as_str);
    let value = params.get("value").and_then(Value::as_str);
    let selector = match (using, value) {
        (Some("class name"), Some(v)) => {
            if v.chars().any(char::is_whitespace) {
                return Err(CodecError::InvalidSelector(
                    "compound class names are not permitted".to_string(),
                ));
            }
            Some(format!(".{}", css_escape(v)))
        }
        (Some("id"), Some(v)) => Some(format!("#{}", css_escape(v))),
        (Some("name"), Some(v)) => Some(format!("*[name='{}']", attribute_escape(v))),
        _ => None,
    };
    if let Some(selector) = selector {
        params.insert("using".to_string(), Value::String("css selector".to_string()));
        params.insert("value".to_string(), Value::String(selector));
    }
    Ok(params)
}

/// Characters that must be backslash-escaped inside a CSS identifier,
/// beyond whitespace.
const CSS_SPECIALS: &str = "'\"\\#.:;,!?+<>=~*^$|%&@`{}-/[]()";

/// Backslash-escape a value for use in a CSS identifier position. A leading
/// digit becomes its escaped codepoint form (`\31 ` for `1`).
pub(crate) fn css_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_whitespace() || CSS_SPECIALS.contains(ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    if let Some(first) = escaped.chars().next() {
        if first.is_ascii_digit() {
            let digit = first as u32 - '0' as u32;
            escaped.replace_range(..1, &format!("\\{} ", 30 + digit));
        }
    }
    escaped
}

/// Escape a value for interpolation inside a single-quoted CSS attribute
/// string, closing the quote-injection hole the legacy rewrite had.
fn attribute_escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('\'', "\\'")
}

/// `sendKeysToElement`: collapse `value` (one string or a sequence of
/// strings) into joined `text` plus one array entry per Unicode codepoint.
/// Unrelated keys survive the rewrite.
fn spread_text(mut params: Map<String, Value>) -> Map<String, Value> {
    let text = match params.get("value") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts.iter().filter_map(Value::as_str).collect(),
        _ => return params,
    };
    params.insert("value".to_string(), Value::Array(explode_codepoints(&text)));
    params.insert("text".to_string(), Value::String(text));
    params
}

/// `setAlertValue`: the wire body is exactly `text` plus its codepoints.
fn alert_text(params: Map<String, Value>) -> Map<String, Value> {
    let Some(text) = params.get("text").and_then(Value::as_str) else {
        return params;
    };
    let mut amended = Map::new();
    amended.insert("value".to_string(), Value::Array(explode_codepoints(text)));
    amended.insert("text".to_string(), Value::String(text.to_string()));
    amended
}

/// `setTimeout`: the wire body keys the duration by the timeout type, e.g.
/// `{"implicit": 500}`. An existing entry under that key is replaced.
fn fold_timeout(mut params: Map<String, Value>) -> Map<String, Value> {
    let kind = match params.get("type").and_then(Value::as_str) {
        Some(kind) => kind.to_string(),
        None => return params,
    };
    let Some(ms) = params.get("ms").cloned() else {
        return params;
    };
    params.insert(kind, ms);
    params
}

/// Split into one string per Unicode codepoint (never UTF-16 units).
fn explode_codepoints(text: &str) -> Vec<Value> {
    text.chars().map(|ch| Value::String(ch.to_string())).collect()
}
