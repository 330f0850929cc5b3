//! Command registry: symbolic names mapped to HTTP method + path template.
//!
//! Templates use `:placeholder` segments (`/session/:sessionId/element/:id`)
//! that are substituted from the session context and the command parameters
//! when a request is built. Parameters consumed by the path are removed from
//! the mapping so they never show up again in the request body.

use std::collections::HashMap;

use http::Method;
use serde_json::{Map, Value};

use crate::element;
use crate::CodecError;

/// Placeholder consumed from the session context rather than the parameters.
const SESSION_PLACEHOLDER: &str = "sessionId";

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Literal(String),
    Placeholder(String),
}

/// HTTP mapping for one command.
///
/// ```rust
/// use rudder_codec::CommandSpec;
///
/// let spec = CommandSpec::get("/session/:sessionId/element/:id/text");
/// assert_eq!(spec.method(), &http::Method::GET);
/// assert_eq!(spec.placeholders().collect::<Vec<_>>(), ["sessionId", "id"]);
/// ```
#[derive(Debug, Clone)]
pub struct CommandSpec {
    method: Method,
    template: String,
    segments: Vec<PathSegment>,
}

impl CommandSpec {
    pub fn new(method: Method, template: impl Into<String>) -> Self {
        let template = template.into();
        let segments = template
            .split('/')
            .filter(|part| !part.is_empty())
            .map(|part| match part.strip_prefix(':') {
                Some(name) => PathSegment::Placeholder(name.to_string()),
                None => PathSegment::Literal(part.to_string()),
            })
            .collect();
        Self {
            method,
            template,
            segments,
        }
    }

    pub fn get(template: impl Into<String>) -> Self {
        Self::new(Method::GET, template)
    }

    pub fn post(template: impl Into<String>) -> Self {
        Self::new(Method::POST, template)
    }

    pub fn delete(template: impl Into<String>) -> Self {
        Self::new(Method::DELETE, template)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path_template(&self) -> &str {
        &self.template
    }

    /// Placeholder names in template order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            PathSegment::Placeholder(name) => Some(name.as_str()),
            PathSegment::Literal(_) => None,
        })
    }

    /// Substitute placeholders into a concrete request path.
    ///
    /// `sessionId` comes from the session context; every other placeholder is
    /// removed from `params` as it is consumed. Values are percent-encoded.
    pub(crate) fn build_path(
        &self,
        command: &str,
        session_id: Option<&str>,
        params: &mut Map<String, Value>,
    ) -> Result<String, CodecError> {
        let missing = |placeholder: &str| CodecError::MissingPathParameter {
            placeholder: placeholder.to_string(),
            command: command.to_string(),
        };

        let mut path = String::with_capacity(self.template.len());
        for segment in &self.segments {
            path.push('/');
            match segment {
                PathSegment::Literal(part) => path.push_str(part),
                PathSegment::Placeholder(name) if name == SESSION_PLACEHOLDER => {
                    let id = session_id.ok_or_else(|| missing(name))?;
                    path.push_str(&urlencoding::encode(id));
                }
                PathSegment::Placeholder(name) => {
                    let value = params.remove(name).ok_or_else(|| missing(name))?;
                    let text = path_value(&value).ok_or_else(|| missing(name))?;
                    path.push_str(&urlencoding::encode(&text));
                }
            }
        }
        Ok(path)
    }
}

/// Render a parameter value as a path segment. Element references contribute
/// their id; composite or null values cannot name a segment.
fn path_value(value: &Value) -> Option<String> {
    if let Some(id) = element::element_id(value) {
        return Some(id.to_string());
    }
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Name → [`CommandSpec`] table with alias support.
///
/// Aliases are snapshots: an alias records the concrete command its target
/// resolves to at declaration time, so lookup follows at most one hop and
/// cycles cannot be formed.
#[derive(Debug, Default, Clone)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandSpec>,
    aliases: HashMap<String, String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new command. Rejects names already taken by a command or
    /// an alias; overriding an existing mapping goes through
    /// [`CommandRegistry::redefine`] so it cannot happen by accident.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        spec: CommandSpec,
    ) -> Result<(), CodecError> {
        let name = name.into();
        if self.is_taken(&name) {
            return Err(CodecError::DuplicateCommand(name));
        }
        self.commands.insert(name, spec);
        Ok(())
    }

    /// Replace (or introduce) a mapping. This is the intentional-override
    /// path used when a dialect moves an endpoint.
    pub fn redefine(&mut self, name: impl Into<String>, spec: CommandSpec) {
        let name = name.into();
        self.aliases.remove(&name);
        self.commands.insert(name, spec);
    }

    /// Declare `alias` as another name for whatever `target` resolves to
    /// right now. The target must already be defined.
    pub fn alias(&mut self, alias: impl Into<String>, target: &str) -> Result<(), CodecError> {
        let alias = alias.into();
        if self.is_taken(&alias) {
            return Err(CodecError::DuplicateCommand(alias));
        }
        let canonical = self.canonical_name(target);
        if !self.commands.contains_key(canonical) {
            return Err(CodecError::UnknownCommand(target.to_string()));
        }
        let canonical = canonical.to_string();
        self.aliases.insert(alias, canonical);
        Ok(())
    }

    /// Look up the HTTP mapping for `name`, following at most one alias hop.
    pub fn resolve(&self, name: &str) -> Result<&CommandSpec, CodecError> {
        self.commands
            .get(self.canonical_name(name))
            .ok_or_else(|| CodecError::UnknownCommand(name.to_string()))
    }

    /// The concrete command name `name` maps to (itself if not an alias).
    pub fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    /// All directly defined command names, in no particular order.
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    /// All alias names, in no particular order.
    pub fn alias_names(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }

    fn is_taken(&self, name: &str) -> bool {
        self.commands.contains_key(name) || self.aliases.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn define_rejects_duplicates() {
        let mut registry = CommandRegistry::new();
        registry.define("go", CommandSpec::post("/session/:sessionId/url")).unwrap();
        let err = registry
            .define("go", CommandSpec::get("/session/:sessionId/url"))
            .unwrap_err();
        assert!(matches!(err, CodecError::DuplicateCommand(name) if name == "go"));
    }

    #[test]
    fn redefine_replaces_the_mapping() {
        let mut registry = CommandRegistry::new();
        registry.define("upload", CommandSpec::post("/session/:sessionId/se/file")).unwrap();
        registry.redefine("upload", CommandSpec::post("/session/:sessionId/file"));
        let spec = registry.resolve("upload").unwrap();
        assert_eq!(spec.path_template(), "/session/:sessionId/file");
    }

    #[test]
    fn alias_requires_an_existing_target() {
        let mut registry = CommandRegistry::new();
        let err = registry.alias("pageSource", "executeScript").unwrap_err();
        assert!(matches!(err, CodecError::UnknownCommand(name) if name == "executeScript"));
    }

    #[test]
    fn alias_of_alias_snapshots_the_concrete_command() {
        let mut registry = CommandRegistry::new();
        registry.define("run", CommandSpec::post("/session/:sessionId/execute/sync")).unwrap();
        registry.alias("first", "run").unwrap();
        registry.alias("second", "first").unwrap();
        assert_eq!(registry.canonical_name("second"), "run");
        assert_eq!(
            registry.resolve("second").unwrap().path_template(),
            "/session/:sessionId/execute/sync"
        );
    }

    #[test]
    fn alias_name_cannot_shadow_a_command() {
        let mut registry = CommandRegistry::new();
        registry.define("run", CommandSpec::post("/run")).unwrap();
        registry.define("other", CommandSpec::post("/other")).unwrap();
        let err = registry.alias("run", "other").unwrap_err();
        assert!(matches!(err, CodecError::DuplicateCommand(name) if name == "run"));
    }

    #[test]
    fn resolve_unknown_name_errors() {
        let registry = CommandRegistry::new();
        assert!(matches!(
            registry.resolve("liftOff"),
            Err(CodecError::UnknownCommand(name)) if name == "liftOff"
        ));
    }

    #[test]
    fn build_path_substitutes_and_consumes_parameters() {
        let spec = CommandSpec::get("/session/:sessionId/element/:id/attribute/:name");
        let mut p = params(json!({ "id": "e1", "name": "class", "extra": true }));
        let path = spec.build_path("getElementDomAttribute", Some("sid-1"), &mut p).unwrap();
        assert_eq!(path, "/session/sid-1/element/e1/attribute/class");
        // Consumed placeholders are gone, everything else survives.
        assert_eq!(p, params(json!({ "extra": true })));
    }

    #[test]
    fn build_path_percent_encodes_values() {
        let spec = CommandSpec::get("/session/:sessionId/cookie/:name");
        let mut p = params(json!({ "name": "a/b c" }));
        let path = spec.build_path("getCookie", Some("s"), &mut p).unwrap();
        assert_eq!(path, "/session/s/cookie/a%2Fb%20c");
    }

    #[test]
    fn build_path_accepts_wire_element_objects() {
        let spec = CommandSpec::post("/session/:sessionId/element/:id/click");
        let mut p = params(json!({}));
        p.insert("id".to_string(), element::wire_element("e9"));
        let path = spec.build_path("clickElement", Some("s"), &mut p).unwrap();
        assert_eq!(path, "/session/s/element/e9/click");
    }

    #[test]
    fn build_path_reports_missing_parameters() {
        let spec = CommandSpec::get("/session/:sessionId/element/:id/text");
        let mut p = params(json!({}));
        let err = spec.build_path("getElementText", Some("s"), &mut p).unwrap_err();
        assert!(matches!(
            err,
            CodecError::MissingPathParameter { placeholder, command }
                if placeholder == "id" && command == "getElementText"
        ));
    }

    #[test]
    fn build_path_requires_a_session_for_session_scoped_templates() {
        let spec = CommandSpec::get("/session/:sessionId/url");
        let mut p = params(json!({}));
        let err = spec.build_path("getCurrentUrl", None, &mut p).unwrap_err();
        assert!(matches!(
            err,
            CodecError::MissingPathParameter { placeholder, .. } if placeholder == "sessionId"
        ));
    }

    #[test]
    fn build_path_rejects_null_and_composite_values() {
        let spec = CommandSpec::get("/session/:sessionId/cookie/:name");
        let mut p = params(json!({ "name": null }));
        assert!(spec.build_path("getCookie", Some("s"), &mut p).is_err());
        let mut p = params(json!({ "name": ["a"] }));
        assert!(spec.build_path("getCookie", Some("s"), &mut p).is_err());
    }
}
