mod common;

use rudder_codec::atoms::DirAtoms;
use rudder_codec::{cmd, CodecError, Command, W3cCodec, ELEMENT_KEY};
use serde_json::json;

fn codec() -> W3cCodec {
    W3cCodec::new()
}

#[test]
fn dom_attribute_read_is_a_plain_get() {
    common::init_test_tracing();
    let request = codec()
        .encode(
            &Command::new(cmd::GET_ELEMENT_DOM_ATTRIBUTE)
                .param("id", "e1")
                .param("name", "class"),
            Some("77aa"),
        )
        .unwrap();
    assert_eq!(request.method, http::Method::GET);
    assert_eq!(request.path, "/session/77aa/element/e1/attribute/class");
    assert!(request.body.is_none());
}

#[test]
fn aliased_attribute_read_becomes_an_atom_script() {
    common::init_test_tracing();
    let request = codec()
        .encode(
            &Command::new(cmd::GET_ELEMENT_ATTRIBUTE)
                .param("id", "e1")
                .param("name", "href"),
            Some("s1"),
        )
        .unwrap();
    assert_eq!(request.method, http::Method::POST);
    assert_eq!(request.path, "/session/s1/execute/sync");

    let body = request.body.unwrap();
    let script = body["script"].as_str().unwrap();
    assert!(script.starts_with("return (function"));
    assert!(script.ends_with(".apply(null, arguments);"));
    assert_eq!(body["args"], json!([{ (ELEMENT_KEY): "e1" }, "href"]));
    // The rewrite consumed the raw identifiers entirely.
    assert!(body.get("id").is_none());
    assert!(body.get("name").is_none());
}

#[test]
fn storage_write_becomes_a_script_payload() {
    common::init_test_tracing();
    let request = codec()
        .encode(
            &Command::new(cmd::SET_LOCAL_STORAGE_ITEM)
                .param("key", "theme")
                .param("value", "dark"),
            Some("s1"),
        )
        .unwrap();
    assert_eq!(request.path, "/session/s1/execute/sync");
    assert_eq!(
        request.body,
        Some(json!({
            "script": "localStorage.setItem(arguments[0], arguments[1])",
            "args": ["theme", "dark"],
        }))
    );
}

#[test]
fn page_source_is_emulated_via_script() {
    common::init_test_tracing();
    let request = codec()
        .encode(&Command::new(cmd::GET_PAGE_SOURCE), Some("s1"))
        .unwrap();
    assert_eq!(request.method, http::Method::POST);
    assert_eq!(request.path, "/session/s1/execute/sync");
    let body = request.body.unwrap();
    assert!(body["script"].as_str().unwrap().contains("XMLSerializer"));
    assert_eq!(body["args"], json!([]));
}

#[test]
fn send_keys_splits_text_and_consumes_the_element_id() {
    common::init_test_tracing();
    let request = codec()
        .encode(
            &Command::new(cmd::SEND_KEYS_TO_ELEMENT)
                .param("id", "e2")
                .param("value", json!(["Hi ", "🦀"])),
            Some("s1"),
        )
        .unwrap();
    assert_eq!(request.path, "/session/s1/element/e2/value");
    let body = request.body.unwrap();
    assert_eq!(body["text"], "Hi 🦀");
    assert_eq!(body["value"], json!(["H", "i", " ", "🦀"]));
    assert!(body.get("id").is_none());
}

#[test]
fn legacy_locators_are_rewritten_before_sending() {
    common::init_test_tracing();
    let request = codec()
        .encode(
            &Command::new(cmd::FIND_ELEMENT)
                .param("using", "id")
                .param("value", "login"),
            Some("s1"),
        )
        .unwrap();
    assert_eq!(request.path, "/session/s1/element");
    assert_eq!(
        request.body,
        Some(json!({ "using": "css selector", "value": "#login" }))
    );

    let err = codec()
        .encode(
            &Command::new(cmd::FIND_ELEMENTS)
                .param("using", "class name")
                .param("value", "btn primary"),
            Some("s1"),
        )
        .unwrap_err();
    assert!(matches!(err, CodecError::InvalidSelector(_)));
}

#[test]
fn script_bodies_pass_through_untouched() {
    common::init_test_tracing();
    let request = codec()
        .encode(
            &Command::new(cmd::EXECUTE_SCRIPT)
                .param("script", "return document.title;")
                .param("args", json!([1, true])),
            Some("s1"),
        )
        .unwrap();
    assert_eq!(request.path, "/session/s1/execute/sync");
    assert_eq!(
        request.body,
        Some(json!({ "script": "return document.title;", "args": [1, true] }))
    );
}

#[test]
fn set_timeout_folds_the_duration_onto_the_type_key() {
    common::init_test_tracing();
    let request = codec()
        .encode(
            &Command::new(cmd::SET_TIMEOUT)
                .param("type", "implicit")
                .param("ms", 500),
            Some("s1"),
        )
        .unwrap();
    assert_eq!(request.path, "/session/s1/timeouts");
    assert_eq!(
        request.body,
        Some(json!({ "type": "implicit", "ms": 500, "implicit": 500 }))
    );
}

#[test]
fn alert_value_carries_text_and_codepoints() {
    common::init_test_tracing();
    let request = codec()
        .encode(&Command::new(cmd::SET_ALERT_VALUE).param("text", "hi"), Some("s1"))
        .unwrap();
    assert_eq!(request.path, "/session/s1/alert/text");
    assert_eq!(
        request.body,
        Some(json!({ "text": "hi", "value": ["h", "i"] }))
    );
}

#[test]
fn submit_is_emulated_with_the_form_script() {
    common::init_test_tracing();
    let request = codec()
        .encode(&Command::new(cmd::SUBMIT_ELEMENT).param("id", "e5"), Some("s1"))
        .unwrap();
    assert_eq!(request.path, "/session/s1/execute/sync");
    let body = request.body.unwrap();
    assert!(body["script"]
        .as_str()
        .unwrap()
        .contains("HTMLFormElement.prototype.submit"));
    assert_eq!(body["args"], json!([{ (ELEMENT_KEY): "e5" }]));
}

#[test]
fn get_and_delete_requests_have_no_body() {
    common::init_test_tracing();
    let title = codec().encode(&Command::new(cmd::GET_TITLE), Some("s1")).unwrap();
    assert_eq!(title.method, http::Method::GET);
    assert!(title.body.is_none());

    let quit = codec().encode(&Command::new(cmd::QUIT), Some("s1")).unwrap();
    assert_eq!(quit.method, http::Method::DELETE);
    assert_eq!(quit.path, "/session/s1");
    assert!(quit.body.is_none());

    // POSTs always carry a JSON object, even an empty one.
    let back = codec().encode(&Command::new(cmd::GO_BACK), Some("s1")).unwrap();
    assert_eq!(back.body, Some(json!({})));
}

#[test]
fn new_session_posts_capabilities_without_a_session() {
    common::init_test_tracing();
    let request = codec()
        .encode(
            &Command::new(cmd::NEW_SESSION)
                .param("capabilities", json!({ "alwaysMatch": { "browserName": "firefox" } })),
            None,
        )
        .unwrap();
    assert_eq!(request.path, "/session");
    assert_eq!(
        request.body,
        Some(json!({ "capabilities": { "alwaysMatch": { "browserName": "firefox" } } }))
    );
}

#[test]
fn upload_file_uses_the_compat_endpoint() {
    common::init_test_tracing();
    let request = codec()
        .encode(&Command::new(cmd::UPLOAD_FILE).param("file", "UEs="), Some("s1"))
        .unwrap();
    assert_eq!(request.path, "/session/s1/file");
    assert_eq!(request.body, Some(json!({ "file": "UEs=" })));
}

#[test]
fn shadow_root_lookups_substitute_the_shadow_id() {
    common::init_test_tracing();
    let request = codec()
        .encode(
            &Command::new(cmd::FIND_ELEMENT_FROM_SHADOW_ROOT)
                .param("shadowId", "sh-4")
                .param("using", "css selector")
                .param("value", "input"),
            Some("s1"),
        )
        .unwrap();
    assert_eq!(request.path, "/session/s1/shadow/sh-4/element");
    assert_eq!(
        request.body,
        Some(json!({ "using": "css selector", "value": "input" }))
    );
}

#[test]
fn missing_identifiers_are_reported_with_their_placeholder() {
    common::init_test_tracing();
    let err = codec()
        .encode(&Command::new(cmd::GET_ELEMENT_TEXT), Some("s1"))
        .unwrap_err();
    assert!(matches!(
        err,
        CodecError::MissingPathParameter { placeholder, command }
            if placeholder == "id" && command == "getElementText"
    ));

    let err = codec()
        .encode(&Command::new(cmd::GET_CURRENT_URL), None)
        .unwrap_err();
    assert!(matches!(
        err,
        CodecError::MissingPathParameter { placeholder, .. } if placeholder == "sessionId"
    ));
}

#[test]
fn unknown_commands_are_rejected() {
    common::init_test_tracing();
    let err = codec()
        .encode(&Command::new("warpDrive"), Some("s1"))
        .unwrap_err();
    assert!(matches!(err, CodecError::UnknownCommand(name) if name == "warpDrive"));
}

#[test]
fn atoms_can_come_from_a_directory() {
    common::init_test_tracing();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("get-attribute.js"),
        "function(e, n){ return 'x'; }",
    )
    .unwrap();

    let codec = W3cCodec::with_atoms(DirAtoms::new(dir.path()));
    let request = codec
        .encode(
            &Command::new(cmd::GET_ELEMENT_ATTRIBUTE)
                .param("id", "e1")
                .param("name", "a"),
            Some("s"),
        )
        .unwrap();
    assert_eq!(
        request.body.unwrap()["script"],
        "return (function(e, n){ return 'x'; }).apply(null, arguments);"
    );

    // A directory without the atom reports the load failure on every call.
    let empty = W3cCodec::with_atoms(DirAtoms::new(dir.path().join("missing")));
    let command = Command::new(cmd::IS_ELEMENT_DISPLAYED).param("id", "e1");
    assert!(matches!(
        empty.encode(&command, Some("s")),
        Err(CodecError::AtomLoad { .. })
    ));
    assert!(empty.encode(&command, Some("s")).is_err());
}
