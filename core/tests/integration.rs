//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `RequestBuilder`
//! through the real `UreqTransport`. The `/echo` routes reflect what arrived
//! on the wire; the `/v1/games` routes exercise a realistic resource flow.

use std::net::SocketAddr;
use std::time::Duration;

use minesweeper_core::{
    ApiError, ContentType, HttpMethod, RequestBuilder, Settings, TransportConfig, UreqTransport,
};
use serde_json::{json, Value};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

#[test]
fn wire_format_reaches_server() {
    let addr = start_server();
    let mut api = RequestBuilder::new(Settings::default().url(format!("http://{addr}")));

    // GET: params go to the query string, no body.
    let echo = api
        .ns("echo")
        .ns("Games")
        .with_id(7)
        .with_params(json!({ "a": 1 }))
        .with_params(json!({ "a": 2, "b": 3 }))
        .execute(HttpMethod::Get, None, Value::Null)
        .unwrap();
    assert_eq!(echo["method"], "GET");
    assert_eq!(echo["path"], "/echo/games/7");
    assert_eq!(echo["query"], "a=2&b=3");
    assert_eq!(echo["body"], "");
    assert_eq!(echo["accept_language"], json!(["en-En"]));
    assert_eq!(echo["user_agent"], "MINESWEEPER-RUST-SDK-1.0.0");

    // PUT with the default JSON encoding.
    let echo = api
        .ns("echo")
        .execute(HttpMethod::Put, None, json!({ "x": "y" }))
        .unwrap();
    assert_eq!(echo["method"], "PUT");
    assert_eq!(echo["body"], r#"{"x":"y"}"#);
    assert_eq!(echo["content_type"], "application/json");

    // Switch to form encoding and a second language.
    api.configure(
        Settings::default()
            .language("fr-Fr")
            .content_type(ContentType::Form),
    );
    let echo = api
        .ns("echo")
        .with_method("delete")
        .execute(HttpMethod::Get, None, json!({ "x": "y" }))
        .unwrap();
    assert_eq!(echo["method"], "DELETE");
    assert_eq!(echo["body"], "x=y");
    assert_eq!(echo["content_type"], "application/x-www-form-urlencoded");
    assert_eq!(echo["accept_language"], json!(["en-En", "fr-Fr"]));

    // Nothing carried over from the previous request.
    let echo = api
        .execute(HttpMethod::Get, Some("/echo"), Value::Null)
        .unwrap();
    assert_eq!(echo["method"], "GET");
    assert_eq!(echo["path"], "/echo");
    assert!(echo["query"].is_null());
}

#[test]
fn debug_envelope_over_http() {
    let addr = start_server();
    let mut api = RequestBuilder::new(Settings::default().url(format!("http://{addr}")));
    let result = api
        .set_debug(true)
        .ns("echo")
        .execute(HttpMethod::Post, None, json!({ "rows": 9 }))
        .unwrap();

    assert_eq!(result["url"], format!("http://{addr}/echo"));
    assert_eq!(result["method"], "POST");
    assert_eq!(result["postdata"], r#"{"rows":9}"#);
    assert_eq!(result["params"], json!({ "rows": 9 }));
    assert_eq!(result["response"]["body"], r#"{"rows":9}"#);
}

#[test]
fn non_json_body_is_a_decode_error() {
    let addr = start_server();
    let mut api = RequestBuilder::new(Settings::default().url(format!("http://{addr}")));

    let err = api.ns("broken").get().unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));

    let value = api.execute_or_null(HttpMethod::Get, Some("/broken"), Value::Null);
    assert!(value.is_null());
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = UreqTransport::new(TransportConfig {
        connect_timeout: Duration::from_secs(1),
        timeout: Duration::from_secs(2),
        ..Default::default()
    });
    let mut api = RequestBuilder::with_transport(
        Settings::default().url(format!("http://{addr}")),
        transport,
    );
    let result = api
        .ns("games")
        .with_params(json!({ "a": 1 }))
        .execute(HttpMethod::Get, None, Value::Null);
    assert!(result.is_err());
    assert!(api.state().is_empty());
}

#[test]
fn game_lifecycle() {
    let addr = start_server();
    let mut api = RequestBuilder::new(
        Settings::default()
            .url(format!("http://{addr}"))
            .version("1"),
    );

    // Step 1: list is empty.
    let games = api.ns("games").get().unwrap();
    assert_eq!(games, json!([]));

    // Step 2: create.
    let created = api
        .ns("games")
        .create(json!({ "rows": 9, "cols": 9, "mines": 10 }))
        .unwrap();
    assert_eq!(created["rows"], 9);
    assert_eq!(created["paused"], false);
    let id: uuid::Uuid = serde_json::from_value(created["id"].clone()).unwrap();

    // Step 3: fetch it back.
    let fetched = api.ns("games").with_id(id).get().unwrap();
    assert_eq!(fetched, created);

    // Step 4: reveal a cell through a custom action.
    let game = api
        .ns("games")
        .with_id(id)
        .with_method("post")
        .call("reveal", json!({ "row": 4, "col": 5 }))
        .unwrap();
    assert_eq!(game["revealed"], json!([{ "row": 4, "col": 5 }]));

    // Step 5: pause.
    let game = api
        .ns("games")
        .with_id(id)
        .update(json!({ "paused": true }))
        .unwrap();
    assert_eq!(game["paused"], true);

    // Step 6: revealing while paused returns the error envelope, not Err.
    let conflict = api
        .ns("games")
        .with_id(id)
        .with_action("reveal")
        .execute(HttpMethod::Post, None, json!({ "row": 0, "col": 0 }))
        .unwrap();
    assert_eq!(conflict["success"], false);
    assert_eq!(conflict["error"]["status"], 409);

    // Step 7: delete; 204 decodes to null.
    let deleted = api.ns("games").with_id(id).destroy().unwrap();
    assert!(deleted.is_null());

    // Step 8: get after delete.
    let missing = api.ns("games").with_id(id).get().unwrap();
    assert_eq!(missing["error"]["status"], 404);
    assert_eq!(missing["error"]["userMessage"], "game not found");
}
