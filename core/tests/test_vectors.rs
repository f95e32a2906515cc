//! Verify request compilation and response decoding against JSON test
//! vectors stored in `test-vectors/`.
//!
//! Each case lists builder settings, a chain of calls, the `execute`
//! arguments, the request the transport should see, a simulated response and
//! the expected result. Bodies are compared as strings because byte-exact
//! encoding (key order, escaping) is part of what is being tested.

use std::cell::RefCell;

use minesweeper_core::{
    ApiError, HttpMethod, HttpRequest, HttpResponse, RequestBuilder, Settings, Transport,
};
use serde_json::Value;

/// Replays one canned response and remembers the request it was asked to send.
struct ReplayTransport {
    response: HttpResponse,
    sent: RefCell<Option<HttpRequest>>,
}

impl Transport for ReplayTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        *self.sent.borrow_mut() = Some(request.clone());
        Ok(self.response.clone())
    }
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    HttpMethod::parse(s).unwrap_or_else(|| panic!("unknown method: {s}"))
}

fn apply_step(api: &mut RequestBuilder<&ReplayTransport>, step: &Value, name: &str) {
    let (op, arg) = step
        .as_object()
        .and_then(|m| m.iter().next())
        .unwrap_or_else(|| panic!("{name}: malformed step {step}"));
    match op.as_str() {
        "ns" => {
            api.ns(arg.as_str().unwrap());
        }
        "id" => {
            api.with_id(arg.as_str().unwrap());
        }
        "action" => {
            api.with_action(arg.as_str().unwrap());
        }
        "method" => {
            api.with_method(arg.as_str().unwrap());
        }
        "params" => {
            api.with_params(arg.clone());
        }
        "debug" => {
            api.set_debug(arg.as_bool().unwrap());
        }
        "configure" => {
            api.configure_from_value(arg.clone()).unwrap();
        }
        other => panic!("{name}: unknown step {other}"),
    }
}

#[test]
fn compile_test_vectors() {
    let raw = include_str!("../../test-vectors/compile.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let transport = ReplayTransport {
            response: HttpResponse {
                status: sim["status"].as_u64().unwrap() as u16,
                headers: Vec::new(),
                body: sim["body"].as_str().unwrap().to_string(),
            },
            sent: RefCell::new(None),
        };

        let settings = Settings::from_value(case["settings"].clone()).unwrap();
        let mut api = RequestBuilder::with_transport(settings, &transport);
        for step in case["chain"].as_array().unwrap() {
            apply_step(&mut api, step, name);
        }

        let exec = &case["execute"];
        let verb = parse_method(exec["verb"].as_str().unwrap());
        let raw_url = exec["raw_url"].as_str();
        let result = api.execute(verb, raw_url, exec["params"].clone());

        // Verify the compiled request
        let expected_req = &case["expected_request"];
        let req = transport
            .sent
            .borrow_mut()
            .take()
            .unwrap_or_else(|| panic!("{name}: nothing was sent"));
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, expected_req["url"].as_str().unwrap(), "{name}: url");

        let expected_headers: Vec<(String, String)> = expected_req["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");
        assert_eq!(req.body.as_deref(), expected_req["body"].as_str(), "{name}: body");

        // Verify the decoded result
        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "Decode" => assert!(matches!(err, ApiError::Decode(_)), "{name}: expected Decode"),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            assert_eq!(result.unwrap(), case["expected_result"], "{name}: result");
        }

        // State never survives a request
        assert!(api.state().is_empty(), "{name}: state not reset");
    }
}
