//! Verify key-case conversion against JSON test vectors stored in `test-vectors/`.
//!
//! Whole documents are compared as parsed JSON, so field ordering never
//! causes false negatives.

use pipeline_core::case::{camel_to_snake, keys_to_camel, keys_to_snake, snake_to_camel};
use pipeline_core::interceptors::{camel_case_body, snake_case_body};
use pipeline_core::{Body, Request, Response};

fn vectors() -> serde_json::Value {
    let raw = include_str!("../../test-vectors/case.json");
    serde_json::from_str(raw).unwrap()
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

#[test]
fn key_vectors_convert_both_ways() {
    for case in vectors()["keys"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let camel = case["camel"].as_str().unwrap();
        let snake = case["snake"].as_str().unwrap();
        assert_eq!(camel_to_snake(camel), snake, "{name}: to snake");
        assert_eq!(snake_to_camel(snake), camel, "{name}: to camel");
    }
}

#[test]
fn one_way_vectors() {
    let v = vectors();
    for case in v["one_way_to_snake"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = case["input"].as_str().unwrap();
        assert_eq!(camel_to_snake(input), case["expected"], "{name}");
    }
    for case in v["one_way_to_camel"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = case["input"].as_str().unwrap();
        assert_eq!(snake_to_camel(input), case["expected"], "{name}");
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[test]
fn document_vectors() {
    for case in vectors()["documents"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        assert_eq!(keys_to_snake(case["camel"].clone()), case["snake"], "{name}: to snake");
        assert_eq!(keys_to_camel(case["snake"].clone()), case["camel"], "{name}: to camel");
    }
}

#[test]
fn document_vectors_through_interceptors() {
    let to_snake = snake_case_body();
    let to_camel = camel_case_body();
    for case in vectors()["documents"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();

        let request = to_snake(Request::new().with("body", case["camel"].clone())).unwrap();
        assert_eq!(request.body(), Some(&case["snake"]), "{name}: request body");

        let response = Response::new(200).with_body(Body::Json(case["snake"].clone()));
        let response = to_camel(response).unwrap();
        assert_eq!(response.body, Body::Json(case["camel"].clone()), "{name}: response body");
    }
}
