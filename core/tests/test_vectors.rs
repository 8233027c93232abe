//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results or errors. Comparing parsed values (not raw
//! strings) avoids false negatives from field-ordering differences.

use std::fmt::Debug;

use cdn_core::{
    ApiError, CreateServiceInput, DeleteServiceInput, GetServiceInput, HttpMethod, HttpRequest,
    HttpResponse, ListServiceDomainInput, ListServicesInput, SearchServiceInput, Service,
    ServiceClient, ServiceDetail, ServiceDomain, UpdateServiceInput,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

const BASE_URL: &str = "https://api.example.com";

fn client() -> ServiceClient {
    ServiceClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

/// Stable names for error variants as written in the vector files.
fn error_name(err: &ApiError) -> String {
    match err {
        ApiError::MissingId => "MissingId".to_string(),
        ApiError::MissingServiceId => "MissingServiceId".to_string(),
        ApiError::MissingName => "MissingName".to_string(),
        ApiError::MissingOptionalNameComment => "MissingOptionalNameComment".to_string(),
        ApiError::MissingNameValue => "MissingNameValue".to_string(),
        ApiError::NotOk => "NotOk".to_string(),
        ApiError::HttpError { status, .. } => format!("HttpError{status}"),
        ApiError::Transport(_) => "Transport".to_string(),
        ApiError::DeserializationError(_) => "DeserializationError".to_string(),
    }
}

/// Bodies may be written inline as JSON or as a raw string.
fn simulated_response(sim: &Value) -> HttpResponse {
    let body = match &sim["body"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body,
    }
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.path, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");

    match expected.get("headers") {
        Some(headers) => {
            let expected_headers: Vec<(String, String)> =
                serde_json::from_value(headers.clone()).unwrap();
            assert_eq!(req.headers, expected_headers, "{name}: headers");
        }
        None => assert!(req.headers.is_empty(), "{name}: headers should be empty"),
    }

    match expected.get("body") {
        Some(body) => assert_eq!(req.body.as_deref(), body.as_str(), "{name}: body"),
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn run_vectors<I, T>(
    raw: &str,
    build: impl Fn(&ServiceClient, &I) -> Result<HttpRequest, ApiError>,
    parse: impl Fn(&ServiceClient, HttpResponse) -> Result<T, ApiError>,
) where
    I: DeserializeOwned,
    T: DeserializeOwned + PartialEq + Debug,
{
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: I = serde_json::from_value(case["input"].clone()).unwrap();

        // Verify build
        let built = build(&c, &input);
        if let Some(expected_error) = case.get("expected_build_error") {
            let err = built.expect_err(name);
            assert_eq!(error_name(&err), expected_error.as_str().unwrap(), "{name}: build error");
            continue;
        }
        let req = built.unwrap();
        check_request(name, &req, &case["expected_request"]);

        // Verify parse
        let result = parse(&c, simulated_response(&case["simulated_response"]));
        if let Some(expected_error) = case.get("expected_error") {
            let err = result.expect_err(name);
            assert_eq!(error_name(&err), expected_error.as_str().unwrap(), "{name}: parse error");
        } else if let Some(expected) = case.get("expected_result") {
            let expected: T = serde_json::from_value(expected.clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        } else {
            assert!(result.is_ok(), "{name}: expected success");
        }
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    run_vectors::<ListServicesInput, Vec<Service>>(
        include_str!("../../test-vectors/list.json"),
        |c, i| Ok(c.build_list_services(i)),
        |c, r| c.parse_list_services(r),
    );
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_test_vectors() {
    run_vectors::<CreateServiceInput, Service>(
        include_str!("../../test-vectors/create.json"),
        |c, i| Ok(c.build_create_service(i)),
        |c, r| c.parse_create_service(r),
    );
}

// ---------------------------------------------------------------------------
// Get / details
// ---------------------------------------------------------------------------

#[test]
fn get_test_vectors() {
    run_vectors::<GetServiceInput, Service>(
        include_str!("../../test-vectors/get.json"),
        |c, i| c.build_get_service(i),
        |c, r| c.parse_get_service(r),
    );
}

#[test]
fn details_test_vectors() {
    run_vectors::<GetServiceInput, ServiceDetail>(
        include_str!("../../test-vectors/details.json"),
        |c, i| c.build_get_service_details(i),
        |c, r| c.parse_get_service_details(r),
    );
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_test_vectors() {
    run_vectors::<UpdateServiceInput, Service>(
        include_str!("../../test-vectors/update.json"),
        |c, i| c.build_update_service(i),
        |c, r| c.parse_update_service(r),
    );
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn delete_test_vectors() {
    run_vectors::<DeleteServiceInput, ()>(
        include_str!("../../test-vectors/delete.json"),
        |c, i| c.build_delete_service(i),
        |c, r| c.parse_delete_service(r),
    );
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[test]
fn search_test_vectors() {
    run_vectors::<SearchServiceInput, Service>(
        include_str!("../../test-vectors/search.json"),
        |c, i| c.build_search_service(i),
        |c, r| c.parse_search_service(r),
    );
}

// ---------------------------------------------------------------------------
// Domains
// ---------------------------------------------------------------------------

#[test]
fn domains_test_vectors() {
    run_vectors::<ListServiceDomainInput, Vec<ServiceDomain>>(
        include_str!("../../test-vectors/domains.json"),
        |c, i| c.build_list_service_domains(i),
        |c, r| c.parse_list_service_domains(r),
    );
}
