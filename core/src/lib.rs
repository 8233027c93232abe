//! Typed client core for a CDN service-management API.
//!
//! # Overview
//! Covers the service lifecycle (list, create, get, details, update, delete,
//! search) and per-service domain listings. Inputs are validated locally,
//! each operation makes exactly one HTTP round trip, and responses are
//! decoded into typed records.
//!
//! # Design
//! - `ServiceClient` is stateless: `build_*` validates and produces an
//!   `HttpRequest`, `parse_*` consumes an `HttpResponse` (host-does-IO).
//! - `Client<T: Transport>` joins the two around a pluggable transport;
//!   `UreqTransport` is the blocking default.
//! - Validation errors are sentinel variants of `ApiError`, raised before any
//!   request is built.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod de;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use api::Client;
pub use client::ServiceClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use transport::{TransportConfig, UreqTransport};
pub use types::{
    CreateServiceInput, DeleteServiceInput, GetServiceInput, ListServiceDomainInput,
    ListServicesInput, SearchServiceInput, Service, ServiceDetail, ServiceDomain,
    ServiceDomainsList, StatusResponse, UpdateServiceInput, Version,
};
