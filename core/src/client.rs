//! Stateless request builder and response parser for the service API.
//!
//! # Design
//! `ServiceClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! validates its input and produces an `HttpRequest`, and a `parse_*` method
//! that consumes an `HttpResponse`. Validation lives entirely in `build_*`, so
//! a rejected input never reaches a transport.
//!
//! Post-processing also lives here: `parse_list_services` sorts by name and
//! `parse_get_service` backfills the active version, which that endpoint
//! omits.

use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    CreateServiceInput, DeleteServiceInput, GetServiceInput, ListServiceDomainInput,
    ListServicesInput, SearchServiceInput, Service, ServiceDetail, ServiceDomainsList,
    StatusResponse, UpdateServiceInput,
};

/// Synchronous, stateless client for the service API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. See [`crate::Client`] for the variant that drives a
/// [`crate::Transport`].
#[derive(Debug, Clone)]
pub struct ServiceClient {
    base_url: String,
}

impl ServiceClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn service_url(&self, id: &str) -> String {
        format!("{}/service/{}", self.base_url, urlencoding::encode(id))
    }

    pub fn build_list_services(&self, _input: &ListServicesInput) -> HttpRequest {
        HttpRequest::without_body(HttpMethod::Get, format!("{}/service", self.base_url))
    }

    pub fn build_create_service(&self, input: &CreateServiceInput) -> HttpRequest {
        HttpRequest::form(
            HttpMethod::Post,
            format!("{}/service", self.base_url),
            &input.form_pairs(),
        )
    }

    pub fn build_get_service(&self, input: &GetServiceInput) -> Result<HttpRequest, ApiError> {
        if input.id.is_empty() {
            return Err(ApiError::MissingId);
        }
        Ok(HttpRequest::without_body(HttpMethod::Get, self.service_url(&input.id)))
    }

    pub fn build_get_service_details(&self, input: &GetServiceInput) -> Result<HttpRequest, ApiError> {
        if input.id.is_empty() {
            return Err(ApiError::MissingId);
        }
        Ok(HttpRequest::without_body(
            HttpMethod::Get,
            format!("{}/details", self.service_url(&input.id)),
        ))
    }

    /// Checks run in a fixed order: service id, then presence of at least one
    /// field, then a non-empty name.
    pub fn build_update_service(&self, input: &UpdateServiceInput) -> Result<HttpRequest, ApiError> {
        if input.service_id.is_empty() {
            return Err(ApiError::MissingServiceId);
        }
        if input.name.is_none() && input.comment.is_none() {
            return Err(ApiError::MissingOptionalNameComment);
        }
        if input.name.as_deref() == Some("") {
            return Err(ApiError::MissingNameValue);
        }
        Ok(HttpRequest::form(
            HttpMethod::Put,
            self.service_url(&input.service_id),
            &input.form_pairs(),
        ))
    }

    pub fn build_delete_service(&self, input: &DeleteServiceInput) -> Result<HttpRequest, ApiError> {
        if input.id.is_empty() {
            return Err(ApiError::MissingId);
        }
        Ok(HttpRequest::without_body(HttpMethod::Delete, self.service_url(&input.id)))
    }

    pub fn build_search_service(&self, input: &SearchServiceInput) -> Result<HttpRequest, ApiError> {
        if input.name.is_empty() {
            return Err(ApiError::MissingName);
        }
        Ok(HttpRequest::without_body(
            HttpMethod::Get,
            format!(
                "{}/service/search?name={}",
                self.base_url,
                urlencoding::encode(&input.name)
            ),
        ))
    }

    pub fn build_list_service_domains(
        &self,
        input: &ListServiceDomainInput,
    ) -> Result<HttpRequest, ApiError> {
        if input.id.is_empty() {
            return Err(ApiError::MissingId);
        }
        Ok(HttpRequest::without_body(
            HttpMethod::Get,
            format!("{}/domain", self.service_url(&input.id)),
        ))
    }

    /// Services ordered by name; services sharing a name keep API order.
    pub fn parse_list_services(&self, response: HttpResponse) -> Result<Vec<Service>, ApiError> {
        let mut services: Vec<Service> = decode(response)?;
        sort_by_name(&mut services);
        Ok(services)
    }

    pub fn parse_create_service(&self, response: HttpResponse) -> Result<Service, ApiError> {
        decode(response)
    }

    pub fn parse_get_service(&self, response: HttpResponse) -> Result<Service, ApiError> {
        let mut service: Service = decode(response)?;
        service.backfill_active_version();
        trace!(id = %service.id, active_version = service.active_version, "backfilled active version");
        Ok(service)
    }

    pub fn parse_get_service_details(&self, response: HttpResponse) -> Result<ServiceDetail, ApiError> {
        decode(response)
    }

    pub fn parse_update_service(&self, response: HttpResponse) -> Result<Service, ApiError> {
        decode(response)
    }

    pub fn parse_delete_service(&self, response: HttpResponse) -> Result<(), ApiError> {
        let status: StatusResponse = decode(response)?;
        if !status.is_ok() {
            return Err(ApiError::NotOk);
        }
        Ok(())
    }

    pub fn parse_search_service(&self, response: HttpResponse) -> Result<Service, ApiError> {
        decode(response)
    }

    pub fn parse_list_service_domains(
        &self,
        response: HttpResponse,
    ) -> Result<ServiceDomainsList, ApiError> {
        decode(response)
    }
}

/// Stable sort by name using the default `str` ordering.
pub fn sort_by_name(services: &mut [Service]) {
    services.sort_by(|a, b| a.name.cmp(&b.name));
}

/// Map a non-2xx status to `HttpError`, then deserialize the body.
fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
