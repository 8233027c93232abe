//! One-call-per-operation client over a [`Transport`].
//!
//! `Client` pairs a [`ServiceClient`] with a transport: each method builds the
//! request (validating first), sends it once, and parses the response. There
//! is no retry, pagination or caching, and no state is shared between calls.

use tracing::debug;

use crate::client::ServiceClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::transport::{TransportConfig, UreqTransport};
use crate::types::{
    CreateServiceInput, DeleteServiceInput, GetServiceInput, ListServiceDomainInput,
    ListServicesInput, SearchServiceInput, Service, ServiceDetail, ServiceDomainsList,
    UpdateServiceInput,
};

#[derive(Debug, Clone)]
pub struct Client<T> {
    services: ServiceClient,
    transport: T,
}

impl Client<UreqTransport> {
    /// Blocking client for `config.base_url`, authenticated with
    /// `config.api_key`.
    pub fn from_config(config: &TransportConfig) -> Self {
        Self::new(&config.base_url, UreqTransport::new(config))
    }
}

impl<T: Transport> Client<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            services: ServiceClient::new(base_url),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), path = %request.path, "sending request");
        let response = self.transport.send(request)?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    pub fn list_services(&self, input: &ListServicesInput) -> Result<Vec<Service>, ApiError> {
        let req = self.services.build_list_services(input);
        self.services.parse_list_services(self.send(req)?)
    }

    pub fn create_service(&self, input: &CreateServiceInput) -> Result<Service, ApiError> {
        let req = self.services.build_create_service(input);
        self.services.parse_create_service(self.send(req)?)
    }

    /// Unknown ids come back as `HttpError { status: 400, .. }`.
    pub fn get_service(&self, input: &GetServiceInput) -> Result<Service, ApiError> {
        let req = self.services.build_get_service(input)?;
        self.services.parse_get_service(self.send(req)?)
    }

    pub fn get_service_details(&self, input: &GetServiceInput) -> Result<ServiceDetail, ApiError> {
        let req = self.services.build_get_service_details(input)?;
        self.services.parse_get_service_details(self.send(req)?)
    }

    pub fn update_service(&self, input: &UpdateServiceInput) -> Result<Service, ApiError> {
        let req = self.services.build_update_service(input)?;
        self.services.parse_update_service(self.send(req)?)
    }

    pub fn delete_service(&self, input: &DeleteServiceInput) -> Result<(), ApiError> {
        let req = self.services.build_delete_service(input)?;
        self.services.parse_delete_service(self.send(req)?)
    }

    /// A name with no match comes back as `HttpError { status: 400, .. }`.
    pub fn search_service(&self, input: &SearchServiceInput) -> Result<Service, ApiError> {
        let req = self.services.build_search_service(input)?;
        self.services.parse_search_service(self.send(req)?)
    }

    pub fn list_service_domains(
        &self,
        input: &ListServiceDomainInput,
    ) -> Result<ServiceDomainsList, ApiError> {
        let req = self.services.build_list_service_domains(input)?;
        self.services.parse_list_service_domains(self.send(req)?)
    }
}
