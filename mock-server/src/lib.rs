use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const CUSTOMER_ID: &str = "x4xCwxxJxGCx123Rx5xTx";

/// Any non-empty value is accepted.
pub const AUTH_HEADER: &str = "fastly-key";

#[derive(Clone, Debug)]
pub struct MockVersion {
    pub number: u64,
    pub active: bool,
    pub locked: bool,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct MockDomain {
    pub name: String,
    pub version: i64,
    pub comment: String,
    pub locked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct MockService {
    pub id: String,
    pub name: String,
    pub service_type: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub versions: Vec<MockVersion>,
    pub domains: Vec<MockDomain>,
}

fn timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl MockService {
    fn active_version(&self) -> Option<&MockVersion> {
        self.versions.iter().find(|v| v.active)
    }

    fn version_json(&self, v: &MockVersion) -> Value {
        json!({
            "number": v.number,
            "active": v.active,
            "locked": v.locked,
            "deployed": false,
            "staging": false,
            "testing": false,
            "comment": v.comment,
            "service_id": self.id,
            "created_at": timestamp(&v.created_at),
            "updated_at": timestamp(&v.updated_at),
            "deleted_at": null,
        })
    }

    /// The single-service endpoint leaves out `version`; the list endpoint
    /// includes it.
    fn summary_json(&self, with_active_version: bool) -> Value {
        let mut body = json!({
            "id": self.id,
            "name": self.name,
            "type": self.service_type,
            "comment": self.comment,
            "customer_id": CUSTOMER_ID,
            "created_at": timestamp(&self.created_at),
            "updated_at": timestamp(&self.updated_at),
            "deleted_at": null,
            "versions": self.versions.iter().map(|v| self.version_json(v)).collect::<Vec<_>>(),
        });
        if with_active_version {
            body["version"] = json!(self.active_version().map_or(0, |v| v.number));
        }
        body
    }

    fn details_json(&self) -> Value {
        let mut body = self.summary_json(false);
        body["active_version"] = self
            .active_version()
            .map_or(Value::Null, |v| self.version_json(v));
        body["version"] = self
            .versions
            .last()
            .map_or(Value::Null, |v| self.version_json(v));
        body
    }

    fn domain_json(&self, d: &MockDomain) -> Value {
        json!({
            "name": d.name,
            "locked": d.locked,
            "service_id": self.id,
            "version": d.version,
            "comment": d.comment,
            "created_at": timestamp(&d.created_at),
            "updated_at": timestamp(&d.created_at),
            "deleted_at": null,
        })
    }
}

/// Services in creation order.
#[derive(Debug, Default)]
pub struct MockState {
    services: Vec<MockService>,
}

impl MockState {
    /// New services start with a single inactive version 1.
    pub fn insert_service(&mut self, name: &str, service_type: &str, comment: &str) -> String {
        let now = Utc::now();
        let id = Uuid::new_v4().simple().to_string();
        self.services.push(MockService {
            id: id.clone(),
            name: name.to_string(),
            service_type: service_type.to_string(),
            comment: comment.to_string(),
            created_at: now,
            updated_at: now,
            versions: vec![MockVersion {
                number: 1,
                active: false,
                locked: false,
                comment: String::new(),
                created_at: now,
                updated_at: now,
            }],
            domains: Vec::new(),
        });
        id
    }

    pub fn service(&self, id: &str) -> Option<&MockService> {
        self.services.iter().find(|s| s.id == id)
    }

    fn service_mut(&mut self, id: &str) -> Option<&mut MockService> {
        self.services.iter_mut().find(|s| s.id == id)
    }

    /// Append a blank inactive version numbered after the latest one;
    /// returns its number.
    pub fn add_version(&mut self, id: &str) -> Option<u64> {
        let service = self.service_mut(id)?;
        let now = Utc::now();
        let number = service.versions.last().map_or(1, |v| v.number + 1);
        service.versions.push(MockVersion {
            number,
            active: false,
            locked: false,
            comment: String::new(),
            created_at: now,
            updated_at: now,
        });
        Some(number)
    }

    /// Activate `number` and deactivate every other version.
    pub fn activate_version(&mut self, id: &str, number: u64) -> bool {
        let Some(service) = self.service_mut(id) else {
            return false;
        };
        if !service.versions.iter().any(|v| v.number == number) {
            return false;
        }
        for v in &mut service.versions {
            v.active = v.number == number;
            if v.active {
                v.locked = true;
            }
        }
        true
    }

    pub fn add_domain(&mut self, id: &str, version: i64, name: &str, comment: &str) -> bool {
        let Some(service) = self.service_mut(id) else {
            return false;
        };
        service.domains.push(MockDomain {
            name: name.to_string(),
            version,
            comment: comment.to_string(),
            locked: false,
            created_at: Utc::now(),
        });
        true
    }
}

pub type Db = Arc<RwLock<MockState>>;

type Failure = (StatusCode, Json<Value>);

/// The API answers 400, not 404, for unknown services.
fn bad_request(msg: &str, detail: String) -> Failure {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "msg": msg, "detail": detail })),
    )
}

fn record_not_found(id: &str) -> Failure {
    bad_request("Record not found", format!("Cannot find service '{id}'"))
}

pub fn app() -> Router {
    app_with_state(Db::default())
}

pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/service", get(list_services).post(create_service))
        .route("/service/search", get(search_service))
        .route(
            "/service/{id}",
            get(get_service).put(update_service).delete(delete_service),
        )
        .route("/service/{id}/details", get(get_service_details))
        .route("/service/{id}/domain", get(list_service_domains))
        .with_state(db)
        .layer(middleware::from_fn(require_api_key))
}

async fn require_api_key(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(AUTH_HEADER)
        .is_some_and(|v| !v.is_empty());
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "msg": "Provided credentials are missing or invalid" })),
        )
            .into_response();
    }
    next.run(request).await
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, Db::default()).await
}

pub async fn run_with_state(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(db)).await
}

#[derive(Debug, Deserialize)]
pub struct CreateServiceForm {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub service_type: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateServiceForm {
    pub name: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
}

async fn list_services(State(db): State<Db>) -> Json<Value> {
    let state = db.read().await;
    Json(Value::Array(
        state.services.iter().map(|s| s.summary_json(true)).collect(),
    ))
}

async fn create_service(
    State(db): State<Db>,
    Form(input): Form<CreateServiceForm>,
) -> Result<Json<Value>, Failure> {
    let name = input.name.filter(|n| !n.is_empty()).ok_or_else(|| {
        bad_request("Bad request", "Missing required field 'name'".to_string())
    })?;
    let service_type = input.service_type.unwrap_or_else(|| "vcl".to_string());
    let comment = input.comment.unwrap_or_default();

    let mut state = db.write().await;
    let id = state.insert_service(&name, &service_type, &comment);
    info!(%id, %name, "created service");
    let service = state.service(&id).ok_or_else(|| record_not_found(&id))?;
    Ok(Json(service.summary_json(false)))
}

async fn get_service(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Value>, Failure> {
    let state = db.read().await;
    let service = state.service(&id).ok_or_else(|| record_not_found(&id))?;
    Ok(Json(service.summary_json(false)))
}

async fn get_service_details(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Value>, Failure> {
    let state = db.read().await;
    let service = state.service(&id).ok_or_else(|| record_not_found(&id))?;
    Ok(Json(service.details_json()))
}

async fn update_service(
    State(db): State<Db>,
    Path(id): Path<String>,
    Form(input): Form<UpdateServiceForm>,
) -> Result<Json<Value>, Failure> {
    if input.name.as_deref() == Some("") {
        return Err(bad_request("Bad request", "Name can't be blank".to_string()));
    }
    let mut state = db.write().await;
    let service = state.service_mut(&id).ok_or_else(|| record_not_found(&id))?;
    if let Some(name) = input.name {
        service.name = name;
    }
    if let Some(comment) = input.comment {
        service.comment = comment;
    }
    service.updated_at = Utc::now();
    info!(%id, "updated service");
    Ok(Json(service.summary_json(false)))
}

async fn delete_service(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Value>, Failure> {
    let mut state = db.write().await;
    let before = state.services.len();
    state.services.retain(|s| s.id != id);
    if state.services.len() == before {
        return Err(record_not_found(&id));
    }
    info!(%id, "deleted service");
    Ok(Json(json!({ "status": "ok" })))
}

async fn search_service(
    State(db): State<Db>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, Failure> {
    let name = params.name.unwrap_or_default();
    let state = db.read().await;
    let service = state
        .services
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| bad_request("Record not found", format!("Cannot find service named '{name}'")))?;
    Ok(Json(service.summary_json(true)))
}

async fn list_service_domains(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Value>, Failure> {
    let state = db.read().await;
    let service = state.service(&id).ok_or_else(|| record_not_found(&id))?;
    Ok(Json(Value::Array(
        service.domains.iter().map(|d| service.domain_json(d)).collect(),
    )))
}
