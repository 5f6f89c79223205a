//! HTTP routes.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use realmforge_domain::magic::SpellSelection;
use realmforge_domain::realm::RealmInputs;
use realmforge_domain::{
    CastRequest, CastingResult, OwnerId, RealmComputedFields, RealmEdit, RealmId, RitualEstimate,
    SpellCraft, SpellCraftId,
};

use crate::app::App;
use crate::infrastructure::ports::{RealmRecord, SpellCraftRecord};
use crate::use_cases::{EstimateRequest, RealmError, SpellError};

/// Header carrying the caller's owner id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        // Spells
        .route("/api/spells", get(list_spells).post(save_spell))
        .route("/api/spells/craft", post(craft_spell))
        .route("/api/spells/cast", post(cast_spell))
        .route("/api/spells/estimate", post(estimate_ritual))
        .route("/api/spells/{id}", axum::routing::delete(delete_spell))
        // Realms
        .route("/api/realms", get(list_realms).post(create_realm))
        .route("/api/realms/compute", post(compute_realm))
        .route("/api/realms/import", post(import_realm))
        .route(
            "/api/realms/{id}",
            get(get_realm)
                .put(replace_realm)
                .patch(update_realm)
                .delete(delete_realm),
        )
        .route("/api/realms/{id}/export", get(export_realm))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Owner identity
// =============================================================================

/// The caller, identified by the `X-User-Id` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub OwnerId);

impl<S: Send + Sync> FromRequestParts<S> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or(ApiError::Unauthorized)?;
        let value = value
            .to_str()
            .map_err(|_| ApiError::BadRequest("X-User-Id must be a UUID".to_string()))?;
        OwnerId::from_str(value.trim())
            .map(Owner)
            .map_err(|e| ApiError::BadRequest(e.to_string()))
    }
}

// =============================================================================
// Spells
// =============================================================================

async fn craft_spell(
    State(app): State<Arc<App>>,
    Json(selection): Json<SpellSelection>,
) -> Json<SpellCraft> {
    Json(app.use_cases.spells.craft(selection))
}

async fn cast_spell(
    State(app): State<Arc<App>>,
    Json(request): Json<CastRequest>,
) -> Result<Json<CastingResult>, ApiError> {
    Ok(Json(app.use_cases.spells.cast(&request)?))
}

async fn estimate_ritual(
    State(app): State<Arc<App>>,
    Json(request): Json<EstimateRequest>,
) -> Json<RitualEstimate> {
    Json(app.use_cases.spells.estimate(&request))
}

async fn list_spells(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
) -> Result<Json<Vec<SpellCraftRecord>>, ApiError> {
    Ok(Json(app.use_cases.spells.list(owner).await?))
}

async fn save_spell(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Json(selection): Json<SpellSelection>,
) -> Result<(StatusCode, Json<SpellCraftRecord>), ApiError> {
    let spells = &app.use_cases.spells;
    let record = spells.save(owner, spells.craft(selection)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn delete_spell(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app.use_cases
        .spells
        .delete(owner, SpellCraftId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Realms
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreateRealmRequest {
    name: String,
}

async fn compute_realm(
    State(app): State<Arc<App>>,
    Json(inputs): Json<RealmInputs>,
) -> Json<RealmComputedFields> {
    Json(app.use_cases.realms.compute(&inputs))
}

async fn list_realms(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
) -> Result<Json<Vec<RealmRecord>>, ApiError> {
    Ok(Json(app.use_cases.realms.list(owner).await?))
}

async fn create_realm(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Json(request): Json<CreateRealmRequest>,
) -> Result<(StatusCode, Json<RealmRecord>), ApiError> {
    let record = app.use_cases.realms.create(owner, &request.name).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_realm(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<RealmRecord>, ApiError> {
    let record = app
        .use_cases
        .realms
        .get(owner, RealmId::from_uuid(id))
        .await?;
    Ok(Json(record))
}

async fn replace_realm(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
    Json(document): Json<Value>,
) -> Result<Json<RealmRecord>, ApiError> {
    let record = app
        .use_cases
        .realms
        .replace(owner, RealmId::from_uuid(id), document)
        .await?;
    Ok(Json(record))
}

async fn update_realm(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
    Json(edits): Json<Vec<RealmEdit>>,
) -> Result<Json<RealmRecord>, ApiError> {
    let record = app
        .use_cases
        .realms
        .update(owner, RealmId::from_uuid(id), edits)
        .await?;
    Ok(Json(record))
}

async fn delete_realm(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app.use_cases
        .realms
        .delete(owner, RealmId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn export_realm(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let export = app
        .use_cases
        .realms
        .export(owner, RealmId::from_uuid(id))
        .await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        header_safe_file_name(&export.file_name)
    );
    let headers = [
        (header::CONTENT_TYPE, "application/json".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, export.json).into_response())
}

/// Body is the raw exported JSON text.
async fn import_realm(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    body: String,
) -> Result<(StatusCode, Json<RealmRecord>), ApiError> {
    let record = app.use_cases.realms.import(owner, &body).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

fn header_safe_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    Unauthorized,
    TooManyRequests { retry_after: Duration, message: String },
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Missing X-User-Id header").into_response()
            }
            ApiError::TooManyRequests {
                retry_after,
                message,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after_secs(retry_after).to_string())],
                message,
            )
                .into_response(),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

/// Whole seconds, rounded up, never zero.
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

impl From<RealmError> for ApiError {
    fn from(e: RealmError) -> Self {
        match e {
            RealmError::NotFound(_) => ApiError::NotFound,
            RealmError::Domain(e) => ApiError::BadRequest(e.to_string()),
            RealmError::Throttled(e) => ApiError::TooManyRequests {
                retry_after: e.retry_after(),
                message: e.to_string(),
            },
            RealmError::Repo(e) if e.is_not_found() => ApiError::NotFound,
            RealmError::Repo(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<SpellError> for ApiError {
    fn from(e: SpellError) -> Self {
        match e {
            SpellError::NotFound(_) => ApiError::NotFound,
            SpellError::Domain(e) => ApiError::BadRequest(e.to_string()),
            SpellError::Throttled(e) => ApiError::TooManyRequests {
                retry_after: e.retry_after(),
                message: e.to_string(),
            },
            SpellError::Repo(e) if e.is_not_found() => ApiError::NotFound,
            SpellError::Repo(e) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::EngineConfig;
    use crate::infrastructure::throttle::WriteThrottleConfig;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    fn router_with(config: EngineConfig) -> Router {
        routes().with_state(Arc::new(App::in_memory(&config)))
    }

    /// Router whose writes never cool down.
    fn router() -> Router {
        router_with(EngineConfig {
            throttle: WriteThrottleConfig {
                cooldown: Duration::ZERO,
                ..WriteThrottleConfig::default()
            },
            ..EngineConfig::default()
        })
    }

    fn request(method: &str, uri: &str, owner: Option<OwnerId>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(owner) = owner {
            builder = builder.header(USER_ID_HEADER, owner.to_string());
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, _) = send(&router(), request("GET", "/api/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn craft_returns_derived_totals() {
        let body = json!({
            "name": "Fireball",
            "effects": [
                { "name": "Create", "cost": 6, "greater": true, "path": "Energy" },
                { "name": "Control", "cost": 5, "greater": false, "path": "Energy" }
            ],
            "modifiers": [ { "name": "Damage", "cost": 4, "type": "modifier" } ]
        });
        let (status, craft) = send(
            &router(),
            request("POST", "/api/spells/craft", None, Some(body)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(craft["greaterEffects"], 1);
        assert_eq!(craft["totalEnergy"], 45);
    }

    #[tokio::test]
    async fn cast_returns_a_full_trace() {
        let body = json!({ "spellName": "Light", "requiredEnergy": 5, "cap": 14, "skill": 12 });
        let (status, result) =
            send(&router(), request("POST", "/api/spells/cast", None, Some(body))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["spellName"], "Light");
        assert!(!result["rolls"].as_array().unwrap().is_empty());
        assert!(result["termination"].is_string());
    }

    #[tokio::test]
    async fn cast_without_energy_requirement_is_rejected() {
        let body = json!({ "spellName": "Nothing", "requiredEnergy": 0, "cap": 14, "skill": 12 });
        let (status, _) =
            send(&router(), request("POST", "/api/spells/cast", None, Some(body))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn estimate_clamps_success_chance() {
        let body = json!({ "ritual": "Storm", "path": "Energy", "power": 30, "modifiers": "5, x" });
        let (status, estimate) =
            send(&router(), request("POST", "/api/spells/estimate", None, Some(body))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(estimate["successChance"], 95);
        assert_eq!(estimate["totalModifiers"], 5);
    }

    #[tokio::test]
    async fn saved_spells_round_trip_through_the_api() {
        let router = router();
        let owner = OwnerId::new();
        let body = json!({ "name": "Ward", "effects": [ { "name": "Strengthen", "cost": 3, "path": "Protection" } ] });

        let (status, saved) =
            send(&router, request("POST", "/api/spells", Some(owner), Some(body))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(saved["craft"]["totalEnergy"], 3);

        let (_, listed) = send(&router, request("GET", "/api/spells", Some(owner), None)).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let uri = format!("/api/spells/{}", saved["id"].as_str().unwrap());
        let (status, _) = send(&router, request("DELETE", &uri, Some(owner), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&router, request("DELETE", &uri, Some(owner), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn realm_routes_require_an_owner() {
        let router = router();
        let (status, _) = send(&router, request("GET", "/api/realms", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let bad = Request::builder()
            .uri("/api/realms")
            .header(USER_ID_HEADER, "not-a-uuid")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&router, bad).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn realm_lifecycle() {
        let router = router();
        let owner = OwnerId::new();

        let (status, created) = send(
            &router,
            request("POST", "/api/realms", Some(owner), Some(json!({ "name": "Duskmere" }))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["realm"]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/realms/{id}");

        let edits = json!([
            { "field": "population", "value": 2000 },
            { "field": "techLevel", "value": 3 },
            { "field": "taxationRating", "value": 3 },
            { "field": "addEnhancement", "value": { "name": "Port", "pointCost": 5, "level": 2 } }
        ]);
        let (status, updated) =
            send(&router, request("PATCH", &uri, Some(owner), Some(edits))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["realm"]["enhancements"][0]["totalCost"], 10);
        assert_eq!(updated["realm"]["computed"]["enhancementsSum"], 10);

        let (status, _) = send(&router, request("GET", &uri, Some(OwnerId::new()), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&router, request("DELETE", &uri, Some(owner), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&router, request("GET", &uri, Some(owner), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_edit_is_a_bad_request() {
        let router = router();
        let owner = OwnerId::new();
        let (_, created) = send(
            &router,
            request("POST", "/api/realms", Some(owner), Some(json!({ "name": "Strict" }))),
        )
        .await;
        let uri = format!("/api/realms/{}", created["realm"]["id"].as_str().unwrap());

        let edits = json!([{ "field": "removeLimitation", "value": 4 }]);
        let (status, _) = send(&router, request("PATCH", &uri, Some(owner), Some(edits))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rapid_writes_get_429_with_retry_after() {
        let router = router_with(EngineConfig::default());
        let owner = OwnerId::new();
        let (_, created) = send(
            &router,
            request("POST", "/api/realms", Some(owner), Some(json!({ "name": "Busy" }))),
        )
        .await;
        let uri = format!("/api/realms/{}", created["realm"]["id"].as_str().unwrap());

        let edits = json!([{ "field": "wartime", "value": true }]);
        let response = router
            .clone()
            .oneshot(request("PATCH", &uri, Some(owner), Some(edits)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "1");
    }

    #[tokio::test]
    async fn compute_is_stateless() {
        let inputs = json!({
            "habitability": 9,
            "population": 1000,
            "techLevel": 3,
            "workDependMod": 1,
            "taxationRating": 3
        });
        let (status, computed) =
            send(&router(), request("POST", "/api/realms/compute", None, Some(inputs))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(computed["habitabilityLabel"], "Poor -1");
        assert_eq!(computed["revenue"], 70_000);
    }

    #[tokio::test]
    async fn compute_defaults_missing_work_depend_mod() {
        let inputs = json!({ "population": 1000, "techLevel": 3, "taxationRating": 3 });
        let (status, computed) =
            send(&router(), request("POST", "/api/realms/compute", None, Some(inputs))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(computed["realmValue"], 700_000);
        assert_eq!(computed["revenue"], 70_000);
    }

    #[tokio::test]
    async fn import_migrates_and_export_names_the_file() {
        let router = router();
        let owner = OwnerId::new();
        let legacy = json!({
            "name": "Old Keep",
            "surroundings": { "habitability": 10, "totalArea": 100, "densityPerMile": 10 },
            "government": { "controlRating": 2, "taxationRating": 3 },
            "fundsAndPeople": { "population": 1000, "independentIncome": true, "independentIncomeLevel": 10 },
            "details": { "techLevel": 3 },
            "resources": {}
        });

        let (status, imported) = send(
            &router,
            request("POST", "/api/realms/import", Some(owner), Some(legacy)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(imported["realm"]["schemaVersion"], 2);
        assert_eq!(imported["realm"]["computed"]["earningsAtTurn"], 77_000);

        let uri = format!(
            "/api/realms/{}/export",
            imported["realm"]["id"].as_str().unwrap()
        );
        let response = router
            .clone()
            .oneshot(request("GET", &uri, Some(owner), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"Old Keep-"));
    }

    #[test]
    fn retry_after_rounds_up() {
        assert_eq!(retry_after_secs(Duration::from_millis(1)), 1);
        assert_eq!(retry_after_secs(Duration::from_millis(1500)), 2);
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
    }

    #[test]
    fn file_names_are_header_safe() {
        assert_eq!(header_safe_file_name("Río \"Grande\".json"), "R_o _Grande_.json");
    }
}
