use axum::http::HeaderValue;
use axum::{routing::get, Router};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{ApiConfig, AppConfig};
use crate::handlers;
use crate::services::asset_service::AssetService;
use crate::services::calculation_service::CalculationService;
use crate::services::category_service::CategoryService;
use crate::services::directory::IdentityDirectory;
use crate::services::family_service::FamilyService;
use crate::services::transaction_service::TransactionService;
use crate::services::user_service::UserService;

/// Shared router state: the pool, the loaded configuration, and the identity
/// directory seam (swapped for a stub in tests)
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    directory: Arc<dyn IdentityDirectory>,
}

impl AppState {
    pub fn new(pool: PgPool, directory: Arc<dyn IdentityDirectory>, config: AppConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            directory,
        }
    }

    pub fn families(&self) -> FamilyService {
        FamilyService::new(self.pool.clone(), Arc::clone(&self.directory))
    }

    pub fn assets(&self) -> AssetService {
        AssetService::new(self.pool.clone(), self.families())
    }

    pub fn transactions(&self) -> TransactionService {
        TransactionService::new(self.pool.clone())
    }

    pub fn categories(&self) -> CategoryService {
        CategoryService::new(self.pool.clone())
    }

    pub fn calculations(&self) -> CalculationService {
        CalculationService::new(self.assets(), self.transactions())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.pool.clone())
    }
}

pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(asset_routes())
        .merge(transaction_routes())
        .merge(calculation_routes())
        .merge(family_routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::bearer_auth,
        ));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(category_routes())
        // Everything else requires a bearer identity
        .merge(protected)
        // Global middleware
        .layer(cors_layer(&state.config.api))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn asset_routes() -> Router<AppState> {
    use handlers::assets;

    Router::new()
        .route("/api/assets", get(assets::list).post(assets::create))
        .route(
            "/api/assets/:asset_id",
            get(assets::get).put(assets::update).delete(assets::delete),
        )
}

fn transaction_routes() -> Router<AppState> {
    use handlers::transactions;

    Router::new()
        .route(
            "/api/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/api/transactions/:transaction_id",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::delete),
        )
}

fn calculation_routes() -> Router<AppState> {
    use handlers::calculations;

    Router::new()
        .route("/api/calculations/summary", get(calculations::summary))
        .route("/api/calculations/monthly", get(calculations::monthly))
}

fn family_routes() -> Router<AppState> {
    use axum::routing::{delete, post};
    use handlers::family;

    Router::new()
        .route("/api/family/groups", post(family::create_group))
        .route("/api/family/groups/my", get(family::my_group))
        .route(
            "/api/family/groups/:group_id/members",
            post(family::add_member),
        )
        .route(
            "/api/family/groups/:group_id/members/:member_user_id",
            delete(family::remove_member),
        )
}

fn category_routes() -> Router<AppState> {
    use handlers::categories;

    Router::new()
        .route("/api/categories", get(categories::list_by_type))
        .route("/api/categories/all", get(categories::list_all))
}

fn cors_layer(api: &ApiConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Household API",
        "version": version,
        "description": "Family asset tracking and household ledger backend",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "categories": "/api/categories[/all] (public)",
            "assets": "/api/assets[/:id] (bearer)",
            "transactions": "/api/transactions[/:id] (bearer)",
            "calculations": "/api/calculations/summary, /api/calculations/monthly (bearer)",
            "family": "/api/family/groups[...] (bearer)",
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
