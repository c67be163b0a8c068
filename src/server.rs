//! HTTP surface over the translation service.
//!
//! Every request gets its own [`Intl`] built from the shared state, so caches
//! never leak between requests. The request locale comes from the JSON body
//! (or query string), then from `Accept-Language`, then the default.

use crate::config::Config;
use crate::db::Database;
use crate::i18n::format::parser;
use crate::i18n::{
    Args, Catalog, DatabaseStore, I18nError, Intl, LocaleRegistry, MetricsReport, StoreError,
    TranslationCause, TranslationMetrics, TranslationStore, TranslationValidator, MESSAGES_CONTEXT,
};
use crate::security::{self, API_KEY_HEADER};
use anyhow::Context;
use axum::extract::{Path, Query, State};
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub struct AppState {
    pub config: Config,
    pub registry: Arc<LocaleRegistry>,
    pub store: Arc<dyn TranslationStore>,
    pub database: Database,
    pub metrics: Arc<TranslationMetrics>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Build the shared state from configuration and an open database.
    pub fn new(config: Config, database: Database) -> anyhow::Result<Self> {
        let registry = LocaleRegistry::new(&config.locales, &config.default_locale)
            .context("Invalid locale configuration")?;
        let store = DatabaseStore::new(database.clone(), config.catalog_dir.clone());

        Ok(Self {
            config,
            registry: Arc::new(registry),
            store: Arc::new(store),
            database,
            metrics: Arc::new(TranslationMetrics::new()),
        })
    }

    /// A request-scoped translation service.
    ///
    /// An explicit `locale` must be supported; without one the
    /// `Accept-Language` header is negotiated, then the default is used.
    fn intl(&self, locale: Option<&str>, headers: &HeaderMap) -> Result<Intl, I18nError> {
        let mut intl = Intl::new(Arc::clone(&self.registry), Arc::clone(&self.store))
            .with_metrics(Arc::clone(&self.metrics));

        if let Some(locale) = locale {
            intl.set_locale(locale)?;
        } else if let Some(locale) = headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| self.registry.negotiate(value))
        {
            intl.set_locale(locale.as_str())?;
        }
        Ok(intl)
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let Some(expected) = self.config.api_key.as_deref() else {
            return Err(ApiError::AdminDisabled);
        };
        let presented = headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());
        if security::is_authorized(Some(expected), presented) {
            Ok(())
        } else {
            warn!("Rejected admin request with missing or invalid API key");
            Err(ApiError::Unauthorized)
        }
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/translate", post(translate))
        .route("/translate/plural", post(translate_plural))
        .route("/route", post(translate_route))
        .route("/translations/:locale/*context", get(translations))
        .route("/format/bytes", get(format_bytes))
        .route("/messages", post(create_message))
        .route("/messages/translation", put(set_translation))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ==================== Errors ====================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    I18n(#[from] I18nError),

    #[error("admin endpoints are disabled")]
    AdminDisabled,

    #[error("missing or invalid API key")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::I18n(err) => match err {
                I18nError::InvalidLocale(_)
                | I18nError::InvalidArgument(_)
                | I18nError::Logic(_) => StatusCode::BAD_REQUEST,
                I18nError::Translation { source, .. } => match source {
                    TranslationCause::Format(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    TranslationCause::Store(StoreError::InvalidContext(_)) => {
                        StatusCode::BAD_REQUEST
                    }
                    TranslationCause::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                },
            },
            ApiError::AdminDisabled => StatusCode::FORBIDDEN,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ==================== Translation Endpoints ====================

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub pattern: String,
    pub args: Option<Args>,
    pub context: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PluralRequest {
    pub plural: String,
    pub singular: String,
    pub count: i64,
    pub args: Option<Args>,
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub route: String,
    #[serde(default)]
    pub plural: bool,
    pub args: Option<Args>,
    pub locale: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub text: String,
    pub locale: String,
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn translate(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let mut intl = state.intl(req.locale.as_deref(), &headers)?;
    let context = req.context.as_deref().unwrap_or(MESSAGES_CONTEXT);
    let text = intl.translate(&req.pattern, req.args.as_ref(), context, None)?;
    Ok(Json(TranslateResponse {
        text,
        locale: intl.locale().to_string(),
    }))
}

async fn translate_plural(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<PluralRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let mut intl = state.intl(req.locale.as_deref(), &headers)?;
    let text = intl.tp(&req.plural, &req.singular, req.count, req.args.as_ref())?;
    Ok(Json(TranslateResponse {
        text,
        locale: intl.locale().to_string(),
    }))
}

async fn translate_route(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<RouteRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let mut intl = state.intl(req.locale.as_deref(), &headers)?;
    let text = if req.plural {
        intl.rp(&req.route, req.args.as_ref())?
    } else {
        intl.r(&req.route, req.args.as_ref())?
    };
    Ok(Json(TranslateResponse {
        text,
        locale: intl.locale().to_string(),
    }))
}

async fn translations(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path((locale, context)): Path<(String, String)>,
) -> Result<Json<Catalog>, ApiError> {
    let mut intl = state.intl(Some(locale.as_str()), &headers)?;
    Ok(Json(intl.get_translations(&context, None)?))
}

#[derive(Debug, Deserialize)]
pub struct BytesQuery {
    pub bytes: u64,
    pub locale: Option<String>,
}

async fn format_bytes(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<BytesQuery>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let intl = state.intl(query.locale.as_deref(), &headers)?;
    Ok(Json(TranslateResponse {
        text: intl.format_bytes(query.bytes),
        locale: intl.locale().to_string(),
    }))
}

async fn metrics(State(state): State<SharedState>) -> Json<MetricsReport> {
    Json(state.metrics.report())
}

// ==================== Admin Endpoints ====================

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub message: String,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateMessageResponse {
    pub id: i64,
    pub created: bool,
}

async fn create_message(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<CreateMessageResponse>), ApiError> {
    state.authorize(&headers)?;

    if req.message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }
    parser::parse(&req.message)
        .map_err(|e| ApiError::Unprocessable(format!("message is not a valid pattern: {}", e)))?;

    let (id, created) = state
        .database
        .insert_message(&req.message, req.comment.as_deref())?;

    let status = if created {
        info!("Created message {}: {}", id, req.message);
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(CreateMessageResponse { id, created })))
}

#[derive(Debug, Deserialize)]
pub struct SetTranslationRequest {
    pub message: String,
    pub language_code: String,
    pub translation: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetTranslationResponse {
    pub message: String,
    pub language_code: String,
    pub warnings: Vec<String>,
}

async fn set_translation(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<SetTranslationRequest>,
) -> Result<Json<SetTranslationResponse>, ApiError> {
    state.authorize(&headers)?;

    if state.registry.by_language_code(&req.language_code).is_none() {
        return Err(I18nError::InvalidLocale(req.language_code).into());
    }

    let report = TranslationValidator::validate(&req.message, &req.translation);
    if report.has_errors() {
        return Err(ApiError::Unprocessable(report.errors.join("; ")));
    }
    for warning in &report.warnings {
        warn!("Translation of '{}' ({}): {}", req.message, req.language_code, warning);
    }

    let updated = state
        .database
        .set_translation(&req.message, &req.language_code, &req.translation)?;
    if !updated {
        return Err(ApiError::NotFound(format!("unknown message: '{}'", req.message)));
    }

    info!("Stored {} translation of '{}'", req.language_code, req.message);
    Ok(Json(SetTranslationResponse {
        message: req.message,
        language_code: req.language_code,
        warnings: report.warnings,
    }))
}
