use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::budget::{BudgetPlan, BudgetWeights};
use crate::models::{Place, PlaceFilter};
use crate::notice::Notice;
use crate::payment::{PaymentRecord, PaymentSimulator};
use crate::selector::{MapView, ProviderKind};
use crate::session::{PlannerSession, SearchOutcome, TripRequest};
use crate::summary::TripSummary;
use crate::TripSyncError;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<PlannerSession>>,
    pub payments: Arc<PaymentSimulator>,
}

impl AppState {
    pub fn new(session: PlannerSession, payments: PaymentSimulator) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            payments: Arc::new(payments),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub notice: Notice,
}

pub struct ApiFailure(TripSyncError);

impl From<TripSyncError> for ApiFailure {
    fn from(err: TripSyncError) -> Self {
        Self(err)
    }
}

fn status_for(err: &TripSyncError) -> StatusCode {
    match err {
        TripSyncError::Validation { .. } => StatusCode::BAD_REQUEST,
        TripSyncError::AddressNotFound { .. } => StatusCode::NOT_FOUND,
        TripSyncError::RouteNotFound { .. }
        | TripSyncError::PlacesSearch { .. }
        | TripSyncError::Api { .. } => StatusCode::BAD_GATEWAY,
        TripSyncError::ProviderUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        TripSyncError::Config { .. }
        | TripSyncError::Storage { .. }
        | TripSyncError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            warn!("Request failed: {}", self.0);
        }
        let body = ApiError {
            error: self.0.to_string(),
            notice: Notice::from(&self.0),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiFailure>;

#[derive(Deserialize)]
pub struct RecommendationQuery {
    pub filter: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct BudgetRequest {
    pub budget: u64,
    #[serde(default)]
    pub weights: Option<BudgetWeights>,
}

#[derive(Serialize, Deserialize)]
pub struct BudgetResponse {
    #[serde(flatten)]
    pub plan: BudgetPlan,
    pub transport_cost: Option<u64>,
}

#[derive(Serialize, Deserialize)]
pub struct ProviderRequest {
    pub provider: ProviderKind,
}

#[derive(Serialize, Deserialize)]
pub struct ProviderResponse {
    pub view: MapView,
    pub notice: Option<Notice>,
}

#[derive(Serialize, Deserialize)]
pub struct PaymentRequest {
    pub item: String,
    pub amount: u64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search", post(search))
        .route("/recommendations", get(recommendations))
        .route("/budget", post(update_budget))
        .route("/summary", get(summary))
        .route("/provider", post(select_provider))
        .route("/payments", get(payment_history).post(pay))
        .with_state(state)
}

async fn search(
    State(state): State<AppState>,
    payload: Result<Json<TripRequest>, JsonRejection>,
) -> ApiResult<SearchOutcome> {
    // Held for the whole search so no reader sees a half-applied trip
    let mut session = state.session.lock().await;
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Unreadable trip form: {}", rejection.body_text());
            let err = TripSyncError::validation("Please check the trip details and try again.");
            return Err(session.reject_input(err).into());
        }
    };
    Ok(Json(session.search(request).await?))
}

async fn recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> ApiResult<Vec<Place>> {
    let filter = match query.filter.as_deref() {
        Some(raw) => PlaceFilter::from_str(raw)?,
        None => PlaceFilter::All,
    };
    Ok(Json(state.session.lock().await.recommendations(filter)))
}

async fn update_budget(
    State(state): State<AppState>,
    Json(request): Json<BudgetRequest>,
) -> ApiResult<BudgetResponse> {
    let mut session = state.session.lock().await;
    let weights = request.weights.unwrap_or_default();
    let plan = session.update_budget(request.budget, weights)?;
    Ok(Json(BudgetResponse {
        plan,
        transport_cost: session.estimated_transport_cost(),
    }))
}

async fn summary(State(state): State<AppState>) -> Json<TripSummary> {
    Json(state.session.lock().await.summary())
}

async fn select_provider(
    State(state): State<AppState>,
    Json(request): Json<ProviderRequest>,
) -> ApiResult<ProviderResponse> {
    let selection = state
        .session
        .lock()
        .await
        .select_provider(request.provider)
        .await?;
    Ok(Json(ProviderResponse {
        view: selection.view,
        notice: selection.notice,
    }))
}

async fn payment_history(State(state): State<AppState>) -> ApiResult<Vec<PaymentRecord>> {
    Ok(Json(state.payments.history().await?))
}

async fn pay(
    State(state): State<AppState>,
    Json(request): Json<PaymentRequest>,
) -> ApiResult<PaymentRecord> {
    Ok(Json(state.payments.pay(&request.item, request.amount).await?))
}
