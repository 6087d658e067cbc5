use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::header,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    auth::Role,
    error::AppError,
    middleware::{RequireRoleLayer, jwt_auth},
    response::{ApiResult, JsonApiResponse},
    services::{
        ServiceContext,
        report_service::{DateRange, SalesSummary, TopProduct},
    },
    state::AppState,
};

/// `?from=YYYY-MM-DD&to=YYYY-MM-DD`, both days inclusive.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<u64>,
}

impl RangeQuery {
    fn range(&self) -> Result<DateRange, AppError> {
        DateRange::resolve(self.from, self.to)
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/reports/sales", get(sales))
        .route("/reports/sales/export", get(export_sales))
        .route("/reports/top-products", get(top_products))
        .route_layer(RequireRoleLayer::new(Role::Admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth))
        .with_state(state)
}

async fn sales(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<SalesSummary> {
    let service = ServiceContext::from_state(state.as_ref()).report();
    JsonApiResponse::ok(service.sales(query.range()?).await?)
}

async fn top_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Vec<TopProduct>> {
    let service = ServiceContext::from_state(state.as_ref()).report();
    let ranked = service.top_products(query.range()?, query.limit).await?;
    JsonApiResponse::ok(ranked)
}

async fn export_sales(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Response, AppError> {
    let range = query.range()?;
    let service = ServiceContext::from_state(state.as_ref()).report();
    let csv = service.export_sales(range).await?;
    let disposition = format!(
        "attachment; filename=\"sales-{}-{}.csv\"",
        range.from, range.to
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}
