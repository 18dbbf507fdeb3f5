use crate::api::AppState;
use crate::db::{export, queries, sources};
use crate::error::ReconError;
use crate::models::{BillingRecord, ReconciliationOutput, ReferenceData};
use crate::service::ReconSummary;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 请求体: 可选的月份过滤 (YYYY-MM)
#[derive(Debug, Default, Deserialize)]
pub struct ReconcileRequest {
    #[serde(default)]
    pub month: Option<String>,
}

/// 响应体
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub success: bool,
    pub message: String,
    pub summary: Option<ReconSummary>,
    pub report_dir: Option<PathBuf>,
}

/// 内联对账请求: 直接携带全部表
#[derive(Debug, Deserialize)]
pub struct InlineReconcileRequest {
    pub records: Vec<BillingRecord>,
    #[serde(flatten)]
    pub reference: ReferenceData,
}

#[derive(Debug, Serialize)]
pub struct InlineReconcileResponse {
    pub success: bool,
    pub message: String,
    pub summary: Option<ReconSummary>,
    pub output: Option<ReconciliationOutput>,
}

impl IntoResponse for ReconError {
    fn into_response(self) -> Response {
        let status = if self.is_malformed_input() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        tracing::error!("对账失败: {}", self);

        let response = ReconcileResponse {
            success: false,
            message: format!("Error: {}", self),
            summary: None,
            report_dir: None,
        };
        (status, Json(response)).into_response()
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 从数据库取计费明细, 按配置读取参考数据, 对账并导出报告
pub async fn reconcile(State(state): State<AppState>, Json(req): Json<ReconcileRequest>) -> Response {
    match run_reconcile(&state, req.month.as_deref()).await {
        Ok((summary, report_dir)) => {
            let response = ReconcileResponse {
                success: true,
                message: format!(
                    "Reconciled {} records, {} with discrepancies",
                    summary.total_records, summary.discrepant_records
                ),
                summary: Some(summary),
                report_dir: Some(report_dir),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn run_reconcile(state: &AppState, month: Option<&str>) -> Result<(ReconSummary, PathBuf), ReconError> {
    let month = month.map(queries::parse_month).transpose()?;
    let records = queries::list_billing_records(&state.pool, month.as_deref()).await?;
    tracing::info!(
        "取到 {} 条可计费明细 (月份: {})",
        records.len(),
        month.as_deref().unwrap_or("全部")
    );

    let engine = state.engine.clone();
    let config = state.config.clone();

    // 文件读写与匹配都是同步 CPU/IO 工作
    tokio::task::spawn_blocking(move || {
        let reference = sources::load_reference_data(&config.pricing)?;
        let output = engine.reconcile(&records, &reference)?;
        let summary = ReconSummary::from_output(&output, &config.report.discrepancy_threshold_percent);
        let dir = export::write_report(&output, &summary, &config.report.output_dir)?;
        Ok::<_, ReconError>((summary, dir))
    })
    .await?
}

/// 对请求体中的表直接对账, 不访问数据库与文件
pub async fn reconcile_inline(
    State(state): State<AppState>,
    Json(req): Json<InlineReconcileRequest>,
) -> Response {
    let engine = state.engine.clone();
    let threshold = state.config.report.discrepancy_threshold_percent.clone();

    let result = tokio::task::spawn_blocking(move || {
        engine
            .reconcile(&req.records, &req.reference)
            .map(|output| (ReconSummary::from_output(&output, &threshold), output))
    })
    .await
    .map_err(ReconError::from)
    .and_then(|r| r);

    match result {
        Ok((summary, output)) => {
            let response = InlineReconcileResponse {
                success: true,
                message: format!(
                    "Reconciled {} records, {} with discrepancies",
                    summary.total_records, summary.discrepant_records
                ),
                summary: Some(summary),
                output: Some(output),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => e.into_response(),
    }
}
