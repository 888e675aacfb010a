// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::extract::{Path, Query as QueryParams, State};
use axum::Json;
use concierge_agent::ChatOutcome;
use concierge_core::types::{User, UserAnalytics};
use concierge_core::{ConciergeError, HistoryFilter, Interaction, ModelId, ProviderKind, Query};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{LoginSession, INVALID_CREDENTIALS, INVALID_SESSION};
use crate::error::ApiError;
use crate::server::GatewayState;

/// Default page size for `/chat/history`.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// Default period reported by `/analytics/report`.
pub const DEFAULT_REPORT_DAYS: u32 = 30;

/// Request body for `/chat` and `/chat/stream`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Session token; attributes the interaction to its user.
    #[serde(default)]
    pub token: Option<String>,
}

impl ChatRequest {
    /// Resolves the optional token and builds the routed query.
    pub(crate) async fn into_query(self, state: &GatewayState) -> Result<Query, ConciergeError> {
        let mut query = Query::new(self.query);
        if let Some(session_id) = self.session_id.filter(|s| !s.is_empty()) {
            query = query.with_session(session_id);
        }
        if let Some(token) = self.token.filter(|t| !t.is_empty()) {
            let user = state
                .accounts
                .verify(&token)
                .await?
                .ok_or_else(|| ConciergeError::Unauthorized(INVALID_SESSION.into()))?;
            query = query.with_user(user.id);
        }
        Ok(query)
    }
}

/// POST /chat
pub async fn post_chat(
    State(state): State<GatewayState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatOutcome>, ApiError> {
    if body.query.trim().is_empty() {
        return Err(ConciergeError::empty_query().into());
    }
    let query = body.into_query(&state).await?;
    let outcome = state.chat.chat(query).await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<u32>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<Interaction>,
    pub count: usize,
}

/// GET /chat/history
pub async fn get_history(
    State(state): State<GatewayState>,
    QueryParams(params): QueryParams<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let filter = HistoryFilter {
        session_id: params.session_id.filter(|s| !s.is_empty()),
        user_id: None,
    };
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let history = state.chat.history(limit, &filter).await?;
    Ok(Json(HistoryResponse {
        success: true,
        count: history.len(),
        history,
    }))
}

#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub model: ModelId,
    pub status: &'static str,
    pub provider: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ModelsStatusResponse {
    pub models: Vec<ModelStatus>,
    pub count: usize,
    pub time: String,
}

/// GET /models/status
///
/// Lists the catalog models whose provider had a credential at startup.
pub async fn get_models_status(State(state): State<GatewayState>) -> Json<ModelsStatusResponse> {
    let credentials = state.chat.dispatcher().credentials();
    let models: Vec<ModelStatus> = ModelId::ALL
        .iter()
        .filter(|m| match m.provider() {
            ProviderKind::Gemini => credentials.gemini,
            ProviderKind::DeepSeek => credentials.deepseek,
        })
        .map(|m| ModelStatus {
            model: *m,
            status: "available",
            provider: m.provider().vendor(),
        })
        .collect();
    Json(ModelsStatusResponse {
        count: models.len(),
        models,
        time: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response body for `/auth/register` and `/auth/login`.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl AuthResponse {
    fn issued(message: &str, session: LoginSession) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            user_id: Some(session.user_id),
            token: Some(session.token),
        }
    }

    fn refused(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            user_id: None,
            token: None,
        }
    }
}

/// POST /auth/register
pub async fn post_register(
    State(state): State<GatewayState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    match state
        .accounts
        .register(&body.username, &body.email, &body.password)
        .await
    {
        Ok(session) => Ok(Json(AuthResponse::issued(
            "User registered successfully",
            session,
        ))),
        Err(ConciergeError::Conflict(message)) => Ok(Json(AuthResponse::refused(message))),
        Err(e) => Err(e.into()),
    }
}

/// POST /auth/login
pub async fn post_login(
    State(state): State<GatewayState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let reply = match state.accounts.login(&body.username, &body.password).await? {
        Some(session) => {
            info!(user_id = session.user_id, "login succeeded");
            AuthResponse::issued("Login successful", session)
        }
        None => AuthResponse::refused(INVALID_CREDENTIALS),
    };
    Ok(Json(reply))
}

#[derive(Debug, Deserialize)]
pub struct TokenParams {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /auth/verify
pub async fn get_verify(
    State(state): State<GatewayState>,
    QueryParams(params): QueryParams<TokenParams>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let reply = match state.accounts.verify(&params.token).await? {
        Some(user) => VerifyResponse {
            success: true,
            user: Some(user),
            message: None,
        },
        None => VerifyResponse {
            success: false,
            user: None,
            message: Some(INVALID_SESSION.to_string()),
        },
    };
    Ok(Json(reply))
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub success: bool,
    pub analytics: UserAnalytics,
}

/// GET /analytics/user/{user_id}
pub async fn get_user_analytics(
    State(state): State<GatewayState>,
    Path(user_id): Path<i64>,
    QueryParams(params): QueryParams<TokenParams>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    state.accounts.authorize(&params.token, user_id).await?;
    let analytics = state.accounts.store().analytics(user_id).await?;
    Ok(Json(AnalyticsResponse {
        success: true,
        analytics,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ReportParams {
    pub token: String,
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub total_conversations: u64,
    pub total_tokens_used: u64,
    pub total_cost: f64,
    pub avg_response_time: f64,
    pub avg_confidence: f64,
    pub most_used_agent: String,
    pub most_used_model: String,
}

#[derive(Debug, Serialize)]
pub struct DetailedMetrics {
    pub agent_breakdown: Vec<concierge_core::types::AgentUsage>,
    pub model_performance: Vec<concierge_core::types::ModelUsage>,
    pub daily_activity: Vec<concierge_core::types::DailyUsage>,
}

#[derive(Debug, Serialize)]
pub struct UserReport {
    pub user_info: User,
    pub period_days: u32,
    pub summary: ReportSummary,
    pub detailed_metrics: DetailedMetrics,
    pub generated_at: String,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub success: bool,
    pub report: UserReport,
}

impl UserReport {
    pub fn new(user: User, period_days: u32, analytics: UserAnalytics) -> Self {
        let summary = ReportSummary {
            total_conversations: analytics.stats.total_chats,
            total_tokens_used: analytics.stats.total_tokens,
            total_cost: analytics.stats.total_cost,
            avg_response_time: analytics.stats.avg_response_time,
            avg_confidence: analytics.stats.avg_confidence,
            most_used_agent: analytics.most_used_agent().unwrap_or("None").to_string(),
            most_used_model: analytics.most_used_model().unwrap_or("None").to_string(),
        };
        Self {
            user_info: user,
            period_days,
            summary,
            detailed_metrics: DetailedMetrics {
                agent_breakdown: analytics.agent_usage,
                model_performance: analytics.model_usage,
                daily_activity: analytics.daily_usage,
            },
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// GET /analytics/report/{user_id}
pub async fn get_user_report(
    State(state): State<GatewayState>,
    Path(user_id): Path<i64>,
    QueryParams(params): QueryParams<ReportParams>,
) -> Result<Json<ReportResponse>, ApiError> {
    let user = state.accounts.authorize(&params.token, user_id).await?;
    let analytics = state.accounts.store().analytics(user_id).await?;
    let days = params.days.unwrap_or(DEFAULT_REPORT_DAYS);
    Ok(Json(ReportResponse {
        success: true,
        report: UserReport::new(user, days, analytics),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::types::{AgentUsage, ModelUsage, UsageStats};

    #[test]
    fn chat_request_accepts_bare_query() {
        let req: ChatRequest = serde_json::from_str(r#"{"query": "hello"}"#).unwrap();
        assert_eq!(req.query, "hello");
        assert!(req.session_id.is_none());
        assert!(req.token.is_none());
    }

    #[test]
    fn refused_auth_omits_user_and_token() {
        let json = serde_json::to_value(AuthResponse::refused(INVALID_CREDENTIALS)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], INVALID_CREDENTIALS);
        assert!(json.get("token").is_none());
    }

    fn user() -> User {
        User {
            id: 1,
            username: "ada".into(),
            email: "ada@example.com".into(),
            created_at: "2026-01-01T00:00:00.000Z".into(),
            last_login: None,
            is_active: true,
        }
    }

    #[test]
    fn empty_report_names_none() {
        let report = UserReport::new(user(), 30, UserAnalytics::default());
        assert_eq!(report.summary.most_used_agent, "None");
        assert_eq!(report.summary.most_used_model, "None");
        assert_eq!(report.summary.total_conversations, 0);
    }

    #[test]
    fn report_picks_most_used() {
        let analytics = UserAnalytics {
            stats: UsageStats {
                total_chats: 3,
                ..UsageStats::default()
            },
            agent_usage: vec![
                AgentUsage {
                    agent_used: "Code Assistant".into(),
                    count: 2,
                },
                AgentUsage {
                    agent_used: "Task Helper".into(),
                    count: 1,
                },
            ],
            model_usage: vec![ModelUsage {
                model: "deepseeker-1.0".into(),
                count: 3,
                avg_time: 1.5,
            }],
            daily_usage: vec![],
        };
        let report = UserReport::new(user(), 7, analytics);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["period_days"], 7);
        assert_eq!(json["summary"]["most_used_agent"], "Code Assistant");
        assert_eq!(json["summary"]["most_used_model"], "deepseeker-1.0");
        assert_eq!(json["detailed_metrics"]["agent_breakdown"][0]["count"], 2);
        assert_eq!(json["user_info"]["username"], "ada");
    }
}
