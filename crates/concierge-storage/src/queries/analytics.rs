// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user aggregates over the interactions table.

use chrono::{Duration, Utc};
use concierge_core::types::{AgentUsage, DailyUsage, ModelUsage, UsageStats, UserAnalytics};
use concierge_core::ConciergeError;
use rusqlite::{params, Connection};

use crate::database::Database;

/// Days of history covered by the daily activity series.
pub const DAILY_WINDOW_DAYS: i64 = 30;

/// Totals, persona and model breakdowns, and daily activity for `user_id`.
pub async fn user_analytics(db: &Database, user_id: i64) -> Result<UserAnalytics, ConciergeError> {
    let since = (Utc::now() - Duration::days(DAILY_WINDOW_DAYS))
        .format("%Y-%m-%d")
        .to_string();
    db.connection()
        .call(move |conn| -> Result<_, rusqlite::Error> {
            Ok(UserAnalytics {
                stats: usage_stats(conn, user_id)?,
                agent_usage: agent_usage(conn, user_id)?,
                model_usage: model_usage(conn, user_id)?,
                daily_usage: daily_usage(conn, user_id, &since)?,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn usage_stats(conn: &Connection, user_id: i64) -> rusqlite::Result<UsageStats> {
    conn.query_row(
        "SELECT COUNT(*), SUM(token_count), SUM(input_tokens), SUM(output_tokens),
                AVG(processing_time), AVG(confidence), SUM(cost_estimate)
         FROM interactions WHERE user_id = ?1",
        params![user_id],
        |row| {
            // Aggregates over zero rows come back NULL except COUNT.
            Ok(UsageStats {
                total_chats: row.get::<_, i64>(0)?.max(0) as u64,
                total_tokens: row.get::<_, Option<i64>>(1)?.unwrap_or(0).max(0) as u64,
                total_input_tokens: row.get::<_, Option<i64>>(2)?.unwrap_or(0).max(0) as u64,
                total_output_tokens: row.get::<_, Option<i64>>(3)?.unwrap_or(0).max(0) as u64,
                avg_response_time: row.get::<_, Option<f64>>(4)?.unwrap_or(0.0),
                avg_confidence: row.get::<_, Option<f64>>(5)?.unwrap_or(0.0),
                total_cost: row.get::<_, Option<f64>>(6)?.unwrap_or(0.0),
            })
        },
    )
}

fn agent_usage(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<AgentUsage>> {
    let mut stmt = conn.prepare(
        "SELECT agent_used, COUNT(*) AS count FROM interactions
         WHERE user_id = ?1 GROUP BY agent_used ORDER BY count DESC, agent_used",
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
        Ok(AgentUsage {
            agent_used: row.get(0)?,
            count: row.get::<_, i64>(1)?.max(0) as u64,
        })
    })?;
    rows.collect()
}

fn model_usage(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<ModelUsage>> {
    let mut stmt = conn.prepare(
        "SELECT model, COUNT(*) AS count, AVG(processing_time) FROM interactions
         WHERE user_id = ?1 GROUP BY model ORDER BY count DESC, model",
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
        Ok(ModelUsage {
            model: row.get(0)?,
            count: row.get::<_, i64>(1)?.max(0) as u64,
            avg_time: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
        })
    })?;
    rows.collect()
}

fn daily_usage(conn: &Connection, user_id: i64, since: &str) -> rusqlite::Result<Vec<DailyUsage>> {
    let mut stmt = conn.prepare(
        "SELECT substr(created_at, 1, 10) AS day, COUNT(*), SUM(token_count)
         FROM interactions
         WHERE user_id = ?1 AND substr(created_at, 1, 10) >= ?2
         GROUP BY day ORDER BY day",
    )?;
    let rows = stmt.query_map(params![user_id, since], |row| {
        Ok(DailyUsage {
            date: row.get(0)?,
            count: row.get::<_, i64>(1)?.max(0) as u64,
            tokens: row.get::<_, Option<i64>>(2)?.unwrap_or(0).max(0) as u64,
        })
    })?;
    rows.collect()
}
