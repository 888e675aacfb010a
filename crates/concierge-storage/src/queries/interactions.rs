// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interaction persistence and history lookups.

use std::str::FromStr;

use concierge_core::types::{HistoryFilter, Interaction, ModelId, Persona};
use concierge_core::ConciergeError;
use rusqlite::types::Type;
use rusqlite::{params, Row};

use crate::database::Database;

const COLUMNS: &str = "id, user_id, session_id, agent_used, model, query, response, confidence, \
                       processing_time, token_count, input_tokens, output_tokens, created_at";

/// Insert an interaction and return its row id.
pub async fn insert_interaction(
    db: &Database,
    interaction: &Interaction,
) -> Result<i64, ConciergeError> {
    let i = interaction.clone();
    db.connection()
        .call(move |conn| -> Result<_, rusqlite::Error> {
            conn.execute(
                "INSERT INTO interactions (user_id, session_id, agent_used, model, query, response, \
                 confidence, processing_time, token_count, input_tokens, output_tokens, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    i.user_id,
                    i.session_id,
                    i.persona.to_string(),
                    i.model.as_str(),
                    i.query,
                    i.response,
                    i.confidence,
                    i.processing_time_secs,
                    i.token_count,
                    i.input_tokens,
                    i.output_tokens,
                    i.created_at,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Most recent interactions first, optionally restricted to a session and/or user.
pub async fn recent_interactions(
    db: &Database,
    limit: u32,
    filter: &HistoryFilter,
) -> Result<Vec<Interaction>, ConciergeError> {
    let filter = filter.clone();
    db.connection()
        .call(move |conn| -> Result<_, rusqlite::Error> {
            // NULL parameters disable the corresponding filter.
            let sql = format!(
                "SELECT {COLUMNS} FROM interactions
                 WHERE (?1 IS NULL OR session_id = ?1) AND (?2 IS NULL OR user_id = ?2)
                 ORDER BY id DESC LIMIT ?3"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(
                params![filter.session_id, filter.user_id, limit],
                row_to_interaction,
            )?;
            let mut interactions = Vec::new();
            for row in rows {
                interactions.push(row?);
            }
            Ok(interactions)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn row_to_interaction(row: &Row<'_>) -> rusqlite::Result<Interaction> {
    let agent: String = row.get(3)?;
    let model: String = row.get(4)?;
    Ok(Interaction {
        id: Some(row.get(0)?),
        user_id: row.get(1)?,
        session_id: row.get(2)?,
        persona: Persona::from_str(&agent)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?,
        model: ModelId::from_str(&model)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
        query: row.get(5)?,
        response: row.get(6)?,
        confidence: row.get(7)?,
        processing_time_secs: row.get(8)?,
        token_count: row.get(9)?,
        input_tokens: row.get(10)?,
        output_tokens: row.get(11)?,
        created_at: row.get(12)?,
    })
}
