// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit event inserts and reads. There are no update or delete paths.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use coffee_core::{ActionResult, ActionType, AuditEvent, CoffeeError, NewAuditEvent};
use rusqlite::types::Type;
use rusqlite::{Row, params};

use crate::database::{Database, map_tr_err};

const SELECT_COLUMNS: &str =
    "SELECT id, source, type, result, created_datetime, modified_datetime FROM auditing_actions";

/// Timestamp text format: RFC 3339, UTC, millisecond precision.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn conversion_err<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, e))
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<AuditEvent> {
    let action: String = row.get(2)?;
    let result: String = row.get(3)?;
    Ok(AuditEvent {
        id: row.get(0)?,
        source_address: row.get(1)?,
        action_type: ActionType::from_str(&action).map_err(|e| conversion_err(2, e))?,
        result: ActionResult::from_str(&result).map_err(|e| conversion_err(3, e))?,
        created_at: timestamp_column(row, 4)?,
        modified_at: timestamp_column(row, 5)?,
    })
}

/// Append one event and return it with its assigned id.
///
/// `modified_datetime` is written equal to `created_datetime`.
pub async fn append_event(db: &Database, event: &NewAuditEvent) -> Result<AuditEvent, CoffeeError> {
    let event = event.clone();
    db.connection()
        .call(move |conn| -> Result<_, rusqlite::Error> {
            let stamp = format_timestamp(&event.created_at);
            conn.execute(
                "INSERT INTO auditing_actions (source, result, type, created_datetime, modified_datetime)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![
                    event.source_address,
                    event.result.to_string(),
                    event.action_type.to_string(),
                    stamp,
                ],
            )?;
            let id = conn.last_insert_rowid();
            // Read back so the returned timestamps carry the stored precision.
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                event_from_row,
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Append many events in a single transaction.
pub async fn append_events(db: &Database, events: Vec<NewAuditEvent>) -> Result<usize, CoffeeError> {
    db.connection()
        .call(move |conn| -> Result<_, rusqlite::Error> {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO auditing_actions (source, result, type, created_datetime, modified_datetime)
                     VALUES (?1, ?2, ?3, ?4, ?4)",
                )?;
                for event in &events {
                    stmt.execute(params![
                        event.source_address,
                        event.result.to_string(),
                        event.action_type.to_string(),
                        format_timestamp(&event.created_at),
                    ])?;
                }
            }
            tx.commit()?;
            Ok(events.len())
        })
        .await
        .map_err(map_tr_err)
}

/// All events in insertion order, optionally restricted to one action type.
pub async fn list_events(
    db: &Database,
    action: Option<ActionType>,
) -> Result<Vec<AuditEvent>, CoffeeError> {
    db.connection()
        .call(move |conn| -> Result<_, rusqlite::Error> {
            let events = match action {
                Some(action) => {
                    let mut stmt =
                        conn.prepare(&format!("{SELECT_COLUMNS} WHERE type = ?1 ORDER BY id ASC"))?;
                    stmt.query_map(params![action.to_string()], event_from_row)?
                        .collect::<Result<Vec<_>, _>>()?
                }
                None => {
                    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))?;
                    stmt.query_map([], event_from_row)?
                        .collect::<Result<Vec<_>, _>>()?
                }
            };
            Ok(events)
        })
        .await
        .map_err(map_tr_err)
}
