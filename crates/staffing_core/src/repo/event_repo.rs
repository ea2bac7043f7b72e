//! Event window persistence.
//!
//! Events are owned by the event registry; the local store keeps only the
//! window needed for overlap checks.

use crate::model::event::{Event, EventId};
use crate::repo::{parse_uuid, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub trait EventRepository {
    fn upsert_event(&self, event: &Event) -> RepoResult<()>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>>;
}

pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn upsert_event(&self, event: &Event) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO events (uuid, start_ms, end_ms) VALUES (?1, ?2, ?3)
             ON CONFLICT(uuid) DO UPDATE SET start_ms = excluded.start_ms, end_ms = excluded.end_ms;",
            params![event.id.to_string(), event.start_ms, event.end_ms],
        )?;
        Ok(())
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        self.conn
            .query_row(
                "SELECT uuid, start_ms, end_ms FROM events WHERE uuid = ?1;",
                [id.to_string()],
                read_event_columns,
            )
            .optional()?
            .map(parse_event)
            .transpose()
    }
}

type EventColumns = (String, i64, i64);

pub(crate) fn read_event_columns(row: &Row<'_>) -> rusqlite::Result<EventColumns> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

pub(crate) fn parse_event((uuid, start_ms, end_ms): EventColumns) -> RepoResult<Event> {
    Ok(Event::new(parse_uuid(&uuid, "events.uuid")?, start_ms, end_ms))
}
