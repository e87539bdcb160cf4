use crate::collation::compare_names;
use crate::error::{StoreError, StoreResult};
use crate::schema::{Committee, CommitteeSummary, Event, EventKind, MotionStatus, NewEvent, Portfolio};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fs;
use std::path::Path;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::debug;
use uuid::Uuid;

pub type DbPool = Pool<SqliteConnectionManager>;

pub fn open(db_path: &str, pool_size: u32) -> StoreResult<DbPool> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")
    });
    let pool = Pool::builder().max_size(pool_size.max(1)).build(manager)?;
    let conn = pool.get()?;
    init(&conn)?;
    drop(conn);
    Ok(pool)
}

/// Single-connection pool over a private in-memory database.
pub fn open_in_memory() -> StoreResult<DbPool> {
    let manager = SqliteConnectionManager::memory()
        .with_init(|conn| conn.pragma_update(None, "foreign_keys", "ON"));
    // Recycling the only connection would drop the database with it.
    let pool = Pool::builder()
        .max_size(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .build(manager)?;
    let conn = pool.get()?;
    init(&conn)?;
    drop(conn);
    Ok(pool)
}

fn init(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS committees (
          id TEXT PRIMARY KEY,
          name TEXT NOT NULL,
          password TEXT,
          created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        );

        CREATE TABLE IF NOT EXISTS portfolios (
          id TEXT PRIMARY KEY,
          committee_id TEXT NOT NULL,
          name TEXT NOT NULL,
          created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
          FOREIGN KEY (committee_id) REFERENCES committees (id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS events (
          id TEXT PRIMARY KEY,
          committee_id TEXT NOT NULL,
          type TEXT NOT NULL,
          portfolio TEXT NOT NULL,
          target_portfolio TEXT,
          duration TEXT,
          description TEXT,
          motion_type TEXT,
          motion_status TEXT,
          timestamp TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
          FOREIGN KEY (committee_id) REFERENCES committees (id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_committees_created_at ON committees (created_at);
        CREATE INDEX IF NOT EXISTS idx_portfolios_committee_id ON portfolios (committee_id);
        CREATE INDEX IF NOT EXISTS idx_events_committee_id ON events (committee_id);
        CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events (timestamp);
        CREATE INDEX IF NOT EXISTS idx_events_type ON events (type);
        CREATE INDEX IF NOT EXISTS idx_events_portfolio ON events (portfolio);
        "#,
    )?;
    Ok(())
}

/// UTC with millisecond precision, fixed width so text order is time order.
pub fn now_timestamp() -> StoreResult<String> {
    let formatted = OffsetDateTime::now_utc().format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    ))?;
    Ok(formatted)
}

/// Roster order on write: case-insensitive, exact spelling breaks ties.
pub fn sort_portfolio_names(names: &mut [String]) {
    names.sort_by(|a, b| compare_names(a, b).then_with(|| a.cmp(b)));
}

fn committee_not_found(id: &str) -> StoreError {
    StoreError::NotFound(format!("Committee with ID {id} not found"))
}

pub fn committee_exists(conn: &Connection, id: &str) -> StoreResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM committees WHERE id = ?1", [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

pub fn create_committee(conn: &Connection, name: &str, password: &str) -> StoreResult<Committee> {
    let id = Uuid::new_v4().to_string();
    let created_at = now_timestamp()?;
    let stored_password = (!password.is_empty()).then_some(password);

    conn.execute(
        "INSERT INTO committees (id, name, password, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, name, stored_password, created_at],
    )?;

    Ok(Committee {
        id,
        name: name.to_string(),
        portfolios: Vec::new(),
        created_at,
        portfolio_count: 0,
        has_password: stored_password.is_some(),
    })
}

pub fn list_committees(conn: &Connection) -> StoreResult<Vec<CommitteeSummary>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT c.id, c.name, c.created_at, COALESCE(c.password, '') <> '', COUNT(p.id)
        FROM committees c
        LEFT JOIN portfolios p ON c.id = p.committee_id
        GROUP BY c.id
        ORDER BY c.created_at DESC, c.rowid DESC
        "#,
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(CommitteeSummary {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: row.get(2)?,
            has_password: row.get(3)?,
            portfolio_count: row.get::<_, i64>(4)? as usize,
        })
    })?;

    let mut committees = Vec::new();
    for r in rows {
        committees.push(r?);
    }
    Ok(committees)
}

pub fn get_committee(conn: &Connection, id: &str) -> StoreResult<Option<Committee>> {
    let row = conn
        .query_row(
            "SELECT id, name, created_at, password FROM committees WHERE id = ?1",
            [id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            },
        )
        .optional()?;

    let Some((id, name, created_at, password)) = row else {
        return Ok(None);
    };

    let portfolios: Vec<String> = list_portfolios(conn, &id)?
        .into_iter()
        .map(|portfolio| portfolio.name)
        .collect();

    Ok(Some(Committee {
        portfolio_count: portfolios.len(),
        has_password: password.is_some_and(|p| !p.is_empty()),
        id,
        name,
        portfolios,
        created_at,
    }))
}

fn stored_password(conn: &Connection, id: &str) -> StoreResult<Option<Option<String>>> {
    let password = conn
        .query_row("SELECT password FROM committees WHERE id = ?1", [id], |row| {
            row.get::<_, Option<String>>(0)
        })
        .optional()?;
    Ok(password)
}

/// Deletes the committee and, by cascade, its portfolios and events. Only an
/// exact password match deletes; an unknown id reports `false`.
pub fn delete_committee(conn: &Connection, id: &str, password: &str) -> StoreResult<bool> {
    let Some(stored) = stored_password(conn, id)? else {
        return Ok(false);
    };
    if stored.as_deref().unwrap_or("") != password {
        return Ok(false);
    }

    let deleted = conn.execute("DELETE FROM committees WHERE id = ?1", [id])?;
    Ok(deleted > 0)
}

pub fn verify_access(conn: &Connection, id: &str, password: &str) -> StoreResult<bool> {
    let access = match stored_password(conn, id)? {
        None => false,
        Some(None) => true,
        Some(Some(stored)) => stored.is_empty() || stored == password,
    };
    Ok(access)
}

pub fn list_portfolios(conn: &Connection, committee_id: &str) -> StoreResult<Vec<Portfolio>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, committee_id, name, created_at
        FROM portfolios
        WHERE committee_id = ?1
        ORDER BY rowid ASC
        "#,
    )?;

    let rows = stmt.query_map([committee_id], |row| {
        Ok(Portfolio {
            id: row.get(0)?,
            committee_id: row.get(1)?,
            name: row.get(2)?,
            created_at: row.get(3)?,
        })
    })?;

    let mut portfolios = Vec::new();
    for r in rows {
        portfolios.push(r?);
    }
    Ok(portfolios)
}

/// Swaps the whole roster in one transaction.
pub fn replace_portfolios(
    conn: &mut Connection,
    committee_id: &str,
    names: &[String],
) -> StoreResult<()> {
    let tx = conn.transaction()?;
    if !committee_exists(&tx, committee_id)? {
        return Err(committee_not_found(committee_id));
    }

    tx.execute("DELETE FROM portfolios WHERE committee_id = ?1", [committee_id])?;

    let mut sorted = names.to_vec();
    sort_portfolio_names(&mut sorted);
    {
        let mut stmt = tx.prepare(
            "INSERT INTO portfolios (id, committee_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for name in &sorted {
            stmt.execute(params![
                Uuid::new_v4().to_string(),
                committee_id,
                name,
                now_timestamp()?
            ])?;
        }
    }

    tx.commit()?;
    Ok(())
}

pub fn list_events(conn: &Connection, committee_id: &str) -> StoreResult<Vec<Event>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, committee_id, type, portfolio, target_portfolio,
               duration, description, motion_type, motion_status, timestamp
        FROM events
        WHERE committee_id = ?1
        ORDER BY timestamp DESC, rowid DESC
        "#,
    )?;

    let rows = stmt.query_map([committee_id], event_from_row)?;

    let mut events = Vec::new();
    for r in rows {
        events.push(r?);
    }
    Ok(events)
}

pub fn add_event(conn: &Connection, committee_id: &str, event: NewEvent) -> StoreResult<Event> {
    if !committee_exists(conn, committee_id)? {
        return Err(committee_not_found(committee_id));
    }

    let record = event.into_record(
        Uuid::new_v4().to_string(),
        committee_id.to_string(),
        now_timestamp()?,
    );

    conn.execute(
        r#"
        INSERT INTO events (
          id, committee_id, type, portfolio, target_portfolio,
          duration, description, motion_type, motion_status, timestamp
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
        params![
            record.id,
            record.committee_id,
            record.kind.as_str(),
            record.portfolio,
            record.target_portfolio,
            record.duration,
            record.description,
            record.motion_type,
            record.motion_status.map(|status| status.as_str()),
            record.timestamp
        ],
    )?;

    debug!(
        committee_id,
        event_id = %record.id,
        kind = %record.kind,
        "Recorded event"
    );
    Ok(record)
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let kind: String = row.get(2)?;
    let kind = kind
        .parse::<EventKind>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    let motion_status = non_empty(row.get(8)?)
        .map(|status: String| status.parse::<MotionStatus>())
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?;

    Ok(Event {
        id: row.get(0)?,
        committee_id: row.get(1)?,
        kind,
        portfolio: row.get(3)?,
        target_portfolio: non_empty(row.get(4)?),
        duration: non_empty(row.get(5)?),
        description: non_empty(row.get(6)?),
        motion_type: non_empty(row.get(7)?),
        motion_status,
        timestamp: row.get(9)?,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
