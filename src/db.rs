use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

use crate::sites::Site;

/// Open (creating if needed) the site's own database file. Each site
/// worker owns exactly one connection; nothing is shared between them.
pub fn connect(site: Site) -> Result<Connection> {
    let path = Path::new(site.db_path());
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS pages (
            id         INTEGER PRIMARY KEY,
            uri        TEXT UNIQUE NOT NULL,
            visited    BOOLEAN NOT NULL DEFAULT 0,
            visited_at TEXT,
            error      TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_pages_visited ON pages(visited);

        CREATE TABLE IF NOT EXISTS entries (
            id           INTEGER PRIMARY KEY,
            uri          TEXT UNIQUE NOT NULL,
            title        TEXT NOT NULL,
            abstract     TEXT NOT NULL,
            contents     TEXT NOT NULL,
            body         TEXT NOT NULL,
            bibliography TEXT NOT NULL,
            scraped_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;
    Ok(())
}

// ── Crawl queue ──

pub fn insert_pages(conn: &Connection, uris: &[String]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare("INSERT OR IGNORE INTO pages (uri) VALUES (?1)")?;
        for uri in uris {
            count += stmt.execute(rusqlite::params![uri])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub fn fetch_unvisited(conn: &Connection, limit: Option<usize>) -> Result<Vec<(i64, String)>> {
    let sql = match limit {
        Some(n) => format!(
            "SELECT id, uri FROM pages WHERE visited = 0 ORDER BY id LIMIT {}",
            n
        ),
        None => "SELECT id, uri FROM pages WHERE visited = 0 ORDER BY id".to_string(),
    };
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Entries ──

/// One stored entry page. Built once per fetched page, written as one
/// row, never mutated afterwards; `uri` is the natural key.
pub struct EntryRow {
    pub uri: String,
    pub title: String,
    pub abstract_text: String,
    pub contents: String,
    pub body: String,
    pub bibliography: String,
}

/// Persist an extracted entry and mark its queue row visited, in one
/// transaction.
pub fn save_entry(conn: &Connection, page_id: i64, row: &EntryRow) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT OR REPLACE INTO entries (uri, title, abstract, contents, body, bibliography)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            row.uri,
            row.title,
            row.abstract_text,
            row.contents,
            row.body,
            row.bibliography,
        ],
    )?;
    tx.execute(
        "UPDATE pages SET visited = 1, visited_at = datetime('now'), error = NULL WHERE id = ?1",
        rusqlite::params![page_id],
    )?;
    tx.commit()?;
    Ok(())
}

/// Mark a queue row visited with a per-page failure recorded, so the
/// crawl loop can move on without retrying it forever.
pub fn mark_failed(conn: &Connection, page_id: i64, error: &str) -> Result<()> {
    conn.execute(
        "UPDATE pages SET visited = 1, visited_at = datetime('now'), error = ?2 WHERE id = ?1",
        rusqlite::params![page_id, error],
    )?;
    Ok(())
}

// ── Export reads ──

pub fn fetch_title_body(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT title, body FROM entries ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub struct NestedExportRow {
    pub title: String,
    pub abstract_text: String,
    pub contents: String,
}

pub fn fetch_title_abstract_contents(conn: &Connection) -> Result<Vec<NestedExportRow>> {
    let mut stmt = conn.prepare("SELECT title, abstract, contents FROM entries ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(NestedExportRow {
                title: row.get(0)?,
                abstract_text: row.get(1)?,
                contents: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Overview ──

pub struct OverviewRow {
    pub id: i64,
    pub title: String,
    pub contents: String,
    pub body_chars: i64,
    pub bibliography_chars: i64,
}

pub fn fetch_overview(conn: &Connection, limit: usize) -> Result<Vec<OverviewRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, contents, length(body), length(bibliography)
         FROM entries ORDER BY id LIMIT ?1",
    )?;
    let rows = stmt
        .query_map([limit], |row| {
            Ok(OverviewRow {
                id: row.get(0)?,
                title: row.get(1)?,
                contents: row.get(2)?,
                body_chars: row.get(3)?,
                bibliography_chars: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub total: usize,
    pub visited: usize,
    pub unvisited: usize,
    pub entries: usize,
    pub errors: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let total: usize = conn.query_row("SELECT COUNT(*) FROM pages", [], |r| r.get(0))?;
    let visited: usize =
        conn.query_row("SELECT COUNT(*) FROM pages WHERE visited = 1", [], |r| r.get(0))?;
    let entries: usize = conn.query_row("SELECT COUNT(*) FROM entries", [], |r| r.get(0))?;
    let errors: usize = conn.query_row(
        "SELECT COUNT(*) FROM pages WHERE error IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    Ok(Stats {
        total,
        visited,
        unvisited: total - visited,
        entries,
        errors,
    })
}

// ── Tests ──
