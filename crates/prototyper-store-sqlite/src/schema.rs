//! SQL schema for the feedback SQLite store.
//!
//! Executed on open and by `initialize`. `PRAGMA user_version` records the
//! layout so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Rows are never deleted; only `status` is ever updated.
CREATE TABLE IF NOT EXISTS feedback (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    page_id     TEXT    NOT NULL,
    element_id  TEXT,                -- NULL for page-level comments
    round       INTEGER NOT NULL CHECK (round >= 1),
    author      TEXT    NOT NULL,
    comment     TEXT    NOT NULL,
    rating      INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    status      TEXT    NOT NULL DEFAULT 'open'
                        CHECK (status IN ('open', 'resolved')),
    created_at  TEXT    NOT NULL,    -- RFC 3339 UTC, fixed width
    source      TEXT
);

CREATE INDEX IF NOT EXISTS feedback_page_idx    ON feedback(page_id, element_id);
CREATE INDEX IF NOT EXISTS feedback_round_idx   ON feedback(round);
CREATE INDEX IF NOT EXISTS feedback_created_idx ON feedback(created_at);

PRAGMA user_version = 1;
";
