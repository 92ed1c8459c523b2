//! SQL schema for the idlink SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS contacts (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    email           TEXT,
    phone_number    TEXT,
    linked_id       INTEGER REFERENCES contacts(id),
    link_precedence TEXT NOT NULL
                    CHECK (link_precedence IN ('primary', 'secondary')),
    created_at      TEXT NOT NULL,   -- RFC 3339 UTC; server-assigned
    updated_at      TEXT NOT NULL,
    deleted_at      TEXT,            -- tombstone
    CHECK (email IS NOT NULL OR phone_number IS NOT NULL)
);

CREATE INDEX IF NOT EXISTS contacts_email_idx
    ON contacts(email) WHERE email IS NOT NULL;
CREATE INDEX IF NOT EXISTS contacts_phone_idx
    ON contacts(phone_number) WHERE phone_number IS NOT NULL;
CREATE INDEX IF NOT EXISTS contacts_linked_idx
    ON contacts(linked_id) WHERE linked_id IS NOT NULL;

PRAGMA user_version = 1;
";
