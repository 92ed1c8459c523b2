//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; precedence as its lowercase
//! name.

use chrono::{DateTime, Utc};
use idlink_core::contact::{Contact, ContactId, Precedence};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Precedence ──────────────────────────────────────────────────────────────

pub fn encode_precedence(p: Precedence) -> &'static str { p.as_str() }

pub fn decode_precedence(s: &str) -> Result<Precedence> {
  match s {
    "primary" => Ok(Precedence::Primary),
    "secondary" => Ok(Precedence::Secondary),
    other => Err(Error::Decode(format!("unknown link precedence: {other:?}"))),
  }
}

// ─── Raw row ─────────────────────────────────────────────────────────────────

/// Column list shared by every contact `SELECT`, in [`RawContact`] order.
pub const CONTACT_COLUMNS: &str = "id, email, phone_number, linked_id, link_precedence, \
   created_at, updated_at, deleted_at";

/// A `contacts` row as read from SQLite, before decoding.
pub struct RawContact {
  pub id:         ContactId,
  pub email:      Option<String>,
  pub phone:      Option<String>,
  pub linked_id:  Option<ContactId>,
  pub precedence: String,
  pub created_at: String,
  pub updated_at: String,
  pub deleted_at: Option<String>,
}

impl RawContact {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      email:      row.get(1)?,
      phone:      row.get(2)?,
      linked_id:  row.get(3)?,
      precedence: row.get(4)?,
      created_at: row.get(5)?,
      updated_at: row.get(6)?,
      deleted_at: row.get(7)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      id:         self.id,
      email:      self.email,
      phone:      self.phone,
      linked_id:  self.linked_id,
      precedence: decode_precedence(&self.precedence)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      deleted_at: self.deleted_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}
