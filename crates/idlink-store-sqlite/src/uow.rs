//! [`SqliteUow`]: the [`UnitOfWork`] over an open SQLite transaction.

use chrono::{DateTime, Utc};
use idlink_core::{
  contact::{Contact, ContactId, NewContact, Precedence},
  store::UnitOfWork,
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{CONTACT_COLUMNS, RawContact, decode_dt, encode_dt, encode_precedence},
};

/// Borrows the connection of an in-flight transaction. Whether the writes
/// stick is decided by whoever owns the transaction.
pub struct SqliteUow<'c> {
  conn: &'c rusqlite::Connection,
}

impl<'c> SqliteUow<'c> {
  pub fn new(conn: &'c rusqlite::Connection) -> Self { Self { conn } }

  fn query(
    &self,
    sql: &str,
    params: impl rusqlite::Params,
  ) -> Result<Vec<Contact>> {
    let mut stmt = self.conn.prepare(sql)?;
    let raws = stmt
      .query_map(params, RawContact::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawContact::into_contact).collect()
  }

  fn created_at(&self, id: ContactId) -> Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = self
      .conn
      .query_row(
        "SELECT created_at FROM contacts WHERE id = ?1",
        rusqlite::params![id],
        |row| row.get(0),
      )
      .optional()?;
    raw.as_deref().map(decode_dt).transpose()
  }

  /// Every live record, ascending by id.
  pub fn all(&self) -> Result<Vec<Contact>> {
    self.query(
      &format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts WHERE deleted_at IS NULL ORDER BY id"
      ),
      [],
    )
  }
}

impl UnitOfWork for SqliteUow<'_> {
  type Error = Error;

  fn find_by_email_or_phone(
    &mut self,
    email: Option<&str>,
    phone: Option<&str>,
  ) -> Result<Vec<Contact>> {
    self.query(
      &format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts
         WHERE deleted_at IS NULL
           AND ((?1 IS NOT NULL AND email = ?1)
             OR (?2 IS NOT NULL AND phone_number = ?2))
         ORDER BY id"
      ),
      rusqlite::params![email, phone],
    )
  }

  fn load_clusters(&mut self, primary_ids: &[ContactId]) -> Result<Vec<Contact>> {
    if primary_ids.is_empty() {
      return Ok(Vec::new());
    }
    let placeholders = (1..=primary_ids.len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");
    self.query(
      &format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts
         WHERE deleted_at IS NULL
           AND (id IN ({placeholders}) OR linked_id IN ({placeholders}))
         ORDER BY id"
      ),
      rusqlite::params_from_iter(primary_ids.iter()),
    )
  }

  fn get(&mut self, id: ContactId) -> Result<Option<Contact>> {
    let raw = self
      .conn
      .query_row(
        &format!(
          "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1 AND deleted_at IS NULL"
        ),
        rusqlite::params![id],
        RawContact::from_row,
      )
      .optional()?;
    raw.map(RawContact::into_contact).transpose()
  }

  fn insert(&mut self, input: NewContact) -> Result<Contact> {
    let mut now = Utc::now();
    // A secondary never predates its primary, even if the clock stepped back
    // or another writer's clock runs ahead.
    if let Some(primary) = input.linked_id
      && let Some(primary_created) = self.created_at(primary)?
    {
      now = now.max(primary_created);
    }
    let now_str = encode_dt(now);

    self.conn.execute(
      "INSERT INTO contacts (
         email, phone_number, linked_id, link_precedence, created_at, updated_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
      rusqlite::params![
        input.email,
        input.phone,
        input.linked_id,
        encode_precedence(input.precedence),
        now_str,
      ],
    )?;

    Ok(Contact {
      id:         self.conn.last_insert_rowid(),
      email:      input.email,
      phone:      input.phone,
      linked_id:  input.linked_id,
      precedence: input.precedence,
      created_at: now,
      updated_at: now,
      deleted_at: None,
    })
  }

  fn update_precedence_and_link(
    &mut self,
    id: ContactId,
    precedence: Precedence,
    linked_id: Option<ContactId>,
  ) -> Result<()> {
    let changed = self.conn.execute(
      "UPDATE contacts
         SET link_precedence = ?2, linked_id = ?3, updated_at = ?4
       WHERE id = ?1 AND deleted_at IS NULL",
      rusqlite::params![
        id,
        encode_precedence(precedence),
        linked_id,
        encode_dt(Utc::now()),
      ],
    )?;
    if changed == 0 {
      return Err(idlink_core::Error::ContactNotFound(id).into());
    }
    Ok(())
  }
}
