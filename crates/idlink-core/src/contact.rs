//! Contact records: the atomic unit of identity evidence.
//!
//! A contact carries an email and/or a phone number plus its link state. Every
//! cluster of contacts has exactly one [`Precedence::Primary`] record; all
//! others are [`Precedence::Secondary`] and point directly at it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Store-assigned, monotonically increasing record id.
pub type ContactId = i64;

// ─── Precedence ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precedence {
  Primary,
  Secondary,
}

impl Precedence {
  /// The value stored in the `link_precedence` column.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Primary => "primary",
      Self::Secondary => "secondary",
    }
  }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A stored contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub id:         ContactId,
  pub email:      Option<String>,
  #[serde(rename = "phoneNumber")]
  pub phone:      Option<String>,
  /// Set only on secondaries; the id of their primary.
  #[serde(rename = "linkedId")]
  pub linked_id:  Option<ContactId>,
  #[serde(rename = "linkPrecedence")]
  pub precedence: Precedence,
  /// Server-assigned; never changes after creation.
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  /// Tombstone. Deleted records are invisible to matching and projection.
  pub deleted_at: Option<DateTime<Utc>>,
}

impl Contact {
  pub fn is_primary(&self) -> bool { self.precedence == Precedence::Primary }

  pub fn is_deleted(&self) -> bool { self.deleted_at.is_some() }

  /// The id of the primary this record belongs to: its own id for a primary,
  /// its link for a secondary.
  pub fn primary_id(&self) -> Option<ContactId> {
    match self.precedence {
      Precedence::Primary => Some(self.id),
      Precedence::Secondary => self.linked_id,
    }
  }

  /// Ordering key for "oldest wins": creation time, then id.
  pub fn seniority(&self) -> (DateTime<Utc>, ContactId) {
    (self.created_at, self.id)
  }
}

// ─── NewContact ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::UnitOfWork::insert`].
/// `id` and the timestamps are always assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
  pub email:      Option<String>,
  pub phone:      Option<String>,
  pub linked_id:  Option<ContactId>,
  pub precedence: Precedence,
}

impl NewContact {
  /// A fresh primary carrying the submitted pair.
  pub fn primary(identifier: &Identifier) -> Self {
    Self {
      email:      identifier.email.clone(),
      phone:      identifier.phone.clone(),
      linked_id:  None,
      precedence: Precedence::Primary,
    }
  }

  /// A secondary carrying the full submitted pair, linked to `primary_id`.
  pub fn secondary(identifier: &Identifier, primary_id: ContactId) -> Self {
    Self {
      email:      identifier.email.clone(),
      phone:      identifier.phone.clone(),
      linked_id:  Some(primary_id),
      precedence: Precedence::Secondary,
    }
  }
}

// ─── Identifier ──────────────────────────────────────────────────────────────

/// A validated `(email?, phone?)` pair with at least one field present.
///
/// Empty strings are treated as absent. Matching is exact, so no other
/// normalisation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
  email: Option<String>,
  phone: Option<String>,
}

impl Identifier {
  pub fn new(email: Option<String>, phone: Option<String>) -> Result<Self> {
    let email = email.filter(|e| !e.is_empty());
    let phone = phone.filter(|p| !p.is_empty());
    if email.is_none() && phone.is_none() {
      return Err(Error::Validation(
        "at least one of email or phone number is required".into(),
      ));
    }
    Ok(Self { email, phone })
  }

  pub fn email(&self) -> Option<&str> { self.email.as_deref() }

  pub fn phone(&self) -> Option<&str> { self.phone.as_deref() }
}

impl std::fmt::Display for Identifier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "email={} phone={}",
      self.email().unwrap_or("-"),
      self.phone().unwrap_or("-")
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn identifier_treats_empty_as_absent() {
    let id = Identifier::new(Some(String::new()), Some("555".into())).unwrap();
    assert_eq!(id.email(), None);
    assert_eq!(id.phone(), Some("555"));
  }

  #[test]
  fn identifier_rejects_both_empty() {
    let err = Identifier::new(Some(String::new()), None).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(Identifier::new(None, None).is_err());
  }

  #[test]
  fn identifier_keeps_whitespace_verbatim() {
    let id = Identifier::new(Some(" a@x.com".into()), None).unwrap();
    assert_eq!(id.email(), Some(" a@x.com"));
  }

  #[test]
  fn contact_serialises_with_wire_names() {
    let now = Utc::now();
    let c = Contact {
      id:         7,
      email:      None,
      phone:      Some("555".into()),
      linked_id:  Some(1),
      precedence: Precedence::Secondary,
      created_at: now,
      updated_at: now,
      deleted_at: None,
    };
    let json = serde_json::to_value(&c).unwrap();
    assert_eq!(json["phoneNumber"], "555");
    assert_eq!(json["linkedId"], 1);
    assert_eq!(json["linkPrecedence"], "secondary");
    assert!(json["deletedAt"].is_null());
  }
}
