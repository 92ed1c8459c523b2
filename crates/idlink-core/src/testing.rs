//! In-memory [`UnitOfWork`] test double.

use chrono::{DateTime, Duration, TimeZone as _, Utc};

use crate::{
  Error, Result,
  contact::{Contact, ContactId, Identifier, NewContact, Precedence},
  store::UnitOfWork,
};

pub fn ident(email: Option<&str>, phone: Option<&str>) -> Identifier {
  Identifier::new(email.map(str::to_owned), phone.map(str::to_owned)).unwrap()
}

/// A vector of rows with a deterministic clock that advances one millisecond
/// per operation.
#[derive(Debug, Default)]
pub struct MemoryUow {
  rows:   Vec<Contact>,
  ticks:  i64,
  writes: usize,
}

impl MemoryUow {
  fn now(&mut self) -> DateTime<Utc> {
    self.ticks += 1;
    Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::milliseconds(self.ticks)
  }

  fn next_id(&self) -> ContactId { self.rows.len() as ContactId + 1 }

  fn seed(
    &mut self,
    email: Option<&str>,
    phone: Option<&str>,
    linked_id: Option<ContactId>,
    precedence: Precedence,
  ) -> ContactId {
    let now = self.now();
    let id = self.next_id();
    self.rows.push(Contact {
      id,
      email: email.map(str::to_owned),
      phone: phone.map(str::to_owned),
      linked_id,
      precedence,
      created_at: now,
      updated_at: now,
      deleted_at: None,
    });
    id
  }

  pub fn seed_primary(&mut self, email: Option<&str>, phone: Option<&str>) -> ContactId {
    self.seed(email, phone, None, Precedence::Primary)
  }

  pub fn seed_secondary(
    &mut self,
    email: Option<&str>,
    phone: Option<&str>,
    primary: ContactId,
  ) -> ContactId {
    self.seed(email, phone, Some(primary), Precedence::Secondary)
  }

  pub fn tombstone(&mut self, id: ContactId) {
    let now = self.now();
    self.row_mut(id).deleted_at = Some(now);
  }

  pub fn backdate(&mut self, id: ContactId, by: Duration) {
    let row = self.row_mut(id);
    row.created_at -= by;
  }

  pub fn set_created_at_like(&mut self, id: ContactId, other: ContactId) {
    let at = self.row(other).created_at;
    self.row_mut(id).created_at = at;
  }

  pub fn row(&self, id: ContactId) -> &Contact {
    self.rows.iter().find(|c| c.id == id).expect("row exists")
  }

  pub fn row_mut(&mut self, id: ContactId) -> &mut Contact {
    self.rows.iter_mut().find(|c| c.id == id).expect("row exists")
  }

  pub fn rows(&self) -> impl Iterator<Item = &Contact> { self.rows.iter() }

  pub fn len(&self) -> usize { self.rows.len() }

  /// Number of inserts and updates performed through the trait.
  pub fn writes(&self) -> usize { self.writes }

  fn live(&self) -> impl Iterator<Item = &Contact> {
    self.rows.iter().filter(|c| !c.is_deleted())
  }
}

impl UnitOfWork for MemoryUow {
  type Error = Error;

  fn find_by_email_or_phone(
    &mut self,
    email: Option<&str>,
    phone: Option<&str>,
  ) -> Result<Vec<Contact>> {
    Ok(
      self
        .live()
        .filter(|c| {
          (email.is_some() && c.email.as_deref() == email)
            || (phone.is_some() && c.phone.as_deref() == phone)
        })
        .cloned()
        .collect(),
    )
  }

  fn load_clusters(&mut self, primary_ids: &[ContactId]) -> Result<Vec<Contact>> {
    Ok(
      self
        .live()
        .filter(|c| {
          primary_ids.contains(&c.id)
            || c.linked_id.is_some_and(|l| primary_ids.contains(&l))
        })
        .cloned()
        .collect(),
    )
  }

  fn get(&mut self, id: ContactId) -> Result<Option<Contact>> {
    Ok(self.live().find(|c| c.id == id).cloned())
  }

  fn insert(&mut self, input: NewContact) -> Result<Contact> {
    self.writes += 1;
    let id = self.seed(
      input.email.as_deref(),
      input.phone.as_deref(),
      input.linked_id,
      input.precedence,
    );
    Ok(self.row(id).clone())
  }

  fn update_precedence_and_link(
    &mut self,
    id: ContactId,
    precedence: Precedence,
    linked_id: Option<ContactId>,
  ) -> Result<()> {
    let now = self.now();
    let row = self
      .rows
      .iter_mut()
      .find(|c| c.id == id && !c.is_deleted())
      .ok_or(Error::ContactNotFound(id))?;
    row.precedence = precedence;
    row.linked_id = linked_id;
    row.updated_at = now;
    self.writes += 1;
    Ok(())
  }
}
