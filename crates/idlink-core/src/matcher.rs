//! The matcher: every live record sharing at least one field with the
//! submitted identifier.

use crate::{
  contact::{Contact, Identifier},
  store::UnitOfWork,
};

/// Exact-match lookup by email OR phone.
///
/// The result is ascending by id and free of duplicates and tombstones, even
/// if the backend is sloppy about either.
pub fn find<U: UnitOfWork>(
  uow: &mut U,
  identifier: &Identifier,
) -> Result<Vec<Contact>, U::Error> {
  let mut matched =
    uow.find_by_email_or_phone(identifier.email(), identifier.phone())?;

  matched.retain(|c| !c.is_deleted() && shares_field(c, identifier));
  matched.sort_by_key(|c| c.id);
  matched.dedup_by_key(|c| c.id);

  Ok(matched)
}

fn shares_field(contact: &Contact, identifier: &Identifier) -> bool {
  let email_hit = identifier
    .email()
    .is_some_and(|e| contact.email.as_deref() == Some(e));
  let phone_hit = identifier
    .phone()
    .is_some_and(|p| contact.phone.as_deref() == Some(p));
  email_hit || phone_hit
}
