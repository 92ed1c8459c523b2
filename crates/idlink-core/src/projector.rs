//! Builds the [`ConsolidatedView`] of a cluster.

use crate::{
  Error, Result,
  contact::{Contact, ContactId},
  view::ConsolidatedView,
};

/// Project the live `records` of the cluster rooted at `primary_id`.
///
/// `records` must contain the primary itself and nothing but its direct
/// secondaries; anything else is reported as an invariant violation.
pub fn project(primary_id: ContactId, records: &[Contact]) -> Result<ConsolidatedView> {
  let live = || records.iter().filter(|c| !c.is_deleted());

  let primary = live()
    .find(|c| c.id == primary_id)
    .ok_or_else(|| Error::invariant(format!("primary {primary_id} missing from its cluster")))?;
  if !primary.is_primary() {
    return Err(Error::invariant(format!(
      "contact {primary_id} was projected as a primary but is a secondary"
    )));
  }

  let mut secondaries: Vec<&Contact> = live().filter(|c| c.id != primary_id).collect();
  secondaries.sort_by_key(|c| c.id);
  if let Some(stray) = secondaries
    .iter()
    .find(|c| c.is_primary() || c.linked_id != Some(primary_id))
  {
    return Err(Error::invariant(format!(
      "contact {} does not belong to the cluster of {primary_id}",
      stray.id
    )));
  }

  let ordered = || std::iter::once(primary).chain(secondaries.iter().copied());

  Ok(ConsolidatedView {
    primary_contact_id:    primary_id,
    emails:                distinct(ordered().filter_map(|c| c.email.as_deref())),
    phone_numbers:         distinct(ordered().filter_map(|c| c.phone.as_deref())),
    secondary_contact_ids: secondaries.iter().map(|c| c.id).collect(),
  })
}

/// First-occurrence order, duplicates dropped.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
  let mut out: Vec<String> = Vec::new();
  for v in values {
    if !out.iter().any(|seen| seen == v) {
      out.push(v.to_owned());
    }
  }
  out
}
