//! The full consolidation pipeline for one request.

use tracing::debug;

use crate::{
  cluster::{self, ClusterIndex, Resolution},
  contact::{ContactId, Identifier},
  matcher, mutator, projector,
  store::UnitOfWork,
  view::ConsolidatedView,
};

/// Result of [`reconcile`]: the view plus what was written to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consolidation {
  pub view:       ConsolidatedView,
  pub resolution: Resolution,
  pub created:    Option<ContactId>,
  pub relinked:   Vec<ContactId>,
}

impl Consolidation {
  pub fn wrote(&self) -> bool { self.created.is_some() || !self.relinked.is_empty() }
}

/// Match, resolve, mutate and project `identifier` inside `uow`.
///
/// The view is re-read from `uow` after the writes, so it reflects exactly
/// the state the caller is about to commit.
pub fn reconcile<U: UnitOfWork>(
  uow: &mut U,
  identifier: &Identifier,
) -> Result<Consolidation, U::Error> {
  let matched = matcher::find(uow, identifier)?;
  let roots = cluster::roots(&matched)?;

  let loaded = if roots.is_empty() {
    Vec::new()
  } else {
    let ids: Vec<ContactId> = roots.iter().copied().collect();
    uow.load_clusters(&ids)?
  };
  let index = ClusterIndex::build(&roots, loaded)?;

  let resolution = cluster::resolve(&index, identifier);
  let applied = mutator::apply(uow, &index, &resolution, identifier)?;

  let records = uow.load_clusters(&[applied.primary])?;
  let view = projector::project(applied.primary, &records)?;

  debug!(
    %identifier,
    primary = view.primary_contact_id,
    secondaries = view.secondary_contact_ids.len(),
    "reconciled"
  );

  Ok(Consolidation {
    view,
    resolution,
    created: applied.created,
    relinked: applied.relinked,
  })
}

/// Read-only view of the cluster containing record `id`. Returns `None` if
/// the record does not exist or is tombstoned.
pub fn view_of<U: UnitOfWork>(
  uow: &mut U,
  id: ContactId,
) -> Result<Option<ConsolidatedView>, U::Error> {
  let Some(contact) = uow.get(id)? else {
    return Ok(None);
  };
  if contact.is_deleted() {
    return Ok(None);
  }

  let roots = cluster::roots(std::slice::from_ref(&contact))?;
  let ids: Vec<ContactId> = roots.iter().copied().collect();
  let records = uow.load_clusters(&ids)?;
  let index = ClusterIndex::build(&roots, records.clone())?;

  let primary = index
    .primary_of(id)
    .ok_or_else(|| crate::Error::invariant(format!("contact {id} is not in its own cluster")))?;
  Ok(Some(projector::project(primary, &records)?))
}
