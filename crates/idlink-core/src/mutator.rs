//! Applies a [`Resolution`] as the minimal set of writes.
//!
//! Runs inside the caller's [`UnitOfWork`]; atomicity is the backend's job.

use tracing::debug;

use crate::{
  Error,
  cluster::{ClusterIndex, Resolution},
  contact::{ContactId, Identifier, NewContact, Precedence},
  store::UnitOfWork,
};

/// What [`apply`] wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Applied {
  /// The primary the request resolved to.
  pub primary:  ContactId,
  /// The record inserted by this request, if any.
  pub created:  Option<ContactId>,
  /// Existing records whose link state was rewritten, ascending.
  pub relinked: Vec<ContactId>,
}

pub fn apply<U: UnitOfWork>(
  uow: &mut U,
  index: &ClusterIndex,
  resolution: &Resolution,
  identifier: &Identifier,
) -> Result<Applied, U::Error> {
  let applied = match resolution {
    Resolution::CreatePrimary => {
      let created = uow.insert(NewContact::primary(identifier))?;
      Applied { primary: created.id, created: Some(created.id), relinked: Vec::new() }
    }
    Resolution::Unchanged { primary } => Applied { primary: *primary, ..Applied::default() },
    Resolution::AttachSecondary { primary } => {
      let created = uow.insert(NewContact::secondary(identifier, *primary))?;
      Applied { primary: *primary, created: Some(created.id), relinked: Vec::new() }
    }
    Resolution::Merge { primary, demoted, attach } => {
      let mut relinked = Vec::new();
      for &old in demoted {
        let cluster = index.cluster(old).ok_or_else(|| {
          Error::invariant(format!("demoted primary {old} is not in the index"))
        })?;

        uow.update_precedence_and_link(old, Precedence::Secondary, Some(*primary))?;
        relinked.push(old);

        // Flatten: the old cluster's secondaries point straight at the winner.
        for s in &cluster.secondaries {
          uow.update_precedence_and_link(s.id, Precedence::Secondary, Some(*primary))?;
          relinked.push(s.id);
        }
      }
      relinked.sort_unstable();

      let created = if *attach {
        Some(uow.insert(NewContact::secondary(identifier, *primary))?.id)
      } else {
        None
      };
      Applied { primary: *primary, created, relinked }
    }
  };

  debug!(
    primary = applied.primary,
    created = ?applied.created,
    relinked = applied.relinked.len(),
    "applied resolution"
  );
  Ok(applied)
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use super::*;
  use crate::testing::{MemoryUow, ident};

  #[test]
  fn create_primary_inserts_one_unlinked_primary() {
    let mut uow = MemoryUow::default();
    let id = ident(Some("new@x.com"), Some("999"));
    let applied =
      apply(&mut uow, &ClusterIndex::default(), &Resolution::CreatePrimary, &id).unwrap();

    let row = uow.row(applied.primary);
    assert_eq!(applied.created, Some(row.id));
    assert_eq!(row.precedence, Precedence::Primary);
    assert_eq!(row.linked_id, None);
    assert_eq!(uow.len(), 1);
  }

  #[test]
  fn unchanged_writes_nothing() {
    let mut uow = MemoryUow::default();
    let p = uow.seed_primary(Some("p@x.com"), None);
    let writes = uow.writes();
    let applied = apply(
      &mut uow,
      &ClusterIndex::default(),
      &Resolution::Unchanged { primary: p },
      &ident(Some("p@x.com"), None),
    )
    .unwrap();
    assert_eq!(applied, Applied { primary: p, ..Applied::default() });
    assert_eq!(uow.writes(), writes);
  }

  #[test]
  fn merge_relinks_demoted_cluster_flat() {
    let mut uow = MemoryUow::default();
    let a = uow.seed_primary(Some("a@x.com"), None);
    let b = uow.seed_primary(None, Some("555"));
    let b1 = uow.seed_secondary(Some("b1@x.com"), Some("555"), b);

    let roots = BTreeSet::from([a, b]);
    let loaded = {
      use crate::store::UnitOfWork as _;
      uow.load_clusters(&[a, b]).unwrap()
    };
    let index = ClusterIndex::build(&roots, loaded).unwrap();
    let resolution = Resolution::Merge { primary: a, demoted: vec![b], attach: false };

    let applied =
      apply(&mut uow, &index, &resolution, &ident(Some("a@x.com"), Some("555"))).unwrap();

    assert_eq!(applied.relinked, vec![b, b1]);
    assert_eq!(applied.created, None);
    for id in [b, b1] {
      let row = uow.row(id);
      assert_eq!(row.precedence, Precedence::Secondary);
      assert_eq!(row.linked_id, Some(a));
      assert!(row.updated_at > row.created_at);
    }
  }

  #[test]
  fn merge_with_unknown_demoted_primary_fails() {
    let mut uow = MemoryUow::default();
    let resolution = Resolution::Merge { primary: 1, demoted: vec![2], attach: false };
    let err = apply(
      &mut uow,
      &ClusterIndex::default(),
      &resolution,
      &ident(Some("a@x.com"), None),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvariantViolation(_)));
  }
}
