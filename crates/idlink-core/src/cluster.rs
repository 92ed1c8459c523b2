//! Cluster resolution.
//!
//! Matched records are partitioned into clusters keyed by their primary's id.
//! Thanks to the flattening invariant every secondary links directly to its
//! primary, so the partition never needs more than one hop. From the
//! partition, [`resolve`] decides which writes (if any) reconcile the
//! submitted identifier with what is stored.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::{
  Error, Result,
  contact::{Contact, ContactId, Identifier, Precedence},
};

// ─── Cluster ─────────────────────────────────────────────────────────────────

/// One identity: a primary and the secondaries linked to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
  pub primary:     Contact,
  /// Ascending by id.
  pub secondaries: Vec<Contact>,
}

impl Cluster {
  pub fn primary_id(&self) -> ContactId { self.primary.id }

  /// The primary followed by its secondaries.
  pub fn records(&self) -> impl Iterator<Item = &Contact> {
    std::iter::once(&self.primary).chain(self.secondaries.iter())
  }

  pub fn has_email(&self, email: &str) -> bool {
    self.records().any(|c| c.email.as_deref() == Some(email))
  }

  pub fn has_phone(&self, phone: &str) -> bool {
    self.records().any(|c| c.phone.as_deref() == Some(phone))
  }
}

// ─── Index ───────────────────────────────────────────────────────────────────

/// Explicit record-id → primary-id index over a set of loaded clusters.
#[derive(Debug, Clone, Default)]
pub struct ClusterIndex {
  primary_of: BTreeMap<ContactId, ContactId>,
  clusters:   BTreeMap<ContactId, Cluster>,
}

/// The primary ids referenced by `matched`.
///
/// Fails if a matched record's own link state is malformed.
pub fn roots(matched: &[Contact]) -> Result<BTreeSet<ContactId>> {
  matched
    .iter()
    .map(|c| {
      check_link_shape(c)?;
      c.primary_id()
        .ok_or_else(|| Error::invariant(format!("contact {} has no primary", c.id)))
    })
    .collect()
}

fn check_link_shape(c: &Contact) -> Result<()> {
  match (c.precedence, c.linked_id) {
    (Precedence::Primary, Some(link)) => Err(Error::invariant(format!(
      "primary contact {} is linked to {link}",
      c.id
    ))),
    (Precedence::Secondary, None) => Err(Error::invariant(format!(
      "secondary contact {} has no linked primary",
      c.id
    ))),
    (Precedence::Secondary, Some(link)) if link == c.id => Err(
      Error::invariant(format!("secondary contact {} is linked to itself", c.id)),
    ),
    _ => Ok(()),
  }
}

impl ClusterIndex {
  /// Build the index from every live record of the clusters rooted at
  /// `roots`, as returned by [`crate::store::UnitOfWork::load_clusters`].
  ///
  /// Each root must resolve to a live primary, every secondary must link
  /// directly to one of the loaded primaries, and no secondary may be senior
  /// to its primary by `(created_at, id)`.
  pub fn build(roots: &BTreeSet<ContactId>, records: Vec<Contact>) -> Result<Self> {
    let mut primaries = BTreeMap::new();
    let mut secondaries = Vec::new();

    for c in records.into_iter().filter(|c| !c.is_deleted()) {
      check_link_shape(&c)?;
      match c.precedence {
        Precedence::Primary => {
          primaries.insert(c.id, c);
        }
        Precedence::Secondary => secondaries.push(c),
      }
    }

    for root in roots {
      if !primaries.contains_key(root) {
        return Err(Error::invariant(format!(
          "contact {root} is referenced as a primary but is not a live primary"
        )));
      }
    }

    let mut index = ClusterIndex::default();
    for (id, primary) in primaries {
      index.primary_of.insert(id, id);
      index.clusters.insert(id, Cluster { primary, secondaries: Vec::new() });
    }

    secondaries.sort_by_key(|c| c.id);
    for s in secondaries {
      // `check_link_shape` guarantees the link is present.
      let link = s.linked_id.unwrap_or_default();
      let Some(cluster) = index.clusters.get_mut(&link) else {
        return Err(Error::invariant(format!(
          "secondary contact {} links to {link}, which is not a live primary",
          s.id
        )));
      };
      if s.seniority() < cluster.primary.seniority() {
        return Err(Error::invariant(format!(
          "secondary contact {} predates its primary {link}",
          s.id
        )));
      }
      index.primary_of.insert(s.id, link);
      cluster.secondaries.push(s);
    }

    Ok(index)
  }

  pub fn primary_of(&self, id: ContactId) -> Option<ContactId> {
    self.primary_of.get(&id).copied()
  }

  pub fn cluster(&self, primary_id: ContactId) -> Option<&Cluster> {
    self.clusters.get(&primary_id)
  }

  /// Clusters in ascending primary-id order.
  pub fn clusters(&self) -> impl Iterator<Item = &Cluster> { self.clusters.values() }

  pub fn len(&self) -> usize { self.clusters.len() }

  pub fn is_empty(&self) -> bool { self.clusters.is_empty() }
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// The action needed to reconcile an identifier with the stored clusters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  /// Nothing matched: the identifier starts a new identity.
  CreatePrimary,
  /// One cluster matched and already holds every submitted value.
  Unchanged { primary: ContactId },
  /// One cluster matched but a submitted value is new to it.
  AttachSecondary { primary: ContactId },
  /// Two or more clusters matched: fold every `demoted` primary (and its
  /// secondaries) into `primary`, then attach a secondary if `attach`.
  Merge {
    primary: ContactId,
    demoted: Vec<ContactId>,
    attach:  bool,
  },
}

impl Resolution {
  /// The primary the request resolves to, if it already exists.
  pub fn primary(&self) -> Option<ContactId> {
    match self {
      Self::CreatePrimary => None,
      Self::Unchanged { primary }
      | Self::AttachSecondary { primary }
      | Self::Merge { primary, .. } => Some(*primary),
    }
  }
}

/// Decide what to do with `identifier` given the clusters it matched.
///
/// When several clusters match, the oldest primary by `(created_at, id)` wins.
/// A secondary is attached whenever a submitted value appears nowhere in the
/// matched clusters; it always carries the full submitted pair.
pub fn resolve(index: &ClusterIndex, identifier: &Identifier) -> Resolution {
  let mut clusters: Vec<&Cluster> = index.clusters().collect();
  clusters.sort_by_key(|c| c.primary.seniority());

  let Some((oldest, rest)) = clusters.split_first() else {
    debug!(%identifier, "no match; new primary");
    return Resolution::CreatePrimary;
  };

  let email_known = identifier
    .email()
    .is_none_or(|e| clusters.iter().any(|c| c.has_email(e)));
  let phone_known = identifier
    .phone()
    .is_none_or(|p| clusters.iter().any(|c| c.has_phone(p)));
  let attach = !(email_known && phone_known);
  let primary = oldest.primary_id();

  let resolution = if rest.is_empty() {
    if attach {
      Resolution::AttachSecondary { primary }
    } else {
      Resolution::Unchanged { primary }
    }
  } else {
    Resolution::Merge {
      primary,
      demoted: rest.iter().map(|c| c.primary_id()).collect(),
      attach,
    }
  };

  debug!(%identifier, clusters = clusters.len(), ?resolution, "resolved");
  resolution
}
