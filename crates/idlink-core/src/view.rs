//! The consolidated view returned to callers.

use serde::{Deserialize, Serialize};

use crate::contact::ContactId;

/// Deduplicated projection of one cluster.
///
/// `emails` and `phone_numbers` list the primary's own value first (when it
/// has one), then the remaining values in ascending id order of the record
/// that carries them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedView {
  pub primary_contact_id:    ContactId,
  pub emails:                Vec<String>,
  pub phone_numbers:         Vec<String>,
  /// Ascending.
  pub secondary_contact_ids: Vec<ContactId>,
}
