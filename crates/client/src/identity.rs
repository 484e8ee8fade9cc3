//! Child identity resolution
//!
//! The profiles payload nests children under one entry per guardian role,
//! so the same child can legitimately appear more than once. Each child
//! carries two ids: the login-level `userId` (what callers key on) and the
//! institution-scoped profile id (what the data endpoints require). All
//! per-child headers and query parameters downstream are derived from this
//! mapping, so it must be one-to-one in both directions. One institution
//! id resolving to two different login ids would silently attribute one
//! child's data to another; one login id resolving to two institution
//! profiles would let the later profile's snapshot overwrite the earlier
//! one, since snapshots are keyed on the login id. Both shapes are fatal.

use std::collections::HashMap;

use skoleport_domain::{ChildIdentity, ClientError, Result};
use tracing::debug;

use crate::api::wire::RawProfile;

/// Flatten profiles into a deduplicated child list, enforcing a one-to-one
/// mapping between login ids and institution ids.
///
/// # Errors
/// - [`ClientError::IdentityCollision`] when two distinct login ids claim
///   the same institution id
/// - [`ClientError::AmbiguousIdentity`] when one login id claims two
///   distinct institution ids
pub fn resolve_children(profiles: &[RawProfile]) -> Result<Vec<ChildIdentity>> {
    let mut by_internal: HashMap<String, usize> = HashMap::new();
    let mut by_external: HashMap<String, usize> = HashMap::new();
    let mut children: Vec<ChildIdentity> = Vec::new();

    for profile in profiles {
        for raw in &profile.children {
            let internal_id = raw.id.as_string();
            let external_id = raw.user_id.as_string();
            let display_name =
                raw.name.clone().filter(|n| !n.is_empty()).unwrap_or_else(|| external_id.clone());

            match by_internal.get(&internal_id) {
                None => {
                    if let Some(&index) = by_external.get(&external_id) {
                        return Err(ClientError::AmbiguousIdentity {
                            external_id,
                            internal_ids: vec![children[index].internal_id.clone(), internal_id],
                        });
                    }
                    by_internal.insert(internal_id.clone(), children.len());
                    by_external.insert(external_id.clone(), children.len());
                    children.push(ChildIdentity { external_id, internal_id, display_name });
                }
                Some(&index) if children[index].external_id == external_id => {
                    // Same child listed under another guardian role
                }
                Some(&index) => {
                    return Err(ClientError::IdentityCollision {
                        internal_id,
                        children: vec![children[index].external_id.clone(), external_id],
                    });
                }
            }
        }
    }

    debug!(count = children.len(), "resolved child identities");
    Ok(children)
}
