// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::membership::MembershipMemoryStore;
use crate::principals::PrincipalMemoryStore;

/// In-memory store.
///
/// This does not persist data permanently, all changes are lost when the process ends. Use this
/// only in development or test contexts.
///
/// Cloned instances share the same underlying state.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub(crate) principals: PrincipalMemoryStore,
    pub(crate) membership: MembershipMemoryStore,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// Trait implementations are in the regarding modules, see `principals` and `membership`.
