// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repairing the reverse index from the forward index.
//!
//! Both indices are written without atomicity across them, so the reverse index can miss
//! ancestors after a failed or racing `add_members`. Reconciling a group rebuilds the sub-graph
//! below it from the forward index and appends every ancestor that is missing in the reverse index
//! row of a descendant. The reverse index row of the reconciled group itself is trusted.
use std::collections::{HashMap, HashSet};
use std::error::Error;

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use principal_graph_core::PrincipalId;
use principal_graph_store::{IndexRow, MembershipStore, PrincipalStore};
use tracing::{debug, info};

use crate::directory::Directory;
use crate::error::{DirectoryError, InvalidPrincipal};

/// Membership sub-graph with edges pointing from a group to its direct members.
#[derive(Debug, Default)]
struct Subgraph {
    graph: DiGraph<PrincipalId, ()>,
    nodes: HashMap<PrincipalId, NodeIndex>,
}

impl Subgraph {
    fn node(&mut self, id: &PrincipalId) -> NodeIndex {
        if let Some(index) = self.nodes.get(id) {
            return *index;
        }
        let index = self.graph.add_node(id.clone());
        self.nodes.insert(id.clone(), index);
        index
    }

    fn add_edge(&mut self, group_id: &PrincipalId, member_id: &PrincipalId) {
        let group = self.node(group_id);
        let member = self.node(member_id);
        self.graph.update_edge(group, member, ());
    }

    /// Expected ancestors of every node below the root, given the ancestors of the root.
    ///
    /// Fails with the identifier of a node on a cycle.
    fn ancestry(
        &self,
        root: &PrincipalId,
        root_ancestors: HashSet<PrincipalId>,
    ) -> Result<HashMap<PrincipalId, HashSet<PrincipalId>>, PrincipalId> {
        let order =
            toposort(&self.graph, None).map_err(|cycle| self.graph[cycle.node_id()].clone())?;

        let mut ancestry: HashMap<NodeIndex, HashSet<PrincipalId>> = HashMap::new();
        if let Some(index) = self.nodes.get(root) {
            ancestry.insert(*index, root_ancestors);
        }

        // Parents come before their members, their ancestry is complete once visited.
        for index in order {
            let mut inherited = ancestry.get(&index).cloned().unwrap_or_default();
            inherited.insert(self.graph[index].clone());
            for member in self.graph.neighbors_directed(index, Direction::Outgoing) {
                ancestry
                    .entry(member)
                    .or_default()
                    .extend(inherited.iter().cloned());
            }
        }

        Ok(ancestry
            .into_iter()
            .filter(|(_, groups)| !groups.is_empty())
            .map(|(index, groups)| (self.graph[index].clone(), groups))
            .filter(|(id, _)| id != root)
            .collect())
    }
}

impl<S, E> Directory<S>
where
    S: PrincipalStore<Error = E> + MembershipStore<Error = E>,
    E: Error,
{
    /// Append ancestors missing in the reverse index rows of all principals below a group.
    ///
    /// Returns the number of reverse index rows which were written. Fails with `CycleDetected`
    /// when the forward index below the group contains a cycle, nothing is written in that case.
    pub async fn reconcile(&self, group_id: &PrincipalId) -> Result<usize, DirectoryError<E>> {
        if !group_id.is_group() {
            return Err(InvalidPrincipal::NotAGroup(group_id.clone()).into());
        }

        let mut subgraph = Subgraph::default();
        subgraph.node(group_id);

        let mut visited = HashSet::from([group_id.clone()]);
        let mut frontier = vec![group_id.clone()];
        while !frontier.is_empty() {
            self.check_cancelled()?;

            let mut next = Vec::new();
            for (parent, members) in self.member_rows(&frontier).await? {
                for member in members {
                    subgraph.add_edge(&parent, &member);
                    if member.is_group() && visited.insert(member.clone()) {
                        next.push(member);
                    }
                }
            }
            frontier = next;
        }

        let root_ancestors = self.ancestors(group_id).await?;
        let expected = subgraph
            .ancestry(group_id, root_ancestors)
            .map_err(|member_id| DirectoryError::CycleDetected {
                group_id: group_id.clone(),
                member_id,
            })?;

        let keys: Vec<PrincipalId> = expected.keys().cloned().collect();
        let mut batch: Vec<IndexRow> = Vec::new();
        for (principal_id, stored) in self.membership_rows(&keys).await? {
            let Some(groups) = expected.get(&principal_id) else {
                continue;
            };
            let missing: HashSet<PrincipalId> = groups.difference(&stored).cloned().collect();
            if !missing.is_empty() {
                debug!(%principal_id, missing = missing.len(), "repair reverse index row");
                batch.push((principal_id, missing));
            }
        }

        self.write_memberships(&batch).await?;

        info!(
            %group_id,
            principals = keys.len(),
            repaired = batch.len(),
            "reconciled reverse index"
        );

        Ok(batch.len())
    }
}
