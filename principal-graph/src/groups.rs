// SPDX-License-Identifier: MIT OR Apache-2.0

//! Creating principals and reading group membership.
use std::collections::HashSet;
use std::error::Error;

use principal_graph_core::{Group, Principal, PrincipalId, PrincipalRecord, Tenant};
use principal_graph_store::{MembershipStore, PrincipalStore};
use tracing::{debug, warn};

use crate::directory::Directory;
use crate::error::{DirectoryError, InvalidPrincipal};

impl<S, E> Directory<S>
where
    S: PrincipalStore<Error = E> + MembershipStore<Error = E>,
    E: Error,
{
    /// Create a group `g:<tenant>:<name>` titled after its name.
    ///
    /// No membership is created. Creating a group with an already used name silently replaces the
    /// metadata of the existing group, its memberships stay untouched.
    pub async fn create_group(
        &self,
        tenant: &Tenant,
        name: &str,
        description: &str,
    ) -> Result<PrincipalId, DirectoryError<E>> {
        let group_id = tenant.group_id(name)?;
        let record = PrincipalRecord::group(name, description, None);
        self.insert(group_id, record).await
    }

    /// Create a user `u:<tenant>:<name>`, replacing the metadata of an existing user.
    pub async fn create_user(
        &self,
        tenant: &Tenant,
        name: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<PrincipalId, DirectoryError<E>> {
        let user_id = tenant.user_id(name)?;
        let record = PrincipalRecord::user(first_name, last_name);
        self.insert(user_id, record).await
    }

    async fn insert(
        &self,
        id: PrincipalId,
        record: PrincipalRecord,
    ) -> Result<PrincipalId, DirectoryError<E>> {
        let created = self
            .round_trip(self.store().insert_principal(&id, record))
            .await?;
        if created {
            debug!(principal_id = %id, "created principal");
        } else {
            warn!(principal_id = %id, "overwrote metadata of existing principal");
        }
        Ok(id)
    }

    /// Metadata of a group, private groups are reported as not found.
    pub async fn group(&self, group_id: &PrincipalId) -> Result<Group, DirectoryError<E>> {
        if !group_id.is_group() {
            return Err(InvalidPrincipal::NotAGroup(group_id.clone()).into());
        }

        match self.fetch_one(group_id).await? {
            Principal::Group(group) => Ok(group),
            Principal::User(_) => Err(InvalidPrincipal::NotAGroup(group_id.clone()).into()),
        }
    }

    /// Direct members of a group, sorted by identifier.
    pub async fn group_members(
        &self,
        group_id: &PrincipalId,
    ) -> Result<Vec<PrincipalId>, DirectoryError<E>> {
        let rows = self.member_rows(std::slice::from_ref(group_id)).await?;
        let mut members: Vec<PrincipalId> =
            rows.into_iter().flat_map(|(_, members)| members).collect();
        members.sort();

        if members.is_empty() {
            warn!(%group_id, "group has no members");
        }

        Ok(members)
    }

    /// Metadata of all direct members of a group which have metadata.
    pub async fn group_members_metadata(
        &self,
        group_id: &PrincipalId,
    ) -> Result<Vec<Principal>, DirectoryError<E>> {
        let members = self.group_members(group_id).await?;
        if members.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch_many(&members).await
    }

    /// All groups the principal is a member of, directly or through nested groups, sorted by
    /// identifier.
    pub async fn member_of(
        &self,
        principal_id: &PrincipalId,
    ) -> Result<Vec<PrincipalId>, DirectoryError<E>> {
        let mut groups: Vec<PrincipalId> =
            self.ancestors(principal_id).await?.into_iter().collect();
        groups.sort();
        Ok(groups)
    }

    pub async fn member_of_metadata(
        &self,
        principal_id: &PrincipalId,
    ) -> Result<Vec<Principal>, DirectoryError<E>> {
        let groups = self.member_of(principal_id).await?;
        if groups.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch_many(&groups).await
    }

    /// All users contained in a group, directly or through nested groups.
    pub async fn group_users(
        &self,
        group_id: &PrincipalId,
    ) -> Result<HashSet<PrincipalId>, DirectoryError<E>> {
        self.explode(std::slice::from_ref(group_id), true).await
    }
}

#[cfg(test)]
mod tests {
    use principal_graph_core::test_utils::{id, ids};
    use principal_graph_core::{PrincipalRecord, Privacy, Tenant};
    use principal_graph_store::{MemoryStore, PrincipalStore};

    use crate::Directory;
    use crate::error::{DirectoryError, InvalidPrincipal};

    #[tokio::test]
    async fn create_and_read_group() {
        let directory = Directory::new(MemoryStore::new());
        let tenant = Tenant::new("cam", "Cambridge");

        let group_id = directory
            .create_group(&tenant, "oae-team", "The OAE team")
            .await
            .unwrap();
        assert_eq!(group_id.to_string(), "g:cam:oae-team");

        let group = directory.group(&group_id).await.unwrap();
        assert_eq!(group.tenant, "cam");
        assert_eq!(group.group_title.as_deref(), Some("oae-team"));
        assert_eq!(group.group_description.as_deref(), Some("The OAE team"));
        assert_eq!(group.privacy_setting, None);

        // No memberships get created along with the group.
        let members = directory.group_members(&group_id).await.unwrap();
        assert!(members.is_empty());
        assert!(directory.member_of(&group_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_group_overwrites_metadata() {
        let directory = Directory::new(MemoryStore::new());
        let tenant = Tenant::new("cam", "Cambridge");

        let first = directory
            .create_group(&tenant, "oak", "First")
            .await
            .unwrap();
        let second = directory
            .create_group(&tenant, "oak", "Second")
            .await
            .unwrap();
        assert_eq!(first, second);

        let group = directory.group(&first).await.unwrap();
        assert_eq!(group.group_description.as_deref(), Some("Second"));
    }

    #[tokio::test]
    async fn group_rejects_users_and_hides_private_groups() {
        let directory = Directory::new(MemoryStore::new());
        let tenant = Tenant::new("cam", "Cambridge");

        let user_id = directory
            .create_user(&tenant, "ada", "Ada", "Lovelace")
            .await
            .unwrap();
        assert!(matches!(
            directory.group(&user_id).await,
            Err(DirectoryError::InvalidPrincipalKind(InvalidPrincipal::NotAGroup(_)))
        ));

        directory
            .store()
            .insert_principal(
                &id("g:cam:secret"),
                PrincipalRecord::group("Secret", "", Some(Privacy::Private)),
            )
            .await
            .unwrap();
        assert!(matches!(
            directory.group(&id("g:cam:secret")).await,
            Err(DirectoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn members_and_memberships() {
        let directory = Directory::new(MemoryStore::new());
        let tenant = Tenant::new("cam", "Cambridge");

        let root = directory.create_group(&tenant, "root", "").await.unwrap();
        let team = directory.create_group(&tenant, "team", "").await.unwrap();
        let ada = directory
            .create_user(&tenant, "ada", "Ada", "Lovelace")
            .await
            .unwrap();
        let bob = directory
            .create_user(&tenant, "bob", "Bob", "Builder")
            .await
            .unwrap();

        directory
            .add_members(&team, &[ada.clone(), bob.clone()])
            .await
            .unwrap();
        directory.add_members(&root, &[team.clone()]).await.unwrap();

        assert_eq!(
            directory.group_members(&team).await.unwrap(),
            ids(&["u:cam:ada", "u:cam:bob"])
        );
        assert_eq!(
            directory.group_members(&root).await.unwrap(),
            vec![team.clone()]
        );

        let metadata = directory.group_members_metadata(&team).await.unwrap();
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata[0].id(), &ada);

        assert_eq!(
            directory.member_of(&ada).await.unwrap(),
            ids(&["g:cam:root", "g:cam:team"])
        );
        let groups = directory.member_of_metadata(&ada).await.unwrap();
        assert!(groups.iter().all(|group| group.as_group().is_some()));
        assert_eq!(groups.len(), 2);

        let users = directory.group_users(&root).await.unwrap();
        assert_eq!(users, [ada, bob].into_iter().collect());
    }
}
