// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use principal_graph_core::PrincipalId;
use sqlx::{QueryBuilder, Sqlite};

use crate::membership::{IndexRow, MembershipStore};
use crate::sqlite::{Pool, SqliteError, SqliteStore};

/// Upper bound of bind parameters SQLite accepts in a single statement.
const MAX_VARIABLES: usize = 32766;

/// Columns of one index table: the row key and the stored value.
struct IndexTable {
    name: &'static str,
    key: &'static str,
    value: &'static str,
}

/// Forward index, keyed by group.
const GROUP_MEMBERS: IndexTable = IndexTable {
    name: "group_members_v1",
    key: "group_id",
    value: "principal_id",
};

/// Reverse index, keyed by principal.
const MEMBER_OF: IndexTable = IndexTable {
    name: "member_of_v1",
    key: "principal_id",
    value: "group_id",
};

fn decode(value: String) -> Result<PrincipalId, SqliteError> {
    PrincipalId::from_str(&value).map_err(|err| SqliteError::Decode(value, err))
}

async fn fetch_rows(
    pool: &Pool,
    table: &IndexTable,
    keys: &[PrincipalId],
) -> Result<Vec<IndexRow>, SqliteError> {
    let mut rows: HashMap<String, HashSet<PrincipalId>> = HashMap::new();

    for chunk in keys.chunks(MAX_VARIABLES) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {key}, {value} FROM {name} WHERE {key} IN (",
            key = table.key,
            value = table.value,
            name = table.name,
        ));
        let mut separated = builder.separated(", ");
        for key in chunk {
            separated.push_bind(key.to_string());
        }
        separated.push_unseparated(")");

        let pairs: Vec<(String, String)> = builder.build_query_as().fetch_all(pool).await?;
        for (key, value) in pairs {
            let value = decode(value)?;
            rows.entry(key).or_default().insert(value);
        }
    }

    Ok(keys
        .iter()
        .map(|key| {
            let values = rows.get(&key.to_string()).cloned().unwrap_or_default();
            (key.clone(), values)
        })
        .collect())
}

/// Write all values of one row, split into as few statements as SQLite allows.
async fn insert_row(
    pool: &Pool,
    table: &IndexTable,
    key: &PrincipalId,
    values: &HashSet<PrincipalId>,
) -> Result<(), SqliteError> {
    let key = key.to_string();
    let values: Vec<&PrincipalId> = values.iter().collect();

    // Two bound parameters per inserted pair.
    for chunk in values.chunks(MAX_VARIABLES / 2) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "INSERT OR IGNORE INTO {name} ({key}, {value}) ",
            name = table.name,
            key = table.key,
            value = table.value,
        ));
        builder.push_values(chunk, |mut row, value| {
            row.push_bind(key.clone()).push_bind(value.to_string());
        });
        builder.build().execute(pool).await?;
    }

    Ok(())
}

impl MembershipStore for SqliteStore {
    type Error = SqliteError;

    async fn get_members(&self, group_ids: &[PrincipalId]) -> Result<Vec<IndexRow>, Self::Error> {
        self.execute(async |pool| fetch_rows(pool, &GROUP_MEMBERS, group_ids).await)
            .await
    }

    async fn get_memberships(
        &self,
        principal_ids: &[PrincipalId],
    ) -> Result<Vec<IndexRow>, Self::Error> {
        self.execute(async |pool| fetch_rows(pool, &MEMBER_OF, principal_ids).await)
            .await
    }

    async fn add_members(
        &self,
        group_id: &PrincipalId,
        members: &HashSet<PrincipalId>,
    ) -> Result<(), Self::Error> {
        self.execute(async |pool| insert_row(pool, &GROUP_MEMBERS, group_id, members).await)
            .await
    }

    async fn add_memberships(&self, batch: &[IndexRow]) -> Result<(), Self::Error> {
        self.execute(async |pool| {
            // No transaction around the batch, every row stands on its own.
            for (principal_id, groups) in batch {
                insert_row(pool, &MEMBER_OF, principal_id, groups).await?;
            }
            Ok(())
        })
        .await
    }
}
