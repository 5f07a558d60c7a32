// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use principal_graph_core::{PrincipalId, PrincipalRecord, Privacy};
use sqlx::{FromRow, QueryBuilder, Sqlite, query};

use crate::principals::{PrincipalRow, PrincipalStore};
use crate::sqlite::{SqliteError, SqliteStore};

/// A single row of the principals table as it is stored in the database.
#[derive(FromRow, Debug, Clone, PartialEq, Eq)]
struct PrincipalsRow {
    principal_id: String,
    group_title: Option<String>,
    group_description: Option<String>,
    group_privacy_setting: Option<String>,
    user_first_name: Option<String>,
    user_last_name: Option<String>,
}

impl From<PrincipalsRow> for PrincipalRecord {
    fn from(row: PrincipalsRow) -> Self {
        Self {
            group_title: row.group_title,
            group_description: row.group_description,
            group_privacy: row
                .group_privacy_setting
                .as_deref()
                .and_then(Privacy::from_setting),
            user_first_name: row.user_first_name,
            user_last_name: row.user_last_name,
        }
    }
}

impl PrincipalStore for SqliteStore {
    type Error = SqliteError;

    async fn insert_principal(
        &self,
        id: &PrincipalId,
        record: PrincipalRecord,
    ) -> Result<bool, Self::Error> {
        self.execute(async |pool| {
            let exists = query(
                "
                SELECT
                    1
                FROM
                    principals_v1
                WHERE
                    principal_id = ?
                ",
            )
            .bind(id.to_string())
            .fetch_optional(pool)
            .await?
            .is_some();

            query(
                "
                INSERT OR REPLACE
                INTO
                    principals_v1 (
                        principal_id,
                        group_title,
                        group_description,
                        group_privacy_setting,
                        user_first_name,
                        user_last_name
                    )
                VALUES
                    (?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(id.to_string())
            .bind(record.group_title)
            .bind(record.group_description)
            .bind(record.group_privacy.map(|privacy| privacy.as_str()))
            .bind(record.user_first_name)
            .bind(record.user_last_name)
            .execute(pool)
            .await?;

            Ok(!exists)
        })
        .await
    }

    async fn get_principals(&self, ids: &[PrincipalId]) -> Result<Vec<PrincipalRow>, Self::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.execute(async |pool| {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
                "
                SELECT
                    principal_id,
                    group_title,
                    group_description,
                    group_privacy_setting,
                    user_first_name,
                    user_last_name
                FROM
                    principals_v1
                WHERE
                    principal_id IN (",
            );
            let mut separated = builder.separated(", ");
            for id in ids {
                separated.push_bind(id.to_string());
            }
            separated.push_unseparated(")");

            let rows: Vec<PrincipalsRow> = builder.build_query_as().fetch_all(pool).await?;

            let rows: HashMap<String, PrincipalRecord> = rows
                .into_iter()
                .map(|row| (row.principal_id.clone(), PrincipalRecord::from(row)))
                .collect();

            Ok(ids
                .iter()
                .map(|id| (id.clone(), rows.get(&id.to_string()).cloned()))
                .collect())
        })
        .await
    }
}
