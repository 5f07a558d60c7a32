// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::PrincipalId;

/// Visibility of a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Public,
    Private,
}

impl Privacy {
    /// Read a stored privacy setting.
    ///
    /// Any value other than `public` or `private` is treated as unset.
    pub fn from_setting(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Privacy::Public),
            "private" => Some(Privacy::Private),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Private => "private",
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of the principals table as it is persisted.
///
/// Users and groups share the same table, only the columns matching the kind of the identifier
/// are populated. A record where no column is populated is indistinguishable from a missing row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrincipalRecord {
    pub group_title: Option<String>,
    pub group_description: Option<String>,
    pub group_privacy: Option<Privacy>,
    pub user_first_name: Option<String>,
    pub user_last_name: Option<String>,
}

impl PrincipalRecord {
    /// Metadata columns of a group.
    pub fn group(title: &str, description: &str, privacy: Option<Privacy>) -> Self {
        Self {
            group_title: Some(title.to_owned()),
            group_description: Some(description.to_owned()),
            group_privacy: privacy,
            ..Default::default()
        }
    }

    /// Metadata columns of a user.
    pub fn user(first_name: &str, last_name: &str) -> Self {
        Self {
            user_first_name: Some(first_name.to_owned()),
            user_last_name: Some(last_name.to_owned()),
            ..Default::default()
        }
    }

    /// Returns `true` if no column beyond the key is populated.
    pub fn is_empty(&self) -> bool {
        self.group_title.is_none()
            && self.group_description.is_none()
            && self.group_privacy.is_none()
            && self.user_first_name.is_none()
            && self.user_last_name.is_none()
    }
}

/// Reduced projection of a user principal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub principal_id: PrincipalId,
    pub tenant: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Group principal with its metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub principal_id: PrincipalId,
    pub tenant: String,
    pub group_title: Option<String>,
    pub group_description: Option<String>,
    pub privacy_setting: Option<Privacy>,
}

impl Group {
    pub fn is_private(&self) -> bool {
        self.privacy_setting == Some(Privacy::Private)
    }
}

/// Hydrated user or group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Principal {
    User(User),
    Group(Group),
}

impl Principal {
    /// Shape a stored record into a user or group, depending on the kind of the identifier.
    pub fn hydrate(id: PrincipalId, record: PrincipalRecord) -> Self {
        let tenant = id.tenant().to_owned();
        if id.is_group() {
            Principal::Group(Group {
                principal_id: id,
                tenant,
                group_title: record.group_title,
                group_description: record.group_description,
                privacy_setting: record.group_privacy,
            })
        } else {
            Principal::User(User {
                principal_id: id,
                tenant,
                first_name: record.user_first_name,
                last_name: record.user_last_name,
            })
        }
    }

    pub fn id(&self) -> &PrincipalId {
        match self {
            Principal::User(user) => &user.principal_id,
            Principal::Group(group) => &group.principal_id,
        }
    }

    pub fn tenant(&self) -> &str {
        match self {
            Principal::User(user) => &user.tenant,
            Principal::Group(group) => &group.tenant,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Principal::Group(group) => Some(group),
            Principal::User(_) => None,
        }
    }

    pub fn into_group(self) -> Option<Group> {
        match self {
            Principal::Group(group) => Some(group),
            Principal::User(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::PrincipalId;

    use super::{Principal, PrincipalRecord, Privacy};

    #[test]
    fn empty_record() {
        assert!(PrincipalRecord::default().is_empty());
        assert!(!PrincipalRecord::user("Simon", "Gaeremynck").is_empty());
        assert!(
            !PrincipalRecord {
                group_privacy: Some(Privacy::Private),
                ..Default::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn privacy_settings() {
        assert_eq!(Privacy::from_setting("private"), Some(Privacy::Private));
        assert_eq!(Privacy::from_setting("public"), Some(Privacy::Public));
        assert_eq!(Privacy::from_setting("loggedin"), None);
        assert_eq!(Privacy::Private.to_string(), "private");
    }

    #[test]
    fn hydrate_by_identifier_kind() {
        let group_id: PrincipalId = "g:cam:oae-team".parse().unwrap();
        let group = Principal::hydrate(
            group_id.clone(),
            PrincipalRecord::group("OAE Team", "Builds things", Some(Privacy::Public)),
        );
        assert_eq!(group.id(), &group_id);
        assert_eq!(group.tenant(), "cam");
        let group = group.into_group().unwrap();
        assert_eq!(group.group_title.as_deref(), Some("OAE Team"));
        assert!(!group.is_private());

        // User columns on a group row are ignored and vice versa.
        let user_id: PrincipalId = "u:cam:bert".parse().unwrap();
        let mut record = PrincipalRecord::user("Bert", "Pareyn");
        record.group_title = Some("ignored".into());
        let user = Principal::hydrate(user_id, record);
        assert!(user.as_group().is_none());
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            json!({
                "principal_id": "u:cam:bert",
                "tenant": "cam",
                "first_name": "Bert",
                "last_name": "Pareyn",
            })
        );
    }

    #[test]
    fn group_json_shape() {
        let group = Principal::hydrate(
            "g:cam:ui".parse().unwrap(),
            PrincipalRecord::group("UI", "Front-end", Some(Privacy::Private)),
        );
        assert_eq!(
            serde_json::to_value(&group).unwrap(),
            json!({
                "principal_id": "g:cam:ui",
                "tenant": "cam",
                "group_title": "UI",
                "group_description": "Front-end",
                "privacy_setting": "private",
            })
        );
    }
}
