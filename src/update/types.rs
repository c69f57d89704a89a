//! Wire types of the client-facing update API.

use crate::core::{Branch, Runtime};
use crate::db::ChangeList;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `{available, updatePackage?}` answer to an update check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePackageContainer {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_package: Option<UpdatePackage>,
}

impl UpdatePackageContainer {
    pub fn up_to_date() -> Self {
        Self {
            available: false,
            update_package: None,
        }
    }

    pub fn available(package: UpdatePackage) -> Self {
        Self {
            available: true,
            update_package: Some(package),
        }
    }
}

/// One release as offered to a client
///
/// `runtime` is only set on update checks; `status` only on change listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePackage {
    pub version: String,
    pub release_date: DateTime<Utc>,
    pub filename: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<UpdateChanges>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub branch: Branch,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<Runtime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateChanges {
    pub new: Vec<String>,
    pub fixed: Vec<String>,
}

impl UpdateChanges {
    /// `None` for a release without change notes
    pub fn from_list(changes: &ChangeList) -> Option<Self> {
        if changes.is_empty() {
            None
        } else {
            Some(Self {
                new: changes.new.clone(),
                fixed: changes.fixed.clone(),
            })
        }
    }
}

/// `{errorMessage}` body for requests the service can't answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error_message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_up_to_date_omits_package() {
        let json = serde_json::to_value(UpdatePackageContainer::up_to_date()).unwrap();
        assert_eq!(json, json!({"available": false}));
    }

    #[test]
    fn test_package_is_camel_case_and_skips_absent_fields() {
        let package = UpdatePackage {
            version: "2.1.0".to_string(),
            release_date: Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
            filename: "Lidarr.develop.2.1.0.linux.tar.gz".to_string(),
            url: "https://example.com/Lidarr.develop.2.1.0.linux.tar.gz".to_string(),
            hash: Some("abc".to_string()),
            changes: None,
            status: None,
            branch: Branch::Develop,
            runtime: Some(Runtime::NetCore),
        };
        let json = serde_json::to_value(UpdatePackageContainer::available(package)).unwrap();

        assert_eq!(json["available"], true);
        let package = &json["updatePackage"];
        assert_eq!(package["releaseDate"], "2024-05-01T08:30:00Z");
        assert_eq!(package["branch"], "develop");
        assert_eq!(package["runtime"], "netcore");
        assert!(package.get("changes").is_none());
        assert!(package.get("status").is_none());
    }

    #[test]
    fn test_empty_change_list_is_omitted() {
        assert!(UpdateChanges::from_list(&ChangeList::default()).is_none());
        let changes = UpdateChanges::from_list(&ChangeList {
            new: vec![],
            fixed: vec!["crash".to_string()],
        })
        .unwrap();
        assert_eq!(changes.fixed, vec!["crash"]);
    }

    #[test]
    fn test_error_response() {
        let json = serde_json::to_value(ErrorResponse::new("Latest update not found.")).unwrap();
        assert_eq!(json, json!({"errorMessage": "Latest update not found."}));
    }
}
