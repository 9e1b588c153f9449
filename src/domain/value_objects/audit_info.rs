use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::seedwork::{DomainError, DomainResult};

/// Who created/last modified something, and when.
///
/// Creation fields never change; `update_modified` returns a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AuditInfoParts")]
pub struct AuditInfo {
    created_by: String,
    created_at: DateTime<Utc>,
    modified_by: Option<String>,
    modified_at: Option<DateTime<Utc>>,
}

/// Unvalidated input; goes through the same actor checks on deserialization
#[derive(Debug, Clone, Deserialize)]
pub struct AuditInfoParts {
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub modified_by: Option<String>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

impl AuditInfo {
    pub fn new(created_by: impl Into<String>) -> DomainResult<Self> {
        Self::new_at(created_by, Utc::now())
    }

    pub fn new_at(created_by: impl Into<String>, at: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            created_by: actor("CreatedBy", created_by.into())?,
            created_at: at,
            modified_by: None,
            modified_at: None,
        })
    }

    pub fn update_modified(&self, modified_by: impl Into<String>) -> DomainResult<Self> {
        self.update_modified_at(modified_by, Utc::now())
    }

    pub fn update_modified_at(&self, modified_by: impl Into<String>, at: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            created_by: self.created_by.clone(),
            created_at: self.created_at,
            modified_by: Some(actor("ModifiedBy", modified_by.into())?),
            modified_at: Some(at),
        })
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_by(&self) -> Option<&str> {
        self.modified_by.as_deref()
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified_at
    }

    /// Most recent actor: the last modifier, else the creator
    pub fn last_actor(&self) -> &str {
        self.modified_by.as_deref().unwrap_or(&self.created_by)
    }
}

impl TryFrom<AuditInfoParts> for AuditInfo {
    type Error = DomainError;

    fn try_from(parts: AuditInfoParts) -> Result<Self, Self::Error> {
        let audit = Self::new_at(parts.created_by, parts.created_at)?;
        match (parts.modified_by, parts.modified_at) {
            (None, None) => Ok(audit),
            (Some(by), Some(at)) => audit.update_modified_at(by, at),
            _ => Err(DomainError::validation("ModifiedBy and ModifiedAt must be set together")),
        }
    }
}

fn actor(field: &str, value: String) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_update_modified_preserves_creation() {
        let created = Utc::now() - Duration::days(3);
        let original = AuditInfo::new_at("alice", created).unwrap();

        let first_edit = Utc::now() - Duration::days(1);
        let updated = original.update_modified_at("bob", first_edit).unwrap();

        assert_eq!(updated.created_by(), "alice");
        assert_eq!(updated.created_at(), created);
        assert_eq!(updated.modified_by(), Some("bob"));
        assert_eq!(updated.modified_at(), Some(first_edit));

        // Original is untouched
        assert_eq!(original.modified_by(), None);
        assert_eq!(original.modified_at(), None);

        let again = updated.update_modified("carol").unwrap();
        assert_eq!(again.created_at(), created);
        assert_eq!(again.created_by(), "alice");
        assert_eq!(again.modified_by(), Some("carol"));
        assert_eq!(again.last_actor(), "carol");
    }

    #[test]
    fn test_deserialization_validates_actors() {
        let audit = AuditInfo::new("system").unwrap().update_modified("ops").unwrap();
        let json = serde_json::to_string(&audit).unwrap();
        assert_eq!(serde_json::from_str::<AuditInfo>(&json).unwrap(), audit);

        let at = "2024-01-01T00:00:00Z";
        let blank_creator = format!(r#"{{"created_by":"   ","created_at":"{at}","modified_by":null,"modified_at":null}}"#);
        assert!(serde_json::from_str::<AuditInfo>(&blank_creator).is_err());

        let blank_modifier = format!(r#"{{"created_by":"system","created_at":"{at}","modified_by":"","modified_at":"{at}"}}"#);
        assert!(serde_json::from_str::<AuditInfo>(&blank_modifier).is_err());

        let half_modified = format!(r#"{{"created_by":"system","created_at":"{at}","modified_by":"ops"}}"#);
        assert!(serde_json::from_str::<AuditInfo>(&half_modified).is_err());
    }

    #[test]
    fn test_blank_actors_are_rejected() {
        assert!(AuditInfo::new("  ").is_err());
        let audit = AuditInfo::new("system").unwrap();
        assert!(audit.update_modified("").is_err());
        assert_eq!(audit.last_actor(), "system");
    }
}
