use serde::{Deserialize, Serialize};

use crate::shared::errors::StoreResult;
use crate::shared::utils::Validator;

/// Caller-assigned primary key of a directory record.
pub type UserId = i32;

/// A tracked account profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    /// Display name; not unique across the directory.
    pub name: String,
    pub avatar_s3: String,
    pub avatar_anilist: String,
}

impl UserRecord {
    pub fn new(
        user_id: UserId,
        name: impl Into<String>,
        avatar_s3: impl Into<String>,
        avatar_anilist: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            name: name.into(),
            avatar_s3: avatar_s3.into(),
            avatar_anilist: avatar_anilist.into(),
        }
    }

    pub fn validate(&self) -> StoreResult<()> {
        Validator::validate_required("name", &self.name)?;
        Validator::validate_required("avatar_s3", &self.avatar_s3)?;
        Validator::validate_required("avatar_anilist", &self.avatar_anilist)?;
        Ok(())
    }
}

/// Partial update for a directory record. `None` leaves a field
/// untouched; a present `user_id` that differs from the addressed
/// record is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    pub user_id: Option<UserId>,
    pub name: Option<String>,
    pub avatar_s3: Option<String>,
    pub avatar_anilist: Option<String>,
}

impl UserPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn avatar_s3(mut self, url: impl Into<String>) -> Self {
        self.avatar_s3 = Some(url.into());
        self
    }

    pub fn avatar_anilist(mut self, url: impl Into<String>) -> Self {
        self.avatar_anilist = Some(url.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.name.is_none()
            && self.avatar_s3.is_none()
            && self.avatar_anilist.is_none()
    }

    pub(crate) fn apply_to(&self, record: &mut UserRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(url) = &self.avatar_s3 {
            record.avatar_s3 = url.clone();
        }
        if let Some(url) = &self.avatar_anilist {
            record.avatar_anilist = url.clone();
        }
    }
}

/// Filter for directory listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserFilter {
    /// Case-insensitive substring match against the display name.
    pub name: Option<String>,
}

impl UserFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, query: impl Into<String>) -> Self {
        self.name = Some(query.into());
        self
    }

    pub fn matches(&self, record: &UserRecord) -> bool {
        match &self.name {
            Some(query) => record.name.to_lowercase().contains(&query.to_lowercase()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_rejects_empty_name() {
        let valid = UserRecord::new(1, "shiro", "s3://a/1.png", "https://img/1.png");
        assert!(valid.validate().is_ok());

        let invalid = UserRecord::new(1, "", "s3://a/1.png", "https://img/1.png");
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let mut record = UserRecord::new(1, "shiro", "s3://a/1.png", "https://img/1.png");

        UserPatch::new().name("kuro").apply_to(&mut record);

        assert_eq!(record.name, "kuro");
        assert_eq!(record.avatar_s3, "s3://a/1.png");
    }

    #[test]
    fn test_name_filter_is_case_insensitive() {
        let record = UserRecord::new(1, "Shiro", "s3://a/1.png", "https://img/1.png");

        assert!(UserFilter::new().name("shi").matches(&record));
        assert!(!UserFilter::new().name("kuro").matches(&record));
        assert!(UserFilter::new().matches(&record));
    }
}
