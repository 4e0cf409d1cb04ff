use crate::{
    key::NormalizedKey,
    location::{GeoLocation, Granularity},
    user::User,
};

/// Resolution progress of a [`UserGroup`].
///
/// A group starts as `Pending` and ends up either `Resolved`
/// or `Unresolved`. There is no way back.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GroupStatus {
    #[default]
    Pending,
    Resolved(GeoLocation),
    Unresolved,
}

/// Users that share the same normalized location.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct UserGroup {
    pub key           : NormalizedKey,
    /// Display label, taken from the first user of the group.
    pub location_name : String,
    pub users         : Vec<User>,
    pub granularity   : Granularity,
    pub status        : GroupStatus,
}

impl UserGroup {
    pub fn new(key: NormalizedKey, location_name: String, granularity: Granularity) -> Self {
        Self {
            key,
            location_name,
            users: vec![],
            granularity,
            status: GroupStatus::Pending,
        }
    }

    /// The user whose address is used to resolve the whole group.
    pub fn representative(&self) -> Option<&User> {
        self.users.first()
    }

    /// Number of users besides the representative ("+N others").
    pub fn others_count(&self) -> usize {
        self.users.len().saturating_sub(1)
    }

    pub fn location(&self) -> Option<&GeoLocation> {
        match &self.status {
            GroupStatus::Resolved(location) => Some(location),
            GroupStatus::Pending | GroupStatus::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.location().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.status == GroupStatus::Pending
    }

    pub fn mark_resolved(&mut self, location: GeoLocation) {
        debug_assert!(self.is_pending());
        self.granularity = location.granularity;
        self.status = GroupStatus::Resolved(location);
    }

    pub fn mark_unresolved(&mut self) {
        debug_assert!(self.is_pending());
        self.granularity = Granularity::Unknown;
        self.status = GroupStatus::Unresolved;
    }
}
