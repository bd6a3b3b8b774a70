//! Resource kind enumeration and the static children-kinds table
//!
//! The hierarchy is layered by construction: organizations contain folders,
//! projects, and the directory branch; folders nest and contain projects;
//! projects contain the per-project service resources; groups contain
//! members. Everything else is a leaf.

/// A category of cloud or directory-service object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Organization,
    Folder,
    Project,
    Bucket,
    Dataset,
    Instance,
    Disk,
    Firewall,
    Network,
    Subnetwork,
    ServiceAccount,
    Role,
    Sink,
    AppEngineApp,
    CloudSqlInstance,
    Group,
    GroupMember,
    User,
}

impl ResourceKind {
    /// Every kind the crawler knows about
    pub const ALL: [ResourceKind; 18] = [
        Self::Organization,
        Self::Folder,
        Self::Project,
        Self::Bucket,
        Self::Dataset,
        Self::Instance,
        Self::Disk,
        Self::Firewall,
        Self::Network,
        Self::Subnetwork,
        Self::ServiceAccount,
        Self::Role,
        Self::Sink,
        Self::AppEngineApp,
        Self::CloudSqlInstance,
        Self::Group,
        Self::GroupMember,
        Self::User,
    ];

    /// Returns the kinds that can be enumerated under a parent of this kind
    ///
    /// Directory kinds (groups and users) hang off the organization root by
    /// convention, never off folders or projects. Group members hang off
    /// their group. Leaf kinds return an empty slice.
    pub fn children(&self) -> &'static [ResourceKind] {
        match self {
            Self::Organization => &[Self::Folder, Self::Project, Self::Group, Self::User],
            Self::Folder => &[Self::Folder, Self::Project],
            Self::Project => &[
                Self::Bucket,
                Self::Dataset,
                Self::Instance,
                Self::Disk,
                Self::Firewall,
                Self::Network,
                Self::Subnetwork,
                Self::ServiceAccount,
                Self::Role,
                Self::Sink,
                Self::AppEngineApp,
                Self::CloudSqlInstance,
            ],
            Self::Group => &[Self::GroupMember],
            _ => &[],
        }
    }

    /// Whether enumerating this kind is served by the directory service
    /// rather than the cloud inventory API
    pub fn is_directory_kind(&self) -> bool {
        matches!(self, Self::Group | Self::GroupMember | Self::User)
    }

    /// Stable string form, used as the storage encoding
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Folder => "folder",
            Self::Project => "project",
            Self::Bucket => "bucket",
            Self::Dataset => "dataset",
            Self::Instance => "instance",
            Self::Disk => "disk",
            Self::Firewall => "firewall",
            Self::Network => "network",
            Self::Subnetwork => "subnetwork",
            Self::ServiceAccount => "serviceaccount",
            Self::Role => "role",
            Self::Sink => "sink",
            Self::AppEngineApp => "appengine_app",
            Self::CloudSqlInstance => "cloudsql_instance",
            Self::Group => "gsuite_group",
            Self::GroupMember => "gsuite_member",
            Self::User => "gsuite_user",
        }
    }

    /// Parses the storage encoding back into a kind
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }

    /// URL path segment used by the inventory/directory API for listings
    pub fn api_path(&self) -> &'static str {
        match self {
            Self::Organization => "organizations",
            Self::Folder => "folders",
            Self::Project => "projects",
            Self::Bucket => "buckets",
            Self::Dataset => "datasets",
            Self::Instance => "instances",
            Self::Disk => "disks",
            Self::Firewall => "firewalls",
            Self::Network => "networks",
            Self::Subnetwork => "subnetworks",
            Self::ServiceAccount => "serviceaccounts",
            Self::Role => "roles",
            Self::Sink => "sinks",
            Self::AppEngineApp => "apps",
            Self::CloudSqlInstance => "sqlinstances",
            Self::Group => "directory/groups",
            Self::GroupMember => "directory/members",
            Self::User => "directory/users",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
