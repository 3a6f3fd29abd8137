use super::document::DataDocument;

pub const CURRENT_DATA_VERSION: &str = "1.1";
pub const VERSION_KEY: &str = "Version";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    Unversioned,
    Current,
    Outdated { observed: String },
}

impl VersionCheck {
    pub fn needs_migration(&self) -> bool {
        matches!(self, VersionCheck::Outdated { .. })
    }
}

pub fn check_data_version(document: &DataDocument, current_version: &str) -> VersionCheck {
    match document.string(VERSION_KEY) {
        None => VersionCheck::Unversioned,
        Some(observed) if observed == current_version => VersionCheck::Current,
        Some(observed) => VersionCheck::Outdated { observed },
    }
}
