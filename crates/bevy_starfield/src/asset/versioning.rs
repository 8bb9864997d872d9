use std::fmt;

/// Revisions of the starfield file format, oldest first.
///
/// Every revision so far only added sections that deserialize to their
/// defaults when missing, so older files load unchanged and only their
/// `starfield_version` is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormatVersion {
    /// Galaxy, density, constellation and effect sections.
    V0_1,
    /// Adds the `backdrop` section.
    V0_2,
}

impl FormatVersion {
    /// Revision written into new files.
    pub const CURRENT: Self = Self::V0_2;

    const ALL: [Self; 2] = [Self::V0_1, Self::V0_2];

    /// The string stored in `starfield_version`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V0_1 => "0.1",
            Self::V0_2 => "0.2",
        }
    }

    /// Looks up a `starfield_version` string.
    pub fn parse(version: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|known| known.as_str() == version)
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking a `starfield_version` string.
#[derive(Debug, PartialEq, Eq)]
pub enum VersionStatus {
    /// Matches [`FormatVersion::CURRENT`].
    Current,
    /// An older revision, upgraded on load.
    Outdated {
        /// Revision found in the file.
        found: FormatVersion,
    },
    /// Not a revision this crate knows about, probably written by a newer release.
    Unknown,
}

/// Returns the format version written into new starfield files.
pub fn current_format_version() -> &'static str {
    FormatVersion::CURRENT.as_str()
}

/// Classifies `version` against [`FormatVersion::CURRENT`].
pub fn check_version(version: &str) -> VersionStatus {
    match FormatVersion::parse(version) {
        Some(found) if found == FormatVersion::CURRENT => VersionStatus::Current,
        Some(found) => VersionStatus::Outdated { found },
        None => VersionStatus::Unknown,
    }
}
