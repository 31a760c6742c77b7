//! Icon names understood by the site theme.
//!
//! Front matter refers to icons by name. Unknown or missing names fall back
//! to [`DEFAULT_ICON`].

/// Icon used when none is set or the name is unknown.
pub const DEFAULT_ICON: &str = "blocks";

const ICONS: &[&str] = &[
    "compass",
    "monitor",
    "cpu",
    "terminal",
    "pen-tool",
    "file-code",
    "code",
    "git-branch",
    "network",
    "refresh-cw",
    "container",
    "ship",
    "blocks",
    "plug",
    "shield",
    "layers",
    "database",
    "brain-circuit",
];

/// Default icon per well-known section directory name.
const SECTION_ICONS: &[(&str, &str)] = &[
    ("getting-started", "compass"),
    ("introduction-to-computers", "monitor"),
    ("os-fundamentals", "cpu"),
    ("linux", "terminal"),
    ("text-editing", "pen-tool"),
    ("shell-scripting", "file-code"),
    ("programming", "code"),
    ("version-control", "git-branch"),
    ("networking-fundamentals", "network"),
    ("cicd", "refresh-cw"),
    ("containers", "container"),
    ("container-orchestration", "ship"),
    ("iac", "blocks"),
];

/// Whether `name` is a registered icon.
#[must_use]
pub fn is_known(name: &str) -> bool {
    ICONS.contains(&name)
}

/// Resolve an icon name, falling back to [`DEFAULT_ICON`].
#[must_use]
pub fn icon_or_default(name: Option<&str>) -> &'static str {
    name.and_then(|n| ICONS.iter().copied().find(|icon| *icon == n))
        .unwrap_or(DEFAULT_ICON)
}

/// Built-in icon for a section directory, if it has one.
#[must_use]
pub fn section_icon(section: &str) -> Option<&'static str> {
    SECTION_ICONS
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, icon)| *icon)
}
