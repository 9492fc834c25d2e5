use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical dashboard pages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PageId {
    #[default]
    Home,
    Navigation,
    Camera,
    Settings,
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PageId::Home => "home",
            PageId::Navigation => "navigation",
            PageId::Camera => "camera",
            PageId::Settings => "settings",
        };
        f.write_str(label)
    }
}
