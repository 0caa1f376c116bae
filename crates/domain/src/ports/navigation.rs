use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Destination {
    DomainSelection,
    Dashboard,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DomainSelection => "domain-selection",
            Self::Dashboard => "dashboard",
        }
    }
}

/// Fire-and-forget page transition.
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: Destination);
}
