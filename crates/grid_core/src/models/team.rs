use serde::{Deserialize, Serialize};

use super::TeamId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub region: String,
    pub name: String,
    pub abbrev: String,
    /// Disabled (defunct or hidden) teams never become headers.
    #[serde(default)]
    pub disabled: bool,
}

impl Team {
    pub fn new(id: TeamId, region: impl Into<String>, name: impl Into<String>, abbrev: impl Into<String>) -> Self {
        Self { id, region: region.into(), name: name.into(), abbrev: abbrev.into(), disabled: false }
    }

    pub fn display_name(&self) -> String {
        if self.region.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.region, self.name)
        }
    }
}
