use serde::{Deserialize, Serialize};

/// Body of `GET /health`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Health {
    pub status: String,
}

impl Health {
    pub fn ok() -> Self {
        Self { status: "ok".into() }
    }

    pub fn unavailable() -> Self {
        Self { status: "unavailable".into() }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
