//! Identifiers for simulation entities

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an asset class (e.g. `stocks`, `bonds`, `gold`, `cash`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    pub const CASH: &'static str = "cash";

    pub fn new(id: impl Into<String>) -> Self {
        AssetId(id.into())
    }

    #[must_use]
    pub fn cash() -> Self {
        AssetId(Self::CASH.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_cash(&self) -> bool {
        self.0 == Self::CASH
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        AssetId(id.to_string())
    }
}

impl From<String> for AssetId {
    fn from(id: String) -> Self {
        AssetId(id)
    }
}
