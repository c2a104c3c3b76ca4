// src/types.rs

use std::fmt;

use serde::Deserialize;

/// Logical asset class; one route per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Markup,
    Images,
    Styles,
    Scripts,
}

impl AssetClass {
    pub const ALL: [AssetClass; 4] = [
        AssetClass::Markup,
        AssetClass::Images,
        AssetClass::Styles,
        AssetClass::Scripts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Markup => "markup",
            AssetClass::Images => "images",
            AssetClass::Styles => "styles",
            AssetClass::Scripts => "scripts",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a route does when one of its transform stages fails.
///
/// - `Fail`: the leaf fails once every in-flight file has finished.
/// - `Warn`: the failure is logged, that file's output is not written, and
///   the leaf still succeeds (degraded output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    Fail,
    Warn,
}

impl Default for OnError {
    fn default() -> Self {
        OnError::Fail
    }
}
