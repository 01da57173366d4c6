// Region selection and endpoint resolution
//
// The vendor runs region-specific API hosts. A `Region` picks the base
// URL and the locale advertised in request headers; `resolve` maps a
// logical endpoint path onto that base, passing absolute URLs through
// untouched.

use serde::{Deserialize, Serialize};

/// Which regional PetKit cloud to talk to.
///
/// Each region runs a distinct host; accounts are region-bound, so a
/// login against the wrong region fails.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// Mainland China (`api.petkit.cn`) -- the vendor default.
    #[default]
    China,
    /// United States (`api.petkit.com`).
    UnitedStates,
    /// Asia-Pacific outside China (`api.petktasia.com`).
    Asia,
}

impl Region {
    /// The API base URL for this region, with a trailing slash.
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::China => "https://api.petkit.cn/6/",
            Self::UnitedStates => "https://api.petkit.com/6/",
            Self::Asia => "https://api.petktasia.com/latest/",
        }
    }

    /// The locale advertised in the `X-Locale` header.
    pub fn locale(&self) -> &'static str {
        match self {
            Self::China => "zh_CN",
            Self::UnitedStates | Self::Asia => "en_US",
        }
    }
}

/// Resolve a logical endpoint path against a base URL.
///
/// Already-absolute URLs are returned unchanged; everything else is
/// joined onto the base with exactly one separating slash.
pub fn resolve(base: &str, endpoint: &str) -> String {
    if endpoint.starts_with("https:") || endpoint.starts_with("http:") {
        return endpoint.to_owned();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}
