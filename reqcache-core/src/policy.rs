//! Fetch policy variants.
//!
//! The fetch policy governs, for a single `request` call, whether the
//! response cache is consulted before hitting the network and whether a
//! successful result is written back. The decision matrix:
//!
//! | Policy          | Reads cache | Fetches                  | Writes back |
//! |-----------------|-------------|--------------------------|-------------|
//! | `NoCache`       | no          | always                   | no          |
//! | `CacheFirst`    | yes         | only on miss             | yes         |
//! | `FetchFirst`    | no          | always                   | yes         |
//! | `CacheOnly`     | yes         | never                    | -           |
//! | `CacheAndFetch` | yes         | always (background on hit) | yes       |

use serde::{Deserialize, Serialize};

/// Cache read/write behavior for a single request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchPolicy {
    /// Bypass the cache entirely: no read, no write-back.
    NoCache,
    /// Serve from cache when possible, fetch and write back on miss.
    CacheFirst,
    /// Always fetch; write the result back for later cache reads.
    #[default]
    FetchFirst,
    /// Serve from cache only; a miss is an error, never a fetch.
    CacheOnly,
    /// Serve from cache immediately when possible while refreshing in the
    /// background; always fetch and write back.
    CacheAndFetch,
}

impl FetchPolicy {
    /// Whether this policy consults the cache before the network path.
    pub fn reads_cache(&self) -> bool {
        matches!(
            self,
            FetchPolicy::CacheFirst | FetchPolicy::CacheOnly | FetchPolicy::CacheAndFetch
        )
    }

    /// Whether a successful network result is written back to the cache.
    pub fn writes_cache(&self) -> bool {
        !matches!(self, FetchPolicy::NoCache)
    }
}
