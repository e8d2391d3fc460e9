use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::MediaKind;

/// Streaming services with a browse shelf and a dedicated listing page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StreamingService {
    Netflix,
    Prime,
    Apple,
    Disney,
    Hbo,
    Peacock,
}

impl StreamingService {
    pub const ALL: [StreamingService; 6] = [
        StreamingService::Netflix,
        StreamingService::Prime,
        StreamingService::Apple,
        StreamingService::Disney,
        StreamingService::Hbo,
        StreamingService::Peacock,
    ];

    /// URL slug (`/service/netflix/movies`)
    pub fn slug(&self) -> &'static str {
        match self {
            StreamingService::Netflix => "netflix",
            StreamingService::Prime => "prime",
            StreamingService::Apple => "apple",
            StreamingService::Disney => "disney",
            StreamingService::Hbo => "hbo",
            StreamingService::Peacock => "peacock",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StreamingService::Netflix => "Netflix",
            StreamingService::Prime => "Prime Video",
            StreamingService::Apple => "Apple TV+",
            StreamingService::Disney => "Disney+",
            StreamingService::Hbo => "HBO Max",
            StreamingService::Peacock => "Peacock",
        }
    }

    /// TMDb watch-provider id used to discover movies
    pub fn movie_provider_id(&self) -> u32 {
        match self {
            StreamingService::Netflix => 8,
            StreamingService::Prime => 9,
            StreamingService::Apple => 350,
            StreamingService::Disney => 337,
            StreamingService::Hbo => 384,
            StreamingService::Peacock => 386,
        }
    }

    /// TMDb network id used to discover series
    pub fn tv_network_id(&self) -> u32 {
        match self {
            StreamingService::Netflix => 213,
            StreamingService::Prime => 1024,
            StreamingService::Apple => 2552,
            StreamingService::Disney => 2739,
            StreamingService::Hbo => 3186,
            StreamingService::Peacock => 3353,
        }
    }

    /// Listing page path for this service and kind
    pub fn href(&self, kind: MediaKind) -> String {
        format!("/service/{}/{}", self.slug(), kind.plural())
    }
}

impl FromStr for StreamingService {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|service| service.slug() == s)
            .ok_or_else(|| format!("unknown streaming service '{}'", s))
    }
}
