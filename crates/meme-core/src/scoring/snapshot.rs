//! Rating snapshot and coefficient resolution
//!
//! A [`RatingSnapshot`] is immutable once built. Lookups against it are
//! typed ([`Lookup`]) and every fallback is applied in one place,
//! [`Coefficients::resolve`].

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// platform -> group -> value
pub type GroupMap = BTreeMap<String, BTreeMap<String, f64>>;

/// platform -> value
pub type PlatformMap = BTreeMap<String, f64>;

/// Value used when nothing better is known
pub const FALLBACK_COEFFICIENT: f64 = 1.0;

/// Result of a coefficient lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup {
    Found(f64),
    Missing,
}

impl Lookup {
    fn from_option(value: Option<&f64>) -> Self {
        value.copied().map_or(Self::Missing, Self::Found)
    }
}

/// Names of the four exported maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RatingMap {
    GroupRatings,
    GroupActivity,
    PlatformRatings,
    PlatformActivity,
}

impl RatingMap {
    pub const ALL: [RatingMap; 4] = [
        Self::GroupRatings,
        Self::GroupActivity,
        Self::PlatformRatings,
        Self::PlatformActivity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GroupRatings => "groupRatings",
            Self::GroupActivity => "groupActivity",
            Self::PlatformRatings => "platformRatings",
            Self::PlatformActivity => "platformActivity",
        }
    }
}

impl std::str::FromStr for RatingMap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|map| map.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown rating map '{s}', available: groupRatings, groupActivity, platformRatings, platformActivity"
                )
            })
    }
}

/// One flat row of an exported map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRow {
    pub platform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub value: f64,
}

/// Versioned, immutable set of rating and activity coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSnapshot {
    pub version: u64,
    pub computed_at: DateTime<Utc>,
    pub group_ratings: GroupMap,
    pub group_activity: GroupMap,
    pub platform_ratings: PlatformMap,
    pub platform_activity: PlatformMap,
}

impl RatingSnapshot {
    /// Snapshot with no data, served before the first aggregation pass
    pub fn empty(computed_at: DateTime<Utc>) -> Self {
        Self {
            version: 0,
            computed_at,
            group_ratings: GroupMap::new(),
            group_activity: GroupMap::new(),
            platform_ratings: PlatformMap::new(),
            platform_activity: PlatformMap::new(),
        }
    }

    pub fn group_rating(&self, platform: &str, group: &str) -> Lookup {
        Lookup::from_option(self.group_ratings.get(platform).and_then(|g| g.get(group)))
    }

    pub fn group_activity(&self, platform: &str, group: &str) -> Lookup {
        Lookup::from_option(self.group_activity.get(platform).and_then(|g| g.get(group)))
    }

    pub fn platform_rating(&self, platform: &str) -> Lookup {
        Lookup::from_option(self.platform_ratings.get(platform))
    }

    pub fn platform_activity(&self, platform: &str) -> Lookup {
        Lookup::from_option(self.platform_activity.get(platform))
    }

    /// Flatten one map into rows, ordered by platform then group
    pub fn rows(&self, map: RatingMap) -> Vec<RatingRow> {
        let group_rows = |m: &GroupMap| {
            m.iter()
                .flat_map(|(platform, groups)| {
                    groups.iter().map(move |(group, value)| RatingRow {
                        platform: platform.clone(),
                        group: Some(group.clone()),
                        value: *value,
                    })
                })
                .collect()
        };
        let platform_rows = |m: &PlatformMap| {
            m.iter()
                .map(|(platform, value)| RatingRow {
                    platform: platform.clone(),
                    group: None,
                    value: *value,
                })
                .collect()
        };

        match map {
            RatingMap::GroupRatings => group_rows(&self.group_ratings),
            RatingMap::GroupActivity => group_rows(&self.group_activity),
            RatingMap::PlatformRatings => platform_rows(&self.platform_ratings),
            RatingMap::PlatformActivity => platform_rows(&self.platform_activity),
        }
    }
}

/// Configured per-platform rating defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoefficientDefaults {
    ratings: HashMap<String, f64>,
}

impl CoefficientDefaults {
    pub fn new(ratings: HashMap<String, f64>) -> Self {
        Self { ratings }
    }

    /// Default rating for a platform, `1.0` when none is configured
    pub fn rating(&self, platform: &str) -> f64 {
        self.ratings
            .get(platform)
            .copied()
            .unwrap_or(FALLBACK_COEFFICIENT)
    }
}

/// The four coefficients applied to one meme
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub group_rating: f64,
    pub group_activity: f64,
    pub platform_rating: f64,
    pub platform_activity: f64,
}

impl Coefficients {
    /// Resolve every coefficient for (platform, group).
    ///
    /// Missing ratings fall back to the configured platform default.
    /// Missing, non-positive or non-finite activities fall back to `1.0` so
    /// that dividing by them is always defined.
    pub fn resolve(
        snapshot: &RatingSnapshot,
        defaults: &CoefficientDefaults,
        platform: &str,
        group: &str,
    ) -> Self {
        Self {
            group_rating: rating_or_default(snapshot.group_rating(platform, group), defaults, platform),
            group_activity: activity_or_default(
                snapshot.group_activity(platform, group),
                "group",
                platform,
                group,
            ),
            platform_rating: rating_or_default(snapshot.platform_rating(platform), defaults, platform),
            platform_activity: activity_or_default(
                snapshot.platform_activity(platform),
                "platform",
                platform,
                group,
            ),
        }
    }
}

pub(crate) fn rating_or_default(
    lookup: Lookup,
    defaults: &CoefficientDefaults,
    platform: &str,
) -> f64 {
    match lookup {
        Lookup::Found(value) => value,
        Lookup::Missing => defaults.rating(platform),
    }
}

pub(crate) fn activity_or_default(lookup: Lookup, scope: &str, platform: &str, group: &str) -> f64 {
    match lookup {
        Lookup::Found(value) if value.is_finite() && value > 0.0 => value,
        Lookup::Found(value) => {
            tracing::debug!(scope, platform, group, value, "Unusable activity, using fallback");
            FALLBACK_COEFFICIENT
        }
        Lookup::Missing => {
            tracing::debug!(scope, platform, group, "Activity not found, using fallback");
            FALLBACK_COEFFICIENT
        }
    }
}
