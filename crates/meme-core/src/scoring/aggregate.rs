//! Rating aggregation pass: corpus + reaction totals -> snapshot

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::formulas::{kek_index, mean, rating};
use super::snapshot::{
    activity_or_default, rating_or_default, CoefficientDefaults, GroupMap, PlatformMap,
    RatingSnapshot,
};
use crate::entities::{GroupFeedback, Meme};

/// Build a complete snapshot from one consistent read of the corpus and
/// the reaction totals.
///
/// Platform activity is computed with the group maps of this same pass.
pub fn build_snapshot(
    version: u64,
    computed_at: DateTime<Utc>,
    corpus: &[Meme],
    feedback: &[GroupFeedback],
    defaults: &CoefficientDefaults,
) -> RatingSnapshot {
    let mut snapshot = RatingSnapshot::empty(computed_at);
    snapshot.version = version;
    snapshot.group_activity = group_activity(corpus);
    snapshot.group_ratings = group_ratings(feedback);
    snapshot.platform_ratings = platform_ratings(feedback);
    snapshot.platform_activity = platform_activity(&snapshot, corpus, defaults);
    snapshot
}

fn group_activity(corpus: &[Meme]) -> GroupMap {
    let mut samples: BTreeMap<&str, BTreeMap<&str, Vec<f64>>> = BTreeMap::new();
    for meme in corpus {
        samples
            .entry(meme.platform.as_str())
            .or_default()
            .entry(meme.group.as_str())
            .or_default()
            .push(kek_index(meme.engagement()));
    }

    samples
        .into_iter()
        .map(|(platform, groups)| {
            let groups = groups
                .into_iter()
                .filter_map(|(group, values)| mean(&values).map(|m| (group.to_string(), m)))
                .collect();
            (platform.to_string(), groups)
        })
        .collect()
}

fn group_ratings(feedback: &[GroupFeedback]) -> GroupMap {
    let mut tallies: BTreeMap<&str, BTreeMap<&str, (u64, u64)>> = BTreeMap::new();
    for row in feedback {
        let tally = tallies
            .entry(row.platform.as_str())
            .or_default()
            .entry(row.group.as_str())
            .or_default();
        tally.0 += row.likes;
        tally.1 += row.dislikes;
    }

    tallies
        .into_iter()
        .map(|(platform, groups)| {
            let groups = groups
                .into_iter()
                .map(|(group, (likes, dislikes))| (group.to_string(), rating(likes, dislikes)))
                .collect();
            (platform.to_string(), groups)
        })
        .collect()
}

fn platform_ratings(feedback: &[GroupFeedback]) -> PlatformMap {
    let mut tallies: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for row in feedback {
        let tally = tallies.entry(row.platform.as_str()).or_default();
        tally.0 += row.likes;
        tally.1 += row.dislikes;
    }

    tallies
        .into_iter()
        .map(|(platform, (likes, dislikes))| (platform.to_string(), rating(likes, dislikes)))
        .collect()
}

fn platform_activity(
    partial: &RatingSnapshot,
    corpus: &[Meme],
    defaults: &CoefficientDefaults,
) -> PlatformMap {
    let mut samples: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for meme in corpus {
        let activity = activity_or_default(
            partial.group_activity(&meme.platform, &meme.group),
            "group",
            &meme.platform,
            &meme.group,
        );
        let group_rating = rating_or_default(
            partial.group_rating(&meme.platform, &meme.group),
            defaults,
            &meme.platform,
        );
        samples
            .entry(meme.platform.as_str())
            .or_default()
            .push(kek_index(meme.engagement()) / activity * group_rating);
    }

    samples
        .into_iter()
        .filter_map(|(platform, values)| mean(&values).map(|m| (platform.to_string(), m)))
        .collect()
}
