//! Scalar formulas shared by the scorer and the rating aggregator

use chrono::{DateTime, Utc};

use crate::entities::Engagement;

/// Rating of a bucket with no reactions at all
pub const NEUTRAL_RATING: f64 = 0.5;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Engagement quality in `[0, 1]`.
///
/// Zero when nothing was viewed or liked; otherwise the repost share of
/// likes (capped at 1) blended with the like share of views.
pub fn kek_index(engagement: Engagement) -> f64 {
    if engagement.views == 0 || engagement.likes == 0 {
        return 0.0;
    }
    let likes = engagement.likes as f64;
    let views = engagement.views as f64;
    let r = (engagement.reposts as f64 / likes).min(1.0);
    r + (1.0 - r) * likes / views
}

/// Fractional hours elapsed between `created_at` and `now`.
/// Negative for timestamps in the future.
pub fn age_hours(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - created_at).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Exponential recency decay
#[inline]
pub fn time_coeff(age_hours: f64, decay_hours: f64) -> f64 {
    (-age_hours / decay_hours).exp()
}

/// Logistic rating of a like/dislike tally, exactly 0.5 when empty
pub fn rating(likes: u64, dislikes: u64) -> f64 {
    let total = likes + dislikes;
    if total == 0 {
        return NEUTRAL_RATING;
    }
    let balance = (likes as f64 - dislikes as f64) / total as f64;
    1.0 - 1.0 / (balance.exp() + 1.0)
}

/// Arithmetic mean, `None` for an empty input
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
