//! Composite score and top-1 selection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::formulas::{age_hours, kek_index, time_coeff};
use super::snapshot::{CoefficientDefaults, Coefficients, RatingSnapshot};
use crate::entities::Meme;
use crate::value_objects::MemeId;

/// Default decay constant of the recency coefficient, in hours
pub const DEFAULT_DECAY_HOURS: f64 = 24.0;

/// Every factor that went into one score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub meme_id: MemeId,
    pub kek_index: f64,
    pub age_hours: f64,
    pub time_coeff: f64,
    pub group_rating: f64,
    pub group_activity: f64,
    pub platform_rating: f64,
    pub platform_activity: f64,
    pub score: f64,
}

/// Scores memes against a rating snapshot
#[derive(Debug, Clone)]
pub struct Scorer {
    decay_hours: f64,
    defaults: CoefficientDefaults,
}

impl Scorer {
    pub fn new(decay_hours: f64, defaults: CoefficientDefaults) -> Self {
        Self {
            decay_hours,
            defaults,
        }
    }

    pub fn defaults(&self) -> &CoefficientDefaults {
        &self.defaults
    }

    #[inline]
    pub fn decay_hours(&self) -> f64 {
        self.decay_hours
    }

    /// Score one meme at `now`
    pub fn score(&self, meme: &Meme, snapshot: &RatingSnapshot, now: DateTime<Utc>) -> ScoreBreakdown {
        let kek = kek_index(meme.engagement());
        let age = age_hours(meme.created_at, now);
        let decay = time_coeff(age, self.decay_hours);
        let coeffs = Coefficients::resolve(snapshot, &self.defaults, &meme.platform, &meme.group);

        let score = if meme.views == 0 {
            0.0
        } else {
            kek * decay / coeffs.group_activity * coeffs.group_rating / coeffs.platform_activity
                * coeffs.platform_rating
        };

        ScoreBreakdown {
            meme_id: meme.id,
            kek_index: kek,
            age_hours: age,
            time_coeff: decay,
            group_rating: coeffs.group_rating,
            group_activity: coeffs.group_activity,
            platform_rating: coeffs.platform_rating,
            platform_activity: coeffs.platform_activity,
            score,
        }
    }

    /// Highest scoring meme. Ties keep the earliest one in input order.
    pub fn top<'a>(
        &self,
        memes: &'a [Meme],
        snapshot: &RatingSnapshot,
        now: DateTime<Utc>,
    ) -> Option<(&'a Meme, ScoreBreakdown)> {
        let mut best: Option<(&Meme, ScoreBreakdown)> = None;
        for meme in memes {
            let breakdown = self.score(meme, snapshot, now);
            match &best {
                Some((_, current)) if breakdown.score <= current.score => {}
                _ => best = Some((meme, breakdown)),
            }
        }
        best
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(DEFAULT_DECAY_HOURS, CoefficientDefaults::default())
    }
}
