//! Scoring engine - engagement formulas, rating snapshots and selection

mod aggregate;
mod formulas;
mod scorer;
mod snapshot;

pub use aggregate::build_snapshot;
pub use formulas::{age_hours, kek_index, rating, time_coeff, NEUTRAL_RATING};
pub use scorer::{ScoreBreakdown, Scorer, DEFAULT_DECAY_HOURS};
pub use snapshot::{
    CoefficientDefaults, Coefficients, GroupMap, Lookup, PlatformMap, RatingMap, RatingRow,
    RatingSnapshot, FALLBACK_COEFFICIENT,
};
