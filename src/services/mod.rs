pub mod ratings;

pub use ratings::{RateOutcome, RatingService};
