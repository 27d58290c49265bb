mod bookkeeping;
mod challenges;
mod indicators;
mod progression;

pub use bookkeeping::BookkeepingSystem;
pub use challenges::ChallengeSystem;
pub use indicators::IndicatorSystem;
pub use progression::ProgressionSystem;
