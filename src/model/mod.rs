pub mod day_aggregate;
pub mod punch;
pub mod worker;
