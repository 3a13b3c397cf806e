//! Attendance engine: turns raw punches into per-day attendance and decides
//! what the next punch for a worker should be. Nothing in here touches I/O.

pub mod clock;
pub mod export;
pub mod filter;
pub mod policy;
pub mod reconstruct;

pub use reconstruct::reconstruct;
