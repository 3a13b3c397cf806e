pub mod last_punch_cache;
pub mod query_utils;
