//! Core search logic.

pub mod aggregator;
pub mod debounce;
pub mod liked;
pub mod query;
pub mod recommend;
pub mod storage;
