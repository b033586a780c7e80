//! The reward allocation engine: tier resolution, bonus-group assignment
//! enumeration, single-card reward computation, and the two-card
//! allocation search, fronted by `RewardEngine`.

pub mod allocator;
pub mod calculator;
pub mod engine;
pub mod rules;
pub mod tier;
