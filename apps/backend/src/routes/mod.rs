pub mod auth;
pub mod cards;
pub mod rate_limit;
pub mod stats;
pub mod study;
