pub mod audit;
pub mod membership;
pub mod study;
pub mod user;
