pub mod job;
pub mod principal;
pub mod user;
