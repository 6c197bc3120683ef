pub mod job_query_service;
pub mod job_service;
pub mod user_service;
