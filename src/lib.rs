pub mod client;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    job_query_service::JobQueryService, job_service::JobService, user_service::UserService,
};
use crate::store::JobBoardStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobBoardStore>,
    pub session_secret: Arc<str>,
    pub job_query_service: JobQueryService,
    pub job_service: JobService,
    pub user_service: UserService,
}

impl AppState {
    pub fn new(store: Arc<dyn JobBoardStore>, config: &Config) -> Self {
        let job_query_service = JobQueryService::new(store.clone());
        let job_service = JobService::new(store.clone(), config.enforce_job_ownership);
        let user_service = UserService::new(store.clone());

        Self {
            store,
            session_secret: Arc::from(config.session_secret.as_str()),
            job_query_service,
            job_service,
            user_service,
        }
    }
}
