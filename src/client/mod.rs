//! Client-side composition state for a job board front end.

pub mod api;
pub mod draft;
pub mod state;

pub use api::{HttpJobsApi, JobsApi};
pub use draft::{EmploymentTypeSelection, JobDraft};
pub use state::{GlobalState, JobsState, Notice, NoticeKind};
