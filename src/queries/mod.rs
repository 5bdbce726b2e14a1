pub mod job_queries;

pub use job_queries::{JobListItem, JobPage, JobQueryService, JobView};
