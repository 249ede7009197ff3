//! 维护任务
//!
//! 每个任务都可以单独触发（外部调度器或手动执行），
//! 任务之间互不调用。

mod job_logs;
mod kind;
mod report;
mod resources;
mod runner;
mod search_index;
mod seo;
mod visitor;

pub use kind::JobKind;
pub use report::{
    IndexRebuildReport, JobOutcome, JobReport, ResourceImportReport, SeoFailure, SeoReport,
    UserArea, VisitorSnapshot,
};
pub use runner::{Collaborators, JobRunner, JobSettings};
pub use visitor::UNKNOWN_REGION;
