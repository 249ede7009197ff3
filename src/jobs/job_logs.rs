use super::{JobOutcome, JobRunner};
use crate::errors::Result;

impl JobRunner {
    /// 按保留策略清理任务日志
    pub async fn clear_job_logs(&self) -> Result<JobOutcome> {
        let deleted = self.collaborators.job_logs.clean_job_logs().await?;
        Ok(JobOutcome::JobLogsCleared { deleted })
    }
}
