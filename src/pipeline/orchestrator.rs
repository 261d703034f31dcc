// 全ジョブ実行

use rayon::prelude::*;

use crate::error::PdfVisError;
use crate::pipeline::job_runner::{JobConfig, JobResult, run_job};

/// Run multiple jobs, collecting results in input order.
/// One job failure does NOT prevent other jobs from running.
///
/// Jobs share no state, so they run on a rayon pool with `workers` threads
/// (0 = rayon default).
pub fn run_all_jobs(
    jobs: &[JobConfig],
    workers: usize,
) -> crate::error::Result<Vec<crate::error::Result<JobResult>>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| PdfVisError::config(format!("Failed to build worker pool: {e}")))?;

    Ok(pool.install(|| jobs.par_iter().map(run_job).collect()))
}
