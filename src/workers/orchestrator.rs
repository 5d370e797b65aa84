//! Job-level coordination of rendition workers.
//!
//! A submitted job moves `Pending -> Running -> Completed | Failed`. Every
//! blocking step draws a permit from one semaphore shared by all jobs: the
//! source download and probe hold a single permit, released before the planned
//! renditions fan out to [`TranscodeWorker`]s that each take their own. Running
//! downloads, probes and transcodes therefore never exceed `pool_size` in total.
//!
//! Job state lives in memory only and is lost on restart. Only the newest
//! `job_retention` terminal jobs are kept; older ones are evicted as new jobs
//! finish. Cancellation is not supported; a job always runs to a terminal state.

use super::TranscodeWorker;
use crate::common::error::{AppError, AppResult};
use crate::config::settings::TranscodeSettings;
use crate::infrastructure::media::{MediaProbe, VideoScaler};
use crate::infrastructure::storage::BlobStore;
use crate::modules::transcode::model::{join_key, JobState, RenditionOutcome, SourceDescriptor, TranscodeJob};
use crate::modules::transcode::planner;
use crate::modules::transcode::resolution::ResolutionLabel;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock, Semaphore};
use tempfile::TempPath;
use time::OffsetDateTime;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct TranscodeOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn BlobStore>,
    probe: Arc<dyn MediaProbe>,
    worker: TranscodeWorker,
    settings: TranscodeSettings,
    pool: Arc<Semaphore>,
    jobs: RwLock<HashMap<Uuid, TranscodeJob>>,
    finished: Notify,
}

/// Why a job stopped before any worker was dispatched.
struct JobAbort(String);

impl TranscodeOrchestrator {
    pub fn new(
        store: Arc<dyn BlobStore>,
        probe: Arc<dyn MediaProbe>,
        scaler: Arc<dyn VideoScaler>,
        settings: TranscodeSettings,
    ) -> Self {
        let pool_size = settings.pool_size.max(1);
        let worker = TranscodeWorker::new(store.clone(), scaler, settings.temp_dir.clone());

        info!(
            pool_size,
            job_retention = settings.job_retention,
            temp_dir = %settings.temp_dir.display(),
            "Transcode orchestrator ready"
        );

        Self {
            inner: Arc::new(Inner {
                store,
                probe,
                worker,
                settings,
                pool: Arc::new(Semaphore::new(pool_size)),
                jobs: RwLock::new(HashMap::new()),
                finished: Notify::new(),
            }),
        }
    }

    /// Registers a job and starts it in the background. Returns as soon as the
    /// job is recorded; progress is observed through [`Self::status`].
    pub async fn submit(
        &self,
        folder: &str,
        filename: &str,
        requested: BTreeSet<ResolutionLabel>,
    ) -> AppResult<Uuid> {
        if filename.trim_matches('/').is_empty() {
            return Err(AppError::Validation("filename is required".to_string()));
        }
        if requested.is_empty() {
            return Err(AppError::Validation("at least one resolution is required".to_string()));
        }

        let job = TranscodeJob::new(folder, filename, requested);
        let job_id = job.job_id;
        info!(
            job_id = %job_id,
            source = %job.source_key(),
            resolutions = ?job.requested_resolutions,
            "Transcode job submitted"
        );
        self.inner.jobs.write().await.insert(job_id, job);

        let this = self.clone();
        tokio::spawn(async move { this.run_job(job_id).await });

        Ok(job_id)
    }

    /// Point-in-time snapshot of a job.
    pub async fn status(&self, job_id: Uuid) -> AppResult<TranscodeJob> {
        self.inner
            .jobs
            .read()
            .await
            .get(&job_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))
    }

    /// All known jobs, newest first.
    pub async fn list(&self) -> Vec<TranscodeJob> {
        let mut jobs: Vec<TranscodeJob> = self.inner.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        jobs
    }

    /// Resolves once the job reaches a terminal state. After `timeout` the
    /// current, possibly non-terminal, snapshot is returned instead.
    pub async fn wait_for(&self, job_id: Uuid, timeout: Duration) -> AppResult<TranscodeJob> {
        let wait = async {
            loop {
                let notified = self.inner.finished.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();

                match self.status(job_id).await {
                    Ok(job) if job.state.is_terminal() => return Ok(job),
                    Ok(_) => notified.await,
                    Err(e) => return Err(e),
                }
            }
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(result) => result,
            Err(_) => self.status(job_id).await,
        }
    }

    async fn update<R>(&self, job_id: Uuid, f: impl FnOnce(&mut TranscodeJob) -> R) -> Option<R> {
        self.inner.jobs.write().await.get_mut(&job_id).map(f)
    }

    async fn finish(&self, job_id: Uuid, state: JobState, reason: Option<String>) {
        {
            let mut jobs = self.inner.jobs.write().await;
            if let Some(job) = jobs.get_mut(&job_id) {
                job.finish(state, reason);
            }
            let evicted = evict_terminal(&mut jobs, self.inner.settings.job_retention.max(1));
            if evicted > 0 {
                debug!(evicted, "Evicted finished transcode jobs");
            }
        }
        self.inner.finished.notify_waiters();
    }

    async fn run_job(self, job_id: Uuid) {
        let Some(job) = self
            .update(job_id, |job| {
                job.state = JobState::Running;
                job.clone()
            })
            .await
        else {
            return;
        };

        let (source, planned, source_file) = match self.prepare(&job).await {
            Ok(prepared) => prepared,
            Err(JobAbort(reason)) => {
                error!(job_id = %job_id, reason = %reason, "Transcode job failed");
                self.finish(job_id, JobState::Failed, Some(reason)).await;
                return;
            }
        };

        info!(
            job_id = %job_id,
            source = %source.dimensions(),
            planned = ?planned,
            "Dispatching rendition workers"
        );

        let dest_prefix = join_key(&[&job.folder, &self.inner.settings.resolutions_folder]);
        let source = Arc::new(source);
        let mut workers = JoinSet::new();

        for resolution in planned.iter().copied() {
            let pool = self.inner.pool.clone();
            let worker = self.inner.worker.clone();
            let source = source.clone();
            let dest_prefix = dest_prefix.clone();

            workers.spawn(async move {
                let Ok(_permit) = pool.acquire_owned().await else {
                    return RenditionOutcome::failure(resolution, "worker pool closed", Duration::ZERO);
                };
                worker.run(job_id, &source, resolution, &dest_prefix).await
            });
        }

        // Single writer: only this task appends to the job's results.
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(outcome) => {
                    self.update(job_id, |job| job.results.push(outcome)).await;
                }
                Err(e) => error!(job_id = %job_id, error = %e, "Rendition worker panicked"),
            }
        }

        if let Err(e) = source_file.close() {
            warn!(job_id = %job_id, error = %e, "Failed to remove source copy");
        }

        // A panicked worker leaves no outcome behind; record it as a failure.
        let succeeded = self
            .update(job_id, |job| {
                for resolution in &planned {
                    if job.outcome_for(*resolution).is_none() {
                        job.results.push(RenditionOutcome::failure(*resolution, "worker aborted", Duration::ZERO));
                    }
                }
                job.results.iter().filter(|o| o.is_success()).count()
            })
            .await
            .unwrap_or(0);
        info!(job_id = %job_id, succeeded, planned = planned.len(), "Transcode job completed");

        self.finish(job_id, JobState::Completed, None).await;
    }

    /// Download, inspect and plan. The returned path owns the local source copy
    /// and removes it when dropped.
    async fn prepare(
        &self,
        job: &TranscodeJob,
    ) -> Result<(SourceDescriptor, BTreeSet<ResolutionLabel>, TempPath), JobAbort> {
        let key = job.source_key();
        let temp_dir = &self.inner.settings.temp_dir;

        tokio::fs::create_dir_all(temp_dir)
            .await
            .map_err(|e| JobAbort(format!("temp dir unavailable: {}", e)))?;

        let local = TempPath::from_path(temp_dir.join(format!("{}_{}", job.job_id, job.filename.replace('/', "_"))));

        // Released before fan-out so the rendition workers can take it.
        let permit = self
            .inner
            .pool
            .acquire()
            .await
            .map_err(|_| JobAbort("worker pool closed".to_string()))?;

        self.inner
            .store
            .get(&key, &local)
            .await
            .map_err(|e| JobAbort(format!("source download failed: {}", e)))?;

        let dims = self
            .inner
            .probe
            .dimensions(&local)
            .await
            .map_err(|e| JobAbort(format!("source inspection failed: {}", e)))?;

        drop(permit);

        let source = SourceDescriptor {
            bucket_path: key,
            local_path: local.to_path_buf(),
            width: dims.width,
            height: dims.height,
        };
        self.update(job.job_id, |j| j.source = Some(source.clone())).await;

        let planned = planner::plan(&job.requested_resolutions, dims.width, dims.height);
        if planned.is_empty() {
            warn!(
                job_id = %job.job_id,
                source = %dims,
                requested = ?job.requested_resolutions,
                "No requested resolution is smaller than the source"
            );
            return Err(JobAbort(AppError::PlanningEmpty.to_string()));
        }

        Ok((source, planned, local))
    }
}

/// Drops the oldest terminal jobs beyond `keep`. Pending and running jobs are
/// never evicted. Returns how many were removed.
fn evict_terminal(jobs: &mut HashMap<Uuid, TranscodeJob>, keep: usize) -> usize {
    let mut terminal: Vec<(OffsetDateTime, Uuid)> = jobs
        .values()
        .filter(|job| job.state.is_terminal())
        .map(|job| (job.completed_at.unwrap_or(job.submitted_at), job.job_id))
        .collect();
    if terminal.len() <= keep {
        return 0;
    }

    terminal.sort();
    let excess = terminal.len() - keep;
    for (_, job_id) in terminal.into_iter().take(excess) {
        jobs.remove(&job_id);
    }
    excess
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration as TimeDelta;

    fn job_in(state: JobState, completed_secs_ago: i64) -> TranscodeJob {
        let mut job = TranscodeJob::new("uploads", "clip.mp4", BTreeSet::from([ResolutionLabel::P720]));
        job.state = state;
        if state.is_terminal() {
            job.completed_at = Some(OffsetDateTime::now_utc() - TimeDelta::seconds(completed_secs_ago));
        }
        job
    }

    #[test]
    fn eviction_keeps_newest_terminal_and_all_active_jobs() {
        let jobs_in = [
            job_in(JobState::Completed, 30),
            job_in(JobState::Failed, 20),
            job_in(JobState::Completed, 10),
            job_in(JobState::Running, 0),
            job_in(JobState::Pending, 0),
        ];
        let ids: Vec<Uuid> = jobs_in.iter().map(|j| j.job_id).collect();
        let mut jobs: HashMap<Uuid, TranscodeJob> = jobs_in.into_iter().map(|j| (j.job_id, j)).collect();

        assert_eq!(evict_terminal(&mut jobs, 2), 1);
        assert!(!jobs.contains_key(&ids[0]));
        for id in &ids[1..] {
            assert!(jobs.contains_key(id));
        }

        assert_eq!(evict_terminal(&mut jobs, 2), 0);
    }
}
