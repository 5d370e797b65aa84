use super::dto::{JobStatusQuery, TranscodeAccepted, TranscodeRequest};
use super::model::TranscodeJob;
use super::resolution::parse_labels;
use crate::common::error::AppResult;
use crate::state::AppState;
use std::time::Duration;
use uuid::Uuid;

const MAX_WAIT_SECS: u64 = 60;

pub struct TranscodeService;

impl TranscodeService {
    pub async fn submit(state: AppState, req: TranscodeRequest) -> AppResult<TranscodeAccepted> {
        // Reject unknown labels before a job exists.
        let requested = parse_labels(&req.resolutions)?;
        let job_id = state
            .orchestrator
            .submit(&req.folder, &req.filename, requested)
            .await?;

        Ok(TranscodeAccepted {
            job_id,
            accepted: true,
        })
    }

    pub async fn status(state: AppState, id: Uuid, query: JobStatusQuery) -> AppResult<TranscodeJob> {
        match query.wait_secs {
            Some(secs) if secs > 0 => {
                let timeout = Duration::from_secs(secs.min(MAX_WAIT_SECS));
                state.orchestrator.wait_for(id, timeout).await
            }
            _ => state.orchestrator.status(id).await,
        }
    }

    pub async fn list(state: AppState) -> Vec<TranscodeJob> {
        state.orchestrator.list().await
    }
}
