use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct TranscodeRequest {
    /// Folder holding the source object; may be empty for the bucket root.
    #[serde(default)]
    pub folder: String,
    pub filename: String,
    /// Labels such as `"480p"`. Defaults to `["720p"]` when omitted or empty.
    #[serde(default)]
    pub resolutions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TranscodeAccepted {
    pub job_id: Uuid,
    pub accepted: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JobStatusQuery {
    /// Long-poll: wait up to this many seconds for the job to finish.
    pub wait_secs: Option<u64>,
}
