use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::media::handler::upload_file,
        crate::modules::transcode::handler::submit_transcode,
        crate::modules::transcode::handler::get_job,
        crate::modules::transcode::handler::list_jobs,
    ),
    components(
        schemas(
            crate::modules::media::dto::UploadForm,
            crate::modules::media::dto::UploadResponse,
            crate::modules::transcode::dto::TranscodeRequest,
            crate::modules::transcode::dto::TranscodeAccepted,
            crate::modules::transcode::model::TranscodeJob,
            crate::modules::transcode::model::JobState,
            crate::modules::transcode::model::RenditionOutcome,
            crate::modules::transcode::model::RenditionStatus,
            crate::modules::transcode::model::SourceDescriptor,
            crate::modules::transcode::resolution::ResolutionLabel,
        )
    ),
    tags(
        (name = "Upload", description = "Source and banner uploads"),
        (name = "Transcode", description = "Rendition jobs")
    )
)]
pub struct ApiDoc;
