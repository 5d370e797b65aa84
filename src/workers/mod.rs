pub mod orchestrator;
pub mod transcoder;

pub use orchestrator::TranscodeOrchestrator;
pub use transcoder::TranscodeWorker;
