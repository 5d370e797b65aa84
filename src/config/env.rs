use std::env;
use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;

pub enum EnvKey {
    ServerPort,
    MinioUrl,
    MinioBucket,
    MinioAccessKey,
    MinioSecretKey,
    MinioRegion,
    StorageBackend,
    ResolutionsFolder,
    FfmpegPath,
    FfprobePath,
    TempDir,
    PoolSize,
    JobRetention,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::MinioUrl => "MINIO_ENDPOINT",
            EnvKey::MinioBucket => "MINIO_BUCKET_NAME",
            EnvKey::MinioAccessKey => "MINIO_ACCESS_KEY",
            EnvKey::MinioSecretKey => "MINIO_SECRET_KEY",
            EnvKey::MinioRegion => "MINIO_REGION",
            EnvKey::StorageBackend => "STORAGE_BACKEND",
            EnvKey::ResolutionsFolder => "RESOLUTIONS_FOLDER",
            EnvKey::FfmpegPath => "FFMPEG_PATH",
            EnvKey::FfprobePath => "FFPROBE_PATH",
            EnvKey::TempDir => "TRANSCODE_TEMP_DIR",
            EnvKey::PoolSize => "TRANSCODE_POOL_SIZE",
            EnvKey::JobRetention => "TRANSCODE_JOB_RETENTION",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

/// Parses the variable, falling back to `default` when it is unset or malformed.
pub fn get_parsed<T: FromStr + Display>(key: EnvKey, default: T) -> T {
    let name = key.as_str();
    match get(key) {
        Ok(val) => match val.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(variable = name, value = %val, default = %default, "Ignoring malformed value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test owns its variable; the process environment is shared.
    #[test]
    fn malformed_values_fall_back_to_default() {
        unsafe { env::set_var("TRANSCODE_JOB_RETENTION", "lots") };
        assert_eq!(get_parsed(EnvKey::JobRetention, 7usize), 7);

        unsafe { env::set_var("TRANSCODE_JOB_RETENTION", " 12 ") };
        assert_eq!(get_parsed(EnvKey::JobRetention, 7usize), 12);

        unsafe { env::remove_var("TRANSCODE_JOB_RETENTION") };
        assert_eq!(get_parsed(EnvKey::JobRetention, 7usize), 7);
    }
}
