use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("failed to extract widget config from {path:?} on `{stage}`: {source}"))]
    Extract {
        stage: &'static str,
        path: Option<PathBuf>,
        source: figment::Error,
    },
    #[snafu(display("widget config field `{field}` is invalid on `{stage}`: {details}"))]
    InvalidValue {
        stage: &'static str,
        field: &'static str,
        details: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
