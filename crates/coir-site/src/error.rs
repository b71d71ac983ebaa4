use site_common::error::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Search(#[from] crate::search::SearchError),

    #[error("{0} content unavailable")]
    Unavailable(String),
}
