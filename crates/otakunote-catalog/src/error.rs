use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog returned errors: {0}")]
    Api(String),
    #[error("unexpected catalog response: {0}")]
    InvalidResponse(String),
}
