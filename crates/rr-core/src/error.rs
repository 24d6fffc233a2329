use thiserror::Error;

pub type RrResult<T> = Result<T, RrError>;

#[derive(Error, Debug)]
pub enum RrError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },
}
