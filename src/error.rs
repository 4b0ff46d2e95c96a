use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("line {offset} of a transaction block has no `: ` separator: `{line}`")]
    MissingSeparator { offset: usize, line: String },
    #[error("amount `{0}` is not a valid number")]
    InvalidAmount(String),
    #[error("date `{0}` does not match `YYYY-MM-DD HH:MM:SS`")]
    InvalidDate(String),
    #[error("failed to write output: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize CSV: `{0}`")]
    Csv(#[from] csv::Error),
}
