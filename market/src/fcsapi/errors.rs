use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("quote provider rejected the request (code {code}): {msg}")]
    Api { code: i64, msg: String },

    #[error("quote provider base url is empty")]
    MissingBaseUrl,
}
