#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures talking to an upstream data source.
///
/// These never leave a country fetcher: they are logged and turned into a
/// fallback outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The request could not be completed (connect, timeout, body read).
    Transport(String),
    /// Non-2xx HTTP response.
    HttpStatus(u16),
    /// The body was not the JSON shape we expect (bad JSON, empty arrays,
    /// missing fields).
    MalformedPayload(String),
}

impl FetchError {
    pub fn malformed(message: impl Into<String>) -> Self {
        FetchError::MalformedPayload(message.into())
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "transport error: {msg}"),
            FetchError::HttpStatus(code) => write!(f, "HTTP error: {code}"),
            FetchError::MalformedPayload(msg) => write!(f, "malformed payload: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}
