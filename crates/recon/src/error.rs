use thiserror::Error;

/// Which input list a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Orders,
    Invoices,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Orders => "orders",
            Side::Invoices => "invoices",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ReconError {
    /// The request document itself is not a JSON object.
    #[error("request must be an object, found {found}")]
    Envelope { found: &'static str },
    /// `orders` or `invoices` is not a list of record objects. `line` is
    /// the position inside a nested invoice document.
    #[error("{side}: {}", describe_position(.index, .line, .reason))]
    InputType {
        side: Side,
        index: Option<usize>,
        line: Option<usize>,
        reason: String,
    },
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (zero workers, empty name, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Malformed CSV input.
    #[error("CSV error: {0}")]
    Csv(String),
    /// Malformed JSON input.
    #[error("JSON error: {0}")]
    Json(String),
    /// IO error (file read, etc.).
    #[error("IO error: {0}")]
    Io(String),
}

fn describe_position(index: &Option<usize>, line: &Option<usize>, reason: &str) -> String {
    match (index, line) {
        (Some(i), Some(l)) => format!("element {i}, line {l}: {reason}"),
        (Some(i), None) => format!("element {i}: {reason}"),
        _ => reason.to_string(),
    }
}

impl From<csv::Error> for ReconError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

impl From<serde_json::Error> for ReconError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
