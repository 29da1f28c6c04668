use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad threshold ordering, etc.).
    ConfigValidation(String),
    /// A required column could not be located by any known synonym.
    SchemaResolution {
        source: String,
        field: String,
        candidates: Vec<String>,
        available: Vec<String>,
    },
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::SchemaResolution {
                source,
                field,
                candidates,
                available,
            } => {
                write!(
                    f,
                    "source '{source}': no column for field '{field}' (accepted: {}; available: {})",
                    candidates.join(", "),
                    available.join(", ")
                )
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
