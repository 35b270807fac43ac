use std::env::VarError;

const SECRET_DEMO_LOG_FORMAT: &str = "SECRET_DEMO_LOG_FORMAT";

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, colored when stderr is a terminal.
    #[default]
    Text,
    /// One JSON object per line, for log collectors.
    Json,
}

impl LogFormat {
    /// Returns the format selected by `SECRET_DEMO_LOG_FORMAT`.
    pub fn from_env() -> Self {
        Self::from_var(std::env::var(SECRET_DEMO_LOG_FORMAT))
    }

    fn from_var(value: Result<String, VarError>) -> Self {
        match value.as_deref().map(str::trim) {
            Ok(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            Ok("") | Err(_) => Self::Text,
            Ok(v) if v.eq_ignore_ascii_case("text") => Self::Text,
            Ok(other) => {
                eprintln!("'{other}' is not a valid log format, defaulting to text");
                Self::Text
            }
        }
    }
}
