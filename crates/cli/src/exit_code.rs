//! Exit codes for `gqlc`, so scripts can tell failure modes apart.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    /// The selection does not match the schema
    ValidationError = 1,
    /// Missing or invalid client config
    ConfigError = 2,
    /// The endpoint could not be reached or answered with errors
    RequestError = 3,
}

impl ExitCode {
    pub fn exit(self) -> ! {
        std::process::exit(self.code())
    }

    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::ValidationError => write!(f, "validation error"),
            Self::ConfigError => write!(f, "configuration error"),
            Self::RequestError => write!(f, "request error"),
        }
    }
}
