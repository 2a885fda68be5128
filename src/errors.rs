use std::fmt;

use teloxide::dispatching::dialogue::InMemStorageError;

/// Centralized error type for the bot
#[derive(Debug)]
pub enum BotError {
    /// ffmpeg re-encode failures
    ConversionError(ConversionError),
    /// Database failures
    DatabaseError(String),
    /// Filesystem failures
    FileSystemError(std::io::Error),
    /// Telegram API failures
    TelegramError(teloxide::RequestError),
    /// Dialogue storage failures
    DialogueError(String),
    /// Data parsing failures
    ParseError(String),
    /// Startup configuration problems
    ConfigError(String),
    /// External command exited with an error
    ExternalCommandError { command: String, stderr: String },
    /// Generic error with a description
    General(String),
}

#[derive(Debug)]
pub enum ConversionError {
    NonUtf8Path,
    IOError(std::io::Error),
    FfmpegFailed(std::process::ExitStatus, String),
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotError::ConversionError(e) => write!(f, "Conversion error: {}", e),
            BotError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            BotError::FileSystemError(e) => write!(f, "Filesystem error: {}", e),
            BotError::TelegramError(e) => write!(f, "Telegram API error: {}", e),
            BotError::DialogueError(msg) => write!(f, "Dialogue error: {}", msg),
            BotError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            BotError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            BotError::ExternalCommandError { command, stderr } => {
                write!(f, "Command {} failed: {}", command, stderr)
            }
            BotError::General(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::NonUtf8Path => write!(f, "Path contains invalid characters"),
            ConversionError::IOError(e) => write!(f, "I/O error: {}", e),
            ConversionError::FfmpegFailed(code, stderr) => {
                write!(f, "ffmpeg exited with {} - stderr: {}", code, stderr)
            }
        }
    }
}

impl std::error::Error for BotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BotError::ConversionError(e) => Some(e),
            BotError::FileSystemError(e) => Some(e),
            BotError::TelegramError(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ConversionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConversionError::IOError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConversionError> for BotError {
    fn from(err: ConversionError) -> Self {
        BotError::ConversionError(err)
    }
}

impl From<std::io::Error> for BotError {
    fn from(err: std::io::Error) -> Self {
        BotError::FileSystemError(err)
    }
}

impl From<teloxide::RequestError> for BotError {
    fn from(err: teloxide::RequestError) -> Self {
        BotError::TelegramError(err)
    }
}

impl From<teloxide::errors::DownloadError> for BotError {
    fn from(err: teloxide::errors::DownloadError) -> Self {
        BotError::TelegramError(err.into())
    }
}

impl From<std::io::Error> for ConversionError {
    fn from(e: std::io::Error) -> Self {
        Self::IOError(e)
    }
}

impl From<sqlx::Error> for BotError {
    fn from(err: sqlx::Error) -> Self {
        BotError::DatabaseError(err.to_string())
    }
}

impl From<InMemStorageError> for BotError {
    fn from(err: InMemStorageError) -> Self {
        BotError::DialogueError(err.to_string())
    }
}

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::ParseError(format!("JSON parsing error: {}", err))
    }
}

impl From<url::ParseError> for BotError {
    fn from(err: url::ParseError) -> Self {
        BotError::ParseError(format!("URL parsing error: {}", err))
    }
}

// Convenience constructors
impl BotError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn external_command_error(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::ExternalCommandError {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::General(msg.into())
    }
}

/// Result of bot operations
pub type BotResult<T> = Result<T, BotError>;

/// Result for handlers
pub type HandlerResult = BotResult<()>;
