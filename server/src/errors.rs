use common::AppError;
use std::fmt::Display;

#[derive(Debug)]
pub enum ServerError {
    App(AppError),
    VarError(std::env::VarError),
    Io(std::io::Error),
    Generic(anyhow::Error),
}

impl Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerError::App(e) => write!(f, "{}", e),
            ServerError::VarError(e) => write!(f, "environment variable error: {}", e),
            ServerError::Io(e) => write!(f, "i/o error: {}", e),
            ServerError::Generic(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<AppError> for ServerError {
    fn from(value: AppError) -> Self {
        ServerError::App(value)
    }
}

impl From<protocol::errors::CoreError> for ServerError {
    fn from(value: protocol::errors::CoreError) -> Self {
        ServerError::App(AppError::from(value))
    }
}

impl From<std::env::VarError> for ServerError {
    fn from(value: std::env::VarError) -> Self {
        ServerError::VarError(value)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        ServerError::Io(value)
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(value: anyhow::Error) -> Self {
        ServerError::Generic(value)
    }
}
