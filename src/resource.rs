use crate::error::{ClientError, Rendering};
use log::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource<T> {
    Loading,
    Success(T),
    Error(String),
}

impl<T> Resource<T> {
    pub fn from_result(
        result: Result<T, ClientError>,
        fallback: &str,
        rendering: Rendering,
    ) -> Resource<T> {
        match result {
            Ok(data) => Resource::Success(data),
            Err(err) => {
                warn!("{}: {}", fallback, err);
                Resource::Error(err.user_message(fallback, rendering))
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Resource::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Resource::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Resource::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Resource::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Resource<U> {
        match self {
            Resource::Loading => Resource::Loading,
            Resource::Success(data) => Resource::Success(f(data)),
            Resource::Error(message) => Resource::Error(message),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            Resource::Success(data) => Ok(data),
            Resource::Error(message) => Err(message),
            Resource::Loading => Err(String::from("Still loading")),
        }
    }
}
