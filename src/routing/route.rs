//! Path parsing into a typed route.
//!
//! # Responsibilities
//! - Split `<category>/<method...>` into its parts
//! - Resolve the category and method into a closed `Route` enum
//! - Reject unknown categories and unmapped methods before any I/O
//!
//! # Design Decisions
//! - One variant per category; adding a category is a compile-checked change
//! - The method is resolved eagerly so an unmapped method never reaches the
//!   outbound client

use thiserror::Error;

/// Why a path could not be resolved to a route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// First path segment is not a known category.
    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    /// Category is known but the method is not mapped for it.
    #[error("unsupported method '{method}' for category '{category}'")]
    UnsupportedMethod { category: &'static str, method: String },
}

/// Filesystem operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    Readdir,
    Read,
    Write,
}

impl FsOp {
    fn parse(method: &str) -> Option<Self> {
        match method {
            "readdir" => Some(Self::Readdir),
            "read" => Some(Self::Read),
            "write" => Some(Self::Write),
            _ => None,
        }
    }

    /// Outbound endpoint for this operation.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Readdir => "/readdir",
            Self::Read => "/read",
            Self::Write => "/batch",
        }
    }
}

/// AI driver operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiOp {
    Txt2Img,
    Chat,
}

impl AiOp {
    fn parse(method: &str) -> Option<Self> {
        match method {
            "txt2img" => Some(Self::Txt2Img),
            "chat" => Some(Self::Chat),
            _ => None,
        }
    }
}

/// A resolved inbound route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `fs/<op>`: forwarded to a filesystem endpoint with the body untouched.
    Fs(FsOp),
    /// `ai/<op>`: wrapped in a driver call.
    Ai(AiOp),
    /// `kv/<method>`: key-value driver call, method passed through.
    Kv(String),
    /// `chat/...` or `completions/...`: OpenAI-style chat completion.
    Chat,
}

impl Route {
    /// Parse a `category/method` path.
    ///
    /// The first segment is the category; the remaining segments joined by
    /// `/` form the method.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let (category, method) = path.split_once('/').unwrap_or((path, ""));

        match category {
            "fs" => FsOp::parse(method)
                .map(Route::Fs)
                .ok_or_else(|| RouteError::UnsupportedMethod {
                    category: "fs",
                    method: method.to_string(),
                }),
            "ai" => AiOp::parse(method)
                .map(Route::Ai)
                .ok_or_else(|| RouteError::UnsupportedMethod {
                    category: "ai",
                    method: method.to_string(),
                }),
            "kv" => Ok(Route::Kv(method.to_string())),
            "chat" | "completions" => Ok(Route::Chat),
            other => Err(RouteError::UnknownCategory(other.to_string())),
        }
    }

    /// Category label used in logs and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Route::Fs(_) => "fs",
            Route::Ai(_) => "ai",
            Route::Kv(_) => "kv",
            Route::Chat => "chat",
        }
    }
}
