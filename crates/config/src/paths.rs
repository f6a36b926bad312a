//! Path helpers for the presage data directory

use std::path::PathBuf;

/// Base data directory (~/.presage)
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .expect("failed to locate home directory")
        .join(".presage")
}

/// Configuration file location
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Cache directory for memoized lookups (product lists etc.)
pub fn cache_dir() -> PathBuf {
    data_dir().join("cache")
}

/// Downloaded source documents
pub fn documents_dir() -> PathBuf {
    data_dir().join("documents")
}

/// Vector index collections
pub fn index_dir() -> PathBuf {
    data_dir().join("index")
}

/// Conversation session logs
pub fn sessions_dir() -> PathBuf {
    data_dir().join("sessions")
}

/// Persisted knowledge-portal session (access token)
pub fn portal_session_path() -> PathBuf {
    data_dir().join("portal_session.json")
}

/// Ensure directory exists
pub async fn ensure_dir(path: &PathBuf) -> std::io::Result<()> {
    tokio::fs::create_dir_all(path).await
}

/// Sanitize a name for use as a file name
pub fn safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect()
}
