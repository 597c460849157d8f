use std::env;
use std::path::PathBuf;

/// Get the path to the Procura directory (~/.procura)
pub fn procura_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".procura")
    } else {
        // Fall back to dirs crate for normal usage
        dirs::home_dir()
            .expect("Unable to get home directory")
            .join(".procura")
    }
}

/// Get the path to the SQLite database file (~/.procura/procura.db)
pub fn database_file() -> PathBuf {
    procura_dir().join("procura.db")
}

/// Get the path to the uploaded-attachments directory (~/.procura/uploads)
pub fn uploads_dir() -> PathBuf {
    procura_dir().join("uploads")
}
