use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Diagnosia";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wall-clock budget for a single knowledge base query. Queries that run
/// past this are reported as unavailable rather than left hanging.
pub const KNOWLEDGE_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME"))
}

/// Get the application data directory
/// ~/Diagnosia/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(APP_NAME)
}

/// Get the directory where generated PDF reports are stored
pub fn reports_dir() -> PathBuf {
    app_data_dir().join("reports")
}

/// Get the path of the diagnosis history database
pub fn database_path() -> PathBuf {
    app_data_dir().join("diagnosis_history.db")
}

/// Get the path of the declarative knowledge base file
pub fn knowledge_base_path() -> PathBuf {
    app_data_dir().join("knowledge_base.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Diagnosia"));
    }

    #[test]
    fn reports_dir_under_app_data() {
        let reports = reports_dir();
        let app = app_data_dir();
        assert!(reports.starts_with(app));
        assert!(reports.ends_with("reports"));
    }

    #[test]
    fn knowledge_base_path_under_app_data() {
        assert!(knowledge_base_path().starts_with(app_data_dir()));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
