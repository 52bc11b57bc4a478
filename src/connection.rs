//! Connection descriptor parsing and validation.
//!
//! Descriptors arrive as `key=value;key=value` text. The only key the adapter
//! interprets is `DriverPath`; everything else is passed through to the
//! driver untouched. The driver path must be relative: only jar files under
//! the adapter's own install directory are trusted, so an absolute path is
//! rejected before any connection attempt.

use std::path::{Path, PathBuf};

use crate::error::DataError;

const DRIVER_PATH_KEY: &str = "driverpath";

/// Parsed and validated form of the host's connection string.
#[derive(Clone, Debug)]
pub struct ConnectionDescriptor {
    /// Absolute path of the driver jar, resolved under the install directory.
    pub driver_path: PathBuf,
    /// Remaining driver-specific properties, in input order.
    pub properties: Vec<(String, String)>,
}

impl ConnectionDescriptor {
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// Validates a raw connection string against `install_dir` and returns the
/// descriptor with the driver reference replaced by its resolved absolute
/// path. No side effects beyond the file existence check.
pub fn validate_connection_string(
    raw: &str,
    install_dir: &Path,
) -> Result<ConnectionDescriptor, DataError> {
    if raw.trim().is_empty() {
        return Err(DataError::configuration(
            "Connection string can not be null or empty.",
        ));
    }

    let mut driver_path: Option<String> = None;
    let mut properties = Vec::new();

    for segment in raw.split(';') {
        if segment.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = segment.split_once('=') else {
            return Err(DataError::configuration(format!(
                "Invalid connection string segment <{segment}>: expected key=value."
            )));
        };
        let key = key.trim();
        if key.eq_ignore_ascii_case(DRIVER_PATH_KEY) {
            driver_path = Some(value.trim().to_string());
        } else {
            properties.push((key.to_string(), value.to_string()));
        }
    }

    let relative = match driver_path {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => {
            return Err(DataError::configuration(
                "Driver path can not be null or empty.",
            ));
        }
    };

    if relative.is_absolute() {
        return Err(DataError::configuration(
            "Driver path must be a local relative path for security reasons.",
        ));
    }

    let resolved = install_dir.join(&relative);
    if !resolved.is_file() {
        return Err(DataError::configuration(format!(
            "JDBC driver file not found at relative path <{}>.",
            relative.display()
        )));
    }

    tracing::debug!(driver = %resolved.display(), "resolved driver path");

    Ok(ConnectionDescriptor { driver_path: resolved, properties })
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn install_dir_with_driver(relative: &str) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let jar = dir.path().join(relative);
        fs::create_dir_all(jar.parent().unwrap()).unwrap();
        fs::write(&jar, b"jar").unwrap();
        dir
    }

    #[test]
    fn resolves_relative_driver_path_and_keeps_properties() {
        let dir = install_dir_with_driver("drivers/h2.jar");

        let descriptor = validate_connection_string(
            "DriverPath=drivers/h2.jar;JdbcUrl=jdbc:h2:mem:test;User=sa",
            dir.path(),
        )
        .unwrap();

        assert_eq!(descriptor.driver_path, dir.path().join("drivers/h2.jar"));
        assert!(descriptor.driver_path.is_absolute());
        assert_eq!(descriptor.property("jdbcurl"), Some("jdbc:h2:mem:test"));
        assert_eq!(descriptor.property("User"), Some("sa"));
    }

    #[test]
    fn empty_connection_string_is_rejected() {
        let dir = tempdir().unwrap();
        let err = validate_connection_string("  ", dir.path()).unwrap_err();
        assert!(err.to_string().contains("Connection string can not be null or empty"));
    }

    #[test]
    fn missing_driver_path_is_rejected() {
        let dir = tempdir().unwrap();
        for raw in ["JdbcUrl=jdbc:h2:mem:test", "DriverPath=;JdbcUrl=x"] {
            let err = validate_connection_string(raw, dir.path()).unwrap_err();
            assert!(
                err.to_string().contains("Driver path can not be null or empty"),
                "for `{raw}`: {err}"
            );
        }
    }

    #[test]
    fn absolute_driver_path_is_rejected_even_if_the_file_exists() {
        let dir = install_dir_with_driver("h2.jar");
        let absolute = dir.path().join("h2.jar");

        let err = validate_connection_string(
            &format!("DriverPath={}", absolute.display()),
            dir.path(),
        )
        .unwrap_err();

        assert!(err.to_string().contains("must be a local relative path"));
    }

    #[test]
    fn unresolved_driver_file_is_rejected() {
        let dir = tempdir().unwrap();
        let err =
            validate_connection_string("DriverPath=drivers/missing.jar", dir.path()).unwrap_err();
        assert!(err.to_string().contains("drivers/missing.jar"));
    }

    #[test]
    fn malformed_segment_is_rejected() {
        let dir = install_dir_with_driver("h2.jar");
        let err =
            validate_connection_string("DriverPath=h2.jar;garbage", dir.path()).unwrap_err();
        assert!(err.to_string().contains("expected key=value"));
    }
}
