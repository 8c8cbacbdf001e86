//! Secret references in `config.toml`.
//!
//! `client_id` and `client_secret` may name a secret instead of holding it:
//!
//! - `pass::path/in/store` reads the first line of `pass show path/in/store`
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - anything else is used as written

use std::process::Command;

use crate::error::{ClientError, ClientResult};

/// Expands a `pass::` or `env::` reference, or returns `value` unchanged.
pub fn resolve(value: &str) -> ClientResult<String> {
    if let Some(path) = value.strip_prefix("pass::") {
        resolve_pass(path)
    } else if let Some(var) = value.strip_prefix("env::") {
        resolve_env(var)
    } else {
        Ok(value.to_string())
    }
}

fn resolve_pass(path: &str) -> ClientResult<String> {
    let output = Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| ClientError::Config(format!("failed to run `pass show {path}`: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ClientError::Config(format!(
            "`pass show {path}` failed ({}): {}",
            output.status,
            stderr.trim()
        )));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ClientError::Config(format!("`pass show {path}` printed nothing")))
}

fn resolve_env(var: &str) -> ClientResult<String> {
    std::env::var(var)
        .map_err(|_| ClientError::Config(format!("environment variable `{var}` is not set")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_pass_through() {
        assert_eq!(resolve("secret").unwrap(), "secret");
        assert_eq!(
            resolve("123.apps.googleusercontent.com").unwrap(),
            "123.apps.googleusercontent.com"
        );
    }

    #[test]
    fn env_reference() {
        unsafe {
            std::env::set_var("_FOUNDEROS_TEST_SECRET", "from-env");
        }
        assert_eq!(resolve("env::_FOUNDEROS_TEST_SECRET").unwrap(), "from-env");
        unsafe {
            std::env::remove_var("_FOUNDEROS_TEST_SECRET");
        }
    }

    #[test]
    fn missing_env_var_is_a_config_error() {
        let err = resolve("env::_FOUNDEROS_UNSET_VAR_91733").unwrap_err();
        assert!(matches!(err, ClientError::Config(ref m) if m.contains("not set")));
    }

    #[test]
    fn unknown_pass_entry_fails() {
        assert!(resolve("pass::founderos/does/not/exist/91733").is_err());
    }
}
