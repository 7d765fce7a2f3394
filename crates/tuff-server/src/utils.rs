//! Utility functions for configuration and environment handling.

use std::env;

/// Error type for environment variable parsing.
pub type EnvError = Box<dyn std::error::Error + Send + Sync>;

/// Read an environment variable as a string, with a default value.
///
/// # Errors
///
/// Returns an error if the value contains invalid Unicode.
pub fn env_string(name: &str, default: &str) -> Result<String, EnvError> {
    match env::var(name) {
        Ok(v) => Ok(v),
        Err(env::VarError::NotPresent) => Ok(default.to_string()),
        Err(e) => Err(format!("{name}: {e}").into()),
    }
}

/// Parse an environment variable as a u32, with a default value.
///
/// # Errors
///
/// Returns an error if the environment variable is set to an invalid value,
/// or if the value contains invalid Unicode.
pub fn env_u32(name: &str, default: u32) -> Result<u32, EnvError> {
    let value = match env::var(name) {
        Ok(v) => v,
        Err(env::VarError::NotPresent) => return Ok(default),
        Err(e) => return Err(format!("{name}: {e}").into()),
    };

    value
        .trim()
        .parse()
        .map_err(|e| format!("{name}: invalid value '{value}' ({e})").into())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    pub(crate) fn with_env_vars<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let originals: Vec<_> = vars
            .iter()
            .map(|(name, _)| (*name, env::var(name).ok()))
            .collect();

        // SAFETY: We hold ENV_MUTEX to ensure single-threaded access to env vars in tests
        unsafe {
            for (name, value) in vars {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }

        let result = f();

        // SAFETY: We hold ENV_MUTEX to ensure single-threaded access to env vars in tests
        unsafe {
            for (name, original) in originals {
                match original {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }

        result
    }

    #[test]
    fn test_env_u32_parses() {
        with_env_vars(&[("TEST_U32", Some("42"))], || {
            assert_eq!(env_u32("TEST_U32", 7).unwrap(), 42);
        });

        with_env_vars(&[("TEST_U32", Some(" 100 "))], || {
            assert_eq!(env_u32("TEST_U32", 7).unwrap(), 100);
        });
    }

    #[test]
    fn test_env_u32_default_when_unset() {
        with_env_vars(&[("TEST_U32_UNSET", None)], || {
            assert_eq!(env_u32("TEST_U32_UNSET", 7).unwrap(), 7);
        });
    }

    #[test]
    fn test_env_u32_invalid_value() {
        with_env_vars(&[("TEST_U32", Some("-1"))], || {
            let err = env_u32("TEST_U32", 7).unwrap_err();
            assert!(err.to_string().contains("TEST_U32"));
            assert!(err.to_string().contains("invalid value '-1'"));
        });

        with_env_vars(&[("TEST_U32", Some("twenty"))], || {
            assert!(env_u32("TEST_U32", 7).is_err());
        });
    }

    #[test]
    fn test_env_string() {
        with_env_vars(&[("TEST_STRING", Some("hello"))], || {
            assert_eq!(env_string("TEST_STRING", "default").unwrap(), "hello");
        });

        with_env_vars(&[("TEST_STRING", None)], || {
            assert_eq!(env_string("TEST_STRING", "default").unwrap(), "default");
        });
    }
}
