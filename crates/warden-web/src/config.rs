// Copyright 2024 Warden Project
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Enforcement settings for the request boundary.

use crate::errors::WebError;
use serde::Deserialize;
use std::env;

/// Environment variable toggling the "authorization was performed" check.
pub const VERIFY_AUTHORIZED_ENV_VAR: &str = "WARDEN_VERIFY_AUTHORIZED";
/// Environment variable toggling denial logging at the boundary.
pub const LOG_DENIALS_ENV_VAR: &str = "WARDEN_LOG_DENIALS";

/// How the boundary enforces authorization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnforcementConfig {
    /// Fail requests that neither authorized nor explicitly skipped.
    pub verify_authorized: bool,
    /// Log the method and path of denied requests.
    pub log_denials: bool,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            verify_authorized: true,
            log_denials: true,
        }
    }
}

impl EnforcementConfig {
    /// Loads the configuration from the process environment.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, WebError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, WebError> {
        let mut config = Self::default();
        if let Some(value) = lookup(VERIFY_AUTHORIZED_ENV_VAR) {
            config.verify_authorized = parse_flag(VERIFY_AUTHORIZED_ENV_VAR, &value)?;
        }
        if let Some(value) = lookup(LOG_DENIALS_ENV_VAR) {
            config.log_denials = parse_flag(LOG_DENIALS_ENV_VAR, &value)?;
        }
        Ok(config)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, WebError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(WebError::Config {
            key: key.to_string(),
            message: format!("expected a boolean, got '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = EnforcementConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EnforcementConfig::default());
        assert!(config.verify_authorized);
        assert!(config.log_denials);
    }

    #[test]
    fn test_flags_are_parsed() {
        let config = EnforcementConfig::from_lookup(lookup(&[
            (VERIFY_AUTHORIZED_ENV_VAR, "Off"),
            (LOG_DENIALS_ENV_VAR, " 0 "),
        ]))
        .unwrap();
        assert!(!config.verify_authorized);
        assert!(!config.log_denials);
    }

    #[test]
    fn test_invalid_flag_is_a_config_error() {
        let err = EnforcementConfig::from_lookup(lookup(&[(VERIFY_AUTHORIZED_ENV_VAR, "maybe")]))
            .unwrap_err();
        match err {
            WebError::Config { key, message } => {
                assert_eq!(key, VERIFY_AUTHORIZED_ENV_VAR);
                assert!(message.contains("maybe"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let config: EnforcementConfig = serde_json::from_str(r#"{ "log_denials": false }"#).unwrap();
        assert!(config.verify_authorized);
        assert!(!config.log_denials);
    }
}
