// src/orchestrator/env.rs

//! Environment handed to the shell.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::EnvironmentSection;

pub const WORKING_DIR_VAR: &str = "PWD";
pub const HOME_VAR: &str = "HOME";
pub const HOST_KEY_CHECKING_VAR: &str = "ANSIBLE_HOST_KEY_CHECKING";
pub const LOG_PATH_VAR: &str = "ANSIBLE_LOG_PATH";

/// The fixed set of variables a session runs under, plus free-form extras.
///
/// Values are opaque strings; nothing here checks that paths exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentSpec {
    pub working_dir: Option<PathBuf>,
    pub home_dir: Option<String>,
    pub host_key_checking: bool,
    pub log_path: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl EnvironmentSpec {
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn home_dir(mut self, dir: impl Into<String>) -> Self {
        self.home_dir = Some(dir.into());
        self
    }

    pub fn host_key_checking(mut self, enabled: bool) -> Self {
        self.host_key_checking = enabled;
        self
    }

    pub fn log_path(mut self, path: impl Into<String>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Flatten into environment variables. Fixed keys win over `extra`.
    pub fn to_env_map(&self) -> BTreeMap<String, String> {
        let mut vars = self.extra.clone();

        if let Some(dir) = &self.working_dir {
            vars.insert(
                WORKING_DIR_VAR.to_string(),
                dir.to_string_lossy().into_owned(),
            );
        }
        if let Some(home) = &self.home_dir {
            vars.insert(HOME_VAR.to_string(), home.clone());
        }
        vars.insert(
            HOST_KEY_CHECKING_VAR.to_string(),
            bool_flag(self.host_key_checking).to_string(),
        );
        if let Some(path) = &self.log_path {
            vars.insert(LOG_PATH_VAR.to_string(), path.clone());
        }

        vars
    }
}

impl From<&EnvironmentSection> for EnvironmentSpec {
    fn from(section: &EnvironmentSection) -> Self {
        Self {
            working_dir: section.working_dir.as_ref().map(PathBuf::from),
            home_dir: section.home_dir.clone(),
            host_key_checking: section.host_key_checking,
            log_path: section.log_path.clone(),
            extra: section.extra.clone(),
        }
    }
}

fn bool_flag(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_keys_are_always_rendered() {
        let vars = EnvironmentSpec::default()
            .working_dir("/srv/app")
            .home_dir("/home/deploy")
            .log_path("/tmp/run.log")
            .to_env_map();

        assert_eq!(vars.get(WORKING_DIR_VAR).map(String::as_str), Some("/srv/app"));
        assert_eq!(vars.get(HOME_VAR).map(String::as_str), Some("/home/deploy"));
        assert_eq!(vars.get(HOST_KEY_CHECKING_VAR).map(String::as_str), Some("False"));
        assert_eq!(vars.get(LOG_PATH_VAR).map(String::as_str), Some("/tmp/run.log"));
    }

    #[test]
    fn unset_paths_are_left_out() {
        let vars = EnvironmentSpec::default().host_key_checking(true).to_env_map();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[HOST_KEY_CHECKING_VAR], "True");
    }

    #[test]
    fn fixed_keys_override_extras() {
        let vars = EnvironmentSpec::default()
            .extra("HOME", "/wrong")
            .extra("FOO", "bar")
            .home_dir("/right")
            .to_env_map();
        assert_eq!(vars["HOME"], "/right");
        assert_eq!(vars["FOO"], "bar");
    }
}
