//! Settings read once from the process environment.

use crate::github::Credential;
use std::{
    env,
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
};

/// Variables holding a GitHub token, in order of preference.
pub const TOKEN_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// The GitHub CLI, used for batched queries when installed.
pub const GH_PROGRAM: &str = "gh";

/// How repository status is fetched, chosen once per run.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Strategy {
    /// A single GraphQL query per repository through the GitHub CLI.
    Graphql { program: PathBuf },
    /// Several REST calls per repository.
    Rest,
}

#[derive(Clone, Debug)]
pub struct AppEnv {
    credential: Option<Credential>,
    strategy: Strategy,
    no_color: bool,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var_os(name))
    }

    /// Builds the settings from a variable lookup, `PATH` included.
    pub fn from_lookup(var: impl Fn(&str) -> Option<OsString>) -> Self {
        let credential = TOKEN_VARS
            .into_iter()
            .filter_map(&var)
            .filter_map(|value| value.into_string().ok())
            .find(|value| !value.is_empty())
            .map(Credential::new);

        let strategy = match var("PATH").and_then(|x| find_program(GH_PROGRAM, &x)) {
            Some(program) => Strategy::Graphql { program },
            None => Strategy::Rest,
        };

        let no_color = var("NO_COLOR").map(|x| !x.is_empty()).unwrap_or_default();

        Self { credential, strategy, no_color }
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Colors are used only on a terminal and when neither the flag nor `NO_COLOR` opt out.
    pub fn use_color(&self, no_color_flag: bool, stdout_is_term: bool) -> bool {
        stdout_is_term && !no_color_flag && !self.no_color
    }
}

/// Searches `path` (formatted like `PATH`) for an executable named `name`.
pub fn find_program(name: &str, path: &OsStr) -> Option<PathBuf> {
    let file_name = format!("{name}{}", env::consts::EXE_SUFFIX);
    env::split_paths(path).map(|dir| dir.join(&file_name)).find(|x| is_executable(x))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata().map(|x| x.is_file() && x.permissions().mode() & 0o111 != 0).unwrap_or_default()
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
