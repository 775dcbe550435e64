use crate::identity::command::{CommandSource, IdentitySource, Lookup};
use crate::identity::normalize;

use std::sync::OnceLock;
use tracing::{debug, warn};

/// Taken verbatim, no normalization.
pub const OVERRIDE_USER_VAR: &str = "OVERRIDE_USER";
/// Login name used when the identity command gives nothing usable.
pub const LOGIN_USER_VAR: &str = "USER";

pub const DEFAULT_MAX_LEN: usize = 15;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no operator identity: set OVERRIDE_USER or USER, or configure cloud credentials")]
    NoIdentity,
    #[error("identity command is empty")]
    EmptyCommand,
}

/// Read access to environment variables.
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Program followed by its arguments.
    pub identity_command: Vec<String>,
    pub max_len: usize,
    /// Matched against the simplified identity, case-insensitively.
    pub ci_prefixes: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            identity_command: [
                "aws",
                "sts",
                "get-caller-identity",
                "--output",
                "text",
                "--query",
                "UserId",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            max_len: DEFAULT_MAX_LEN,
            ci_prefixes: vec!["awscodebuild".to_string(), "awscodepipeline".to_string()],
        }
    }
}

/// Computes the operator identifier once and hands back the cached value on
/// every later call.
pub struct UsernameResolver<S = CommandSource, E = ProcessEnv> {
    source: S,
    env: E,
    max_len: usize,
    ci_prefixes: Vec<String>,
    cached: OnceLock<String>,
}

impl UsernameResolver {
    /// Resolver backed by the configured cloud CLI and the process environment.
    pub fn from_config(config: ResolverConfig) -> Result<Self, ResolveError> {
        let source =
            CommandSource::from_argv(&config.identity_command).ok_or(ResolveError::EmptyCommand)?;
        Ok(Self::new(source, ProcessEnv, &config))
    }
}

impl<S: IdentitySource, E: Environment> UsernameResolver<S, E> {
    pub fn new(source: S, env: E, config: &ResolverConfig) -> Self {
        Self {
            source,
            env,
            max_len: config.max_len,
            ci_prefixes: config.ci_prefixes.clone(),
            cached: OnceLock::new(),
        }
    }

    /// Operator identifier for this process.
    ///
    /// Order of sources:
    /// 1) `OVERRIDE_USER`, returned as is
    /// 2) identity command output, unless it names a CI identity
    /// 3) `USER`
    ///
    /// Sources 2 and 3 are normalized and truncated. Errors are not cached, so
    /// a later call may still succeed.
    pub fn resolve(&self) -> Result<&str, ResolveError> {
        if let Some(name) = self.cached.get() {
            return Ok(name.as_str());
        }

        let name = self.compute()?;
        Ok(self.cached.get_or_init(|| name).as_str())
    }

    fn compute(&self) -> Result<String, ResolveError> {
        if let Some(name) = non_empty(self.env.var(OVERRIDE_USER_VAR)) {
            debug!(source = OVERRIDE_USER_VAR, "operator identity from override");
            return Ok(name);
        }

        let raw = match self.identity_from_command() {
            Some(raw) => raw,
            None => {
                debug!(source = LOGIN_USER_VAR, "falling back to login name");
                non_empty(self.env.var(LOGIN_USER_VAR)).ok_or(ResolveError::NoIdentity)?
            }
        };

        let name = normalize::normalize(&raw, self.max_len);
        if name.is_empty() {
            return Err(ResolveError::NoIdentity);
        }
        Ok(name)
    }

    fn identity_from_command(&self) -> Option<String> {
        match self.source.lookup() {
            Lookup::Output(out) if normalize::simplify(&out).is_empty() => None,
            Lookup::Output(out) => {
                if normalize::is_ci_identity(&out, &self.ci_prefixes) {
                    debug!(identity = %out.trim(), "ignoring CI identity");
                    None
                } else {
                    Some(out)
                }
            }
            Lookup::Failed { command, reason } => {
                warn!(%command, error = %reason, "error executing identity command");
                None
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
