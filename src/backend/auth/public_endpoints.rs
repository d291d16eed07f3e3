/**
 * Public Endpoint Rules
 *
 * Classifies a request target as public or protected. The authentication
 * pipeline uses the classification only to choose how loudly a credential
 * failure is logged; it never decides access.
 *
 * Patterns are either exact paths or prefixes ending in a `/` followed by
 * `**`. A prefix matches its base path and anything below it on a segment
 * boundary, so the `/api/gems` prefix matches `/api/gems` and
 * `/api/gems/123` but not `/api/gemstones`.
 */

use axum::http::Method;
use serde::Deserialize;

use crate::backend::server::config::ConfigError;

/// Whether a request targets a public endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathPattern {
    Exact(String),
    Prefix(String),
}

impl PathPattern {
    fn parse(pattern: &str) -> Result<Self, ConfigError> {
        if !pattern.starts_with('/') {
            return Err(ConfigError::InvalidEndpoint(format!(
                "pattern must start with '/': {pattern}"
            )));
        }
        match pattern.strip_suffix("/**") {
            Some(base) if base.contains('*') => Err(ConfigError::InvalidEndpoint(format!(
                "wildcards are only supported as a trailing '/**': {pattern}"
            ))),
            Some(base) => Ok(Self::Prefix(base.to_string())),
            None if pattern.contains('*') => Err(ConfigError::InvalidEndpoint(format!(
                "wildcards are only supported as a trailing '/**': {pattern}"
            ))),
            None => Ok(Self::Exact(pattern.to_string())),
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(exact) => path == exact,
            Self::Prefix(base) => match path.strip_prefix(base.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }
}

/// One public endpoint rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRule {
    /// Restricting method; `None` matches every method
    method: Option<Method>,
    pattern: PathPattern,
}

impl EndpointRule {
    /// Rule matching a pattern for every method
    pub fn any(pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            method: None,
            pattern: PathPattern::parse(pattern)?,
        })
    }

    /// Rule matching a pattern for one method
    pub fn method(method: Method, pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            method: Some(method),
            pattern: PathPattern::parse(pattern)?,
        })
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().map_or(true, |m| m == method) && self.pattern.matches(path)
    }
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    endpoint: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    method: Option<String>,
    pattern: String,
}

/// The static set of public endpoint rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicEndpoints {
    rules: Vec<EndpointRule>,
}

impl PublicEndpoints {
    pub fn new(rules: Vec<EndpointRule>) -> Self {
        Self { rules }
    }

    /// Parse rules from TOML
    ///
    /// ```toml
    /// [[endpoint]]
    /// pattern = "/api/auth/**"
    ///
    /// [[endpoint]]
    /// method = "GET"
    /// pattern = "/api/gems/**"
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: RuleFile = toml::from_str(source)?;
        let rules = file
            .endpoint
            .into_iter()
            .map(|raw| match raw.method {
                None => EndpointRule::any(&raw.pattern),
                Some(method) => {
                    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                        .map_err(|_| ConfigError::InvalidEndpoint(format!("invalid method: {method}")))?;
                    EndpointRule::method(method, &raw.pattern)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    pub fn classify(&self, method: &Method, path: &str) -> Visibility {
        if self.rules.iter().any(|rule| rule.matches(method, path)) {
            Visibility::Public
        } else {
            Visibility::Protected
        }
    }

    pub fn is_public(&self, method: &Method, path: &str) -> bool {
        self.classify(method, path) == Visibility::Public
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for PublicEndpoints {
    fn default() -> Self {
        Self::new(vec![
            EndpointRule {
                method: None,
                pattern: PathPattern::Prefix("/api/auth".to_string()),
            },
            EndpointRule {
                method: Some(Method::GET),
                pattern: PathPattern::Prefix("/api/gems".to_string()),
            },
            EndpointRule {
                method: None,
                pattern: PathPattern::Prefix("/api/landing".to_string()),
            },
            EndpointRule {
                method: None,
                pattern: PathPattern::Exact("/actuator/health".to_string()),
            },
        ])
    }
}
