//! Ordered path access rules.
//!
//! Patterns are ant-style: `?` matches one character and `*` any run of
//! characters within a single path segment, `**` matches zero or more whole
//! segments. Rules are evaluated in order and the first match wins; a path
//! matched by no rule requires authentication.

use std::fmt;
use std::str::FromStr;

use gatehouse_core::config::{AccessConfig, AuthConfig};
use gatehouse_core::error::AppError;
use gatehouse_core::types::Principal;

/// What a request must present to reach a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone, authenticated or not.
    PermitAll,
    /// Any authenticated principal.
    Authenticated,
    /// An authenticated principal holding the named role.
    Role(String),
}

impl Requirement {
    /// Whether an authenticated `principal` satisfies this requirement.
    pub fn is_satisfied_by(&self, principal: &Principal) -> bool {
        match self {
            Self::PermitAll | Self::Authenticated => true,
            Self::Role(role) => principal.has_role(role),
        }
    }
}

impl FromStr for Requirement {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "permit_all" => Ok(Self::PermitAll),
            "authenticated" => Ok(Self::Authenticated),
            other => match other.strip_prefix("role:") {
                Some(role) if !role.is_empty() => Ok(Self::Role(role.to_string())),
                _ => Err(AppError::configuration(format!(
                    "Unknown access requirement '{s}'"
                ))),
            },
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermitAll => write!(f, "permit_all"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Role(role) => write!(f, "role:{role}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// `**`
    AnyDepth,
    /// A literal segment, possibly with `*` and `?` wildcards.
    Glob(String),
}

/// A compiled ant-style path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compiles `pattern`. It must be absolute.
    pub fn new(pattern: &str) -> Result<Self, AppError> {
        if !pattern.starts_with('/') {
            return Err(AppError::configuration(format!(
                "Path pattern '{pattern}' must start with '/'"
            )));
        }

        let segments = split_path(pattern)
            .map(|segment| match segment {
                "**" => Segment::AnyDepth,
                glob => Segment::Glob(glob.to_string()),
            })
            .collect();

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether `path` (without query string) matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = split_path(path).collect();
        match_segments(&self.segments, &parts)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((Segment::Glob(glob), rest)) => path
            .split_first()
            .is_some_and(|(head, tail)| glob_matches(glob, head) && match_segments(rest, tail)),
    }
}

/// Wildcard match of a single segment.
fn glob_matches(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = star {
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}

/// Ordered `(pattern, requirement)` rules.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    rules: Vec<(PathPattern, Requirement)>,
}

impl AccessPolicy {
    /// Creates a policy from already compiled rules.
    pub fn new(rules: Vec<(PathPattern, Requirement)>) -> Self {
        Self { rules }
    }

    /// Builds the policy from configuration.
    ///
    /// Order: explicit rules, then the login, logout, and access-denied
    /// pages, then the public paths.
    pub fn from_config(access: &AccessConfig, auth: &AuthConfig) -> Result<Self, AppError> {
        let mut rules = Vec::with_capacity(access.rules.len() + access.public_paths.len() + 3);

        for rule in &access.rules {
            rules.push((PathPattern::new(&rule.pattern)?, rule.requirement.parse()?));
        }
        for page in [&auth.login_page, &auth.logout_url, &auth.access_denied_page] {
            rules.push((PathPattern::new(page)?, Requirement::PermitAll));
        }
        for path in &access.public_paths {
            rules.push((PathPattern::new(path)?, Requirement::PermitAll));
        }

        Ok(Self::new(rules))
    }

    /// The requirement of the first rule matching `path`.
    pub fn requirement_for(&self, path: &str) -> &Requirement {
        static DEFAULT: Requirement = Requirement::Authenticated;
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map_or(&DEFAULT, |(_, requirement)| requirement)
    }

    /// The configured rules in evaluation order.
    pub fn rules(&self) -> &[(PathPattern, Requirement)] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::config::AccessRuleConfig;

    fn pattern(p: &str) -> PathPattern {
        PathPattern::new(p).unwrap()
    }

    #[test]
    fn test_double_star_matches_any_depth() {
        let p = pattern("/css/**");
        assert!(p.matches("/css"));
        assert!(p.matches("/css/site.css"));
        assert!(p.matches("/css/vendor/bootstrap/min.css"));
        assert!(!p.matches("/cssx/site.css"));
        assert!(!p.matches("/js/app.js"));
    }

    #[test]
    fn test_exact_and_trailing_slash() {
        let p = pattern("/lang");
        assert!(p.matches("/lang"));
        assert!(p.matches("/lang/"));
        assert!(!p.matches("/lang/en"));
        assert!(!p.matches("/language"));
    }

    #[test]
    fn test_single_segment_wildcards() {
        let p = pattern("/images/*.png");
        assert!(p.matches("/images/logo.png"));
        assert!(!p.matches("/images/logo.svg"));
        assert!(!p.matches("/images/icons/logo.png"));

        let q = pattern("/v?/status");
        assert!(q.matches("/v1/status"));
        assert!(!q.matches("/v10/status"));
    }

    #[test]
    fn test_double_star_in_the_middle() {
        let p = pattern("/api/**/admin");
        assert!(p.matches("/api/admin"));
        assert!(p.matches("/api/v1/tenants/admin"));
        assert!(!p.matches("/api/v1/admin/users"));
    }

    #[test]
    fn test_relative_pattern_is_rejected() {
        assert!(PathPattern::new("css/**").is_err());
    }

    #[test]
    fn test_requirement_parsing() {
        assert_eq!("permit_all".parse::<Requirement>().unwrap(), Requirement::PermitAll);
        assert_eq!(
            "role:ADMIN".parse::<Requirement>().unwrap(),
            Requirement::Role("ADMIN".into())
        );
        assert!("role:".parse::<Requirement>().is_err());
        assert!("everyone".parse::<Requirement>().is_err());
        assert_eq!(Requirement::Role("ADMIN".into()).to_string(), "role:ADMIN");
    }

    #[test]
    fn test_default_policy_from_config() {
        let policy =
            AccessPolicy::from_config(&AccessConfig::default(), &AuthConfig::default()).unwrap();

        assert_eq!(policy.requirement_for("/webjars/jquery.js"), &Requirement::PermitAll);
        assert_eq!(policy.requirement_for("/sbat/index"), &Requirement::PermitAll);
        assert_eq!(policy.requirement_for("/sbat/login"), &Requirement::PermitAll);
        assert_eq!(policy.requirement_for("/403"), &Requirement::PermitAll);
        assert_eq!(policy.requirement_for("/h2-console/login.do"), &Requirement::PermitAll);
        assert_eq!(policy.requirement_for("/sbat/secure"), &Requirement::Authenticated);
        assert_eq!(policy.requirement_for("/"), &Requirement::Authenticated);
    }

    #[test]
    fn test_explicit_rules_win_over_public_paths() {
        let access = AccessConfig {
            rules: vec![AccessRuleConfig {
                pattern: "/sbat/index/admin/**".into(),
                requirement: "role:ADMIN".into(),
            }],
            ..AccessConfig::default()
        };
        let policy = AccessPolicy::from_config(&access, &AuthConfig::default()).unwrap();

        assert_eq!(
            policy.requirement_for("/sbat/index/admin/users"),
            &Requirement::Role("ADMIN".into())
        );
        assert_eq!(policy.requirement_for("/sbat/index/home"), &Requirement::PermitAll);
    }

    #[test]
    fn test_role_requirement_checks_principal() {
        let admin = Principal::new("root", "h", ["ADMIN"]);
        let user = Principal::new("alice", "h", ["USER"]);
        let requirement = Requirement::Role("ADMIN".into());

        assert!(requirement.is_satisfied_by(&admin));
        assert!(!requirement.is_satisfied_by(&user));
        assert!(Requirement::Authenticated.is_satisfied_by(&user));
    }
}
