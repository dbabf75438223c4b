//! PEP 440 versions
//!
//! Components are stripped from the input in a fixed order because their
//! delimiters overlap:
//! 1. epoch (`1!`)
//! 2. local segment (`+ubuntu.1`)
//! 3. dev release (`.dev0`, `dev0`)
//! 4. post release (`.post1`, `post1`, `-1`)
//! 5. pre-release (`a1`, `beta2`, `rc3`, `c3`, ...)
//! 6. release numbers (`1.2.3`, `1_2_3`)

use crate::error::VersionError;
use std::cmp::Ordering;
use std::fmt;

const SYSTEM: &str = "PyPI";

/// Pre-release phase, ordered `a < b < rc`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Alpha,
    Beta,
    ReleaseCandidate,
}

impl Phase {
    /// Canonical spelling of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Alpha => "a",
            Phase::Beta => "b",
            Phase::ReleaseCandidate => "rc",
        }
    }

    fn from_token(token: &str) -> Self {
        match token {
            "alpha" | "a" => Phase::Alpha,
            "beta" | "b" => Phase::Beta,
            _ => Phase::ReleaseCandidate,
        }
    }
}

// Search order matters when two tokens start at the same index
// ("beta" must win over "b", "rc" over "c").
const PHASE_TOKENS: [&str; 6] = ["rc", "c", "beta", "b", "alpha", "a"];

/// A parsed PEP 440 version
#[derive(Debug, Clone)]
pub struct PyPIVersion {
    original: String,
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(Phase, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<String>,
}

impl PyPIVersion {
    /// Parse a PEP 440 version string
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        if version.is_empty() {
            return Err(VersionError::parse(SYSTEM, version, "empty version string"));
        }

        let lowered = version.trim().to_lowercase();

        let (epoch, rest) = strip_epoch(&lowered, version)?;
        let (local, rest) = strip_local(rest);
        let (dev, rest) = strip_dev(rest, version)?;
        let (post, rest) = strip_post(rest, version)?;
        let (pre, rest) = strip_pre(rest, version)?;
        let release = parse_release(rest, version)?;

        Ok(Self {
            original: version.to_string(),
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn release(&self) -> &[u64] {
        &self.release
    }

    pub fn pre(&self) -> Option<(Phase, u64)> {
        self.pre
    }

    pub fn post(&self) -> Option<u64> {
        self.post
    }

    pub fn dev(&self) -> Option<u64> {
        self.dev
    }

    pub fn local(&self) -> Option<&str> {
        self.local.as_deref()
    }

    /// The input exactly as given to `parse`
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Canonical rendering: `[epoch!]release[phaseN][.postN][.devN][+local]`
    pub fn canon(&self, include_epoch: bool) -> String {
        let mut out = String::new();

        if include_epoch && self.epoch > 0 {
            out.push_str(&self.epoch.to_string());
            out.push('!');
        }

        let release: Vec<String> = self.release.iter().map(u64::to_string).collect();
        out.push_str(&release.join("."));

        if let Some((phase, number)) = self.pre {
            out.push_str(phase.as_str());
            out.push_str(&number.to_string());
        }
        if let Some(post) = self.post {
            out.push_str(".post");
            out.push_str(&post.to_string());
        }
        if let Some(dev) = self.dev {
            out.push_str(".dev");
            out.push_str(&dev.to_string());
        }
        if let Some(ref local) = self.local {
            out.push('+');
            out.push_str(local);
        }

        out
    }
}

/// `Some` beats `None` for post releases, but loses to it for pre and dev
/// releases: `1.0a1 < 1.0 < 1.0.post1` and `1.0.dev0 < 1.0`.
fn cmp_absent_greater<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(b),
    }
}

impl Ord for PyPIVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.release.cmp(&other.release))
            .then_with(|| cmp_absent_greater(&self.pre, &other.pre))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| cmp_absent_greater(&self.dev, &other.dev))
    }
}

impl PartialOrd for PyPIVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// The local segment never takes part in ordering, so it is ignored here too.
impl PartialEq for PyPIVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PyPIVersion {}

impl fmt::Display for PyPIVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

fn strip_epoch<'a>(s: &'a str, version: &str) -> Result<(u64, &'a str), VersionError> {
    match s.find('!') {
        Some(idx) if idx > 0 => {
            let digits = &s[..idx];
            let epoch = digits.parse::<u64>().map_err(|_| {
                VersionError::parse(SYSTEM, version, format!("invalid epoch: {}", digits))
            })?;
            Ok((epoch, &s[idx + 1..]))
        }
        _ => Ok((0, s)),
    }
}

fn strip_local(s: &str) -> (Option<String>, &str) {
    match s.split_once('+') {
        Some((head, local)) => (Some(local.to_string()).filter(|l| !l.is_empty()), head),
        None => (None, s),
    }
}

fn strip_dev<'a>(s: &'a str, version: &str) -> Result<(Option<u64>, &'a str), VersionError> {
    for marker in [".dev", "dev"] {
        if let Some(idx) = s.find(marker) {
            let number = parse_optional_number(&s[idx + marker.len()..], version, "dev")?;
            return Ok((Some(number), &s[..idx]));
        }
    }
    Ok((None, s))
}

fn strip_post<'a>(s: &'a str, version: &str) -> Result<(Option<u64>, &'a str), VersionError> {
    for marker in [".post", "post"] {
        if let Some(idx) = s.find(marker) {
            let number = parse_optional_number(&s[idx + marker.len()..], version, "post")?;
            return Ok((Some(number), &s[..idx]));
        }
    }

    // Implicit post release: "1.0.0-1"
    if let Some(idx) = s.rfind('-') {
        let tail = &s[idx + 1..];
        if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(number) = tail.parse::<u64>() {
                return Ok((Some(number), &s[..idx]));
            }
        }
    }

    Ok((None, s))
}

fn strip_pre<'a>(
    s: &'a str,
    version: &str,
) -> Result<(Option<(Phase, u64)>, &'a str), VersionError> {
    let earliest = PHASE_TOKENS
        .iter()
        .filter_map(|token| s.find(token).map(|idx| (idx, *token)))
        .fold(None, |best: Option<(usize, &str)>, candidate| match best {
            Some(found) if found.0 <= candidate.0 => Some(found),
            _ => Some(candidate),
        });

    let Some((idx, token)) = earliest else {
        return Ok((None, s));
    };

    let digits = &s[idx + token.len()..];
    let number = if digits.is_empty() {
        0
    } else {
        digits.parse::<u64>().map_err(|_| {
            VersionError::parse(
                SYSTEM,
                version,
                format!("invalid pre-release number: {}", digits),
            )
        })?
    };

    Ok((Some((Phase::from_token(token), number)), &s[..idx]))
}

fn parse_release(s: &str, version: &str) -> Result<Vec<u64>, VersionError> {
    let s = s.trim_end_matches('.');
    if s.is_empty() {
        return Err(VersionError::parse(SYSTEM, version, "no release numbers found"));
    }

    let release = s
        .split(['.', '_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>().map_err(|_| {
                VersionError::parse(SYSTEM, version, format!("invalid release number: {}", part))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if release.is_empty() {
        return Err(VersionError::parse(SYSTEM, version, "no valid release numbers"));
    }

    Ok(release)
}

fn parse_optional_number(s: &str, version: &str, component: &str) -> Result<u64, VersionError> {
    if s.is_empty() {
        return Ok(0);
    }
    s.parse::<u64>().map_err(|_| {
        VersionError::parse(
            SYSTEM,
            version,
            format!("invalid {} number: {}", component, s),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(version: &str) -> String {
        PyPIVersion::parse(version).unwrap().canon(true)
    }

    fn cmp(a: &str, b: &str) -> Ordering {
        PyPIVersion::parse(a)
            .unwrap()
            .cmp(&PyPIVersion::parse(b).unwrap())
    }

    #[test]
    fn test_parse_release_only() {
        assert_eq!(canon("1.0.0"), "1.0.0");
        assert_eq!(canon("1.0"), "1.0");
        assert_eq!(canon("1.2.3.4"), "1.2.3.4");
    }

    #[test]
    fn test_parse_epoch() {
        assert_eq!(canon("1!2.0.0"), "1!2.0.0");
        assert_eq!(canon("0!1.0.0"), "1.0.0");
        let v = PyPIVersion::parse("3!1.0").unwrap();
        assert_eq!(v.epoch(), 3);
        assert_eq!(v.canon(false), "1.0");
    }

    #[test]
    fn test_parse_pre_release_phases() {
        assert_eq!(canon("1.0.0a1"), "1.0.0a1");
        assert_eq!(canon("1.0.0alpha1"), "1.0.0a1");
        assert_eq!(canon("1.0.0b2"), "1.0.0b2");
        assert_eq!(canon("1.0.0beta2"), "1.0.0b2");
        assert_eq!(canon("1.0.0rc3"), "1.0.0rc3");
        assert_eq!(canon("1.0.0c3"), "1.0.0rc3");
        assert_eq!(canon("1.0.0a"), "1.0.0a0");
    }

    #[test]
    fn test_parse_post_release() {
        assert_eq!(canon("1.0.0.post1"), "1.0.0.post1");
        assert_eq!(canon("1.0.0post1"), "1.0.0.post1");
        assert_eq!(canon("1.0.0-1"), "1.0.0.post1");
    }

    #[test]
    fn test_underscore_is_a_release_separator() {
        assert_eq!(canon("1.0.0_1"), "1.0.0.1");
        assert_eq!(canon("1_0_0"), "1.0.0");
    }

    #[test]
    fn test_parse_dev_release() {
        assert_eq!(canon("1.0.0.dev0"), "1.0.0.dev0");
        assert_eq!(canon("1.0.0dev0"), "1.0.0.dev0");
        assert_eq!(canon("1.0.0.dev"), "1.0.0.dev0");
    }

    #[test]
    fn test_parse_local() {
        assert_eq!(canon("1.0.0+local"), "1.0.0+local");
        assert_eq!(canon("1.0.0+ubuntu.1"), "1.0.0+ubuntu.1");
        let v = PyPIVersion::parse("1.0+abc").unwrap();
        assert_eq!(v.local(), Some("abc"));
    }

    #[test]
    fn test_parse_empty_local() {
        assert_eq!(canon("1.0+"), "1.0");
        assert_eq!(PyPIVersion::parse("1.0+").unwrap().local(), None);
    }

    #[test]
    fn test_parse_all_segments() {
        assert_eq!(
            canon("1!1.0.0a1.post2.dev3+local"),
            "1!1.0.0a1.post2.dev3+local"
        );
        assert_eq!(canon("1.0.0b1.post2"), "1.0.0b1.post2");
        assert_eq!(canon("1.0.0.post1.dev0"), "1.0.0.post1.dev0");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(canon("1.0.0A1"), "1.0.0a1");
        assert_eq!(canon("1.0.0Beta2"), "1.0.0b2");
    }

    #[test]
    fn test_leading_zeros_and_trailing_dot() {
        assert_eq!(canon("1.02.003"), "1.2.3");
        assert_eq!(canon("1.0."), "1.0");
    }

    #[test]
    fn test_original_is_preserved() {
        let v = PyPIVersion::parse("1.0.0Beta2").unwrap();
        assert_eq!(v.original(), "1.0.0Beta2");
        assert_eq!(v.to_string(), "1.0.0Beta2");
    }

    #[test]
    fn test_parse_errors() {
        assert!(PyPIVersion::parse("").is_err());
        assert!(PyPIVersion::parse("abc").is_err());
        assert!(PyPIVersion::parse("a!1.0.0").is_err());
        assert!(PyPIVersion::parse("1.x.0").is_err());
    }

    #[test]
    fn test_parse_error_carries_context() {
        let VersionError::Parse {
            system,
            version,
            reason,
        } = PyPIVersion::parse("a!1.0.0").unwrap_err();
        assert_eq!(system, "PyPI");
        assert_eq!(version, "a!1.0.0");
        assert!(reason.contains("epoch"));
    }

    #[test]
    fn test_compare_release() {
        assert_eq!(cmp("1.0.0", "1.0.0"), Ordering::Equal);
        assert_eq!(cmp("1.0.0", "2.0.0"), Ordering::Less);
        assert_eq!(cmp("2.0.0", "1.0.0"), Ordering::Greater);
        assert_eq!(cmp("1.0.0", "1.1.0"), Ordering::Less);
        assert_eq!(cmp("1.0.0", "1.0.1"), Ordering::Less);
    }

    #[test]
    fn test_compare_shorter_release_sorts_lower() {
        assert_eq!(cmp("1.0", "1.0.0"), Ordering::Less);
        assert_eq!(cmp("1.0.0", "1.0"), Ordering::Greater);
    }

    #[test]
    fn test_compare_epoch_dominates() {
        assert_eq!(cmp("1!1.0.0", "2.0.0"), Ordering::Greater);
        assert_eq!(cmp("1.0.0", "1!1.0.0"), Ordering::Less);
    }

    #[test]
    fn test_compare_pre_release() {
        assert_eq!(cmp("1.0.0", "1.0.0a1"), Ordering::Greater);
        assert_eq!(cmp("1.0.0a1", "1.0.0"), Ordering::Less);
        assert_eq!(cmp("1.0.0a1", "1.0.0b1"), Ordering::Less);
        assert_eq!(cmp("1.0.0b1", "1.0.0rc1"), Ordering::Less);
        assert_eq!(cmp("1.0.0a1", "1.0.0a2"), Ordering::Less);
    }

    #[test]
    fn test_compare_post_release() {
        assert_eq!(cmp("1.0.0", "1.0.0.post1"), Ordering::Less);
        assert_eq!(cmp("1.0.0.post1", "1.0.0"), Ordering::Greater);
        assert_eq!(cmp("1.0.0.post1", "1.0.0.post2"), Ordering::Less);
        assert_eq!(cmp("1.0.0a1", "1.0.0a1.post1"), Ordering::Less);
    }

    #[test]
    fn test_compare_dev_release() {
        assert_eq!(cmp("1.0.0", "1.0.0.dev0"), Ordering::Greater);
        assert_eq!(cmp("1.0.0.dev0", "1.0.0"), Ordering::Less);
        assert_eq!(cmp("1.0.0.dev1", "1.0.0.dev2"), Ordering::Less);
        assert_eq!(cmp("1.0.0.post1", "1.0.0.post1.dev0"), Ordering::Greater);
    }

    #[test]
    fn test_compare_ignores_local() {
        assert_eq!(cmp("1.0.0+a", "1.0.0+b"), Ordering::Equal);
        assert_eq!(
            PyPIVersion::parse("1.0+x").unwrap(),
            PyPIVersion::parse("1.0").unwrap()
        );
    }

    #[test]
    fn test_canon_is_idempotent() {
        for input in [
            "1.0.0",
            "1!2.0",
            "1.0.0alpha1",
            "1.0.0-1",
            "1.0.0.dev",
            "1!1.0.0a1.post2.dev3+local",
            "1_0_0",
            "2.0C1",
            "1.02.003",
        ] {
            let first = canon(input);
            assert_eq!(canon(&first), first, "canon not idempotent for {}", input);
        }
    }

    #[test]
    fn test_sorting_follows_pep440_precedence() {
        let mut versions: Vec<PyPIVersion> = [
            "1.0.post1",
            "1.0",
            "1.0rc1",
            "1.0.dev0",
            "1.0a1",
            "1!0.1",
            "1.0b2",
        ]
        .iter()
        .map(|v| PyPIVersion::parse(v).unwrap())
        .collect();
        versions.sort();

        let sorted: Vec<String> = versions.iter().map(|v| v.canon(true)).collect();
        assert_eq!(
            sorted,
            vec!["1.0a1", "1.0b2", "1.0rc1", "1.0.dev0", "1.0", "1.0.post1", "1!0.1"]
        );
    }
}
