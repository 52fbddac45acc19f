use crate::error::{Result, RudixError};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// One positional component of a loose version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Component {
    /// Digit run with leading zeros stripped, so `"007"` and `"7"` are equal.
    Numeric(String),
    Text(String),
}

impl Component {
    fn numeric(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            Component::Numeric("0".to_string())
        } else {
            Component::Numeric(trimmed.to_string())
        }
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // Normalized digit strings: a longer run is a bigger number.
            (Component::Numeric(a), Component::Numeric(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (Component::Text(a), Component::Text(b)) => a.cmp(b),
            (Component::Numeric(_), Component::Text(_)) => Ordering::Less,
            (Component::Text(_), Component::Numeric(_)) => Ordering::Greater,
        }
    }
}

const SEPARATORS: [char; 4] = ['.', '-', '_', '+'];

fn flush(run: &mut String, is_digit: bool, components: &mut Vec<Component>) {
    if run.is_empty() {
        return;
    }
    if is_digit {
        components.push(Component::numeric(run));
    } else {
        components.push(Component::Text(run.clone()));
    }
    run.clear();
}

/// Split a base version into alternating digit / non-digit runs.
fn tokenize(base: &str) -> Vec<Component> {
    let mut components = Vec::new();
    let mut run = String::new();
    let mut run_is_digit = false;

    for ch in base.chars() {
        if SEPARATORS.contains(&ch) {
            flush(&mut run, run_is_digit, &mut components);
            continue;
        }

        let is_digit = ch.is_ascii_digit();
        if !run.is_empty() && is_digit != run_is_digit {
            flush(&mut run, run_is_digit, &mut components);
        }
        run_is_digit = is_digit;
        run.push(ch);
    }
    flush(&mut run, run_is_digit, &mut components);

    components
}

/// A version with an optional trailing `-<digits>` revision.
///
/// Ordering compares the base version loosely (numeric runs numerically,
/// text runs lexically, a missing trailing component sorts first) and only
/// falls back to the revision when the bases are equal. An absent revision
/// is revision 0, so `1.2.0` and `1.2.0-0` are the same version.
#[derive(Debug, Clone)]
pub struct VersionSpec {
    raw: String,
    components: Vec<Component>,
    revision: u64,
}

impl VersionSpec {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();

        let (base, revision) = match raw.rsplit_once('-') {
            Some((base, rev)) if !rev.is_empty() && rev.chars().all(|c| c.is_ascii_digit()) => {
                let revision = rev
                    .parse::<u64>()
                    .map_err(|_| RudixError::MalformedVersion(raw.to_string()))?;
                (base, revision)
            }
            _ => (raw, 0),
        };

        let components = tokenize(base);
        if base.is_empty() || components.is_empty() {
            return Err(RudixError::MalformedVersion(raw.to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            components,
            revision,
        })
    }

    /// The string this version was parsed from.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[cfg(test)]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl FromStr for VersionSpec {
    type Err = RudixError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for VersionSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl PartialEq for VersionSpec {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionSpec {}

impl PartialOrd for VersionSpec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionSpec {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components
            .cmp(&other.components)
            .then_with(|| self.revision.cmp(&other.revision))
    }
}

pub struct VersionComparator;

impl VersionComparator {
    pub fn compare(a: &VersionSpec, b: &VersionSpec) -> Ordering {
        a.cmp(b)
    }

    /// Check if `candidate` is strictly newer than `current`
    pub fn is_newer(candidate: &VersionSpec, current: &VersionSpec) -> bool {
        Self::compare(candidate, current) == Ordering::Greater
    }

    /// Pick the greatest item by version; among equal versions the first one wins.
    pub fn latest_by<T, I, F>(items: I, version_of: F) -> Option<T>
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> &VersionSpec,
    {
        items.into_iter().reduce(|best, item| {
            if Self::is_newer(version_of(&item), version_of(&best)) {
                item
            } else {
                best
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(raw: &str) -> VersionSpec {
        VersionSpec::parse(raw).unwrap()
    }

    #[test]
    fn missing_revision_defaults_to_zero() {
        assert_eq!(v("1.2.0"), v("1.2.0-0"));
        assert_eq!(v("1.2.0").revision(), 0);
        assert!(v("1.2.0-1") > v("1.2.0-0"));
    }

    #[test]
    fn numeric_components_compare_numerically() {
        assert_eq!(
            VersionComparator::compare(&v("1.9"), &v("1.10")),
            Ordering::Less
        );
        assert!(v("2.0") > v("1.99.99"));
        assert_eq!(v("1.007"), v("1.7"));
    }

    #[test]
    fn revision_only_breaks_ties_on_equal_base() {
        assert!(v("1.3-0") > v("1.2-9"));
        assert!(v("1.2-10") > v("1.2-9"));
    }

    #[test]
    fn shorter_version_sorts_before_longer() {
        assert!(v("1.0") < v("1.0.0"));
        assert!(v("1.0") < v("1.0a"));
    }

    #[test]
    fn numbers_sort_before_text() {
        assert!(v("1.0.1") < v("1.0.a"));
        assert!(v("1.0rc1") < v("1.0rc2"));
    }

    #[test]
    fn huge_numeric_components_do_not_overflow() {
        assert!(v("1.123456789012345678901234567890") > v("1.99999999999999999999"));
    }

    #[test]
    fn malformed_versions_are_rejected() {
        assert!(matches!(
            VersionSpec::parse("-3"),
            Err(RudixError::MalformedVersion(_))
        ));
        assert!(VersionSpec::parse("").is_err());
        assert!(VersionSpec::parse("...").is_err());
        assert!(VersionSpec::parse("1.0-99999999999999999999999").is_err());
    }

    #[test]
    fn non_numeric_suffix_is_part_of_base() {
        let version = v("1.2-beta");
        assert_eq!(version.revision(), 0);
        assert!(version > v("1.2"));
    }

    #[test]
    fn ordering_is_total() {
        let samples = [
            "1.0", "1.0-1", "1.0.0", "1.9", "1.10", "1.10a", "1.2-beta", "2.0", "0.9-3", "1.0rc1",
        ];
        let parsed: Vec<VersionSpec> = samples.iter().map(|s| v(s)).collect();

        for a in &parsed {
            assert_eq!(a.cmp(a), Ordering::Equal);
            for b in &parsed {
                assert_eq!(a.cmp(b), b.cmp(a).reverse());
                for c in &parsed {
                    if a <= b && b <= c {
                        assert!(a <= c, "{a} <= {b} <= {c}");
                    }
                }
            }
        }
    }

    #[test]
    fn latest_by_prefers_first_among_equals() {
        let items = vec![("a", v("1.0")), ("b", v("2.0")), ("c", v("2.0-0")), ("d", v("1.5"))];
        let latest = VersionComparator::latest_by(items.iter(), |(_, version)| version).unwrap();
        assert_eq!(latest.0, "b");
    }

    #[test]
    fn hyphen_and_underscore_separate_like_dots() {
        assert_eq!(v("1.0-beta"), v("1.0.beta"));
        assert_eq!(v("2.1_rc1"), v("2.1.rc1"));
        assert_eq!(v("1.0+build"), v("1.0.build"));
        assert!(v("1.0-beta") > v("1.0"));
    }
}
