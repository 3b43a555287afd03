use crate::url::domain::decompose;
use serde::Deserialize;
use std::collections::HashSet;

/// How a discovered link's host is compared against the interesting domains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkPolicy {
    /// Follow when any suffix of the host (subdomain, registrable domain or
    /// TLD) is an interesting domain
    #[default]
    SuffixChain,

    /// Follow only when the full host is an interesting domain
    ExactHost,
}

/// The fixed set of domain suffixes worth following links into
///
/// Entries are normalized on construction: trimmed, lowercased, with a
/// leading `*.` and trailing `.` removed, so `*.Example.com` and
/// `example.com` name the same suffix.
#[derive(Debug, Clone, Default)]
pub struct InterestingDomains {
    domains: HashSet<String>,
    policy: LinkPolicy,
}

impl InterestingDomains {
    /// Builds the set with the default suffix-chain policy
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_policy(domains, LinkPolicy::default())
    }

    /// Builds the set with an explicit link policy
    pub fn with_policy<I, S>(domains: I, policy: LinkPolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .filter_map(|d| normalize_domain(d.as_ref()))
            .collect();

        Self { domains, policy }
    }

    /// Returns true if links into `hostname` should be followed
    ///
    /// # Examples
    ///
    /// ```
    /// use seekr::url::InterestingDomains;
    ///
    /// let domains = InterestingDomains::new(["ic0.app"]);
    /// assert!(domains.is_interesting("abc-cai.raw.ic0.app"));
    /// assert!(!domains.is_interesting("example.com"));
    /// ```
    pub fn is_interesting(&self, hostname: &str) -> bool {
        let hostname = hostname.to_lowercase();

        match self.policy {
            LinkPolicy::SuffixChain => decompose(&hostname)
                .iter()
                .any(|suffix| self.domains.contains(suffix)),
            LinkPolicy::ExactHost => self.domains.contains(&hostname),
        }
    }

    /// Returns the link policy in use
    pub fn policy(&self) -> LinkPolicy {
        self.policy
    }

    /// Returns the number of interesting domains
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Returns whether no domain is interesting
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

fn normalize_domain(raw: &str) -> Option<String> {
    let domain = raw.trim().to_lowercase();
    let domain = domain.strip_prefix("*.").unwrap_or(&domain);
    let domain = domain.trim_end_matches('.');

    if domain.is_empty() {
        None
    } else {
        Some(domain.to_string())
    }
}
