use url::Url;

/// Where to go after a successful submission.
///
/// Holds the destination exactly as the server reported it, either a redirect
/// `Location` or the `url` field of a JSON body. Servers commonly answer with a
/// relative path such as `/results/42`; use [`NavigationTarget::resolve`] to
/// turn it into an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget(String);

impl NavigationTarget {
    pub fn new(target: impl Into<String>) -> Self {
        Self(target.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve against the URL the request was sent to.
    pub fn resolve(&self, base: &Url) -> Result<Url, url::ParseError> {
        base.join(&self.0)
    }
}

impl std::fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
