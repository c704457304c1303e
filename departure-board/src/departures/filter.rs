//! Direction keyword filtering.
//!
//! A filter is a comma-separated keyword list such as `"Hbf, Marktplatz"`.
//! A direction passes if it contains any keyword as a case-sensitive
//! substring. An empty filter lets everything through.

/// Characters trimmed from each keyword.
const KEYWORD_PADDING: [char; 2] = [' ', '\t'];

/// Check a direction label against a comma-separated keyword list.
///
/// - No filter (or an empty one) matches everything, including a missing label.
/// - A missing label never matches a non-empty filter.
/// - Keywords are trimmed of spaces and tabs; keywords that trim to nothing
///   never match, so `","` or `"   "` match no label at all.
///
/// # Examples
///
/// ```
/// use departure_board::departures::matches;
///
/// assert!(matches(Some("Freiburg Hauptbahnhof"), Some("Hauptbahnhof, Marktplatz")));
/// assert!(!matches(Some("Rieselfeld"), Some("Hauptbahnhof,Marktplatz")));
/// assert!(matches(Some("anything"), None));
/// assert!(!matches(None, Some("Hbf")));
/// ```
pub fn matches(label: Option<&str>, filter_spec: Option<&str>) -> bool {
    let filter_spec = match filter_spec {
        Some(spec) if !spec.is_empty() => spec,
        _ => return true,
    };
    let Some(label) = label else {
        return false;
    };

    filter_spec
        .split(',')
        .map(|keyword| keyword.trim_matches(KEYWORD_PADDING))
        .filter(|keyword| !keyword.is_empty())
        .any(|keyword| label.contains(keyword))
}

/// An owned direction filter, typically built from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectionFilter {
    spec: String,
}

impl DirectionFilter {
    /// Create a filter from a comma-separated keyword list.
    pub fn new(spec: impl Into<String>) -> Self {
        Self { spec: spec.into() }
    }

    /// A filter that lets every direction through.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// The raw keyword list.
    pub fn as_str(&self) -> &str {
        &self.spec
    }

    /// Whether this filter lets every direction through.
    pub fn is_empty(&self) -> bool {
        self.spec.is_empty()
    }

    /// Test a direction label against this filter.
    pub fn matches(&self, label: &str) -> bool {
        matches(Some(label), Some(&self.spec))
    }
}
