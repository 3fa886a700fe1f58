/// Resolves a free-text player name against box-score names
///
/// Matching is permissive: after trimming and case-folding, an
/// exact match or a substring match in either direction is accepted, and the
/// first candidate in provider order wins. Short names can therefore match
/// the wrong player. Comma-reordered names ("judge, aaron") and diacritic
/// variants ("Dončić" vs "Doncic") are not handled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameMatcher;

impl NameMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a name for comparison
    pub fn normalize(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Whether a single candidate matches the target name
    pub fn is_match(&self, target: &str, candidate: &str) -> bool {
        let target = Self::normalize(target);
        let candidate = Self::normalize(candidate);

        if target.is_empty() || candidate.is_empty() {
            return false;
        }

        target == candidate || candidate.contains(&target) || target.contains(&candidate)
    }

    /// Return the first candidate matching the target, in the given order
    pub fn find_match<'a, I>(&self, target: &str, candidates: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if Self::normalize(target).is_empty() {
            return None;
        }

        candidates.into_iter().find(|candidate| self.is_match(target, candidate))
    }
}
