// 🏷️ Qualification Rules - Rules as Data
// Tag exclusion, qualifying link detection and edit-comment action markers

use crate::error::{ScoringError, ScoringResult};
use regex::Regex;
use std::collections::HashSet;

// ============================================================================
// TAG FILTER
// ============================================================================

/// Drops revisions carrying any revert-style change tag
#[derive(Debug, Clone)]
pub struct TagFilter {
    excluded: HashSet<String>,
}

impl TagFilter {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TagFilter {
            excluded: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// First tag that excludes the revision, if any
    pub fn excluded_by<'a>(&self, tags: &'a [String]) -> Option<&'a str> {
        tags.iter()
            .find(|tag| self.excluded.contains(tag.as_str()))
            .map(String::as_str)
    }

    pub fn excludes(&self, tags: &[String]) -> bool {
        self.excluded_by(tags).is_some()
    }

    pub fn len(&self) -> usize {
        self.excluded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }
}

// ============================================================================
// LINK PATTERN
// ============================================================================

/// The external link whose introduction earns points
#[derive(Debug, Clone)]
pub struct LinkPattern {
    regex: Regex,
}

impl LinkPattern {
    pub fn new(pattern: &str) -> ScoringResult<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| ScoringError::Config(format!("bad link pattern {:?}: {}", pattern, e)))?;
        Ok(LinkPattern { regex })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// True only when this edit brings the link in: present after, absent before
    pub fn introduced(&self, old_text: &str, new_text: &str) -> bool {
        self.matches(new_text) && !self.matches(old_text)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

// ============================================================================
// ACTION MARKERS
// ============================================================================

/// Substring markers that identify label-setting edits by their
/// autogenerated comment (e.g. `/* wbsetlabel-add:1|fr */`).
///
/// This is a heuristic over free text: it breaks if the wiki changes its
/// autocomment keys.
#[derive(Debug, Clone)]
pub struct ActionMarkers {
    markers: Vec<String>,
}

impl ActionMarkers {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ActionMarkers {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matched<'a>(&'a self, comment: &str) -> Option<&'a str> {
        self.markers
            .iter()
            .find(|marker| comment.contains(marker.as_str()))
            .map(String::as_str)
    }

    pub fn matches(&self, comment: &str) -> bool {
        self.matched(comment).is_some()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CampaignConfig;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_tag_filter_excludes_revert_tags() {
        let filter = TagFilter::new(["mw-undo", "mw-rollback", "revert"]);

        assert!(filter.excludes(&tags(&["visualeditor", "mw-undo"])));
        assert_eq!(filter.excluded_by(&tags(&["revert"])), Some("revert"));
        assert!(!filter.excludes(&tags(&["visualeditor", "mobile edit"])));
        assert!(!filter.excludes(&[]));
    }

    #[test]
    fn test_default_link_pattern_variants() {
        let pattern = CampaignConfig::default().link_pattern().unwrap();

        assert!(pattern.matches("[https://www.unesco.org/en/memory-world/x Doc]"));
        assert!(pattern.matches("https://www.unesco.org/memory-world"));
        assert!(pattern.matches("http://www.unesco.org/zh/memory-world/register"));
        assert!(!pattern.matches("https://www.unesco.org/en/world-heritage"));
        assert!(!pattern.matches("https://www.unesco.org/de/memory-world"));
    }

    #[test]
    fn test_link_must_be_introduced() {
        let pattern = CampaignConfig::default().link_pattern().unwrap();
        let link = "see https://www.unesco.org/en/memory-world/item";

        assert!(pattern.introduced("", link));
        assert!(pattern.introduced("plain text", link));
        assert!(!pattern.introduced(link, link));
        assert!(!pattern.introduced("", "plain text"));
    }

    #[test]
    fn test_invalid_link_pattern() {
        let result = LinkPattern::new("(unclosed");
        assert!(matches!(result, Err(ScoringError::Config(_))));
    }

    #[test]
    fn test_action_markers() {
        let markers = ActionMarkers::new(["wbsetlabel-add", "wbeditentity-update-languages"]);

        assert_eq!(
            markers.matched("/* wbsetlabel-add:1|fr */ Mémoire"),
            Some("wbsetlabel-add")
        );
        assert!(markers.matches("/* wbeditentity-update-languages-short:0||fr, de */"));
        assert!(!markers.matches("/* wbsetdescription-add:1|en */ text"));
    }
}
