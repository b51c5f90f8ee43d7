// 👥 Participants - Who is scored, and on which wikis

use serde::{Deserialize, Serialize};

/// Per-wiki activity for a participant, as discovered from their global account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WikiActivity {
    /// Wiki database name
    pub wiki: String,

    #[serde(default)]
    pub editcount: i64,

    /// Only active wikis are scored
    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default)]
    pub rev_count: i64,

    /// Archived (deleted) revision count
    #[serde(default)]
    pub ar_count: i64,
}

fn default_active() -> bool {
    true
}

impl WikiActivity {
    pub fn active(wiki: &str) -> Self {
        WikiActivity {
            wiki: wiki.to_string(),
            editcount: 0,
            active: true,
            rev_count: 0,
            ar_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub username: String,

    #[serde(default)]
    pub activities: Vec<WikiActivity>,
}

impl Participant {
    pub fn new(username: &str, wikis: &[&str]) -> Self {
        Participant {
            username: username.to_string(),
            activities: wikis.iter().map(|wiki| WikiActivity::active(wiki)).collect(),
        }
    }

    /// Wikis to score, in activity order
    pub fn active_wikis(&self) -> impl Iterator<Item = &str> {
        self.activities
            .iter()
            .filter(|activity| activity.active)
            .map(|activity| activity.wiki.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_active_wikis_are_listed() {
        let mut participant = Participant::new("Alice", &["enwiki", "fiwiki", "wikidatawiki"]);
        participant.activities[1].active = false;

        let wikis: Vec<&str> = participant.active_wikis().collect();
        assert_eq!(wikis, vec!["enwiki", "wikidatawiki"]);
    }

    #[test]
    fn test_activity_defaults_to_active() {
        let participant: Participant =
            serde_json::from_str(r#"{"username": "Bob", "activities": [{"wiki": "svwiki"}]}"#).unwrap();

        assert!(participant.activities[0].active);
        assert_eq!(participant.activities[0].editcount, 0);
    }
}
