use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Skill {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranks: Option<Vec<SkillRank>>,
}

entity!(Skill, "/skills", "skill");

impl Skill {
    /// Highest rank level defined for this skill.
    pub fn max_level(&self) -> Option<u8> {
        self.ranks
            .as_deref()?
            .iter()
            .filter_map(|r| r.level)
            .max()
    }

    pub fn rank(&self, level: u8) -> Option<&SkillRank> {
        self.ranks
            .as_deref()?
            .iter()
            .find(|r| r.level == Some(level))
    }
}

/// One level of a skill, as embedded in armor, charms and decorations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillRank {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning skill id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_name: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub modifiers: BTreeMap<String, Value>,
}
