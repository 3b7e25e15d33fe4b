use serde::{Deserialize, Serialize};

use super::{Item, Location, Rank, SkillRank};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Monster {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `small` or `large`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub monster_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ailments: Option<Vec<Ailment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resistances: Option<Vec<MonsterResistance>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weaknesses: Option<Vec<MonsterWeakness>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewards: Option<Vec<Reward>>,
}

entity!(Monster, "/monsters", "monster");

impl Monster {
    /// Strongest weakness rating (in stars) to `element`, any condition.
    pub fn weakness_to(&self, element: &str) -> Option<u8> {
        self.weaknesses
            .as_deref()?
            .iter()
            .filter(|w| w.element == element)
            .map(|w| w.stars)
            .max()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonsterResistance {
    pub element: String,
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonsterWeakness {
    pub element: String,
    pub stars: u8,
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reward {
    pub id: Option<u64>,
    pub item: Item,
    pub conditions: Vec<RewardCondition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardCondition {
    /// e.g. `carve`, `reward`, `tail carve`.
    #[serde(rename = "type")]
    pub condition_type: String,
    pub subtype: Option<String>,
    pub rank: Option<Rank>,
    pub quantity: u32,
    /// Drop chance in percent.
    pub chance: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ailment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery: Option<AilmentRecovery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protection: Option<AilmentProtection>,
}

entity!(Ailment, "/ailments", "ailment");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AilmentRecovery {
    pub actions: Vec<String>,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AilmentProtection {
    pub items: Vec<Item>,
    pub skills: Vec<SkillRank>,
}
