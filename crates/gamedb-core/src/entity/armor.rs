use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CraftingCost, Rank, SkillRank, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmorType {
    Head,
    Chest,
    Gloves,
    Waist,
    Legs,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Armor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub armor_type: Option<ArmorType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<Rank>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rarity: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defense: Option<Defense>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resistances: Option<Resistances>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<Slot>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<SkillRank>>,
    /// Owning armor set id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub armor_set: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crafting: Option<ArmorCrafting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, Value>>,
}

entity!(Armor, "/armor", "armor");

impl Armor {
    /// Level of the given skill granted by this piece, if any.
    pub fn skill_level(&self, skill_id: u64) -> Option<u8> {
        self.skills
            .as_deref()?
            .iter()
            .find(|r| r.skill == Some(skill_id))
            .and_then(|r| r.level)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defense {
    pub base: u32,
    pub max: u32,
    pub augmented: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resistances {
    pub fire: i32,
    pub water: i32,
    pub ice: i32,
    pub thunder: i32,
    pub dragon: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmorCrafting {
    pub materials: Vec<CraftingCost>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArmorSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<Rank>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pieces: Option<Vec<Armor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus: Option<ArmorSetBonus>,
}

entity!(ArmorSet, "/armor/sets", "armor-set");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmorSetBonus {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub ranks: Vec<ArmorSetBonusRank>,
}

/// Skill unlocked once enough pieces of the set are worn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmorSetBonusRank {
    pub pieces: u8,
    pub skill: SkillRank,
}
