//! The entity catalog.
//!
//! One type per API resource. Every field is optional because the server
//! answers with partial projections and create/update payloads only carry the
//! fields being written. Nested references (skill ranks, crafting costs,
//! durability curves) are plain nested values; the client does not keep them
//! consistent across entities.

macro_rules! entity {
    ($ty:ty, $path:literal, $name:literal) => {
        impl $crate::entity::Entity for $ty {
            const PATH: &'static str = $path;
            const NAME: &'static str = $name;

            fn id(&self) -> Option<u64> {
                self.id
            }
        }
    };
}

mod armor;
mod item;
mod monster;
mod skill;
mod weapon;
mod world;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

pub use armor::{
    Armor, ArmorCrafting, ArmorSet, ArmorSetBonus, ArmorSetBonusRank, ArmorType, Defense,
    Resistances,
};
pub use item::{Charm, CharmCrafting, CharmRank, Decoration, Item};
pub use monster::{
    Ailment, AilmentProtection, AilmentRecovery, Monster, MonsterResistance, MonsterWeakness,
    Reward, RewardCondition,
};
pub use skill::{Skill, SkillRank};
pub use weapon::{
    Ammo, Attack, Capability, Phial, Sharpness, Shelling, Weapon, WeaponCrafting, WeaponElement,
    WeaponKind,
};
pub use world::{Camp, Event, Location, MotionValue};

/// A record served from a fixed resource path.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection path relative to the API base, e.g. `/armor`.
    const PATH: &'static str;
    /// Singular name used in logs and on the command line.
    const NAME: &'static str;

    fn id(&self) -> Option<u64>;
}

/// Equipment rank tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Low,
    High,
    Master,
}

/// A decoration slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub rank: u8,
}

/// A quantity of an item consumed by crafting or upgrading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CraftingCost {
    pub quantity: u32,
    pub item: Item,
}

/// Every resource path the catalog serves, with its entity name.
pub const RESOURCES: &[(&str, &str)] = &[
    (Ailment::NAME, Ailment::PATH),
    (Armor::NAME, Armor::PATH),
    (ArmorSet::NAME, ArmorSet::PATH),
    (Charm::NAME, Charm::PATH),
    (Decoration::NAME, Decoration::PATH),
    (Event::NAME, Event::PATH),
    (Item::NAME, Item::PATH),
    (Location::NAME, Location::PATH),
    (Monster::NAME, Monster::PATH),
    (MotionValue::NAME, MotionValue::PATH),
    (Skill::NAME, Skill::PATH),
    (Weapon::NAME, Weapon::PATH),
];
