//! Weapons.
//!
//! One `Weapon` type covers every weapon class. Class-specific data lives in
//! optional capability fields; the accessors only hand them out when the
//! weapon's kind actually has that capability, so a stray `phial` on a bow
//! reads as absent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CraftingCost, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeaponKind {
    GreatSword,
    LongSword,
    SwordAndShield,
    DualBlades,
    Hammer,
    HuntingHorn,
    Lance,
    Gunlance,
    SwitchAxe,
    ChargeBlade,
    InsectGlaive,
    LightBowgun,
    HeavyBowgun,
    Bow,
}

/// Class-specific weapon data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Durability,
    Phial,
    Shelling,
    Coatings,
    Ammo,
    SpecialAmmo,
    Deviation,
    BoostType,
    Notes,
}

impl Capability {
    pub const ALL: [Self; 9] = [
        Self::Durability,
        Self::Phial,
        Self::Shelling,
        Self::Coatings,
        Self::Ammo,
        Self::SpecialAmmo,
        Self::Deviation,
        Self::BoostType,
        Self::Notes,
    ];
}

impl WeaponKind {
    pub const fn is_ranged(self) -> bool {
        matches!(self, Self::LightBowgun | Self::HeavyBowgun | Self::Bow)
    }

    pub const fn is_bowgun(self) -> bool {
        matches!(self, Self::LightBowgun | Self::HeavyBowgun)
    }

    pub const fn supports(self, capability: Capability) -> bool {
        match capability {
            Capability::Durability => !self.is_ranged(),
            Capability::Phial => matches!(self, Self::SwitchAxe | Self::ChargeBlade),
            Capability::Shelling => matches!(self, Self::Gunlance),
            Capability::Coatings => matches!(self, Self::Bow),
            Capability::Ammo | Capability::SpecialAmmo | Capability::Deviation => {
                self.is_bowgun()
            }
            Capability::BoostType => matches!(self, Self::InsectGlaive),
            Capability::Notes => matches!(self, Self::HuntingHorn),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Weapon {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<WeaponKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rarity: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack: Option<Attack>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<Slot>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<WeaponElement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elderseal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crafting: Option<WeaponCrafting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, Value>>,

    /// Sharpness bars, one per Handicraft level.
    #[serde(skip_serializing_if = "Option::is_none")]
    durability: Option<Vec<Sharpness>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phial: Option<Phial>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shelling: Option<Shelling>,
    #[serde(skip_serializing_if = "Option::is_none")]
    coatings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ammo: Option<Vec<Ammo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    special_ammo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deviation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    boost_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

entity!(Weapon, "/weapons", "weapon");

impl Weapon {
    pub fn new(kind: WeaponKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    fn has(&self, capability: Capability) -> bool {
        self.kind.is_some_and(|k| k.supports(capability))
    }

    fn gate<'a, T: ?Sized>(&self, capability: Capability, value: Option<&'a T>) -> Option<&'a T> {
        value.filter(|_| self.has(capability))
    }

    pub fn durability(&self) -> Option<&[Sharpness]> {
        self.gate(Capability::Durability, self.durability.as_deref())
    }

    pub fn phial(&self) -> Option<&Phial> {
        self.gate(Capability::Phial, self.phial.as_ref())
    }

    pub fn shelling(&self) -> Option<&Shelling> {
        self.gate(Capability::Shelling, self.shelling.as_ref())
    }

    pub fn coatings(&self) -> Option<&[String]> {
        self.gate(Capability::Coatings, self.coatings.as_deref())
    }

    pub fn ammo(&self) -> Option<&[Ammo]> {
        self.gate(Capability::Ammo, self.ammo.as_deref())
    }

    pub fn special_ammo(&self) -> Option<&str> {
        self.gate(Capability::SpecialAmmo, self.special_ammo.as_deref())
    }

    pub fn deviation(&self) -> Option<&str> {
        self.gate(Capability::Deviation, self.deviation.as_deref())
    }

    pub fn boost_type(&self) -> Option<&str> {
        self.gate(Capability::BoostType, self.boost_type.as_deref())
    }

    pub fn notes(&self) -> Option<&str> {
        self.gate(Capability::Notes, self.notes.as_deref())
    }

    /// Capabilities this weapon's kind supports and that carry data.
    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|&c| self.has(c) && self.has_data(c))
            .collect()
    }

    const fn has_data(&self, capability: Capability) -> bool {
        match capability {
            Capability::Durability => self.durability.is_some(),
            Capability::Phial => self.phial.is_some(),
            Capability::Shelling => self.shelling.is_some(),
            Capability::Coatings => self.coatings.is_some(),
            Capability::Ammo => self.ammo.is_some(),
            Capability::SpecialAmmo => self.special_ammo.is_some(),
            Capability::Deviation => self.deviation.is_some(),
            Capability::BoostType => self.boost_type.is_some(),
            Capability::Notes => self.notes.is_some(),
        }
    }

    #[must_use]
    pub fn with_durability(mut self, durability: Vec<Sharpness>) -> Self {
        self.durability = Some(durability);
        self
    }

    #[must_use]
    pub fn with_phial(mut self, phial: Phial) -> Self {
        self.phial = Some(phial);
        self
    }

    #[must_use]
    pub fn with_shelling(mut self, shelling: Shelling) -> Self {
        self.shelling = Some(shelling);
        self
    }

    #[must_use]
    pub fn with_coatings(mut self, coatings: Vec<String>) -> Self {
        self.coatings = Some(coatings);
        self
    }

    #[must_use]
    pub fn with_ammo(mut self, ammo: Vec<Ammo>) -> Self {
        self.ammo = Some(ammo);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attack {
    pub display: u32,
    pub raw: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponElement {
    #[serde(rename = "type")]
    pub element: String,
    pub damage: u32,
    pub hidden: bool,
}

/// One sharpness bar, in hits per color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sharpness {
    pub red: u32,
    pub orange: u32,
    pub yellow: u32,
    pub green: u32,
    pub blue: u32,
    pub white: u32,
    pub purple: u32,
}

impl Sharpness {
    pub const fn total(&self) -> u32 {
        self.red + self.orange + self.yellow + self.green + self.blue + self.white + self.purple
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phial {
    #[serde(rename = "type")]
    pub phial_type: String,
    pub damage: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shelling {
    #[serde(rename = "type")]
    pub shelling_type: String,
    pub level: u8,
}

/// Magazine sizes per ammo level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ammo {
    #[serde(rename = "type")]
    pub ammo_type: String,
    pub capacities: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeaponCrafting {
    pub craftable: bool,
    /// Weapon this one is upgraded from.
    pub previous: Option<u64>,
    pub branches: Vec<u64>,
    pub crafting_materials: Vec<CraftingCost>,
    pub upgrade_materials: Vec<CraftingCost>,
}
