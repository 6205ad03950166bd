use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Stable identifier for a catalog item (the game's item id).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Equipment location an item occupies.
///
/// Known variants are declared in paper-doll order so ordered maps keyed by
/// `Slot` list results the way a character sheet does. `TwoHand`, `OneHand`
/// and `HeldInOffHand` are virtual slots: they are stored verbatim on items and
/// only folded into `MainHand`/`OffHand` by [`Slot::canonical`]. `Other`
/// preserves slot names the catalog introduces without breaking older builds.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Slot {
    Head,
    Neck,
    Shoulder,
    Back,
    Chest,
    Wrist,
    Hands,
    Waist,
    Legs,
    Feet,
    Finger,
    Trinket,
    MainHand,
    OffHand,
    Ranged,
    TwoHand,
    OneHand,
    HeldInOffHand,
    Other(String),
}

/// Item rarity tier.
///
/// Ordered from Poor to Artifact; the order drives display styling only and is
/// never consulted when ranking search results.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Quality {
    Poor,
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Artifact,
    Other(String),
}

impl Serialize for Slot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_name(&value))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Slot {
    pub fn as_str(&self) -> &str {
        match self {
            Slot::Head => "Head",
            Slot::Neck => "Neck",
            Slot::Shoulder => "Shoulder",
            Slot::Back => "Back",
            Slot::Chest => "Chest",
            Slot::Wrist => "Wrist",
            Slot::Hands => "Hands",
            Slot::Waist => "Waist",
            Slot::Legs => "Legs",
            Slot::Feet => "Feet",
            Slot::Finger => "Finger",
            Slot::Trinket => "Trinket",
            Slot::MainHand => "Main Hand",
            Slot::OffHand => "Off Hand",
            Slot::Ranged => "Ranged",
            Slot::TwoHand => "Two-Hand",
            Slot::OneHand => "One-Hand",
            Slot::HeldInOffHand => "Held In Off-hand",
            Slot::Other(value) => value.as_str(),
        }
    }

    /// Parse a catalog slot name. Matching is exact; anything unrecognized is
    /// kept verbatim in `Other`.
    pub fn from_name(value: &str) -> Self {
        match value {
            "Head" => Slot::Head,
            "Neck" => Slot::Neck,
            "Shoulder" => Slot::Shoulder,
            "Back" => Slot::Back,
            "Chest" => Slot::Chest,
            "Wrist" => Slot::Wrist,
            "Hands" => Slot::Hands,
            "Waist" => Slot::Waist,
            "Legs" => Slot::Legs,
            "Feet" => Slot::Feet,
            "Finger" => Slot::Finger,
            "Trinket" => Slot::Trinket,
            "Main Hand" => Slot::MainHand,
            "Off Hand" => Slot::OffHand,
            "Ranged" => Slot::Ranged,
            "Two-Hand" => Slot::TwoHand,
            "One-Hand" => Slot::OneHand,
            "Held In Off-hand" => Slot::HeldInOffHand,
            other => Slot::Other(other.to_string()),
        }
    }

    /// The slot an item is tracked under on the gear sheet.
    pub fn canonical(&self) -> Slot {
        match self {
            Slot::TwoHand => Slot::MainHand,
            Slot::OneHand | Slot::HeldInOffHand => Slot::OffHand,
            other => other.clone(),
        }
    }
}

impl Serialize for Quality {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Quality {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_name(&value))
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Quality {
    pub fn as_str(&self) -> &str {
        match self {
            Quality::Poor => "Poor",
            Quality::Common => "Common",
            Quality::Uncommon => "Uncommon",
            Quality::Rare => "Rare",
            Quality::Epic => "Epic",
            Quality::Legendary => "Legendary",
            Quality::Artifact => "Artifact",
            Quality::Other(value) => value.as_str(),
        }
    }

    pub fn from_name(value: &str) -> Self {
        match value {
            "Poor" => Quality::Poor,
            "Common" => Quality::Common,
            "Uncommon" => Quality::Uncommon,
            "Rare" => Quality::Rare,
            "Epic" => Quality::Epic,
            "Legendary" => Quality::Legendary,
            "Artifact" => Quality::Artifact,
            other => Quality::Other(other.to_string()),
        }
    }
}
