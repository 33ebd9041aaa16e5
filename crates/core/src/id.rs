//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Classification of a catalog item. Fixed at creation time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Equipment,
    Chemical,
    Consumable,
    Other,
}

impl ItemType {
    /// Every item type, in display/report order.
    pub const ALL: [ItemType; 4] = [
        ItemType::Equipment,
        ItemType::Chemical,
        ItemType::Consumable,
        ItemType::Other,
    ];

    /// Stored/wire name (`equipment`, `chemical`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Equipment => "equipment",
            ItemType::Chemical => "chemical",
            ItemType::Consumable => "consumable",
            ItemType::Other => "other",
        }
    }

    /// Identifier prefix for items of this type.
    pub fn prefix(&self) -> &'static str {
        match self {
            ItemType::Equipment => "EQ",
            ItemType::Chemical => "CHE",
            ItemType::Consumable => "CON",
            ItemType::Other => "OT",
        }
    }
}

impl core::fmt::Display for ItemType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equipment" => Ok(ItemType::Equipment),
            "chemical" => Ok(ItemType::Chemical),
            "consumable" => Ok(ItemType::Consumable),
            "other" => Ok(ItemType::Other),
            other => Err(DomainError::validation(format!(
                "unknown item type '{other}' (expected equipment, chemical, consumable or other)"
            ))),
        }
    }
}

/// Catalog item identifier: `<prefix><sequence>`, sequence zero-padded to 4 digits.
///
/// Sequences above 9999 simply grow wider (`EQ10000`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Compose the identifier for `sequence` within `item_type`.
    pub fn compose(item_type: ItemType, sequence: u32) -> Self {
        Self(format!("{}{:04}", item_type.prefix(), sequence))
    }

    /// The item type encoded in the prefix.
    pub fn item_type(&self) -> ItemType {
        split_prefix(&self.0)
            .map(|(t, _)| t)
            .unwrap_or(ItemType::Other)
    }

    /// The numeric sequence part.
    pub fn sequence(&self) -> u32 {
        split_prefix(&self.0).map(|(_, n)| n).unwrap_or(0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn split_prefix(s: &str) -> Option<(ItemType, u32)> {
    ItemType::ALL.iter().find_map(|t| {
        let digits = s.strip_prefix(t.prefix())?;
        if digits.len() < 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<u32>().ok().map(|n| (*t, n))
    })
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match split_prefix(s) {
            Some(_) => Ok(Self(s.to_string())),
            None => Err(DomainError::invalid_id(format!(
                "ItemId: '{s}' is not <EQ|CHE|CON|OT><4+ digits>"
            ))),
        }
    }
}

impl TryFrom<String> for ItemId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemId> for String {
    fn from(value: ItemId) -> Self {
        value.0
    }
}

/// Identifier of a usage ledger entry (database rowid).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageEntryId(i64);

impl UsageEntryId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for UsageEntryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
