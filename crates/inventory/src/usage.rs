//! Usage ledger: the command that debits stock and the entries it leaves behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use labinv_core::{DomainError, DomainResult, ItemId, UsageEntryId};

use crate::item::normalize_optional;

/// Command: record one usage event against an item.
///
/// Positive `quantity_changed` is consumption; negative returns stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUsage {
    pub item_id: ItemId,
    pub user: String,
    pub quantity_changed: i64,
    pub department: Option<String>,
    pub purpose: Option<String>,
    pub notes: Option<String>,
    pub supervisor_approval: Option<String>,
}

impl RecordUsage {
    pub fn new(item_id: ItemId, user: impl Into<String>, quantity_changed: i64) -> Self {
        Self {
            item_id,
            user: user.into(),
            quantity_changed,
            department: None,
            purpose: None,
            notes: None,
            supervisor_approval: None,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_supervisor_approval(mut self, approval: impl Into<String>) -> Self {
        self.supervisor_approval = Some(approval.into());
        self
    }

    /// Input checks that need no stored state.
    pub fn validate(mut self) -> DomainResult<Self> {
        self.user = self.user.trim().to_string();
        if self.user.is_empty() {
            return Err(DomainError::validation("user is required"));
        }
        if self.quantity_changed == 0 {
            return Err(DomainError::validation("quantity changed cannot be zero"));
        }
        self.department = normalize_optional(self.department);
        self.purpose = normalize_optional(self.purpose);
        self.notes = normalize_optional(self.notes);
        self.supervisor_approval = normalize_optional(self.supervisor_approval);
        Ok(self)
    }
}

/// Decide the quantity left after debiting `quantity_changed` from `current`.
///
/// Stock never goes below zero.
pub fn plan_debit(item_id: &ItemId, current: i64, quantity_changed: i64) -> DomainResult<i64> {
    let remaining = current
        .checked_sub(quantity_changed)
        .ok_or_else(|| DomainError::validation("quantity changed is out of range"))?;
    if remaining < 0 {
        return Err(DomainError::insufficient_stock(
            item_id.as_str(),
            current,
            quantity_changed,
        ));
    }
    Ok(remaining)
}

/// Whether the consumed stock has come back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageStatus {
    Active,
    Returned,
}

impl UsageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageStatus::Active => "Active",
            UsageStatus::Returned => "Returned",
        }
    }
}

impl core::fmt::Display for UsageStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the usage ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageLogEntry {
    pub id: UsageEntryId,
    pub item_id: ItemId,
    pub user: String,
    pub user_department: Option<String>,
    pub quantity_changed: i64,
    pub timestamp: DateTime<Utc>,
    pub purpose: Option<String>,
    pub notes: Option<String>,
    pub supervisor_approval: Option<String>,
    /// Reserved: nothing writes it yet.
    pub return_time: Option<DateTime<Utc>>,
}

impl UsageLogEntry {
    pub fn status(&self) -> UsageStatus {
        if self.return_time.is_some() {
            UsageStatus::Returned
        } else {
            UsageStatus::Active
        }
    }
}

/// A ledger entry joined with its item's display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub entry: UsageLogEntry,
    pub item_name: String,
    pub item_name_localized: Option<String>,
}

impl UsageRecord {
    pub fn status(&self) -> UsageStatus {
        self.entry.status()
    }
}

/// Listing order for the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UsageOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

#[cfg(test)]
mod tests {
    use super::*;
    use labinv_core::ItemType;

    fn che1() -> ItemId {
        ItemId::compose(ItemType::Chemical, 1)
    }

    fn entry(return_time: Option<DateTime<Utc>>) -> UsageLogEntry {
        UsageLogEntry {
            id: UsageEntryId::new(1),
            item_id: che1(),
            user: "Alice".to_string(),
            user_department: None,
            quantity_changed: 20,
            timestamp: Utc::now(),
            purpose: None,
            notes: None,
            supervisor_approval: None,
            return_time,
        }
    }

    #[test]
    fn validate_requires_user_and_non_zero_quantity() {
        let err = RecordUsage::new(che1(), "   ", 1).validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("user")));

        let err = RecordUsage::new(che1(), "Alice", 0).validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("zero")));
    }

    #[test]
    fn validate_normalizes_optionals() {
        let cmd = RecordUsage::new(che1(), " Alice ", 3)
            .with_department("Virology")
            .with_purpose("  ")
            .validate()
            .unwrap();
        assert_eq!(cmd.user, "Alice");
        assert_eq!(cmd.department.as_deref(), Some("Virology"));
        assert_eq!(cmd.purpose, None);
    }

    #[test]
    fn plan_debit_allows_exact_drain() {
        assert_eq!(plan_debit(&che1(), 50, 20).unwrap(), 30);
        assert_eq!(plan_debit(&che1(), 30, 30).unwrap(), 0);
    }

    #[test]
    fn plan_debit_rejects_overdraw() {
        let err = plan_debit(&che1(), 30, 40).unwrap_err();
        assert_eq!(err, DomainError::insufficient_stock("CHE0001", 30, 40));
    }

    #[test]
    fn plan_debit_rejects_overflow() {
        let err = plan_debit(&che1(), 0, i64::MIN).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn status_follows_return_time() {
        assert_eq!(entry(None).status(), UsageStatus::Active);
        assert_eq!(entry(Some(Utc::now())).status(), UsageStatus::Returned);
        assert_eq!(UsageStatus::Active.to_string(), "Active");
        assert_eq!(UsageStatus::Returned.to_string(), "Returned");
    }
}
