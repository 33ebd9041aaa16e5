use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use labinv_core::{DomainError, DomainResult, ItemId, ItemType};

use crate::usage::plan_debit;

/// Mutable attributes of a catalog item, as supplied by Add/Edit.
///
/// Optional text fields treat blank input as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFields {
    pub name: String,
    pub name_localized: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub unit: Option<String>,
    pub quantity: i64,
    pub manufacturer: Option<String>,
    pub model_number: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<String>,
    pub warranty_until: Option<String>,
    pub maintenance_contact: Option<String>,
    pub last_calibration: Option<String>,
    pub next_calibration: Option<String>,
    pub safety_classification: Option<String>,
    pub notes: Option<String>,
}

impl ItemFields {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
            ..Self::default()
        }
    }

    /// Check required fields and normalize whitespace.
    pub fn validate(mut self) -> DomainResult<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        if self.quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }

        for field in [
            &mut self.name_localized,
            &mut self.category,
            &mut self.location,
            &mut self.unit,
            &mut self.manufacturer,
            &mut self.model_number,
            &mut self.serial_number,
            &mut self.purchase_date,
            &mut self.warranty_until,
            &mut self.maintenance_contact,
            &mut self.last_calibration,
            &mut self.next_calibration,
            &mut self.safety_classification,
            &mut self.notes,
        ] {
            *field = normalize_optional(field.take());
        }

        Ok(self)
    }
}

/// Parse a user-entered quantity: required, whole, non-negative.
pub fn parse_quantity(raw: &str) -> DomainResult<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DomainError::validation("quantity is required"));
    }
    let quantity = raw
        .parse::<i64>()
        .map_err(|_| DomainError::validation(format!("quantity '{raw}' is not a whole number")))?;
    if quantity < 0 {
        return Err(DomainError::validation("quantity cannot be negative"));
    }
    Ok(quantity)
}

pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A catalog record for one lab asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    item_type: ItemType,
    fields: ItemFields,
    last_updated: DateTime<Utc>,
}

impl Item {
    /// Create a new item from validated input.
    pub fn create(
        id: ItemId,
        item_type: ItemType,
        fields: ItemFields,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if id.item_type() != item_type {
            return Err(DomainError::invalid_id(format!(
                "{id} does not carry the {item_type} prefix"
            )));
        }
        Ok(Self {
            id,
            item_type,
            fields: fields.validate()?,
            last_updated: now,
        })
    }

    /// Rehydrate a stored item without re-validating it.
    pub fn restore(
        id: ItemId,
        item_type: ItemType,
        fields: ItemFields,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            item_type,
            fields,
            last_updated,
        }
    }

    pub fn id_typed(&self) -> &ItemId {
        &self.id
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    pub fn fields(&self) -> &ItemFields {
        &self.fields
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn quantity(&self) -> i64 {
        self.fields.quantity
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Overwrite every mutable field, quantity included. The type never changes.
    pub fn edit(&mut self, fields: ItemFields, now: DateTime<Utc>) -> DomainResult<()> {
        self.fields = fields.validate()?;
        self.last_updated = now;
        Ok(())
    }

    /// Debit `quantity_changed` from stock and return the new quantity.
    ///
    /// Leaves the item untouched when the debit is rejected.
    pub fn apply_usage(&mut self, quantity_changed: i64) -> DomainResult<i64> {
        if quantity_changed == 0 {
            return Err(DomainError::validation("quantity changed cannot be zero"));
        }
        let new_quantity = plan_debit(&self.id, self.fields.quantity, quantity_changed)?;
        self.fields.quantity = new_quantity;
        Ok(new_quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn ethanol(quantity: i64) -> Item {
        Item::create(
            ItemId::compose(ItemType::Chemical, 1),
            ItemType::Chemical,
            ItemFields::new("Ethanol", quantity),
            now(),
        )
        .unwrap()
    }

    #[test]
    fn create_trims_and_drops_blank_optionals() {
        let fields = ItemFields {
            name: "  Centrifuge ".to_string(),
            category: Some("   ".to_string()),
            location: Some(" Room 2 ".to_string()),
            quantity: 1,
            ..ItemFields::default()
        };
        let item = Item::create(
            ItemId::compose(ItemType::Equipment, 1),
            ItemType::Equipment,
            fields,
            now(),
        )
        .unwrap();

        assert_eq!(item.name(), "Centrifuge");
        assert_eq!(item.fields().category, None);
        assert_eq!(item.fields().location.as_deref(), Some("Room 2"));
    }

    #[test]
    fn create_rejects_empty_name_and_negative_quantity() {
        let id = ItemId::compose(ItemType::Other, 1);
        let err = Item::create(id.clone(), ItemType::Other, ItemFields::new("  ", 1), now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = Item::create(id, ItemType::Other, ItemFields::new("Gloves", -1), now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn create_rejects_id_of_another_type() {
        let err = Item::create(
            ItemId::compose(ItemType::Equipment, 1),
            ItemType::Chemical,
            ItemFields::new("Ethanol", 1),
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
    }

    #[test]
    fn parse_quantity_accepts_only_non_negative_integers() {
        assert_eq!(parse_quantity(" 12 ").unwrap(), 12);
        assert_eq!(parse_quantity("0").unwrap(), 0);
        for bad in ["", "  ", "-1", "1.5", "ten"] {
            assert!(
                matches!(parse_quantity(bad), Err(DomainError::Validation(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn edit_overwrites_quantity_and_refreshes_timestamp() {
        let mut item = ethanol(50);
        let before = item.last_updated();
        let later = before + chrono::Duration::seconds(5);

        item.edit(ItemFields::new("Ethanol 96%", 7), later).unwrap();

        assert_eq!(item.name(), "Ethanol 96%");
        assert_eq!(item.quantity(), 7);
        assert_eq!(item.last_updated(), later);
        assert_eq!(item.item_type(), ItemType::Chemical);
    }

    #[test]
    fn failed_edit_keeps_previous_state() {
        let mut item = ethanol(50);
        let snapshot = item.clone();
        assert!(item.edit(ItemFields::new("", 3), now()).is_err());
        assert_eq!(item, snapshot);
    }

    #[test]
    fn apply_usage_debits_and_rejects_overdraw() {
        let mut item = ethanol(50);
        assert_eq!(item.apply_usage(20).unwrap(), 30);

        let err = item.apply_usage(40).unwrap_err();
        assert_eq!(err, DomainError::insufficient_stock("CHE0001", 30, 40));
        assert_eq!(item.quantity(), 30);

        assert!(matches!(item.apply_usage(0), Err(DomainError::Validation(_))));
    }

    #[test]
    fn negative_usage_restocks() {
        let mut item = ethanol(5);
        assert_eq!(item.apply_usage(-10).unwrap(), 15);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Edit(i64),
        Usage(i64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (-20i64..200).prop_map(Op::Edit),
            (-50i64..120).prop_map(Op::Usage),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: no sequence of edits and usage events leaves stock negative,
        /// and every accepted debit subtracts exactly what was requested.
        #[test]
        fn quantity_never_goes_negative(
            initial in 0i64..100,
            ops in prop::collection::vec(op(), 0..40)
        ) {
            let mut item = ethanol(initial);

            for op in ops {
                let before = item.quantity();
                match op {
                    Op::Edit(q) => {
                        let res = item.edit(ItemFields::new("Ethanol", q), now());
                        if q < 0 {
                            prop_assert!(res.is_err());
                            prop_assert_eq!(item.quantity(), before);
                        } else {
                            prop_assert_eq!(item.quantity(), q);
                        }
                    }
                    Op::Usage(q) => match item.apply_usage(q) {
                        Ok(after) => {
                            prop_assert_eq!(after, before - q);
                            prop_assert_eq!(item.quantity(), after);
                        }
                        Err(_) => {
                            prop_assert!(q == 0 || before - q < 0);
                            prop_assert_eq!(item.quantity(), before);
                        }
                    },
                }
                prop_assert!(item.quantity() >= 0);
            }
        }
    }
}
