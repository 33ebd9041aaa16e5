//! Catalog search: case-insensitive substring match within one item type.

use labinv_core::ItemType;

use crate::item::Item;

/// Search over the catalog, scoped to a single item type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    item_type: ItemType,
    /// Lowercased term; `None` matches every item of the type.
    term: Option<String>,
}

impl ItemQuery {
    pub fn new(item_type: ItemType, term: &str) -> Self {
        let term = term.trim().to_lowercase();
        Self {
            item_type,
            term: (!term.is_empty()).then_some(term),
        }
    }

    /// Matches name, localized name, category, location and unit.
    pub fn matches(&self, item: &Item) -> bool {
        if item.item_type() != self.item_type {
            return false;
        }
        let Some(term) = &self.term else {
            return true;
        };

        let fields = item.fields();
        [
            Some(fields.name.as_str()),
            fields.name_localized.as_deref(),
            fields.category.as_deref(),
            fields.location.as_deref(),
            fields.unit.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(term.as_str()))
    }

    /// Filter `items` and order the hits by name.
    pub fn apply(&self, items: impl IntoIterator<Item = Item>) -> Vec<Item> {
        let mut hits: Vec<Item> = items.into_iter().filter(|i| self.matches(i)).collect();
        sort_by_name(&mut hits);
        hits
    }
}

/// Case-insensitive name order, id as tie-breaker.
pub fn sort_by_name(items: &mut [Item]) {
    items.sort_by(|a, b| {
        a.name()
            .to_lowercase()
            .cmp(&b.name().to_lowercase())
            .then_with(|| a.id_typed().cmp(b.id_typed()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemFields;
    use chrono::Utc;
    use labinv_core::ItemId;

    fn item(item_type: ItemType, seq: u32, fields: ItemFields) -> Item {
        Item::create(ItemId::compose(item_type, seq), item_type, fields, Utc::now()).unwrap()
    }

    fn catalog() -> Vec<Item> {
        vec![
            item(
                ItemType::Chemical,
                1,
                ItemFields {
                    name: "Ethanol".into(),
                    name_localized: Some("乙醇".into()),
                    location: Some("Cabinet A".into()),
                    unit: Some("mL".into()),
                    quantity: 50,
                    ..ItemFields::default()
                },
            ),
            item(
                ItemType::Chemical,
                2,
                ItemFields {
                    name: "agarose".into(),
                    category: Some("Gel".into()),
                    quantity: 3,
                    ..ItemFields::default()
                },
            ),
            item(ItemType::Equipment, 1, ItemFields::new("Ethanol dispenser", 1)),
        ]
    }

    #[test]
    fn empty_term_returns_whole_type_sorted_by_name() {
        let hits = ItemQuery::new(ItemType::Chemical, "   ").apply(catalog());
        let names: Vec<_> = hits.iter().map(|i| i.name()).collect();
        assert_eq!(names, ["agarose", "Ethanol"]);
    }

    #[test]
    fn term_is_case_insensitive_and_type_scoped() {
        let hits = ItemQuery::new(ItemType::Chemical, "ETHA").apply(catalog());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id_typed().as_str(), "CHE0001");
    }

    #[test]
    fn term_matches_secondary_fields() {
        let q = |t| ItemQuery::new(ItemType::Chemical, t).apply(catalog()).len();
        assert_eq!(q("乙醇"), 1);
        assert_eq!(q("gel"), 1);
        assert_eq!(q("cabinet"), 1);
        assert_eq!(q("ml"), 1);
        assert_eq!(q("nothing-like-this"), 0);
    }

    #[test]
    fn manufacturer_is_not_searched() {
        let mut items = catalog();
        items.push(item(
            ItemType::Chemical,
            3,
            ItemFields {
                name: "Tris".into(),
                manufacturer: Some("Sigma".into()),
                quantity: 1,
                ..ItemFields::default()
            },
        ));
        assert!(ItemQuery::new(ItemType::Chemical, "sigma").apply(items).is_empty());
    }
}
