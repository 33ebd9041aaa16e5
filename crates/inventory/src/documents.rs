//! Read-only document data derived from catalog records: QR payloads and
//! equipment cover sheets. Rendering to images or PDF happens elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use labinv_core::ItemId;

use crate::item::Item;

/// Who owns the inventory, as printed on labels and cover sheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabIdentity {
    pub name: String,
    pub organization: Option<String>,
}

impl LabIdentity {
    pub fn new(name: impl Into<String>, organization: Option<String>) -> Self {
        Self {
            name: name.into(),
            organization: organization.filter(|o| !o.trim().is_empty()),
        }
    }

    /// `<name>-<organization>`, or just the name.
    pub fn display_name(&self) -> String {
        match &self.organization {
            Some(org) => format!("{}-{}", self.name, org),
            None => self.name.clone(),
        }
    }
}

/// Text encoded into an item's QR label.
pub fn qr_payload(item_id: &ItemId, lab: &LabIdentity) -> String {
    format!("Item ID: {item_id}\nProperty of {}", lab.display_name())
}

/// Labels of the cover sheet's information table, in print order.
pub const COVER_SHEET_FIELDS: [&str; 10] = [
    "Manufacturer",
    "Model Number",
    "Serial Number",
    "Location",
    "Purchase Date",
    "Warranty Until",
    "Maintenance Contact",
    "Last Calibration",
    "Next Calibration",
    "Safety Classification",
];

/// Fixed layout of a single item's cover sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverSheet {
    pub title: String,
    pub lab_lines: Vec<String>,
    pub rows: Vec<(String, Option<String>)>,
    pub generated_at: DateTime<Utc>,
}

impl CoverSheet {
    pub fn for_item(item: &Item, lab: &LabIdentity, generated_at: DateTime<Utc>) -> Self {
        let f = item.fields();
        let values = [
            &f.manufacturer,
            &f.model_number,
            &f.serial_number,
            &f.location,
            &f.purchase_date,
            &f.warranty_until,
            &f.maintenance_contact,
            &f.last_calibration,
            &f.next_calibration,
            &f.safety_classification,
        ];

        let rows = COVER_SHEET_FIELDS
            .iter()
            .zip(values)
            .map(|(label, value)| (label.to_string(), value.clone()))
            .collect();

        let mut lab_lines = vec![lab.name.clone()];
        lab_lines.extend(lab.organization.clone());

        Self {
            title: item.name().to_string(),
            lab_lines,
            rows,
            generated_at,
        }
    }

    pub fn footer(&self) -> String {
        format!(
            "Generated on : {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        )
    }

    /// Plain-text rendition of the sheet.
    pub fn render_text(&self) -> String {
        let width = COVER_SHEET_FIELDS.iter().map(|l| l.len()).max().unwrap_or(0);
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        for line in &self.lab_lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("\nInformation\n");
        for (label, value) in &self.rows {
            out.push_str(&format!(
                "{label:<width$}  {}\n",
                value.as_deref().unwrap_or("")
            ));
        }
        out.push('\n');
        out.push_str(&self.footer());
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemFields;
    use chrono::TimeZone;
    use labinv_core::ItemType;

    fn lab() -> LabIdentity {
        LabIdentity::new("DNA Virology Lab", Some("ICGEB China RRC".into()))
    }

    #[test]
    fn qr_payload_names_item_and_lab() {
        let id = ItemId::compose(ItemType::Equipment, 1);
        assert_eq!(
            qr_payload(&id, &lab()),
            "Item ID: EQ0001\nProperty of DNA Virology Lab-ICGEB China RRC"
        );
        let bare = LabIdentity::new("Lab 5", Some(" ".into()));
        assert_eq!(qr_payload(&id, &bare), "Item ID: EQ0001\nProperty of Lab 5");
    }

    #[test]
    fn cover_sheet_uses_fixed_row_order() {
        let fields = ItemFields {
            name: "PCR Machine".into(),
            manufacturer: Some("Bio-Rad".into()),
            location: Some("Room 101".into()),
            quantity: 1,
            ..ItemFields::default()
        };
        let item = Item::create(
            ItemId::compose(ItemType::Equipment, 1),
            ItemType::Equipment,
            fields,
            Utc::now(),
        )
        .unwrap();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();

        let sheet = CoverSheet::for_item(&item, &lab(), at);

        assert_eq!(sheet.title, "PCR Machine");
        assert_eq!(sheet.lab_lines, ["DNA Virology Lab", "ICGEB China RRC"]);
        let labels: Vec<_> = sheet.rows.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, COVER_SHEET_FIELDS);
        assert_eq!(sheet.rows[0].1.as_deref(), Some("Bio-Rad"));
        assert_eq!(sheet.rows[3].1.as_deref(), Some("Room 101"));
        assert_eq!(sheet.rows[1].1, None);
        assert_eq!(sheet.footer(), "Generated on : 2024-05-01 09:30:00");

        let text = sheet.render_text();
        assert!(text.starts_with("PCR Machine\nDNA Virology Lab\nICGEB China RRC\n"));
        assert!(text.contains("Bio-Rad"));
    }
}
