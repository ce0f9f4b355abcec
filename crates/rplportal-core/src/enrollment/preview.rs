//! Grouping and counting of an offer's units for the enrollment preview.

use std::cmp::Ordering;

use crate::models::OfferUnit;
use crate::utils::cmp_ignore_case;

/// Group key for units without a group code
pub const UNGROUPED: &str = "ungrouped";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitGroup {
    pub key: String,
    pub units: Vec<OfferUnit>,
}

impl UnitGroup {
    pub fn is_ungrouped(&self) -> bool {
        self.key == UNGROUPED
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitPreview {
    /// Groups in order of first appearance
    pub groups: Vec<UnitGroup>,
    pub total: usize,
    pub core: usize,
    pub elective: usize,
}

impl UnitPreview {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

fn group_key(unit: &OfferUnit) -> &str {
    match unit.group_code.as_deref() {
        Some(code) if !code.is_empty() => code,
        _ => UNGROUPED,
    }
}

fn compare_units(a: &OfferUnit, b: &OfferUnit) -> Ordering {
    cmp_ignore_case(a.unit_type_str(), b.unit_type_str())
        .then_with(|| cmp_ignore_case(a.unit_code(), b.unit_code()))
}

/// Group units by group code, sort each group by type then code, and count
/// core and elective units.
pub fn build_preview(units: &[OfferUnit]) -> UnitPreview {
    let mut groups: Vec<UnitGroup> = Vec::new();
    for unit in units {
        let key = group_key(unit);
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.units.push(unit.clone()),
            None => groups.push(UnitGroup {
                key: key.to_string(),
                units: vec![unit.clone()],
            }),
        }
    }
    for group in &mut groups {
        group.units.sort_by(compare_units);
    }

    UnitPreview {
        groups,
        total: units.len(),
        core: units.iter().filter(|u| u.is_core()).count(),
        elective: units.iter().filter(|u| u.is_elective()).count(),
    }
}
