//! RGBridge canonical field catalogue offered as mapping targets

use crate::api::MappingKind;

pub const AVAILABILITY_FIELDS: &[&str] = &[
    "HotelCode",
    "InvCode",
    "RatePlanCode",
    "Status",
    "BookingLimit",
    "Start",
    "End",
    "Mon",
    "Tue",
    "Weds",
    "Thur",
    "Fri",
    "Sat",
    "Sun",
    "MinLOS",
    "MaxLOS",
    "RestrictionStatus",
];

pub const RATE_FIELDS: &[&str] = &[
    "HotelCode",
    "InvCode",
    "RatePlanCode",
    "AmountBeforeTax",
    "AmountAfterTax",
    "CurrencyCode",
    "Start",
    "End",
    "NumberOfGuests",
    "CancelPolicy",
    "MealPlanCodes",
];

/// Candidate canonical fields for a dictionary; combined mode offers the union
pub fn candidates(kind: MappingKind, combined_mode: bool) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    let sources: &[&[&str]] = if combined_mode {
        &[AVAILABILITY_FIELDS, RATE_FIELDS]
    } else {
        match kind {
            MappingKind::Availability => &[AVAILABILITY_FIELDS],
            MappingKind::Rate => &[RATE_FIELDS],
        }
    };

    for field in sources.iter().flat_map(|s| s.iter()) {
        if !fields.iter().any(|f| f == field) {
            fields.push(field.to_string());
        }
    }
    fields
}
