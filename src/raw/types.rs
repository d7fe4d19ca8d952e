//! Serde models of the availability and cost-range response tree.
//!
//! These mirror the backend payload field for field and stay permissive:
//! every field is optional, numbers may arrive as strings, and unknown keys are
//! kept in `extra`. Interpretation happens in the `availability` and
//! `cost_range` modules.

use crate::bitmask::bitmask_to_numbered_list;
use crate::types::{
    PayloadVersion, deserialize_flexible_bool, deserialize_one_or_many, deserialize_string_lossy,
    deserialize_string_or_number,
};
use serde::Deserialize;
use serde_json::{Map, Value};

/// --- Tree ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTicketTypeTree {
    #[serde(default, deserialize_with = "deserialize_one_or_many")]
    pub ticket_type: Vec<RawTicketType>,
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTicketType {
    #[serde(default, deserialize_with = "deserialize_string_lossy")]
    pub ticket_type_code: Option<String>,
    #[serde(default)]
    pub ticket_type_desc: Option<String>,
    #[serde(default, deserialize_with = "deserialize_one_or_many")]
    pub price_band: Vec<RawPriceBand>,
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPriceBand {
    #[serde(default, deserialize_with = "deserialize_string_lossy")]
    pub price_band_code: Option<String>,
    #[serde(default)]
    pub price_band_desc: Option<String>,
    /// Empty when the band carries no detail records at all.
    #[serde(default, deserialize_with = "deserialize_one_or_many")]
    pub avail_detail: Vec<RawAvailDetail>,
    #[serde(default)]
    pub cost_range: Option<RawCostRange>,
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

/// --- Quantities ---

/// Quantity fields shared by detail and cost-range records, in either payload shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuantities {
    #[serde(default)]
    pub valid_quantities: Option<Vec<u32>>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub valid_quantity_bitmask: Option<u64>,
    #[serde(default)]
    pub quantity_options: Option<RawQuantityOptions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuantityOptions {
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub valid_quantity_mask: Option<u64>,
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

impl RawQuantities {
    /// Shape of this record: nested `quantity_options` marks the newer payload.
    pub fn detected_version(&self) -> PayloadVersion {
        if self.quantity_options.is_some() {
            PayloadVersion::V2
        } else {
            PayloadVersion::V1
        }
    }

    /// Explicit list when present, otherwise the mask for `version` decoded from 1.
    pub fn resolve(&self, version: PayloadVersion) -> Vec<u32> {
        if let Some(quantities) = &self.valid_quantities {
            return quantities.clone();
        }
        let mask = match version {
            PayloadVersion::V1 => self.valid_quantity_bitmask,
            PayloadVersion::V2 => self
                .quantity_options
                .as_ref()
                .and_then(|options| options.valid_quantity_mask),
        };
        mask.map(|mask| bitmask_to_numbered_list(mask, 1))
            .unwrap_or_default()
    }
}

/// --- Availability ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAvailDetail {
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub seatprice: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub surcharge: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub full_seatprice: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub full_surcharge: Option<f64>,
    #[serde(default)]
    pub avail_currency_code: Option<String>,
    #[serde(default)]
    pub available_dates: Option<RawAvailableDates>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub available_weekdays_bitmask: Option<u32>,
    #[serde(flatten)]
    pub quantities: RawQuantities,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub cached_number_available: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub percentage_saving: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub absolute_saving: Option<f64>,
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAvailableDates {
    #[serde(default, deserialize_with = "deserialize_string_lossy")]
    pub first_yyyymmdd: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_lossy")]
    pub last_yyyymmdd: Option<String>,
    /// `year_<YYYY>` keys, each an object of `<mon>_bitmask` integers.
    #[serde(default, flatten)]
    pub periods: Map<String, Value>,
}

/// A single detail record that also names its ticket type and price band.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCalendarRecord {
    #[serde(default, deserialize_with = "deserialize_string_lossy")]
    pub ticket_type_code: Option<String>,
    #[serde(default)]
    pub ticket_type_desc: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_lossy")]
    pub price_band_code: Option<String>,
    #[serde(default)]
    pub price_band_desc: Option<String>,
    #[serde(flatten)]
    pub detail: RawAvailDetail,
}

/// --- Cost Ranges ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCostRange {
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub min_seatprice: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub max_seatprice: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub min_surcharge: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub max_surcharge: Option<f64>,
    #[serde(default)]
    pub range_currency_code: Option<String>,
    #[serde(flatten)]
    pub quantities: RawQuantities,
    #[serde(default, deserialize_with = "deserialize_flexible_bool")]
    pub singles: Option<bool>,
    #[serde(default)]
    pub best_value_offer: Option<RawOffer>,
    #[serde(default)]
    pub max_saving_offer: Option<RawOffer>,
    #[serde(default)]
    pub min_cost_offer: Option<RawOffer>,
    #[serde(default)]
    pub top_price_offer: Option<RawOffer>,
    #[serde(default)]
    pub no_singles_cost_range: Option<Box<RawCostRange>>,
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOffer {
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub offer_seatprice: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub offer_surcharge: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub full_seatprice: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub full_surcharge: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub absolute_saving: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub percentage_saving: Option<f64>,
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}
