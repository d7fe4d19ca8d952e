use crate::config::DecodeConfig;
use crate::error::{Result, TicketSwitchError};
use crate::raw::{RawCostRange, RawOffer, RawTicketTypeTree};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace, warn};

/// --- Offer ---

/// A discounted price alongside the price it replaces.
///
/// Saving figures are copied as sent; they are cached backend values and are
/// not recomputed from the prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Offer {
    seatprice: Option<f64>,
    surcharge: Option<f64>,
    original_seatprice: Option<f64>,
    original_surcharge: Option<f64>,
    absolute_saving: Option<f64>,
    percentage_saving: Option<f64>,
}

impl Offer {
    pub fn from_raw(data: &Value) -> Result<Self> {
        let raw = RawOffer::deserialize(data)?;
        Ok(Self::from_payload(&raw))
    }

    pub fn from_payload(raw: &RawOffer) -> Self {
        Self {
            seatprice: raw.offer_seatprice,
            surcharge: raw.offer_surcharge,
            original_seatprice: raw.full_seatprice,
            original_surcharge: raw.full_surcharge,
            absolute_saving: raw.absolute_saving,
            percentage_saving: raw.percentage_saving,
        }
    }

    pub fn seatprice(&self) -> Option<f64> {
        self.seatprice
    }

    pub fn surcharge(&self) -> Option<f64> {
        self.surcharge
    }

    pub fn original_seatprice(&self) -> Option<f64> {
        self.original_seatprice
    }

    pub fn original_surcharge(&self) -> Option<f64> {
        self.original_surcharge
    }

    pub fn absolute_saving(&self) -> Option<f64> {
        self.absolute_saving
    }

    pub fn percentage_saving(&self) -> Option<f64> {
        self.percentage_saving
    }

    pub fn combined_price(&self) -> f64 {
        self.seatprice.unwrap_or(0.0) + self.surcharge.unwrap_or(0.0)
    }

    pub fn original_combined_price(&self) -> f64 {
        self.original_seatprice.unwrap_or(0.0) + self.original_surcharge.unwrap_or(0.0)
    }
}

/// --- Cost Range ---

/// Cached minimum and maximum prices for a price band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostRange {
    min_seatprice: f64,
    max_seatprice: f64,
    min_surcharge: f64,
    max_surcharge: f64,
    currency: Option<String>,
    valid_quantities: Vec<u32>,
    allows_singles: bool,
    best_value_offer: Option<Offer>,
    max_saving_offer: Option<Offer>,
    min_cost_offer: Option<Offer>,
    top_price_offer: Option<Offer>,
}

impl CostRange {
    pub fn from_raw(data: &Value) -> Result<Self> {
        Self::from_raw_with(data, &DecodeConfig::default())
    }

    pub fn from_raw_with(data: &Value, config: &DecodeConfig) -> Result<Self> {
        let raw = RawCostRange::deserialize(data)?;
        Self::from_payload(&raw, config)
    }

    /// Builds the range from a payload record. A nested `no_singles_cost_range`
    /// is not read here; see [`CostRangeDetails`].
    ///
    /// # Errors
    ///
    /// [`TicketSwitchError::InconsistentRange`] when a minimum exceeds its maximum
    /// and `config.strict_price_ranges` is set.
    pub fn from_payload(raw: &RawCostRange, config: &DecodeConfig) -> Result<Self> {
        check_range("seatprice", raw.min_seatprice, raw.max_seatprice, config)?;
        check_range("surcharge", raw.min_surcharge, raw.max_surcharge, config)?;

        let version = config
            .payload_version
            .unwrap_or_else(|| raw.quantities.detected_version());
        trace!(version = %version, "resolving cost range quantities");

        Ok(Self {
            min_seatprice: raw.min_seatprice.unwrap_or(0.0),
            max_seatprice: raw.max_seatprice.unwrap_or(0.0),
            min_surcharge: raw.min_surcharge.unwrap_or(0.0),
            max_surcharge: raw.max_surcharge.unwrap_or(0.0),
            currency: raw.range_currency_code.clone(),
            valid_quantities: raw.quantities.resolve(version),
            allows_singles: raw.singles.unwrap_or(true),
            best_value_offer: raw.best_value_offer.as_ref().map(Offer::from_payload),
            max_saving_offer: raw.max_saving_offer.as_ref().map(Offer::from_payload),
            min_cost_offer: raw.min_cost_offer.as_ref().map(Offer::from_payload),
            top_price_offer: raw.top_price_offer.as_ref().map(Offer::from_payload),
        })
    }

    pub fn has_offer(&self) -> bool {
        self.best_value_offer.is_some()
            || self.max_saving_offer.is_some()
            || self.min_cost_offer.is_some()
            || self.top_price_offer.is_some()
    }

    pub fn get_min_combined_price(&self) -> f64 {
        self.min_seatprice + self.min_surcharge
    }

    pub fn get_max_combined_price(&self) -> f64 {
        self.max_seatprice + self.max_surcharge
    }

    pub fn min_seatprice(&self) -> f64 {
        self.min_seatprice
    }

    pub fn max_seatprice(&self) -> f64 {
        self.max_seatprice
    }

    pub fn min_surcharge(&self) -> f64 {
        self.min_surcharge
    }

    pub fn max_surcharge(&self) -> f64 {
        self.max_surcharge
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn valid_quantities(&self) -> &[u32] {
        &self.valid_quantities
    }

    pub fn allows_singles(&self) -> bool {
        self.allows_singles
    }

    pub fn best_value_offer(&self) -> Option<&Offer> {
        self.best_value_offer.as_ref()
    }

    pub fn max_saving_offer(&self) -> Option<&Offer> {
        self.max_saving_offer.as_ref()
    }

    pub fn min_cost_offer(&self) -> Option<&Offer> {
        self.min_cost_offer.as_ref()
    }

    pub fn top_price_offer(&self) -> Option<&Offer> {
        self.top_price_offer.as_ref()
    }
}

fn check_range(
    field: &'static str,
    min: Option<f64>,
    max: Option<f64>,
    config: &DecodeConfig,
) -> Result<()> {
    if let (Some(min), Some(max)) = (min, max)
        && min > max
    {
        if config.strict_price_ranges {
            return Err(TicketSwitchError::InconsistentRange { field, min, max });
        }
        warn!(field, min, max, "cost range minimum exceeds maximum");
    }
    Ok(())
}

/// --- Cost Range Details ---

/// Cost ranges for one ticket type / price band, with and without singles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostRangeDetails {
    ticket_type_code: Option<String>,
    ticket_type_description: Option<String>,
    price_band_code: Option<String>,
    price_band_description: Option<String>,
    cost_range: CostRange,
    cost_range_no_singles: Option<CostRange>,
}

impl CostRangeDetails {
    /// Flattens a ticket type tree. Price bands without a `cost_range` are skipped.
    pub fn from_raw(tree: &Value) -> Result<Vec<Self>> {
        Self::from_raw_with(tree, &DecodeConfig::default())
    }

    pub fn from_raw_with(tree: &Value, config: &DecodeConfig) -> Result<Vec<Self>> {
        let tree = RawTicketTypeTree::deserialize(tree)?;
        Self::from_payload(&tree, config)
    }

    pub fn from_payload(tree: &RawTicketTypeTree, config: &DecodeConfig) -> Result<Vec<Self>> {
        let mut details = Vec::new();
        for ticket_type in &tree.ticket_type {
            for price_band in &ticket_type.price_band {
                let Some(raw) = &price_band.cost_range else {
                    continue;
                };
                let cost_range_no_singles = raw
                    .no_singles_cost_range
                    .as_deref()
                    .map(|no_singles| CostRange::from_payload(no_singles, config))
                    .transpose()?;

                details.push(Self {
                    ticket_type_code: ticket_type.ticket_type_code.clone(),
                    ticket_type_description: ticket_type.ticket_type_desc.clone(),
                    price_band_code: price_band.price_band_code.clone(),
                    price_band_description: price_band.price_band_desc.clone(),
                    cost_range: CostRange::from_payload(raw, config)?,
                    cost_range_no_singles,
                });
            }
        }
        debug!(
            ticket_types = tree.ticket_type.len(),
            entries = details.len(),
            "flattened cost range tree"
        );
        Ok(details)
    }

    pub fn ticket_type_code(&self) -> Option<&str> {
        self.ticket_type_code.as_deref()
    }

    pub fn ticket_type_description(&self) -> Option<&str> {
        self.ticket_type_description.as_deref()
    }

    pub fn price_band_code(&self) -> Option<&str> {
        self.price_band_code.as_deref()
    }

    pub fn price_band_description(&self) -> Option<&str> {
        self.price_band_description.as_deref()
    }

    pub fn cost_range(&self) -> &CostRange {
        &self.cost_range
    }

    pub fn cost_range_no_singles(&self) -> Option<&CostRange> {
        self.cost_range_no_singles.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn missing_figures_default_to_zero() {
        let range = CostRange::from_raw(&json!({})).unwrap();
        assert_eq!(range.min_seatprice(), 0.0);
        assert_eq!(range.max_surcharge(), 0.0);
        assert!(range.currency().is_none());
        assert!(range.valid_quantities().is_empty());
        assert!(range.allows_singles());
        assert!(!range.has_offer());
    }

    #[test]
    fn singles_flag_accepts_strings() {
        let range = CostRange::from_raw(&json!({"singles": "no"})).unwrap();
        assert!(!range.allows_singles());
    }

    #[test]
    fn any_offer_slot_counts() {
        for slot in [
            "best_value_offer",
            "max_saving_offer",
            "min_cost_offer",
            "top_price_offer",
        ] {
            let range = CostRange::from_raw(&json!({ slot: {"offer_seatprice": 10} })).unwrap();
            assert!(range.has_offer(), "{slot} should count as an offer");
        }
    }

    #[test]
    fn reversed_range_warns_by_default() {
        let range = CostRange::from_raw(&json!({"min_seatprice": 50, "max_seatprice": 20}))
            .unwrap();
        assert_eq!(range.min_seatprice(), 50.0);
        assert_eq!(range.max_seatprice(), 20.0);
    }

    #[test]
    fn reversed_range_errors_when_strict() {
        let config = DecodeConfig::new().with_strict_price_ranges(true);
        let err = CostRange::from_raw_with(
            &json!({"min_surcharge": 5, "max_surcharge": 2}),
            &config,
        )
        .unwrap_err();
        match err {
            TicketSwitchError::InconsistentRange { field, min, max } => {
                assert_eq!(field, "surcharge");
                assert_eq!(min, 5.0);
                assert_eq!(max, 2.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn one_sided_range_is_not_checked() {
        let config = DecodeConfig::new().with_strict_price_ranges(true);
        let range = CostRange::from_raw_with(&json!({"min_seatprice": 50}), &config).unwrap();
        assert_eq!(range.max_seatprice(), 0.0);
    }

    #[test]
    fn offer_maps_full_prices_to_originals() {
        let offer = Offer::from_raw(&json!({
            "offer_seatprice": 25,
            "offer_surcharge": 2.5,
            "full_seatprice": 30,
            "full_surcharge": 3,
            "absolute_saving": 5.5,
            "percentage_saving": 16
        }))
        .unwrap();
        assert_eq!(offer.seatprice(), Some(25.0));
        assert_eq!(offer.original_seatprice(), Some(30.0));
        assert_eq!(offer.original_surcharge(), Some(3.0));
        assert_eq!(offer.combined_price(), 27.5);
        assert_eq!(offer.original_combined_price(), 33.0);
        assert_eq!(offer.percentage_saving(), Some(16.0));
    }

    #[test]
    fn offer_savings_are_not_recomputed() {
        let offer = Offer::from_raw(&json!({
            "offer_seatprice": 25,
            "full_seatprice": 30,
            "absolute_saving": 99
        }))
        .unwrap();
        assert_eq!(offer.absolute_saving(), Some(99.0));
        assert!(offer.surcharge().is_none());
    }

    proptest! {
        #[test]
        fn combined_prices_sum_components(
            min_seat in 0.0f64..10_000.0,
            max_seat in 0.0f64..10_000.0,
            min_sur in 0.0f64..500.0,
            max_sur in 0.0f64..500.0,
        ) {
            let range = CostRange::from_raw(&json!({
                "min_seatprice": min_seat,
                "max_seatprice": max_seat,
                "min_surcharge": min_sur,
                "max_surcharge": max_sur,
            }))
            .unwrap();
            prop_assert_eq!(range.get_min_combined_price(), min_seat + min_sur);
            prop_assert_eq!(range.get_max_combined_price(), max_seat + max_sur);
        }
    }
}
