//! Cost range flattening over whole responses.

use serde_json::{Value, json};
use ticketswitch::{
    AvailabilityDetailsCollection, CostRange, CostRangeDetails, DecodeConfig, TicketSwitchError,
};

fn response() -> Value {
    json!({
        "ticket_type": [
            {
                "ticket_type_code": "STALLS",
                "ticket_type_desc": "Stalls",
                "price_band": [
                    {
                        "price_band_code": "A",
                        "price_band_desc": "Premium",
                        "avail_detail": [{"seatprice": 45.0, "surcharge": 4.0}],
                        "cost_range": {
                            "min_seatprice": 45.0,
                            "max_seatprice": 65.0,
                            "min_surcharge": 4.0,
                            "max_surcharge": 6.0,
                            "range_currency_code": "gbp",
                            "valid_quantities": [1, 2, 3, 4],
                            "max_saving_offer": {
                                "offer_seatprice": 50.0,
                                "full_seatprice": 65.0,
                                "absolute_saving": 15.0,
                                "percentage_saving": 23
                            },
                            "no_singles_cost_range": {
                                "min_seatprice": 40.0,
                                "max_seatprice": 60.0,
                                "singles": false,
                                "quantity_options": {"valid_quantity_mask": 10}
                            }
                        }
                    },
                    {
                        "price_band_code": "B",
                        "avail_detail": [{"seatprice": 30.0, "surcharge": 3.0}]
                    }
                ]
            },
            {
                "ticket_type_code": "CIRCLE",
                "ticket_type_desc": "Circle",
                "price_band": {
                    "price_band_code": "C",
                    "cost_range": {
                        "min_seatprice": "20.00",
                        "max_seatprice": "20.00",
                        "quantity_options": {"valid_quantity_mask": 126}
                    }
                }
            }
        ]
    })
}

// ============================================================================
// Flattening Tests
// ============================================================================

#[test]
fn bands_without_cost_range_are_skipped() {
    let details = CostRangeDetails::from_raw(&response()).unwrap();

    let codes: Vec<_> = details
        .iter()
        .map(|d| (d.ticket_type_code(), d.price_band_code()))
        .collect();
    assert_eq!(
        codes,
        vec![(Some("STALLS"), Some("A")), (Some("CIRCLE"), Some("C"))]
    );
}

#[test]
fn band_without_cost_range_still_has_availability() {
    let availability = AvailabilityDetailsCollection::from_raw(&response()).unwrap();
    let details = CostRangeDetails::from_raw(&response()).unwrap();

    let has_band_b = |code: Option<&str>| code == Some("B");
    assert_eq!(
        availability
            .iter()
            .filter(|e| has_band_b(e.price_band_code()))
            .count(),
        1
    );
    assert_eq!(
        details
            .iter()
            .filter(|d| has_band_b(d.price_band_code()))
            .count(),
        0
    );
}

#[test]
fn no_singles_range_is_attached() {
    let details = CostRangeDetails::from_raw(&response()).unwrap();
    let premium = &details[0];

    assert_eq!(premium.ticket_type_description(), Some("Stalls"));
    assert_eq!(premium.price_band_description(), Some("Premium"));

    let singles = premium.cost_range();
    assert!(singles.allows_singles());
    assert_eq!(singles.valid_quantities(), &[1, 2, 3, 4]);
    assert_eq!(singles.currency(), Some("gbp"));
    assert_eq!(singles.get_min_combined_price(), 49.0);
    assert_eq!(singles.get_max_combined_price(), 71.0);

    let no_singles = premium.cost_range_no_singles().unwrap();
    assert!(!no_singles.allows_singles());
    assert_eq!(no_singles.valid_quantities(), &[2, 4]);
    assert_eq!(no_singles.min_surcharge(), 0.0);
    assert!(!no_singles.has_offer());

    assert!(details[1].cost_range_no_singles().is_none());
}

#[test]
fn offers_are_mapped_per_slot() {
    let details = CostRangeDetails::from_raw(&response()).unwrap();
    let range = details[0].cost_range();

    assert!(range.has_offer());
    assert!(range.best_value_offer().is_none());
    assert!(range.min_cost_offer().is_none());
    assert!(range.top_price_offer().is_none());

    let offer = range.max_saving_offer().unwrap();
    assert_eq!(offer.seatprice(), Some(50.0));
    assert_eq!(offer.original_seatprice(), Some(65.0));
    assert_eq!(offer.absolute_saving(), Some(15.0));
    assert_eq!(offer.percentage_saving(), Some(23.0));
}

#[test]
fn string_prices_and_v2_quantities() {
    let details = CostRangeDetails::from_raw(&response()).unwrap();
    let circle = details[1].cost_range();

    assert_eq!(circle.min_seatprice(), 20.0);
    assert_eq!(circle.max_seatprice(), 20.0);
    assert_eq!(circle.valid_quantities(), &[2, 3, 4, 5, 6, 7]);
    assert!(circle.currency().is_none());
}

#[test]
fn empty_tree_yields_no_details() {
    assert!(CostRangeDetails::from_raw(&json!({"ticket_type": []}))
        .unwrap()
        .is_empty());
}

// ============================================================================
// Range Consistency Tests
// ============================================================================

fn reversed_response() -> Value {
    json!({
        "ticket_type": [{
            "ticket_type_code": "STALLS",
            "price_band": [{
                "price_band_code": "A",
                "cost_range": {
                    "min_seatprice": 30.0,
                    "max_seatprice": 40.0,
                    "no_singles_cost_range": {"min_seatprice": 45.0, "max_seatprice": 40.0}
                }
            }]
        }]
    })
}

#[test]
fn reversed_nested_range_is_trusted_by_default() {
    let details = CostRangeDetails::from_raw(&reversed_response()).unwrap();
    let no_singles = details[0].cost_range_no_singles().unwrap();
    assert!(no_singles.min_seatprice() > no_singles.max_seatprice());
}

#[test]
fn reversed_nested_range_fails_when_strict() {
    let config = DecodeConfig::new().with_strict_price_ranges(true);
    let err = CostRangeDetails::from_raw_with(&reversed_response(), &config).unwrap_err();
    assert!(matches!(
        err,
        TicketSwitchError::InconsistentRange {
            field: "seatprice",
            ..
        }
    ));
}

#[test]
fn cost_range_serializes_offers() {
    let range = CostRange::from_raw(&json!({
        "min_seatprice": 10,
        "best_value_offer": {"offer_seatprice": 8, "full_seatprice": 10}
    }))
    .unwrap();
    let value = serde_json::to_value(&range).unwrap();

    assert_eq!(value["allows_singles"], json!(true));
    assert_eq!(value["best_value_offer"]["original_seatprice"], json!(10.0));
    assert!(value["top_price_offer"].is_null());
}
