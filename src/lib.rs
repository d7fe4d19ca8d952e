//! # ticketswitch
//!
//! Decoding core for the TicketSwitch ticketing API: turns availability and
//! cost-range payloads into typed, immutable values.
//!
//! ## Features
//!
//! - **Calendar availability**: per-day, per-month and per-weekday queries over the
//!   backend's compact bitmasks
//! - **Tree flattening**: ticket type → price band → detail trees become ordered lists
//! - **Cost ranges and offers**: min/max pricing with the best value, max saving,
//!   min cost and top price offers
//! - **Both payload shapes**: bare `valid_quantities` / `valid_quantity_bitmask` and nested
//!   `quantity_options` records decode into the same types
//! - **Forgiving input**: numeric strings, single-object lists and `null` lists are accepted
//!
//! The crate performs no I/O. Fetch the response with any transport, decode it into a
//! [`serde_json::Value`], then hand it over.
//!
//! ## Quick Start: Availability
//!
//! ```
//! use serde_json::json;
//! use ticketswitch::AvailabilityDetailsCollection;
//!
//! # fn run() -> Result<(), ticketswitch::TicketSwitchError> {
//! let response = json!({
//!     "ticket_type": [{
//!         "ticket_type_code": "CIRCLE",
//!         "ticket_type_desc": "Upper circle",
//!         "price_band": [{
//!             "price_band_code": "A",
//!             "avail_detail": [{
//!                 "seatprice": 25.0,
//!                 "surcharge": 2.5,
//!                 "avail_currency_code": "gbp",
//!                 "available_dates": {
//!                     "first_yyyymmdd": "20161201",
//!                     "last_yyyymmdd": "20161231",
//!                     "year_2016": {"dec_bitmask": 1065287163}
//!                 },
//!                 "available_weekdays_bitmask": 23,
//!                 "valid_quantity_bitmask": 126
//!             }]
//!         }]
//!     }]
//! });
//!
//! let availability = AvailabilityDetailsCollection::from_raw(&response)?;
//! let circle = &availability.as_slice()[0];
//! assert!(circle.is_available(2016, Some(12), Some(4))?);
//! assert!(!circle.is_available(2016, Some(12), Some(3))?);
//! assert!(circle.on_weekday(6));
//! assert_eq!(circle.valid_quantities(), &[2, 3, 4, 5, 6, 7]);
//! assert_eq!(circle.combined_price(), 27.5);
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```
//!
//! ## Quick Start: Cost Ranges
//!
//! ```
//! use serde_json::json;
//! use ticketswitch::CostRangeDetails;
//!
//! # fn run() -> Result<(), ticketswitch::TicketSwitchError> {
//! let response = json!({
//!     "ticket_type": [{
//!         "ticket_type_code": "STALLS",
//!         "price_band": [{
//!             "price_band_code": "B",
//!             "cost_range": {
//!                 "min_seatprice": 20.0,
//!                 "max_seatprice": 45.0,
//!                 "min_surcharge": 2.0,
//!                 "max_surcharge": 4.0,
//!                 "range_currency_code": "gbp",
//!                 "best_value_offer": {"offer_seatprice": 18.0, "full_seatprice": 20.0},
//!                 "no_singles_cost_range": {"min_seatprice": 30.0, "max_seatprice": 45.0}
//!             }
//!         }]
//!     }]
//! });
//!
//! let details = CostRangeDetails::from_raw(&response)?;
//! let range = details[0].cost_range();
//! assert_eq!(range.get_min_combined_price(), 22.0);
//! assert!(range.has_offer());
//! assert!(details[0].cost_range_no_singles().is_some());
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```
//!
//! ## Configuration
//!
//! Every `from_raw` has a `from_raw_with` counterpart taking a [`DecodeConfig`]:
//!
//! | Field | Default | Description |
//! |---|---|---|
//! | `payload_version` | `None` (detect) | Which quantity-mask location to read |
//! | `strict_price_ranges` | `false` | Reject cost ranges whose min exceeds max |
//!
//! ## Logging
//!
//! Decoding emits [`tracing`] events: `debug` per flattened tree, `trace` for
//! skipped calendar keys and unparseable dates, `warn` for reversed price ranges and
//! out-of-range masks. Install any subscriber to see them.

pub mod availability;
pub mod bitmask;
pub mod config;
pub mod cost_range;
pub mod error;
pub mod raw;
pub mod types;

pub use availability::{
    AvailabilityDetailsCollection, CalendarAvailability, CalendarAvailabilityBuilder, CalendarMask,
};
pub use bitmask::{bit_is_set, bitmask_to_numbered_list};
pub use config::DecodeConfig;
pub use cost_range::{CostRange, CostRangeDetails, Offer};
pub use error::{Result, TicketSwitchError};
pub use raw::types::*;
pub use types::*;
