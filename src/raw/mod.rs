pub mod types;

pub use types::{
    RawAvailDetail, RawAvailableDates, RawCalendarRecord, RawCostRange, RawOffer, RawPriceBand,
    RawQuantities, RawQuantityOptions, RawTicketType, RawTicketTypeTree,
};
