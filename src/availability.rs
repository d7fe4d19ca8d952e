//! Calendar availability for ticket type / price band combinations.
//!
//! The backend reports availability as per-month day bitmasks nested under
//! `available_dates.year_<YYYY>.<mon>_bitmask`, plus a 7-bit weekday mask and a
//! quantity mask. [`CalendarAvailability`] decodes one such record and answers
//! date, weekday and quantity queries against it;
//! [`AvailabilityDetailsCollection`] flattens a whole ticket type tree.

use crate::bitmask::{bit_is_set, bitmask_to_numbered_list};
use crate::config::DecodeConfig;
use crate::error::{Result, TicketSwitchError};
use crate::raw::{RawAvailDetail, RawCalendarRecord, RawTicketTypeTree};
use crate::types::month_from_abbreviation;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

const WEEKDAY_BITS: u32 = 0x7f;

/// --- Calendar Mask ---

/// Year → month (1-12) → day mask, where bit `i` flags day `i + 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CalendarMask(BTreeMap<i32, BTreeMap<u32, u32>>);

impl CalendarMask {
    fn from_periods(periods: &Map<String, Value>) -> Self {
        let mut years = BTreeMap::new();
        for (key, months) in periods {
            let Some(year) = key
                .strip_prefix("year_")
                .and_then(|year| year.parse::<i32>().ok())
            else {
                trace!(key = %key, "skipping non-calendar key in available_dates");
                continue;
            };
            let masks = years.entry(year).or_insert_with(BTreeMap::new);
            let Some(months) = months.as_object() else {
                trace!(year, "calendar year is not an object, keeping it without months");
                continue;
            };

            for (month_key, mask) in months {
                let Some(month) = month_key
                    .strip_suffix("_bitmask")
                    .and_then(month_from_abbreviation)
                else {
                    trace!(year, key = %month_key, "skipping unrecognised month key");
                    continue;
                };
                match month_mask_value(mask) {
                    Some(mask) => {
                        masks.insert(month, mask);
                    }
                    None => warn!(year, month, value = %mask, "month mask is not a 32-bit integer"),
                }
            }
        }
        Self(years)
    }

    pub fn month_mask(&self, year: i32, month: u32) -> Option<u32> {
        self.0.get(&year)?.get(&month).copied()
    }

    pub fn contains_year(&self, year: i32) -> bool {
        self.0.contains_key(&year)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.keys().copied()
    }

    /// `(year, month, mask)` triples in calendar order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, u32, u32)> + '_ {
        self.0.iter().flat_map(|(&year, months)| {
            months
                .iter()
                .map(move |(&month, &mask)| (year, month, mask))
        })
    }
}

fn month_mask_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|mask| u32::try_from(mask).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Parses an 8-digit `YYYYMMDD` string. The all-zero sentinel and anything
/// else that is not a real date yield `None`.
fn parse_yyyymmdd(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.len() != 8 || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        trace!(value = text, "ignoring malformed yyyymmdd date");
        return None;
    }
    let year = text[..4].parse().ok()?;
    let month = text[4..6].parse().ok()?;
    let day = text[6..].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day);
    if date.is_none() {
        trace!(value = text, "ignoring yyyymmdd value that is not a calendar date");
    }
    date
}

fn checked_weekday_mask(raw: u32) -> u32 {
    if raw > WEEKDAY_BITS {
        warn!(mask = raw, "weekday mask has bits above Saturday, queries ignore them");
    }
    raw
}

/// --- Calendar Availability ---

/// Pricing and availability for one ticket type / price band pricing tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarAvailability {
    ticket_type_code: Option<String>,
    ticket_type_description: Option<String>,
    price_band_code: Option<String>,
    price_band_description: Option<String>,
    seatprice: Option<f64>,
    surcharge: Option<f64>,
    full_seatprice: Option<f64>,
    full_surcharge: Option<f64>,
    currency: Option<String>,
    first_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
    calendar: CalendarMask,
    weekday_mask: Option<u32>,
    valid_quantities: Vec<u32>,
    cached_number_available: Option<u32>,
    absolute_saving: Option<f64>,
    percentage_saving: Option<f64>,
}

impl CalendarAvailability {
    /// Decodes a single detail record. Ticket type and price band identifiers
    /// are read from the same object when present.
    pub fn from_raw(data: &Value) -> Result<Self> {
        Self::from_raw_with(data, &DecodeConfig::default())
    }

    pub fn from_raw_with(data: &Value, config: &DecodeConfig) -> Result<Self> {
        let record = RawCalendarRecord::deserialize(data)?;
        Ok(CalendarAvailabilityBuilder::new()
            .ticket_type(record.ticket_type_code, record.ticket_type_desc)
            .price_band(record.price_band_code, record.price_band_desc)
            .detail(&record.detail, config)
            .build())
    }

    pub fn builder() -> CalendarAvailabilityBuilder {
        CalendarAvailabilityBuilder::new()
    }

    /// Checks availability at year, month or day granularity.
    ///
    /// Year and month queries only test whether the backend reported the period
    /// at all: a present key means *some* availability within it, not that every
    /// day is free. A `year_<YYYY>` key counts even when it lists no months.
    /// Day queries read the day's bit.
    ///
    /// # Errors
    ///
    /// [`TicketSwitchError::InvalidArgument`] when `day` is given without `month`.
    pub fn is_available(&self, year: i32, month: Option<u32>, day: Option<u32>) -> Result<bool> {
        if day.is_some() && month.is_none() {
            return Err(TicketSwitchError::InvalidArgument(
                "is_available: a day requires a month".to_string(),
            ));
        }
        let Some(months) = self.calendar.0.get(&year) else {
            return Ok(false);
        };
        let Some(month) = month else {
            return Ok(true);
        };
        let Some(&mask) = months.get(&month) else {
            return Ok(false);
        };
        Ok(match day {
            None => true,
            Some(day) => day_is_set(mask, day),
        })
    }

    pub fn is_available_on(&self, date: NaiveDate) -> bool {
        self.calendar
            .month_mask(date.year(), date.month())
            .is_some_and(|mask| day_is_set(mask, date.day()))
    }

    pub fn get_month_mask(&self, year: i32, month: u32) -> u32 {
        self.calendar.month_mask(year, month).unwrap_or(0)
    }

    /// `day` counts from Monday (0) to Sunday (6). The payload mask has Sunday
    /// at bit 0, so Monday reads bit 1 and Sunday wraps to bit 0.
    ///
    /// Days past 6 and records without a weekday mask are never available.
    pub fn on_weekday(&self, day: u32) -> bool {
        let Some(mask) = self.weekday_mask else {
            return false;
        };
        if day > 6 {
            return false;
        }
        let adjusted = if day < 6 { day + 1 } else { 0 };
        bit_is_set(u64::from(mask), adjusted)
    }

    pub fn on_chrono_weekday(&self, weekday: Weekday) -> bool {
        self.on_weekday(weekday.num_days_from_monday())
    }

    /// Every date flagged in the calendar, ascending. Bits that do not name a
    /// real day of their month are skipped.
    pub fn available_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.calendar.iter().flat_map(|(year, month, mask)| {
            bitmask_to_numbered_list(u64::from(mask), 1)
                .into_iter()
                .filter_map(move |day| NaiveDate::from_ymd_opt(year, month, day))
        })
    }

    pub fn combined_price(&self) -> f64 {
        self.seatprice.unwrap_or(0.0) + self.surcharge.unwrap_or(0.0)
    }

    pub fn combined_full_price(&self) -> f64 {
        self.full_seatprice.unwrap_or(0.0) + self.full_surcharge.unwrap_or(0.0)
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

    pub fn seatprice(&self) -> Option<f64> {
        self.seatprice
    }

    pub fn surcharge(&self) -> Option<f64> {
        self.surcharge
    }

    pub fn full_seatprice(&self) -> Option<f64> {
        self.full_seatprice
    }

    pub fn full_surcharge(&self) -> Option<f64> {
        self.full_surcharge
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.first_date
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.last_date
    }

    pub fn calendar(&self) -> &CalendarMask {
        &self.calendar
    }

    /// The weekday mask as sent, including any bits above Saturday.
    pub fn weekday_mask(&self) -> Option<u32> {
        self.weekday_mask
    }

    pub fn valid_quantities(&self) -> &[u32] {
        &self.valid_quantities
    }

    pub fn cached_number_available(&self) -> Option<u32> {
        self.cached_number_available
    }

    pub fn absolute_saving(&self) -> Option<f64> {
        self.absolute_saving
    }

    pub fn percentage_saving(&self) -> Option<f64> {
        self.percentage_saving
    }
}

fn day_is_set(mask: u32, day: u32) -> bool {
    day.checked_sub(1)
        .is_some_and(|index| bit_is_set(u64::from(mask), index))
}

/// Accumulates one record's fields during a tree walk; [`build`](Self::build)
/// produces the finished value.
#[derive(Debug, Clone, Default)]
pub struct CalendarAvailabilityBuilder {
    ticket_type_code: Option<String>,
    ticket_type_description: Option<String>,
    price_band_code: Option<String>,
    price_band_description: Option<String>,
    seatprice: Option<f64>,
    surcharge: Option<f64>,
    full_seatprice: Option<f64>,
    full_surcharge: Option<f64>,
    currency: Option<String>,
    first_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
    calendar: CalendarMask,
    weekday_mask: Option<u32>,
    valid_quantities: Vec<u32>,
    cached_number_available: Option<u32>,
    absolute_saving: Option<f64>,
    percentage_saving: Option<f64>,
}

impl CalendarAvailabilityBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket_type(mut self, code: Option<String>, description: Option<String>) -> Self {
        self.ticket_type_code = code;
        self.ticket_type_description = description;
        self
    }

    pub fn price_band(mut self, code: Option<String>, description: Option<String>) -> Self {
        self.price_band_code = code;
        self.price_band_description = description;
        self
    }

    /// Applies a detail record. Prices missing from a present record read as `0.0`.
    pub fn detail(mut self, detail: &RawAvailDetail, config: &DecodeConfig) -> Self {
        self.seatprice = Some(detail.seatprice.unwrap_or(0.0));
        self.surcharge = Some(detail.surcharge.unwrap_or(0.0));
        self.full_seatprice = Some(detail.full_seatprice.unwrap_or(0.0));
        self.full_surcharge = Some(detail.full_surcharge.unwrap_or(0.0));
        self.currency = detail.avail_currency_code.clone();

        if let Some(dates) = &detail.available_dates {
            self.first_date = dates.first_yyyymmdd.as_deref().and_then(parse_yyyymmdd);
            self.last_date = dates.last_yyyymmdd.as_deref().and_then(parse_yyyymmdd);
            self.calendar = CalendarMask::from_periods(&dates.periods);
        }

        self.weekday_mask = detail.available_weekdays_bitmask.map(checked_weekday_mask);

        let version = config
            .payload_version
            .unwrap_or_else(|| detail.quantities.detected_version());
        trace!(version = %version, "resolving detail quantities");
        self.valid_quantities = detail.quantities.resolve(version);

        self.cached_number_available = detail.cached_number_available;
        self.absolute_saving = detail.absolute_saving;
        self.percentage_saving = detail.percentage_saving;
        self
    }

    pub fn build(self) -> CalendarAvailability {
        let (first_date, last_date) = match (self.first_date, self.last_date) {
            (Some(first), Some(last)) if first > last => {
                warn!(%first, %last, "availability window is reversed, swapping bounds");
                (Some(last), Some(first))
            }
            bounds => bounds,
        };

        CalendarAvailability {
            ticket_type_code: self.ticket_type_code,
            ticket_type_description: self.ticket_type_description,
            price_band_code: self.price_band_code,
            price_band_description: self.price_band_description,
            seatprice: self.seatprice,
            surcharge: self.surcharge,
            full_seatprice: self.full_seatprice,
            full_surcharge: self.full_surcharge,
            currency: self.currency,
            first_date,
            last_date,
            calendar: self.calendar,
            weekday_mask: self.weekday_mask,
            valid_quantities: self.valid_quantities,
            cached_number_available: self.cached_number_available,
            absolute_saving: self.absolute_saving,
            percentage_saving: self.percentage_saving,
        }
    }
}

/// --- Collection ---

/// Every pricing tier of a ticket type tree, ordered by ticket type
/// description then combined price.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AvailabilityDetailsCollection {
    entries: Vec<CalendarAvailability>,
}

impl AvailabilityDetailsCollection {
    pub fn from_raw(tree: &Value) -> Result<Self> {
        Self::from_raw_with(tree, &DecodeConfig::default())
    }

    pub fn from_raw_with(tree: &Value, config: &DecodeConfig) -> Result<Self> {
        let tree = RawTicketTypeTree::deserialize(tree)?;
        Ok(Self::from_payload(&tree, config))
    }

    /// Walks ticket types, then price bands, then detail records. A band with
    /// no detail records still yields one entry, with pricing left unset.
    pub fn from_payload(tree: &RawTicketTypeTree, config: &DecodeConfig) -> Self {
        let mut entries = Vec::new();
        for ticket_type in &tree.ticket_type {
            for price_band in &ticket_type.price_band {
                let band = CalendarAvailabilityBuilder::new()
                    .ticket_type(
                        ticket_type.ticket_type_code.clone(),
                        ticket_type.ticket_type_desc.clone(),
                    )
                    .price_band(
                        price_band.price_band_code.clone(),
                        price_band.price_band_desc.clone(),
                    );

                if price_band.avail_detail.is_empty() {
                    entries.push(band.build());
                    continue;
                }
                for detail in &price_band.avail_detail {
                    entries.push(band.clone().detail(detail, config).build());
                }
            }
        }

        // Stable, so equal keys keep traversal order.
        entries.sort_by(display_order);
        debug!(
            ticket_types = tree.ticket_type.len(),
            entries = entries.len(),
            "flattened availability tree"
        );
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CalendarAvailability> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[CalendarAvailability] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<CalendarAvailability> {
        self.entries
    }

    pub fn for_ticket_type<'a>(
        &'a self,
        code: &'a str,
    ) -> impl Iterator<Item = &'a CalendarAvailability> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.ticket_type_code() == Some(code))
    }

    /// The first priced entry with the lowest combined price.
    pub fn cheapest(&self) -> Option<&CalendarAvailability> {
        self.entries
            .iter()
            .filter(|entry| entry.seatprice.is_some())
            .min_by(|a, b| a.combined_price().total_cmp(&b.combined_price()))
    }
}

fn display_order(a: &CalendarAvailability, b: &CalendarAvailability) -> Ordering {
    a.ticket_type_description
        .cmp(&b.ticket_type_description)
        .then_with(|| a.combined_price().total_cmp(&b.combined_price()))
}

impl IntoIterator for AvailabilityDetailsCollection {
    type Item = CalendarAvailability;
    type IntoIter = std::vec::IntoIter<CalendarAvailability>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a AvailabilityDetailsCollection {
    type Item = &'a CalendarAvailability;
    type IntoIter = std::slice::Iter<'a, CalendarAvailability>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
