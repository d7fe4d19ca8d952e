use crate::types::PayloadVersion;

/// Decoding policy shared by every `from_raw_with` constructor.
///
/// # Default
///
/// - Payload version detected per record
/// - Price ranges trusted as sent (min > max only logs a warning)
#[derive(Debug, Clone, Default)]
pub struct DecodeConfig {
    /// Force which quantity-mask location is read. `None` detects it per record.
    ///
    /// An explicit `valid_quantities` list always takes precedence over either mask.
    pub payload_version: Option<PayloadVersion>,
    /// Reject cost ranges whose minimum exceeds their maximum.
    pub strict_price_ranges: bool,
}

impl DecodeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload_version(mut self, version: PayloadVersion) -> Self {
        self.payload_version = Some(version);
        self
    }

    pub fn with_strict_price_ranges(mut self, strict: bool) -> Self {
        self.strict_price_ranges = strict;
        self
    }
}
