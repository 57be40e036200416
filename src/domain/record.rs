// ============================================================
// Layer 3 — Mobile Record Domain Types
// ============================================================
// One row of the mobile price dataset: twenty numeric features
// and a price-range label (0 = low cost … 3 = very high cost).
//
// The column order below is the order of the source CSV and
// the order the model sees its input vector in. Changing it
// invalidates every saved model artifact.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::error::PipelineError;

/// Name of the label column in the source CSV
pub const LABEL_COLUMN: &str = "price_range";

/// Number of distinct price ranges
pub const NUM_PRICE_RANGES: usize = 4;

/// Feature columns, in CSV / model-input order
pub const FEATURE_NAMES: [&str; 20] = [
    "battery_power",
    "blue",
    "clock_speed",
    "dual_sim",
    "fc",
    "four_g",
    "int_memory",
    "m_dep",
    "mobile_wt",
    "n_cores",
    "pc",
    "px_height",
    "px_width",
    "ram",
    "sc_h",
    "sc_w",
    "talk_time",
    "three_g",
    "touch_screen",
    "wifi",
];

/// Yes/no columns. These are only imputed, never capped or scaled.
pub const BINARY_FEATURES: [&str; 6] = [
    "blue",
    "dual_sim",
    "four_g",
    "three_g",
    "touch_screen",
    "wifi",
];

// ─── MobileFeatures ───────────────────────────────────────────────────────────
/// The twenty features of one phone.
///
/// This is also the body of a `POST /predict` request. Integers
/// in the JSON are accepted for every field; an optional
/// `price_range` may be present and is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobileFeatures {
    pub battery_power: f64,
    pub blue:          f64,
    pub clock_speed:   f64,
    pub dual_sim:      f64,
    pub fc:            f64,
    pub four_g:        f64,
    pub int_memory:    f64,
    pub m_dep:         f64,
    pub mobile_wt:     f64,
    pub n_cores:       f64,
    pub pc:            f64,
    pub px_height:     f64,
    pub px_width:      f64,
    pub ram:           f64,
    pub sc_h:          f64,
    pub sc_w:          f64,
    pub talk_time:     f64,
    pub three_g:       f64,
    pub touch_screen:  f64,
    pub wifi:          f64,

    /// Accepted so that rows copied straight from the CSV validate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<f64>,
}

impl MobileFeatures {
    /// Feature values in `FEATURE_NAMES` order
    pub fn to_vector(&self) -> [f64; 20] {
        [
            self.battery_power,
            self.blue,
            self.clock_speed,
            self.dual_sim,
            self.fc,
            self.four_g,
            self.int_memory,
            self.m_dep,
            self.mobile_wt,
            self.n_cores,
            self.pc,
            self.px_height,
            self.px_width,
            self.ram,
            self.sc_h,
            self.sc_w,
            self.talk_time,
            self.three_g,
            self.touch_screen,
            self.wifi,
        ]
    }

    /// Reject NaN and infinities before they reach the model
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (name, value) in FEATURE_NAMES.iter().zip(self.to_vector()) {
            if !value.is_finite() {
                return Err(PipelineError::InvalidFeature {
                    column: name.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

// ─── PriceRange ───────────────────────────────────────────────────────────────
/// A price bucket, always in `0..NUM_PRICE_RANGES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceRange(u8);

impl PriceRange {
    pub fn new(value: usize) -> Result<Self, PipelineError> {
        if value < NUM_PRICE_RANGES {
            Ok(Self(value as u8))
        } else {
            Err(PipelineError::InvalidLabel(value as f64))
        }
    }

    /// Parse a label read from a CSV cell. Must be a whole number in range.
    pub fn from_cell(value: f64) -> Result<Self, PipelineError> {
        if value.fract() != 0.0 || value < 0.0 || value >= NUM_PRICE_RANGES as f64 {
            return Err(PipelineError::InvalidLabel(value));
        }
        Ok(Self(value as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
