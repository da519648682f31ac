//! Duty scaling and carrier-period selection for the H-bridge motor shield.
//!
//! Speeds arrive as integer percentages and are mapped onto the shield's
//! 10-bit PWM duty range. The carrier period is retuned on every motion
//! command: a long period at low duty gives the winding current time to ramp,
//! so the motors produce usable torque instead of stalling.
//!
//! # Example
//! ```rust
//! use dwb_core::utils::math::scaling;
//! let duty = scaling::scale_speed(60);
//! assert_eq!(scaling::trim(duty, 0), 614);
//! ```

use serde::{Deserialize, Serialize};

/// Full-scale PWM duty value (10-bit resolution).
pub const MAX_DUTY: u16 = 1023;

/// Duty counts per speed percent, mapping 0-100 onto 0-1023.
pub const DUTY_PER_PERCENT: f32 = 10.23;

/// Carrier period (µs) used below `MID_TIER_DUTY`, and always on the fixed
/// channel under [`PeriodPolicy::LeftOnly`].
pub const SLOW_PERIOD_US: u32 = 60_000;
/// Carrier period (µs) for the retuned channel in the mid duty tier.
pub const MID_PERIOD_US: u32 = 40_000;
/// Carrier period (µs) for the retuned channel at high duty.
pub const FAST_PERIOD_US: u32 = 30_000;

/// Duty at which the carrier leaves the slow tier.
pub const MID_TIER_DUTY: f32 = 200.0;
/// Duty at which the carrier enters the fast tier.
pub const FAST_TIER_DUTY: f32 = 300.0;

/// How carrier-period updates are distributed across the two channels.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PeriodPolicy {
    /// Only the left channel's period follows the duty tier; the right
    /// channel is rewritten with the slow period on every command. This is
    /// the compatibility default: robots in the field were trimmed against
    /// the torque imbalance it produces.
    #[default]
    LeftOnly,
    /// Both channels follow the duty tier.
    Symmetric,
}

/// Bound `value` to the inclusive range [`lo`, `hi`].
pub fn clamp(value: i32, lo: i32, hi: i32) -> i32 {
    value.min(hi).max(lo)
}

/// Map a speed percentage onto the 10-bit duty range.
///
/// Out-of-range speeds are clamped, never rejected. The result stays `f32`
/// so that rounding happens exactly once, in [`trim`] at the final write.
pub fn scale_speed(percent: i32) -> f32 {
    clamp(percent, 0, 100) as f32 * DUTY_PER_PERCENT
}

/// Carrier period in µs for the retuned channel at the requested duty.
pub fn carrier_period(duty: f32) -> u32 {
    if duty < MID_TIER_DUTY {
        SLOW_PERIOD_US
    } else if duty < FAST_TIER_DUTY {
        MID_PERIOD_US
    } else {
        FAST_PERIOD_US
    }
}

/// Carrier periods in µs for the (left, right) channels under `policy`.
pub fn carrier_periods(duty: f32, policy: PeriodPolicy) -> (u32, u32) {
    let tier = carrier_period(duty);
    match policy {
        PeriodPolicy::LeftOnly => (tier, SLOW_PERIOD_US),
        PeriodPolicy::Symmetric => (tier, tier),
    }
}

/// Apply a trim bias percentage to a duty value, rounding to the nearest
/// duty count.
pub fn trim(duty: f32, bias: u8) -> u16 {
    libm::roundf(duty * (100.0 - f32::from(bias)) / 100.0) as u16
}
