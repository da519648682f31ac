//! Module Exports
//!
//! This file exports the key modules used in the motor control system.
//!
//! - `hbridge`: output-channel traits and the H-bridge pin adapter.
//! - `motors`: motor command translation and controller state.

pub mod hbridge;
pub mod motors;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

pub use hbridge::{HBridgeChannel, MotorChannel, PwmPin};
pub use motors::{MotorCommand, MotorController, MOTOR_CHANNEL};

use crate::utils::math::scaling::PeriodPolicy;

/// Owns the drive controller and funnels all motor traffic through one task.
pub struct SystemController<C, STBY> {
    pub drive: MotorController<C, STBY>,
}

impl<C, STBY> SystemController<C, STBY>
where
    C: MotorChannel,
    STBY: OutputPin,
{
    /// Build the controller and energize the shield.
    ///
    /// A failed standby write is logged rather than returned: the drive
    /// state is still usable and `Enable` can be retried over the channel.
    pub fn new(left: C, right: C, standby: STBY, period_policy: Option<PeriodPolicy>) -> Self {
        let mut drive = MotorController::new(left, right, standby);
        drive.set_period_policy(period_policy.unwrap_or_default());

        match drive.enable() {
            Ok(()) => tracing::info!("motor shield enabled"),
            Err(e) => tracing::warn!("failed to enable motor shield: {:?}", e),
        }

        SystemController { drive }
    }

    /// Drain `MOTOR_CHANNEL`, applying each command in arrival order.
    ///
    /// All motor traffic goes through this single task, which serializes
    /// access to the channels and the bias state. Timed commands block the
    /// task for their duration, so commands queued behind them wait.
    pub async fn motor_ch(&mut self, delay: &mut impl DelayNs) -> ! {
        loop {
            let cmd = MOTOR_CHANNEL.receiver().receive().await;
            tracing::info!("Received motor command: {:?}", cmd);
            match self.drive.execute_command(cmd, delay) {
                Ok(()) => tracing::info!("motor command applied"),
                Err(e) => tracing::error!("motor command failed: {:?}", e),
            }
        }
    }
}
