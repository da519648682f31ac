//! Motor command translation for the Diff-Wheel Bot.
//!
//! Turns high-level motion commands (go, rotate, stop, trim) into carrier
//! periods, duty values, and direction-pin levels on the two H-bridge
//! channels. Commands are received via `MOTOR_CHANNEL`.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};
use serde::{Deserialize, Serialize};

use super::hbridge::MotorChannel;
use crate::utils::math::scaling::{self, PeriodPolicy};

/// Channel used to receive motor commands (`MotorCommand` messages).
pub static MOTOR_CHANNEL: embassy_sync::channel::Channel<CriticalSectionRawMutex, MotorCommand, 16> =
    embassy_sync::channel::Channel::new();

/// Which motor(s) a command targets.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Motor {
    Left,
    Right,
    Both,
}

/// Rotational sense of a single motor.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// Direction-pin levels (IN1, IN2) encoding this sense.
    fn pin_states(self) -> (PinState, PinState) {
        match self {
            Direction::Forward => (PinState::High, PinState::Low),
            Direction::Reverse => (PinState::Low, PinState::High),
        }
    }
}

/// Rotational sense of the whole robot. Also names the side a trim bias
/// applies to: if the robot drifts right, bias `Left`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RobotDirection {
    Left,
    Right,
}

/// How a stop releases the motors.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopMode {
    /// Float the windings and let friction wind the robot down.
    Coast,
    /// Short the windings through the bridge for rapid deceleration.
    Brake,
}

impl StopMode {
    /// Level written to all four direction pins for this stop mode.
    fn pin_state(self) -> PinState {
        match self {
            StopMode::Coast => PinState::Low,
            StopMode::Brake => PinState::High,
        }
    }
}

/// Motor command variants for motion control and shield management.
///
/// Serialized as JSON with tag `"mc"`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(tag = "mc", rename_all = "snake_case")]
pub enum MotorCommand {
    /// Drive both motors in direction `d` at speed `s` percent.
    Go { d: Direction, s: i32 },
    /// `Go`, hold for `ms` milliseconds, then coast to a stop.
    GoFor { d: Direction, s: i32, ms: u32 },
    /// Spin in place towards `d` at speed `s` percent.
    Rotate { d: RobotDirection, s: i32 },
    /// `Rotate`, hold for `ms` milliseconds, then coast to a stop.
    RotateFor { d: RobotDirection, s: i32, ms: u32 },
    /// Stop both motors, coasting or braking.
    Stop { mode: StopMode },
    /// Drive an individual motor (or both) in direction `d` at speed `s`.
    Move { m: Motor, d: Direction, s: i32 },
    /// Trim the `d` side down by `b` percent to correct drift.
    Bias { d: RobotDirection, b: i32 },
    /// Release the shared standby line, energizing both bridges.
    Enable,
    /// Assert standby; both bridges go high-impedance.
    Disable,
}

/// Errors that can occur when applying a motor command to the shield.
#[derive(Debug)]
pub enum DriveError<CE: core::fmt::Debug, SE: core::fmt::Debug> {
    /// A write to one of the motor channels failed.
    Channel(CE),
    /// A write to the shared standby line failed.
    Standby(SE),
}

/// Differential-drive controller for a two-motor H-bridge shield.
///
/// Owns both output channels, the shared standby line, and the per-side trim
/// bias. At most one of the two biases is nonzero at any time. Direction and
/// duty are stateless per-call outputs; the biases are the only carried
/// state.
pub struct MotorController<C, STBY> {
    left: C,
    right: C,
    standby: STBY,
    left_bias: u8,
    right_bias: u8,
    period_policy: PeriodPolicy,
}

impl<C, STBY> MotorController<C, STBY>
where
    C: MotorChannel,
    STBY: OutputPin,
{
    /// Create a controller over the two channels and the standby line.
    ///
    /// Both biases start at zero and the carrier policy defaults to
    /// [`PeriodPolicy::LeftOnly`]. The standby line is left untouched; call
    /// [`MotorController::enable`] to energize the shield.
    pub fn new(left: C, right: C, standby: STBY) -> Self {
        MotorController {
            left,
            right,
            standby,
            left_bias: 0,
            right_bias: 0,
            period_policy: PeriodPolicy::default(),
        }
    }

    /// Select how carrier-period updates are distributed across channels.
    pub fn set_period_policy(&mut self, policy: PeriodPolicy) {
        self.period_policy = policy;
    }

    /// Current (left, right) trim biases in percent.
    pub fn bias(&self) -> (u8, u8) {
        (self.left_bias, self.right_bias)
    }

    /// Release the standby line, energizing both bridges.
    pub fn enable(&mut self) -> Result<(), DriveError<C::Error, STBY::Error>> {
        self.standby.set_high().map_err(DriveError::Standby)
    }

    /// Assert standby; both bridges go high-impedance until re-enabled.
    pub fn disable(&mut self) -> Result<(), DriveError<C::Error, STBY::Error>> {
        self.standby.set_low().map_err(DriveError::Standby)
    }

    /// Drive `motor` in `direction` at `speed` percent.
    ///
    /// Speed is clamped to 0-100 and scaled onto the 10-bit duty range. Both
    /// channels' carrier periods are retuned for the requested duty before
    /// the targeted side(s) receive their trimmed duty and direction pins.
    /// Reads the trim biases but never mutates them.
    pub fn move_motor(
        &mut self,
        motor: Motor,
        direction: Direction,
        speed: i32,
    ) -> Result<(), DriveError<C::Error, STBY::Error>> {
        if !(0..=100).contains(&speed) {
            tracing::warn!("speed {} out of range, clamping", speed);
        }
        let duty = scaling::scale_speed(speed);

        let (left_period, right_period) = scaling::carrier_periods(duty, self.period_policy);
        self.left
            .set_period_us(left_period)
            .map_err(DriveError::Channel)?;
        self.right
            .set_period_us(right_period)
            .map_err(DriveError::Channel)?;

        let (d0, d1) = direction.pin_states();
        if matches!(motor, Motor::Left | Motor::Both) {
            self.left
                .set_duty(scaling::trim(duty, self.left_bias))
                .map_err(DriveError::Channel)?;
            self.left
                .set_direction_pins(d0, d1)
                .map_err(DriveError::Channel)?;
        }
        if matches!(motor, Motor::Right | Motor::Both) {
            self.right
                .set_duty(scaling::trim(duty, self.right_bias))
                .map_err(DriveError::Channel)?;
            self.right
                .set_direction_pins(d0, d1)
                .map_err(DriveError::Channel)?;
        }
        Ok(())
    }

    /// Drive both motors in `direction` at `speed` percent.
    pub fn go(
        &mut self,
        direction: Direction,
        speed: i32,
    ) -> Result<(), DriveError<C::Error, STBY::Error>> {
        self.move_motor(Motor::Both, direction, speed)
    }

    /// Spin in place towards `direction` at `speed` percent.
    ///
    /// A left spin reverses the left motor and drives the right forward;
    /// a right spin is the mirror image. Both sides get the same speed.
    pub fn rotate(
        &mut self,
        direction: RobotDirection,
        speed: i32,
    ) -> Result<(), DriveError<C::Error, STBY::Error>> {
        match direction {
            RobotDirection::Left => {
                self.move_motor(Motor::Left, Direction::Reverse, speed)?;
                self.move_motor(Motor::Right, Direction::Forward, speed)
            }
            RobotDirection::Right => {
                self.move_motor(Motor::Left, Direction::Forward, speed)?;
                self.move_motor(Motor::Right, Direction::Reverse, speed)
            }
        }
    }

    /// Stop both motors.
    ///
    /// Writes the stop level to all four direction pins. The duty outputs
    /// keep their last value; with both direction pins equal the bridge
    /// drives no net current through the windings.
    pub fn stop(&mut self, mode: StopMode) -> Result<(), DriveError<C::Error, STBY::Error>> {
        let level = mode.pin_state();
        self.left
            .set_direction_pins(level, level)
            .map_err(DriveError::Channel)?;
        self.right
            .set_direction_pins(level, level)
            .map_err(DriveError::Channel)
    }

    /// Trim the `direction` side down by `bias` percent.
    ///
    /// Bias is clamped to 0-80. Setting one side zeroes the other, so at
    /// most one side is ever trimmed. Takes effect on the next motion
    /// command; no pins are written here.
    pub fn set_bias(&mut self, direction: RobotDirection, bias: i32) {
        if !(0..=80).contains(&bias) {
            tracing::warn!("bias {} out of range, clamping", bias);
        }
        let bias = scaling::clamp(bias, 0, 80) as u8;
        match direction {
            RobotDirection::Left => {
                self.left_bias = bias;
                self.right_bias = 0;
            }
            RobotDirection::Right => {
                self.left_bias = 0;
                self.right_bias = bias;
            }
        }
    }

    /// Drive both motors for `ms` milliseconds, then coast to a stop.
    ///
    /// Blocks on `delay` for the full duration; the wait cannot be
    /// cancelled once issued.
    pub fn go_for(
        &mut self,
        direction: Direction,
        speed: i32,
        ms: u32,
        delay: &mut impl DelayNs,
    ) -> Result<(), DriveError<C::Error, STBY::Error>> {
        self.go(direction, speed)?;
        delay.delay_ms(ms);
        self.stop(StopMode::Coast)
    }

    /// Spin in place for `ms` milliseconds, then coast to a stop.
    ///
    /// Blocks on `delay` like [`MotorController::go_for`].
    pub fn rotate_for(
        &mut self,
        direction: RobotDirection,
        speed: i32,
        ms: u32,
        delay: &mut impl DelayNs,
    ) -> Result<(), DriveError<C::Error, STBY::Error>> {
        self.rotate(direction, speed)?;
        delay.delay_ms(ms);
        self.stop(StopMode::Coast)
    }

    /// Execute a high-level [`MotorCommand`].
    ///
    /// Timed commands block on `delay` for their duration before issuing
    /// the trailing coast.
    pub fn execute_command(
        &mut self,
        command: MotorCommand,
        delay: &mut impl DelayNs,
    ) -> Result<(), DriveError<C::Error, STBY::Error>> {
        match command {
            MotorCommand::Go { d, s } => self.go(d, s),
            MotorCommand::GoFor { d, s, ms } => self.go_for(d, s, ms, delay),
            MotorCommand::Rotate { d, s } => self.rotate(d, s),
            MotorCommand::RotateFor { d, s, ms } => self.rotate_for(d, s, ms, delay),
            MotorCommand::Stop { mode } => self.stop(mode),
            MotorCommand::Move { m, d, s } => self.move_motor(m, d, s),
            MotorCommand::Bias { d, b } => {
                self.set_bias(d, b);
                Ok(())
            }
            MotorCommand::Enable => self.enable(),
            MotorCommand::Disable => self.disable(),
        }
    }
}
