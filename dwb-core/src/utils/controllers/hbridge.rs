//! H-bridge output channels for the Diff-Wheel Bot.
//!
//! Each motor on the shield is driven through one PWM speed pin and two
//! digital direction pins feeding a TB6612-style H-bridge, with a single
//! standby line shared by both bridges. The reference wiring is the
//! micro:bit motor shield: left bridge on P13/P12 with PWM on P1, right
//! bridge on P15/P16 with PWM on P2, standby on P14.
//!
//! [`MotorChannel`] is the seam the command translator writes through;
//! [`HBridgeChannel`] adapts a PWM pin and a pair of `OutputPin`s to it.

use embedded_hal::digital::{OutputPin, PinState};

/// A PWM-capable pin with a run-time adjustable carrier period.
///
/// Duty resolution is 10 bits (0-1023); the period is in microseconds.
/// Platform HALs or host-side simulators implement this for their analog
/// output pins.
pub trait PwmPin {
    type Error: core::fmt::Debug;

    fn set_duty(&mut self, duty: u16) -> Result<(), Self::Error>;
    fn set_period_us(&mut self, period_us: u32) -> Result<(), Self::Error>;
}

/// One logical motor channel: a duty-scaled PWM output plus two binary
/// direction outputs.
pub trait MotorChannel {
    type Error: core::fmt::Debug;

    fn set_duty(&mut self, duty: u16) -> Result<(), Self::Error>;
    fn set_direction_pins(&mut self, d0: PinState, d1: PinState) -> Result<(), Self::Error>;
    fn set_period_us(&mut self, period_us: u32) -> Result<(), Self::Error>;
}

/// Errors that can occur when driving one H-bridge channel.
#[derive(Debug)]
pub enum ChannelError<P: core::fmt::Debug, D: core::fmt::Debug> {
    Pwm(P),
    Pin(D),
}

/// [`MotorChannel`] implementation over a PWM speed pin and two direction
/// pins.
pub struct HBridgeChannel<P, D0, D1> {
    pwm: P,
    dir0: D0,
    dir1: D1,
}

impl<P, D0, D1> HBridgeChannel<P, D0, D1> {
    /// Bundle a speed pin and a direction-pin pair into one channel.
    pub fn new(pwm: P, dir0: D0, dir1: D1) -> Self {
        HBridgeChannel { pwm, dir0, dir1 }
    }
}

impl<P, D0, D1, E> MotorChannel for HBridgeChannel<P, D0, D1>
where
    P: PwmPin,
    D0: OutputPin<Error = E>,
    D1: OutputPin<Error = E>,
    E: core::fmt::Debug,
{
    type Error = ChannelError<P::Error, E>;

    fn set_duty(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.pwm.set_duty(duty).map_err(ChannelError::Pwm)
    }

    fn set_direction_pins(&mut self, d0: PinState, d1: PinState) -> Result<(), Self::Error> {
        self.dir0.set_state(d0).map_err(ChannelError::Pin)?;
        self.dir1.set_state(d1).map_err(ChannelError::Pin)
    }

    fn set_period_us(&mut self, period_us: u32) -> Result<(), Self::Error> {
        self.pwm.set_period_us(period_us).map_err(ChannelError::Pwm)
    }
}
