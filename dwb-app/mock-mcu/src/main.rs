//! Host-side mock MCU for the Diff-Wheel Bot.
//!
//! Runs the motor controller against simulated shield pins that log every
//! write. Commands are read from stdin, one JSON object per line, e.g.
//!
//! ```text
//! {"mc":"go","d":"forward","s":60}
//! {"mc":"rotate_for","d":"left","s":50,"ms":400}
//! {"mc":"stop","mode":"brake"}
//! ```

use std::convert::Infallible;
use std::io::BufRead;

use clap::Parser;
use dwb_core::mk_static;
use dwb_core::utils::controllers::hbridge::{HBridgeChannel, PwmPin};
use dwb_core::utils::controllers::motors::{MotorCommand, RobotDirection, StopMode, MOTOR_CHANNEL};
use dwb_core::utils::math::scaling::PeriodPolicy;
use dwb_core::utils::{Delay, SystemController};
use embassy_executor::{Executor, Spawner};
use embedded_hal::digital::OutputPin;
use tracing::{error, info, warn};

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// retune the carrier period on both channels instead of only the left
    #[clap(long)]
    symmetric_carrier: bool,
    /// trim this side down at startup to correct drift
    #[clap(long, value_enum)]
    trim: Option<TrimSide>,
    /// startup trim amount in percent
    #[clap(long, default_value_t = 10)]
    trim_percent: i32,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum TrimSide {
    Left,
    Right,
}

impl From<TrimSide> for RobotDirection {
    fn from(side: TrimSide) -> Self {
        match side {
            TrimSide::Left => RobotDirection::Left,
            TrimSide::Right => RobotDirection::Right,
        }
    }
}

/// Digital pin double that logs level changes.
struct SimPin {
    label: &'static str,
}

impl embedded_hal::digital::ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        info!("{} <- 0", self.label);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        info!("{} <- 1", self.label);
        Ok(())
    }
}

/// PWM pin double that logs duty and period writes.
struct SimPwm {
    label: &'static str,
}

impl PwmPin for SimPwm {
    type Error = Infallible;

    fn set_duty(&mut self, duty: u16) -> Result<(), Infallible> {
        info!("{} duty <- {}", self.label, duty);
        Ok(())
    }

    fn set_period_us(&mut self, period_us: u32) -> Result<(), Infallible> {
        info!("{} period <- {}us", self.label, period_us);
        Ok(())
    }
}

type SimChannel = HBridgeChannel<SimPwm, SimPin, SimPin>;

#[embassy_executor::task]
async fn motor_task(mut ctrl: SystemController<SimChannel, SimPin>) -> ! {
    ctrl.motor_ch(&mut Delay).await
}

#[embassy_executor::task]
async fn main_task(spawner: Spawner) {
    let opts: Opts = Opts::parse();

    let left = HBridgeChannel::new(
        SimPwm { label: "left pwm" },
        SimPin { label: "left dir0" },
        SimPin { label: "left dir1" },
    );
    let right = HBridgeChannel::new(
        SimPwm { label: "right pwm" },
        SimPin { label: "right dir0" },
        SimPin { label: "right dir1" },
    );
    let standby = SimPin { label: "standby" };

    let policy = opts.symmetric_carrier.then_some(PeriodPolicy::Symmetric);
    let mut ctrl = SystemController::new(left, right, standby, policy);
    if let Some(side) = opts.trim {
        ctrl.drive.set_bias(side.into(), opts.trim_percent);
    }
    spawner.spawn(motor_task(ctrl)).unwrap();

    // Feed stdin commands into the motor channel from a plain thread; the
    // channel is the serialization point, so this is the only producer-side
    // work needed.
    std::thread::spawn(|| {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!("stdin read failed: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<MotorCommand>(&line) {
                Ok(cmd) => {
                    if MOTOR_CHANNEL.try_send(cmd).is_err() {
                        warn!("motor queue full, dropping command");
                    }
                }
                Err(e) => error!("invalid command {:?}: {}", line, e),
            }
        }
        info!("stdin closed, coasting to a stop");
        let _ = MOTOR_CHANNEL.try_send(MotorCommand::Stop {
            mode: StopMode::Coast,
        });
    });
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let executor = mk_static!(Executor, Executor::new());
    executor.run(|spawner| {
        spawner.spawn(main_task(spawner)).unwrap();
    });
}
