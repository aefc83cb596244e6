use std::fmt::Display;

use rustyline::error::ReadlineError;
use thiserror::Error;

use crate::printer::{pr_params, NumberFormat};

pub type RelayResult<T> = Result<T, RelayError>;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

/// Everything the downstream odometry stage needs, in named form.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OdometryParams {
    /// Encoder ticks per wheel revolution.
    pub encoder_pulses: f64,
    /// Measured encoder tick rate, ticks per second.
    pub pulses_per_second: f64,
    pub wheel_radius: f64,
    /// Track width, distance between the wheels.
    pub vehicle_width: f64,
    pub start_pose: Pose,
    /// Duration the downstream stage integrates over.
    pub elapsed_time: f64,
}

impl OdometryParams {
    pub fn field_mut(&mut self, field: Field) -> &mut f64 {
        match field {
            Field::EncoderPulses => &mut self.encoder_pulses,
            Field::PulsesPerSecond => &mut self.pulses_per_second,
            Field::WheelRadius => &mut self.wheel_radius,
            Field::VehicleWidth => &mut self.vehicle_width,
            Field::StartX => &mut self.start_pose.x,
            Field::StartY => &mut self.start_pose.y,
            Field::StartHeading => &mut self.start_pose.heading,
            Field::ElapsedTime => &mut self.elapsed_time,
        }
    }

    /// Values in output order, see [`Field::ALL`].
    pub fn values(&self) -> [f64; 8] {
        let Self {
            encoder_pulses,
            pulses_per_second,
            wheel_radius,
            vehicle_width,
            start_pose: Pose { x, y, heading },
            elapsed_time,
        } = *self;

        [
            encoder_pulses,
            pulses_per_second,
            wheel_radius,
            vehicle_width,
            x,
            y,
            heading,
            elapsed_time,
        ]
    }
}

impl Display for OdometryParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", pr_params(self, NumberFormat::Shortest))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    EncoderPulses,
    PulsesPerSecond,
    WheelRadius,
    VehicleWidth,
    StartX,
    StartY,
    StartHeading,
    ElapsedTime,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::EncoderPulses,
        Field::PulsesPerSecond,
        Field::WheelRadius,
        Field::VehicleWidth,
        Field::StartX,
        Field::StartY,
        Field::StartHeading,
        Field::ElapsedTime,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::EncoderPulses => "encoder pulses per revolution",
            Field::PulsesPerSecond => "pulses per second",
            Field::WheelRadius => "wheel radius",
            Field::VehicleWidth => "vehicle width",
            Field::StartX => "starting x",
            Field::StartY => "starting y",
            Field::StartHeading => "starting heading",
            Field::ElapsedTime => "elapsed time",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One question put to the operator. The pose is asked for in a single prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    EncoderPulses,
    PulsesPerSecond,
    WheelRadius,
    VehicleWidth,
    StartPose,
    ElapsedTime,
}

impl Prompt {
    pub const ALL: [Prompt; 6] = [
        Prompt::EncoderPulses,
        Prompt::PulsesPerSecond,
        Prompt::WheelRadius,
        Prompt::VehicleWidth,
        Prompt::StartPose,
        Prompt::ElapsedTime,
    ];

    pub fn text(self) -> &'static str {
        match self {
            Prompt::EncoderPulses => "Enter Encoder Pulses per Revolution: ",
            Prompt::PulsesPerSecond => "Enter Pulses per Second: ",
            Prompt::WheelRadius => "Enter Wheel Radius: ",
            Prompt::VehicleWidth => "Enter Vehicle Width: ",
            Prompt::StartPose => "Enter Starting Pose (xg, yg, og) separated by spaces: ",
            Prompt::ElapsedTime => "Enter Elapsed Time: ",
        }
    }

    pub fn fields(self) -> &'static [Field] {
        match self {
            Prompt::EncoderPulses => &[Field::EncoderPulses],
            Prompt::PulsesPerSecond => &[Field::PulsesPerSecond],
            Prompt::WheelRadius => &[Field::WheelRadius],
            Prompt::VehicleWidth => &[Field::VehicleWidth],
            Prompt::StartPose => &[Field::StartX, Field::StartY, Field::StartHeading],
            Prompt::ElapsedTime => &[Field::ElapsedTime],
        }
    }
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("input ended before {0} was given")]
    MissingValue(Field),
    #[error("'{token}' is not a valid number for {field}")]
    InvalidNumber { field: Field, token: String },
    #[error("interrupted")]
    Interrupted,
    #[error("{0}")]
    Usage(String),
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    Readline(ReadlineError),
}

impl From<ReadlineError> for RelayError {
    fn from(value: ReadlineError) -> Self {
        match value {
            ReadlineError::Interrupted => RelayError::Interrupted,
            ReadlineError::Io(e) => RelayError::IOError(e),
            e => RelayError::Readline(e),
        }
    }
}

#[macro_export]
macro_rules! usage {
    ($($arg:tt)*) => { return Err($crate::types::RelayError::Usage(format!($($arg)*))) };
}
