use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
///
/// Each variant names the collaborator that failed. Callers in the main loop
/// and the time-update task log these and carry on; nothing retries.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    #[cfg(feature = "pico1")]
    #[display("Embassy task could not be spawned")]
    TaskSpawn,

    #[display("RTC bus transfer failed")]
    RtcBus,

    #[display("Error setting display output state")]
    DisplayPin,

    #[display("Error setting buzzer output state")]
    BuzzerPin,

    #[display("Error setting PWM duty cycle")]
    Pwm,

    #[display("Analog read failed")]
    AnalogRead,

    #[display("Nonvolatile storage operation failed")]
    Storage,

    #[display("Format error")]
    FormatError,
}

#[cfg(feature = "pico1")]
impl From<embassy_executor::SpawnError> for Error {
    fn from(_: embassy_executor::SpawnError) -> Self {
        Self::TaskSpawn
    }
}
