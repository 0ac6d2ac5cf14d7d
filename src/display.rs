//! A device abstraction for the tube display.
//!
//! Both the time-update task and the main loop draw on the tubes. Instead of
//! sharing the pins, they send a [`DisplayCommand`] through a [`DisplayNotifier`]
//! to one display loop that owns [`NixieTubes`]. The newest command always wins:
//! a fade or the cleaning pattern in progress is abandoned as soon as another
//! command arrives.

use embassy_futures::select::{Either, select};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::Duration;
use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use oorandom::Rand32;

use crate::nixie::{Frame, NixieTubes};
use crate::shared_constants::pause;
use crate::{CLEANING_FRAME_INTERVAL, Never};

/// What the display loop should be doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayCommand {
    /// Latch one frame and hold it.
    Show(Frame),
    /// Dissolve from `source` to `target`, then hold `target`.
    Fade {
        target: Frame,
        source: Frame,
        duration: Duration,
    },
    /// Cycle random digits until told otherwise.
    Clean,
}

impl Default for DisplayCommand {
    fn default() -> Self {
        Self::Show(Frame::BLANK)
    }
}

/// Signal carrying the latest [`DisplayCommand`].
pub type DisplayNotifier = Signal<CriticalSectionRawMutex, DisplayCommand>;

/// Handle for sending commands to the display loop.
#[derive(Clone, Copy)]
pub struct Display<'a>(&'a DisplayNotifier);

impl<'a> Display<'a> {
    #[must_use]
    pub const fn new(notifier: &'a DisplayNotifier) -> Self {
        Self(notifier)
    }

    /// Creates a notifier for the display.
    #[must_use]
    pub const fn notifier() -> DisplayNotifier {
        Signal::new()
    }

    pub fn send(&self, command: DisplayCommand) {
        self.0.signal(command);
    }

    pub fn show(&self, frame: Frame) {
        self.0.signal(DisplayCommand::Show(frame));
    }

    pub fn fade(&self, target: Frame, source: Frame, duration: Duration) {
        self.0.signal(DisplayCommand::Fade {
            target,
            source,
            duration,
        });
    }

    pub fn clean(&self) {
        self.0.signal(DisplayCommand::Clean);
    }
}

impl DisplayCommand {
    /// Carry out this command until it finishes or is replaced, and return what
    /// the display loop should do next.
    pub async fn execute<P, D>(
        self,
        notifier: &DisplayNotifier,
        tubes: &mut NixieTubes<P>,
        delay: &mut D,
        rng: &mut Rand32,
    ) -> Self
    where
        P: OutputPin,
        D: DelayNs,
    {
        match self {
            Self::Show(frame) => {
                if let Err(err) = tubes.show(&frame) {
                    error!("Display: {}", err);
                }
                notifier.wait().await
            }
            Self::Fade {
                target,
                source,
                duration,
            } => match select(tubes.fade(&target, &source, duration, delay), notifier.wait()).await
            {
                Either::First(result) => {
                    if let Err(err) = result {
                        error!("Display: {}", err);
                    }
                    Self::Show(target)
                }
                Either::Second(next) => next,
            },
            Self::Clean => {
                if let Err(err) = tubes.show(&Frame::random(rng)) {
                    error!("Display: {}", err);
                }
                match select(pause(delay, CLEANING_FRAME_INTERVAL), notifier.wait()).await {
                    Either::First(()) => Self::Clean,
                    Either::Second(next) => next,
                }
            }
        }
    }
}

/// The display loop. Runs forever; spawn it in its own task.
pub async fn run_display<P, D>(
    notifier: &DisplayNotifier,
    mut tubes: NixieTubes<P>,
    mut delay: D,
    mut rng: Rand32,
) -> Never
where
    P: OutputPin,
    D: DelayNs,
{
    let mut command = DisplayCommand::default();
    loop {
        command = command
            .execute(notifier, &mut tubes, &mut delay, &mut rng)
            .await;
    }
}
