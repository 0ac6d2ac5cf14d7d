//! RP2040 peripherals for the clock board.
//!
//! | signal            | pin     | peripheral       |
//! |-------------------|---------|------------------|
//! | tube data         | GPIO 2  | output           |
//! | tube clock        | GPIO 3  | output           |
//! | tube strobe       | GPIO 4  | output           |
//! | decimal point     | GPIO 5  | output           |
//! | buzzer            | GPIO 6  | output           |
//! | RTC square wave   | GPIO 7  | input, pull-up   |
//! | RTC SCK/MOSI/MISO | 18/19/16| SPI0             |
//! | RTC chip select   | GPIO 17 | output           |
//! | HV brightness     | GPIO 14 | PWM slice 7 A    |
//! | front buttons     | GPIO 26 | ADC 0            |
//! | rear buttons      | GPIO 27 | ADC 1            |
//! | light sensor      | GPIO 28 | ADC 2            |

use embassy_rp::adc::{self, Adc, Channel as AdcChannel};
use embassy_rp::bind_interrupts;
use embassy_rp::flash::{Blocking, ERASE_SIZE, Flash};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::{FLASH, SPI0};
use embassy_rp::pwm::{self, Pwm, PwmOutput};
use embassy_rp::spi::{self, Phase, Polarity, Spi};
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};

use crate::alarm_store::BlockStorage;
use crate::analog::{AnalogInputs, AnalogLine};
use crate::nixie::NixieTubes;
use crate::{Error, MAX_PWM_DUTY, Result};

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => adc::InterruptHandler;
});

/// Internal flash size of the Pico (2 MB).
const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// The last erase sector of flash holds the alarm block.
const STORAGE_SECTOR: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;

/// The RTC on SPI0 with its own chip select.
pub type RtcSpi = ExclusiveDevice<Spi<'static, SPI0, spi::Async>, Output<'static>, NoDelay>;

/// The three analog lines on the RP2040 ADC.
pub struct PicoAnalog {
    adc: Adc<'static, adc::Async>,
    front: AdcChannel<'static>,
    rear: AdcChannel<'static>,
    light: AdcChannel<'static>,
}

impl AnalogInputs for PicoAnalog {
    async fn read(&mut self, line: AnalogLine) -> Result<u16> {
        let channel = match line {
            AnalogLine::FrontButtons => &mut self.front,
            AnalogLine::RearButtons => &mut self.rear,
            AnalogLine::LightSensor => &mut self.light,
        };
        let raw = self.adc.read(channel).await.map_err(|_| Error::AnalogRead)?;
        // 12-bit conversions, scaled to the 10-bit levels the button and light
        // constants are calibrated in.
        Ok(raw >> 2)
    }
}

/// The last flash sector, used as [`BlockStorage`].
pub struct PicoFlash {
    flash: Flash<'static, FLASH, Blocking, FLASH_SIZE>,
}

impl BlockStorage for PicoFlash {
    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<()> {
        self.flash
            .blocking_read(STORAGE_SECTOR.saturating_add(offset), bytes)
            .map_err(|_| Error::Storage)
    }

    /// Rewrites the whole sector, keeping bytes outside `offset..offset + len`.
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<()> {
        let start = usize::try_from(offset).map_err(|_| Error::Storage)?;
        let end = start.checked_add(bytes.len()).ok_or(Error::Storage)?;
        let mut sector = [0xFFu8; ERASE_SIZE];
        self.flash
            .blocking_read(STORAGE_SECTOR, &mut sector)
            .map_err(|_| Error::Storage)?;
        sector
            .get_mut(start..end)
            .ok_or(Error::Storage)?
            .copy_from_slice(bytes);
        self.flash
            .blocking_erase(STORAGE_SECTOR, STORAGE_SECTOR.saturating_add(ERASE_SIZE as u32))
            .map_err(|_| Error::Storage)?;
        self.flash
            .blocking_write(STORAGE_SECTOR, &sector)
            .map_err(|_| Error::Storage)?;
        debug!("Flash: wrote {} bytes at offset {}", bytes.len(), offset);
        Ok(())
    }
}

/// Every peripheral the clock uses, configured.
pub struct Hardware {
    pub tubes: NixieTubes<Output<'static>>,
    pub buzzer: Output<'static>,
    pub rtc: RtcSpi,
    pub square_wave: Input<'static>,
    pub brightness_pwm: PwmOutput<'static>,
    pub analog: PicoAnalog,
    pub storage: PicoFlash,
}

impl Hardware {
    /// Take the chip's peripherals and set them up for the clock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pwm`] if the brightness channel is unavailable.
    pub fn new() -> Result<Self> {
        let p = embassy_rp::init(embassy_rp::config::Config::default());

        let tubes = NixieTubes::new(
            Output::new(p.PIN_2, Level::Low),
            Output::new(p.PIN_3, Level::Low),
            Output::new(p.PIN_4, Level::Low),
            Output::new(p.PIN_5, Level::Low),
        );
        let buzzer = Output::new(p.PIN_6, Level::Low);
        let square_wave = Input::new(p.PIN_7, Pull::Up);

        // The DS3234 samples on the falling clock edge (SPI mode 1).
        let mut spi_config = spi::Config::default();
        spi_config.frequency = 1_000_000;
        spi_config.polarity = Polarity::IdleLow;
        spi_config.phase = Phase::CaptureOnSecondTransition;
        let bus = Spi::new(
            p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, p.DMA_CH0, p.DMA_CH1, spi_config,
        );
        let chip_select = Output::new(p.PIN_17, Level::High);
        let Ok(rtc) = ExclusiveDevice::new_no_delay(bus, chip_select);

        let mut pwm_config = pwm::Config::default();
        pwm_config.top = u16::from(MAX_PWM_DUTY);
        pwm_config.divider = 16u8.into();
        let (brightness_pwm, _) =
            Pwm::new_output_a(p.PWM_SLICE7, p.PIN_14, pwm_config).split();
        let brightness_pwm = brightness_pwm.ok_or(Error::Pwm)?;

        let analog = PicoAnalog {
            adc: Adc::new(p.ADC, Irqs, adc::Config::default()),
            front: AdcChannel::new_pin(p.PIN_26, Pull::None),
            rear: AdcChannel::new_pin(p.PIN_27, Pull::None),
            light: AdcChannel::new_pin(p.PIN_28, Pull::None),
        };
        let storage = PicoFlash {
            flash: Flash::new_blocking(p.FLASH),
        };

        Ok(Self {
            tubes,
            buzzer,
            rtc,
            square_wave,
            brightness_pwm,
            analog,
            storage,
        })
    }
}
