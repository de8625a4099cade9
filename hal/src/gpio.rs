//! GPIO adapters over `embedded-hal` digital pins

use embedded_hal::digital::{InputPin, OutputPin, PinState};
use log::warn;

use crate::error::{HalError, HalResult};
use crate::{ButtonInput, LedColor, LedOutput};

/// GPIO pin levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Low level (0V)
    Low,
    /// High level (VCC)
    High,
}

impl Level {
    fn state(self) -> PinState {
        match self {
            Self::Low => PinState::Low,
            Self::High => PinState::High,
        }
    }

    fn inverted(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

/// User button on a digital input pin.
///
/// `pressed_level` is the level the pin shows while the button is held;
/// boards with a pull-up wire the button active-low.
pub struct PinButton<P> {
    pin: P,
    pressed_level: Level,
}

impl<P: InputPin + Send> PinButton<P> {
    pub fn new(pin: P, pressed_level: Level) -> Self {
        Self { pin, pressed_level }
    }

    pub fn active_low(pin: P) -> Self {
        Self::new(pin, Level::Low)
    }

    pub fn active_high(pin: P) -> Self {
        Self::new(pin, Level::High)
    }

    /// Reads the current pin level.
    pub fn level(&mut self) -> HalResult<Level> {
        let high = self.pin.is_high().map_err(HalError::from_pin)?;
        Ok(if high { Level::High } else { Level::Low })
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: InputPin + Send> ButtonInput for PinButton<P> {
    fn read_pressed(&mut self) -> bool {
        match self.level() {
            Ok(level) => level == self.pressed_level,
            // an unreadable button counts as released
            Err(err) => {
                warn!("[BUTTON] read failed: {err}");
                false
            }
        }
    }
}

/// RGB LED driven by one output pin per channel, indexed by [`LedColor`].
pub struct PinLeds<P> {
    pins: [P; 3],
    on_level: Level,
}

impl<P: OutputPin + Send> PinLeds<P> {
    /// `pins` are ordered red, green, blue.
    pub fn new(pins: [P; 3], on_level: Level) -> Self {
        Self { pins, on_level }
    }

    pub fn active_high(pins: [P; 3]) -> Self {
        Self::new(pins, Level::High)
    }

    pub fn active_low(pins: [P; 3]) -> Self {
        Self::new(pins, Level::Low)
    }

    /// Switches every channel off.
    pub fn all_off(&mut self) -> HalResult<()> {
        for color in LedColor::ALL {
            self.set(color, false)?;
        }
        Ok(())
    }

    pub fn release(self) -> [P; 3] {
        self.pins
    }
}

impl<P: OutputPin + Send> LedOutput for PinLeds<P> {
    fn set(&mut self, color: LedColor, asserted: bool) -> HalResult<()> {
        let level = if asserted {
            self.on_level
        } else {
            self.on_level.inverted()
        };
        self.pins[color.index()]
            .set_state(level.state())
            .map_err(HalError::from_pin)
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use embedded_hal::digital::ErrorType;

    use super::*;

    #[derive(Default)]
    struct FakePin {
        high: bool,
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl InputPin for FakePin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.high)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.high)
        }
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            Ok(())
        }
    }

    #[test]
    fn active_low_button_reads_pressed_on_low_level() {
        let mut button = PinButton::active_low(FakePin { high: true });
        assert!(!button.read_pressed());

        let mut button = PinButton::active_low(FakePin { high: false });
        assert!(button.read_pressed());
    }

    #[test]
    fn active_high_button_reads_pressed_on_high_level() {
        let mut button = PinButton::active_high(FakePin { high: true });
        assert!(button.read_pressed());
        assert_eq!(button.level(), Ok(Level::High));
    }

    #[test]
    fn leds_drive_the_pin_of_each_color() {
        let mut leds = PinLeds::active_high([FakePin::default(), FakePin::default(), FakePin::default()]);
        leds.set(LedColor::Green, true).unwrap();

        let pins = leds.release();
        assert!(!pins[0].high);
        assert!(pins[1].high);
        assert!(!pins[2].high);
    }

    #[test]
    fn active_low_leds_invert_the_level() {
        let mut leds = PinLeds::active_low([FakePin::default(), FakePin::default(), FakePin::default()]);
        leds.all_off().unwrap();
        leds.set(LedColor::Blue, true).unwrap();

        let pins = leds.release();
        assert!(pins[0].high);
        assert!(pins[1].high);
        assert!(!pins[2].high);
    }
}
