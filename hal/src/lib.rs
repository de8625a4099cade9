//! Hardware Abstraction Layer (HAL) for the button/LED application
//!
//! The application core never touches pins directly. It reads the user
//! button through [`ButtonInput`] and drives the RGB LED through
//! [`LedOutput`]. The [`gpio`] module adapts any `embedded-hal` 1.0 digital
//! pin to these traits; tests and host demos provide their own doubles.

pub mod error;
pub mod gpio;

use core::fmt;

// Re-export commonly used types
pub use error::{HalError, HalResult};
pub use gpio::{Level, PinButton, PinLeds};

/// The three LED channels of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedColor {
    Red,
    Green,
    Blue,
}

impl LedColor {
    pub const ALL: [LedColor; 3] = [LedColor::Red, LedColor::Green, LedColor::Blue];

    /// Position of the channel in per-color arrays.
    pub const fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Green => "GREEN",
            Self::Blue => "BLUE",
        }
    }
}

impl fmt::Display for LedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Source of the raw user-button level.
pub trait ButtonInput: Send {
    /// Returns true while the button is held down.
    fn read_pressed(&mut self) -> bool;
}

/// Sink driving the LED channels.
pub trait LedOutput: Send {
    /// Turns the `color` channel on (`asserted`) or off.
    fn set(&mut self, color: LedColor, asserted: bool) -> HalResult<()>;
}

impl<B: ButtonInput + ?Sized> ButtonInput for Box<B> {
    fn read_pressed(&mut self) -> bool {
        (**self).read_pressed()
    }
}

impl<L: LedOutput + ?Sized> LedOutput for Box<L> {
    fn set(&mut self, color: LedColor, asserted: bool) -> HalResult<()> {
        (**self).set(color, asserted)
    }
}
