//! Events flowing from the button to the LED.

use core::fmt;

use hal::LedColor;
use pq::Priority;

/// Classified button gesture, produced by the button sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiEvent {
    Pulse,
    Short,
    Long,
}

impl UiEvent {
    /// LED channel and mailbox priority assigned to this gesture.
    pub const fn route(self) -> (LedColor, Priority) {
        match self {
            Self::Pulse => (LedColor::Red, Priority::High),
            Self::Short => (LedColor::Green, Priority::Medium),
            Self::Long => (LedColor::Blue, Priority::Low),
        }
    }

    /// Builds the request the UI dispatcher forwards to the LED actor.
    pub const fn to_request(self) -> (LedRequest, Priority) {
        let (color, priority) = self.route();
        (LedRequest::on(color), priority)
    }
}

impl fmt::Display for UiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pulse => "pulse",
            Self::Short => "short",
            Self::Long => "long",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedAction {
    On,
    Off,
}

/// Immutable payload stored in the priority mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedRequest {
    pub action: LedAction,
    pub color: LedColor,
}

impl LedRequest {
    pub const fn on(color: LedColor) -> Self {
        Self {
            action: LedAction::On,
            color,
        }
    }

    pub const fn off(color: LedColor) -> Self {
        Self {
            action: LedAction::Off,
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gestures_map_to_color_and_priority() {
        assert_eq!(UiEvent::Pulse.route(), (LedColor::Red, Priority::High));
        assert_eq!(UiEvent::Short.route(), (LedColor::Green, Priority::Medium));
        assert_eq!(UiEvent::Long.route(), (LedColor::Blue, Priority::Low));
    }

    #[test]
    fn requests_always_switch_the_led_on() {
        let (request, priority) = UiEvent::Long.to_request();
        assert_eq!(request, LedRequest::on(LedColor::Blue));
        assert_eq!(priority, Priority::Low);
    }
}
