//! System configuration.
//!
//! Every timing and sizing constant of the application lives in
//! [`SystemConfig`]. The defaults reproduce the board firmware: a ten-entry
//! mailbox, a 50 ms button period with 200/1000/2000 ms gesture thresholds,
//! a one second dispatcher idle window and five seconds of LED on-time.

use core::time::Duration;

use pq::{Overflow, Strategy};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("mailbox capacity must be at least 2, got {0}")]
    Capacity(usize),
    #[error("{0} must be non-zero")]
    ZeroDuration(&'static str),
    #[error("button thresholds must ascend: pulse < short < long")]
    ThresholdOrder,
}

/// Configuration shared by all active objects.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemConfig {
    /// Capacity of the priority mailbox between UI and LED.
    pub mailbox_capacity: usize,
    pub strategy: Strategy,
    pub overflow: Overflow,
    /// How long a requested LED stays on.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub led_on_duration: Duration,
    /// Upper bound on one LED actor wait for a request.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub led_poll_timeout: Duration,
    /// Dispatcher retires after this long without events.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub ui_idle_timeout: Duration,
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub button_period: Duration,
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub pulse_threshold: Duration,
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub short_threshold: Duration,
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub long_threshold: Duration,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 10,
            strategy: Strategy::Heap,
            overflow: Overflow::Reject,
            led_on_duration: Duration::from_secs(5),
            led_poll_timeout: Duration::from_secs(1),
            ui_idle_timeout: Duration::from_millis(1000),
            button_period: Duration::from_millis(50),
            pulse_threshold: Duration::from_millis(200),
            short_threshold: Duration::from_millis(1000),
            long_threshold: Duration::from_millis(2000),
        }
    }
}

impl SystemConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> SystemConfigBuilder {
        SystemConfigBuilder::default()
    }

    /// Checks the invariants the active objects rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mailbox_capacity < 2 {
            return Err(ConfigError::Capacity(self.mailbox_capacity));
        }
        let durations = [
            ("led_on_duration", self.led_on_duration),
            ("led_poll_timeout", self.led_poll_timeout),
            ("ui_idle_timeout", self.ui_idle_timeout),
            ("button_period", self.button_period),
            ("pulse_threshold", self.pulse_threshold),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, d)| d.is_zero()) {
            return Err(ConfigError::ZeroDuration(*name));
        }
        if !(self.pulse_threshold < self.short_threshold
            && self.short_threshold < self.long_threshold)
        {
            return Err(ConfigError::ThresholdOrder);
        }
        Ok(())
    }
}

/// Builder for ergonomic configuration construction.
#[derive(Debug, Clone, Default)]
pub struct SystemConfigBuilder {
    config: SystemConfig,
}

impl SystemConfigBuilder {
    /// Sets the priority mailbox capacity.
    pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
        self.config.mailbox_capacity = capacity;
        self
    }

    /// Selects the mailbox storage strategy.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Selects what happens when the mailbox is full.
    pub fn overflow(mut self, overflow: Overflow) -> Self {
        self.config.overflow = overflow;
        self
    }

    pub fn led_on_duration(mut self, duration: Duration) -> Self {
        self.config.led_on_duration = duration;
        self
    }

    pub fn led_poll_timeout(mut self, timeout: Duration) -> Self {
        self.config.led_poll_timeout = timeout;
        self
    }

    pub fn ui_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.ui_idle_timeout = timeout;
        self
    }

    pub fn button_period(mut self, period: Duration) -> Self {
        self.config.button_period = period;
        self
    }

    /// Sets the pulse, short and long press thresholds.
    pub fn thresholds(mut self, pulse: Duration, short: Duration, long: Duration) -> Self {
        self.config.pulse_threshold = pulse;
        self.config.short_threshold = short;
        self.config.long_threshold = long;
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<SystemConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(feature = "serde")]
mod millis {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_board_firmware() {
        let config = SystemConfig::default();
        assert_eq!(config.mailbox_capacity, 10);
        assert_eq!(config.button_period, Duration::from_millis(50));
        assert_eq!(config.pulse_threshold, Duration::from_millis(200));
        assert_eq!(config.short_threshold, Duration::from_millis(1000));
        assert_eq!(config.long_threshold, Duration::from_millis(2000));
        assert_eq!(config.led_on_duration, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_overrides_fields() {
        let config = SystemConfig::builder()
            .mailbox_capacity(4)
            .strategy(Strategy::List)
            .overflow(Overflow::EvictLowest)
            .ui_idle_timeout(Duration::from_millis(30))
            .build()
            .unwrap();

        assert_eq!(config.mailbox_capacity, 4);
        assert_eq!(config.strategy, Strategy::List);
        assert_eq!(config.overflow, Overflow::EvictLowest);
        assert_eq!(config.ui_idle_timeout, Duration::from_millis(30));
    }

    #[test]
    fn builder_rejects_invalid_values() {
        assert_eq!(
            SystemConfig::builder().mailbox_capacity(1).build(),
            Err(ConfigError::Capacity(1))
        );
        assert_eq!(
            SystemConfig::builder().button_period(Duration::ZERO).build(),
            Err(ConfigError::ZeroDuration("button_period"))
        );
        assert_eq!(
            SystemConfig::builder()
                .thresholds(
                    Duration::from_millis(500),
                    Duration::from_millis(400),
                    Duration::from_millis(900)
                )
                .build(),
            Err(ConfigError::ThresholdOrder)
        );
    }
}
