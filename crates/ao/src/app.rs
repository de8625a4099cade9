//! Application wiring.
//!
//! [`App`] owns the process-lifetime objects: the priority mailbox and the
//! LED actor. The UI dispatcher is created stopped and comes alive with the
//! first event.

use hal::{ButtonInput, LedOutput};
use log::info;
use pq::PriorityMailbox;

use crate::button::{ButtonSampler, Debouncer, SamplerHandle};
use crate::config::SystemConfig;
use crate::error::ActorResult;
use crate::event::LedRequest;
use crate::led::LedActor;
use crate::trace::{TraceHook, Tracer};
use crate::ui::UiDispatcher;

pub struct AppBuilder {
    config: SystemConfig,
    trace: Option<TraceHook>,
}

impl AppBuilder {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            config,
            trace: None,
        }
    }

    pub fn with_trace_hook(mut self, hook: TraceHook) -> Self {
        self.trace = Some(hook);
        self
    }

    /// Validates the configuration, creates the mailbox and starts the LED
    /// actor on `leds`.
    pub fn start<L>(self, leds: L) -> ActorResult<App>
    where
        L: LedOutput + 'static,
    {
        let config = self.config;
        config.validate()?;
        let tracer = Tracer::new(self.trace);

        let requests =
            PriorityMailbox::create(config.mailbox_capacity, config.strategy, config.overflow)?;
        let led = LedActor::new(
            leds,
            requests.clone(),
            config.led_on_duration,
            config.led_poll_timeout,
            tracer.clone(),
        );
        led.start()?;
        let ui = UiDispatcher::new(requests.clone(), config.ui_idle_timeout, tracer.clone());

        info!(
            "[APP] running: {:?} mailbox of {}, overflow {:?}",
            config.strategy, config.mailbox_capacity, config.overflow
        );
        Ok(App {
            config,
            requests,
            led,
            ui,
            tracer,
        })
    }
}

pub struct App {
    config: SystemConfig,
    requests: PriorityMailbox<LedRequest>,
    led: LedActor,
    ui: UiDispatcher,
    tracer: Tracer,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::new(SystemConfig::default())
    }

    pub fn with_config(config: SystemConfig) -> AppBuilder {
        AppBuilder::new(config)
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &UiDispatcher {
        &self.ui
    }

    pub fn requests(&self) -> &PriorityMailbox<LedRequest> {
        &self.requests
    }

    pub fn led(&self) -> &LedActor {
        &self.led
    }

    /// Builds a sampler that reads `input` and feeds the dispatcher.
    pub fn button_sampler<B: ButtonInput>(&self, input: B) -> ButtonSampler<B, UiDispatcher> {
        ButtonSampler::new(
            input,
            self.ui.clone(),
            Debouncer::from_config(&self.config),
            self.tracer.clone(),
        )
    }

    /// Starts sampling `input` on its own thread.
    pub fn attach_button<B>(&self, input: B) -> ActorResult<SamplerHandle>
    where
        B: ButtonInput + 'static,
    {
        self.button_sampler(input).spawn()
    }

    /// Destroys the priority mailbox, dropping queued requests. The LED
    /// actor exits once it notices.
    pub fn shutdown(self) {
        let dropped = self.requests.size();
        self.requests.destroy();
        info!("[APP] shut down, {dropped} requests dropped");
    }
}
