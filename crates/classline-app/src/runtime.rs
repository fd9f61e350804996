//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: view-model state machine
//! - [`Bridge`]: protocol bridge to the client
//! - [`Driver`]: platform-specific I/O
//!
//! The loop is single-threaded and event-driven: every await is a
//! suspension point where other events may interleave, and the client
//! re-validates delayed results before applying them — the runtime never
//! has to.

use classline_core::Environment;

use crate::{App, AppAction, AppEvent, Bridge, Driver, bridge::TransportCommand};

/// Generic runtime that orchestrates App, Bridge, and Driver.
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    app: App,
    bridge: Bridge<E>,
}

impl<D, E> Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    /// Create a new runtime with the given driver and environment.
    pub fn new(driver: D, env: E) -> Self {
        Self { driver, app: App::new(), bridge: Bridge::new(env) }
    }

    /// Run the main event loop until the app quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error outside the
    /// protocol layer's recovery (rendering, envelope send).
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        loop {
            let should_quit = self.process_cycle().await?;
            if should_quit {
                break;
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        let actions = self.driver.poll_intents(&mut self.app).await?;
        if self.process_actions(actions)? {
            return Ok(true);
        }

        if self.driver.is_connected()
            && let Some(envelope) = self.driver.recv_envelope().await
        {
            let events = self.bridge.handle_envelope(envelope);
            if self.apply_events(events)? {
                return Ok(true);
            }
        }

        let events = self.bridge.handle_tick();
        if self.apply_events(events)? {
            return Ok(true);
        }

        self.drain_io().await
    }

    /// Process actions from the App, feeding protocol actions through the
    /// bridge and looping until no new actions appear.
    ///
    /// Returns `true` if should quit.
    fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),
                    other => {
                        let events = self.bridge.process_app_action(other);
                        for event in events {
                            pending_actions.extend(self.app.handle(event));
                        }
                    },
                }
            }
        }
        Ok(false)
    }

    /// Feed bridge events into the App.
    ///
    /// Returns `true` if should quit.
    fn apply_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        for event in events {
            let actions = self.app.handle(event);
            if self.process_actions(actions)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Drain queued I/O until the bridge has nothing pending: transport
    /// commands, outgoing envelopes, REST calls (whose completions may
    /// queue more work), and UI effects.
    async fn drain_io(&mut self) -> Result<bool, D::Error> {
        loop {
            let mut progressed = false;

            for command in self.bridge.take_transport_commands() {
                progressed = true;
                match command {
                    TransportCommand::Open => {
                        let events = match self.driver.open_transport().await {
                            Ok(()) => self.bridge.handle_transport_opened(),
                            Err(error) => {
                                self.bridge.handle_transport_lost(error.to_string())
                            },
                        };
                        if self.apply_events(events)? {
                            return Ok(true);
                        }
                    },
                    TransportCommand::Close => self.driver.close_transport(),
                }
            }

            for envelope in self.bridge.take_outgoing() {
                progressed = true;
                if let Err(error) = self.driver.send_envelope(envelope).await {
                    tracing::warn!("envelope send failed: {error}");
                    let events = self.bridge.handle_transport_lost(error.to_string());
                    if self.apply_events(events)? {
                        return Ok(true);
                    }
                }
            }

            for call in self.bridge.take_api_calls() {
                progressed = true;
                let outcome = self.driver.execute_api(call).await;
                let events = self.bridge.handle_api_outcome(outcome);
                if self.apply_events(events)? {
                    return Ok(true);
                }
            }

            for effect in self.bridge.take_effects() {
                progressed = true;
                self.driver.apply_effect(effect);
            }

            if !progressed {
                return Ok(false);
            }
        }
    }

    /// Get a reference to the App.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the App.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}
