//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Bridge`]: Session bridge
//! - [`Driver`]: Platform-specific I/O

use matchify_client::{ConnectionAction, Environment, LocalIdentity, PairingPhase, SessionConfig};

use crate::{App, AppAction, AppEvent, Bridge, Driver};

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment providing the clock
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
    pub fn new(driver: D, env: E, identity: LocalIdentity, config: SessionConfig) -> Self {
        let app = App::new(identity.clone());
        let bridge = Bridge::new(env, identity, config);
        Self { driver, app, bridge }
    }

    /// Run the main event loop until the user quits.
    ///
    /// Leaving with an active search or chat disconnects it first.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        while !self.step().await? {}

        if self.bridge.session().state().phase() != PairingPhase::Idle {
            let events = self.bridge.process_app_action(AppAction::Disconnect);
            self.flush_outgoing().await;
            for event in events {
                self.app.handle(event);
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop:
    /// 1. Poll the driver for input and run the resulting actions
    /// 2. Drain every ready transport event through the session
    /// 3. Tick the session so the typing debouncer can fire
    ///
    /// Returns `true` if the application should quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn step(&mut self) -> Result<bool, D::Error> {
        let deadline = self.bridge.next_deadline();
        let actions = self.driver.poll_event(&mut self.app, deadline).await?;
        if !actions.is_empty() && self.process_actions(actions).await? {
            return Ok(true);
        }

        while let Some(event) = self.driver.recv_transport().await {
            let events = self.bridge.handle_transport(event);
            self.flush_outgoing().await;
            if self.process_bridge_events(events).await? {
                return Ok(true);
            }
        }

        let events = self.bridge.handle_tick();
        self.flush_outgoing().await;
        self.process_bridge_events(events).await
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),

                    // Session operations go through the bridge
                    AppAction::StartSearch { .. }
                    | AppAction::Cancel
                    | AppAction::Disconnect
                    | AppAction::SendMessage { .. }
                    | AppAction::Typing => {
                        let events = self.bridge.process_app_action(action);
                        self.flush_outgoing().await;
                        for event in events {
                            pending_actions.extend(self.app.handle(event));
                        }
                    },
                }
            }
        }
        Ok(false)
    }

    /// Process events from Bridge back to App.
    async fn process_bridge_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        for event in events {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Execute pending transport actions.
    ///
    /// A failed send is logged and skipped; the message is already in the
    /// log and the socket reports its own closure.
    async fn flush_outgoing(&mut self) {
        for action in self.bridge.take_outgoing() {
            match action {
                ConnectionAction::Open { id, endpoint } => self.driver.open(id, &endpoint),
                ConnectionAction::Send(text) => {
                    if let Err(e) = self.driver.send_frame(text).await {
                        tracing::warn!(error = %e, "failed to send frame");
                    }
                },
                ConnectionAction::Close { id } => self.driver.close(id),
            }
        }
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the App
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Get a reference to the Bridge
    pub fn bridge(&self) -> &Bridge<E> {
        &self.bridge
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a mutable reference to the Driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
