//! The driver chain: ordered tiers plus one fallback combinator.
//!
//! [`DriverChain::attempt`] walks the tiers in priority order, skipping
//! those that lack the capability or are unavailable right now, and stops
//! at the first success.  A successful call is followed by the configured
//! settle delay for its capability.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::capability::{Capability, Invocation, MouseButton, SystemOp};
use crate::config::DriverConfig;
use crate::keycode::KeyCodeDriver;
use crate::keys::KeyChord;
use crate::runner::{CommandRunner, SystemRunner};
use crate::script::ScriptBridgeDriver;
use crate::spawn::{SpawnDriver, SpawnPrograms};
use crate::traits::{AutomationBackend, Driver, Pause};

/// Ordered set of driver tiers behind the [`AutomationBackend`] interface.
pub struct DriverChain {
    drivers: Vec<Arc<dyn Driver>>,
    config: DriverConfig,
}

impl DriverChain {
    /// Build a chain from explicit tiers, highest priority first.
    pub fn new(drivers: Vec<Arc<dyn Driver>>, config: DriverConfig) -> Self {
        Self { drivers, config }
    }

    /// The default tier order for this machine, spawning real processes.
    pub fn system(config: DriverConfig) -> Self {
        Self::with_runner(Arc::new(SystemRunner::new()), config)
    }

    /// The default tier order with a caller-supplied process runner.
    pub fn with_runner(runner: Arc<dyn CommandRunner>, config: DriverConfig) -> Self {
        let mut drivers: Vec<Arc<dyn Driver>> = Vec::with_capacity(4);

        #[cfg(feature = "native-input")]
        if config.native_input {
            drivers.push(Arc::new(crate::native::NativeInputDriver::new()));
        }

        drivers.push(Arc::new(ScriptBridgeDriver::new(
            Arc::clone(&runner),
            config.script_program.clone(),
        )));
        drivers.push(Arc::new(SpawnDriver::new(
            Arc::clone(&runner),
            SpawnPrograms {
                open: config.open_program.clone(),
                python: config.python_program.clone(),
                screenshot: config.screenshot_program.clone(),
            },
        )));
        drivers.push(Arc::new(KeyCodeDriver::new(
            runner,
            config.script_program.clone(),
        )));

        info!(
            tiers = ?drivers.iter().map(|d| d.id().to_string()).collect::<Vec<_>>(),
            "driver chain assembled"
        );
        Self::new(drivers, config)
    }

    /// Tier identifiers in priority order.
    pub fn tier_ids(&self) -> Vec<&str> {
        self.drivers.iter().map(|d| d.id()).collect()
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Try `call` on each capable, available tier until one succeeds.
    ///
    /// Returns `false` once every tier has been exhausted.  Errors are
    /// logged, never returned.
    pub async fn attempt(&self, call: Invocation<'_>) -> bool {
        let capability = call.capability();
        let mut tried = 0usize;

        for driver in &self.drivers {
            if !driver.supports(capability) {
                continue;
            }
            if !driver.is_available().await {
                debug!(driver = driver.id(), capability = %capability, "tier unavailable");
                continue;
            }
            tried += 1;

            match call.dispatch(driver.as_ref()).await {
                Ok(()) => {
                    debug!(driver = driver.id(), call = %call, "capability call succeeded");
                    if capability == Capability::MoveMouse && self.config.verify_pointer {
                        self.log_pointer(driver.as_ref()).await;
                    }
                    settle(self.config.settle.after(capability)).await;
                    return true;
                }
                Err(e) => {
                    warn!(driver = driver.id(), call = %call, error = %e, "tier failed");
                }
            }
        }

        error!(call = %call, tiers_tried = tried, "all driver tiers failed");
        false
    }

    /// Diagnostic pointer read-back; never affects the call's outcome.
    async fn log_pointer(&self, preferred: &dyn Driver) {
        if read_pointer(preferred).await {
            return;
        }
        for driver in &self.drivers {
            if driver.id() != preferred.id() && read_pointer(driver.as_ref()).await {
                return;
            }
        }
    }
}

async fn read_pointer(driver: &dyn Driver) -> bool {
    match driver.pointer_position().await {
        Ok(Some((x, y))) => {
            debug!(driver = driver.id(), x = x, y = y, "pointer position");
            true
        }
        Ok(None) => false,
        Err(e) => {
            debug!(driver = driver.id(), error = %e, "pointer read-back failed");
            false
        }
    }
}

async fn settle(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

#[async_trait]
impl AutomationBackend for DriverChain {
    async fn activate_app(&self, name: &str) -> bool {
        self.attempt(Invocation::ActivateApp { name }).await
    }

    async fn new_window(&self, name: &str) -> bool {
        self.attempt(Invocation::NewWindow { name }).await
    }

    async fn move_mouse(&self, x: i32, y: i32) -> bool {
        self.attempt(Invocation::MoveMouse { x, y }).await
    }

    async fn click(&self, button: MouseButton) -> bool {
        self.attempt(Invocation::Click { button }).await
    }

    /// Bring `target_app` forward through the chain, then press the chord
    /// in whatever has focus.
    async fn press_keys(&self, chord: &KeyChord, target_app: Option<&str>) -> bool {
        if let Some(app) = target_app
            && !self.attempt(Invocation::ActivateApp { name: app }).await
        {
            warn!(app = app, chord = %chord, "target app not activated, sending keys anyway");
        }
        self.attempt(Invocation::PressKeys {
            chord,
            target_app: None,
        })
        .await
    }

    async fn type_text(&self, text: &str) -> bool {
        self.attempt(Invocation::TypeText { text }).await
    }

    async fn open_url(&self, url: &str, browser: Option<&str>, profile: Option<&str>) -> bool {
        self.attempt(Invocation::OpenUrl {
            url,
            browser,
            profile,
        })
        .await
    }

    async fn system(&self, op: &SystemOp) -> bool {
        self.attempt(Invocation::System { op }).await
    }

    async fn pause(&self, pause: Pause) {
        settle(self.config.settle.pause(pause)).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::config::SettleDelays;
    use crate::error::{DriverError, Result};

    /// Records calls; fails every call when `fail` is set.
    struct FakeDriver {
        id: &'static str,
        caps: Vec<Capability>,
        available: bool,
        fail: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl FakeDriver {
        fn new(id: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                id,
                caps: Capability::ALL.to_vec(),
                available: true,
                fail: false,
                log: Arc::clone(log),
            }
        }

        fn record(&self, what: String) -> Result<()> {
            self.log.lock().unwrap().push(format!("{}:{what}", self.id));
            if self.fail {
                Err(DriverError::Native("boom".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl Driver for FakeDriver {
        fn id(&self) -> &str {
            self.id
        }

        fn supports(&self, capability: Capability) -> bool {
            self.caps.contains(&capability)
        }

        async fn is_available(&self) -> bool {
            self.available
        }

        async fn activate_app(&self, name: &str) -> Result<()> {
            self.record(format!("activate {name}"))
        }

        async fn press_keys(&self, chord: &KeyChord, target_app: Option<&str>) -> Result<()> {
            self.record(format!("keys {chord} {target_app:?}"))
        }

        async fn move_mouse(&self, x: i32, y: i32) -> Result<()> {
            self.record(format!("move {x},{y}"))
        }
    }

    fn chain(drivers: Vec<FakeDriver>) -> DriverChain {
        let drivers = drivers
            .into_iter()
            .map(|d| Arc::new(d) as Arc<dyn Driver>)
            .collect();
        DriverChain::new(
            drivers,
            DriverConfig::new().with_settle(SettleDelays::none()),
        )
    }

    #[tokio::test]
    async fn first_success_stops_the_cascade() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = chain(vec![FakeDriver::new("a", &log), FakeDriver::new("b", &log)]);
        assert!(chain.activate_app("Notes").await);
        assert_eq!(*log.lock().unwrap(), vec!["a:activate Notes"]);
    }

    #[tokio::test]
    async fn failure_falls_through_to_next_tier() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut a = FakeDriver::new("a", &log);
        a.fail = true;
        let chain = chain(vec![a, FakeDriver::new("b", &log)]);
        assert!(chain.move_mouse(10, 20).await);
        assert_eq!(*log.lock().unwrap(), vec!["a:move 10,20", "b:move 10,20"]);
    }

    #[tokio::test]
    async fn unsupported_and_unavailable_tiers_are_skipped() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut a = FakeDriver::new("a", &log);
        a.caps = vec![Capability::PressKeys];
        let mut b = FakeDriver::new("b", &log);
        b.available = false;
        let chain = chain(vec![a, b, FakeDriver::new("c", &log)]);
        assert!(chain.activate_app("Slack").await);
        assert_eq!(*log.lock().unwrap(), vec!["c:activate Slack"]);
    }

    #[tokio::test]
    async fn exhausted_chain_returns_false() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut a = FakeDriver::new("a", &log);
        a.fail = true;
        let mut b = FakeDriver::new("b", &log);
        b.fail = true;
        let chain = chain(vec![a, b]);
        assert!(!chain.activate_app("Notes").await);
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn default_capability_is_unsupported_and_falls_through() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = chain(vec![FakeDriver::new("a", &log)]);
        // FakeDriver advertises TypeText but keeps the default body.
        assert!(!chain.type_text("hello").await);
    }

    #[tokio::test]
    async fn press_keys_activates_target_then_sends_untargeted() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = chain(vec![FakeDriver::new("a", &log)]);
        let chord = KeyChord::parse(["cmd", "t"]);
        assert!(chain.press_keys(&chord, Some("Safari")).await);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:activate Safari", "a:keys command+t None"]
        );
    }

    #[tokio::test]
    async fn empty_chain_fails_every_call() {
        let chain = DriverChain::new(Vec::new(), DriverConfig::default());
        assert!(!chain.click(MouseButton::Left).await);
        assert!(chain.tier_ids().is_empty());
    }
}
