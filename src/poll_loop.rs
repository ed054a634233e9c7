use std::{convert::Infallible, sync::Arc};

use log::{debug, error, info, warn};

use crate::{
    alert::{AlertDispatcher, AlertEvent},
    config::{Config, LoginTimeoutPolicy},
    error::{WatchError, WatchResult},
    log_context::LogContext,
    login_guard::LoginGuard,
    navigator::PageNavigator,
    scanner::{AvailabilityScanner, Match},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Navigating,
    CheckingLogin,
    Scanning,
    Dispatching,
    Sleeping,
}

/// What one cycle saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub login_waits: u32,
    pub matches: Vec<Match>,
}

/// Owns the browser session and drives navigate → login check → scan → alert → sleep.
pub struct PollLoop<N> {
    config: Arc<Config>,
    navigator: N,
    guard: LoginGuard,
    scanner: AvailabilityScanner,
    dispatcher: AlertDispatcher,
    ctx: LogContext,
    phase: PollPhase,
}

impl<N: PageNavigator> PollLoop<N> {
    pub fn new(config: Arc<Config>, navigator: N, dispatcher: AlertDispatcher) -> Self {
        Self {
            guard: LoginGuard::new(&config),
            scanner: AvailabilityScanner::new(config.unavailable_marker.clone()),
            config,
            navigator,
            dispatcher,
            ctx: LogContext::default(),
            phase: PollPhase::Sleeping,
        }
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    pub fn cycles(&self) -> u64 {
        self.ctx.cycle
    }

    /// Gives the session back so it can be shut down.
    pub fn into_navigator(self) -> N {
        self.navigator
    }

    fn enter(&mut self, phase: PollPhase) {
        debug!("[{}] {:?} -> {:?}", self.ctx, self.phase, phase);
        self.phase = phase;
    }

    pub async fn run_cycle(&mut self) -> WatchResult<CycleReport> {
        self.ctx = self.ctx.next();
        let ctx = self.ctx;
        info!("[{ctx}] Checking if there is a spot available for the selected subjects");

        self.enter(PollPhase::Navigating);
        self.navigator.navigate(&self.config.schedule_url).await?;

        self.enter(PollPhase::CheckingLogin);
        let login_waits = self
            .guard
            .ensure_authenticated(&self.navigator, &self.dispatcher, ctx)
            .await?;

        self.enter(PollPhase::Navigating);
        info!("[{ctx}] Refreshing page: {}", self.config.schedule_url);
        self.navigator.navigate(&self.config.schedule_url).await?;

        self.enter(PollPhase::Scanning);
        let table = self.navigator.rows().await?;
        let matches = self.scanner.scan_table(&table, &self.config.subjects, ctx);

        self.enter(PollPhase::Dispatching);
        for found in &matches {
            let event = AlertEvent::schedule_found(&found.subject_name, &found.availability_text);
            self.dispatcher.dispatch(&event, ctx).await;
        }

        Ok(CycleReport {
            login_waits,
            matches,
        })
    }

    /// Runs cycles until a fatal error. Navigation failures skip the cycle;
    /// a login timeout follows the configured policy.
    pub async fn run(&mut self) -> WatchResult<Infallible> {
        info!(
            "Checking schedule availability every {} seconds...",
            self.config.refresh_interval.as_secs()
        );
        loop {
            match self.run_cycle().await {
                Ok(report) => debug!(
                    "[{}] Cycle done: {} login wait(s), {} match(es)",
                    self.ctx,
                    report.login_waits,
                    report.matches.len()
                ),
                Err(e @ WatchError::LoginTimeout { .. }) => match self.config.login_timeout_policy {
                    LoginTimeoutPolicy::Abort => {
                        error!("[{}] {e}, stopping", self.ctx);
                        return Err(e);
                    }
                    LoginTimeoutPolicy::SkipCycle => {
                        warn!("[{}] {e}, trying again on the next refresh", self.ctx);
                    }
                },
                Err(WatchError::Navigation(reason)) => {
                    warn!("[{}] Cycle skipped, page navigation failed: {reason}", self.ctx);
                }
                Err(e) => {
                    error!("[{}] {e}", self.ctx);
                    return Err(e);
                }
            }

            self.enter(PollPhase::Sleeping);
            info!(
                "[{}] Waiting {} seconds before a new verification",
                self.ctx,
                self.config.refresh_interval.as_secs()
            );
            tokio::time::sleep(self.config.refresh_interval).await;
        }
    }
}
