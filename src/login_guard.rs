use std::time::Duration;

use log::{debug, info, warn};

use crate::{
    alert::{AlertDispatcher, AlertEvent},
    config::Config,
    error::{WatchError, WatchResult},
    log_context::LogContext,
    navigator::{PageNavigator, SessionState},
};

/// Waits, bounded, for the operator to log into the portal.
pub struct LoginGuard {
    login_url: String,
    title_marker: String,
    wait: Duration,
    max_checks: u32,
}

impl LoginGuard {
    pub fn new(config: &Config) -> Self {
        Self {
            login_url: config.login_url.clone(),
            title_marker: config.login_title_marker.clone(),
            wait: config.login_wait_interval,
            max_checks: config.max_login_retries,
        }
    }

    pub async fn session_state<N: PageNavigator + ?Sized>(
        &self,
        navigator: &N,
        ctx: LogContext,
    ) -> WatchResult<SessionState> {
        let url = navigator.current_url().await?;
        let title = navigator.page_title().await?;
        debug!("[{ctx}] Checking if it needs a login... page url: {url}, page title: {title}");
        let state = SessionState::evaluate(&url, &title, &self.login_url, &self.title_marker);
        info!("[{ctx}] Needs login? {}", state == SessionState::RequiresLogin);
        Ok(state)
    }

    /// Returns the number of waits it took to see an authenticated page, or
    /// `LoginTimeout` when the page still asks for a login after the last one.
    pub async fn ensure_authenticated<N: PageNavigator + ?Sized>(
        &self,
        navigator: &N,
        dispatcher: &AlertDispatcher,
        ctx: LogContext,
    ) -> WatchResult<u32> {
        let mut waits = 0;
        while self.session_state(navigator, ctx).await? == SessionState::RequiresLogin {
            if waits == self.max_checks {
                warn!("[{ctx}] Exceeded maximum login checks ({})", self.max_checks);
                return Err(WatchError::LoginTimeout {
                    attempts: self.max_checks,
                });
            }
            waits += 1;
            debug!("[{ctx}] Try {waits}/{}: Login needed!", self.max_checks);
            dispatcher.dispatch(&AlertEvent::login_required(), ctx).await;
            tokio::time::sleep(self.wait).await;
        }
        Ok(waits)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicU32, Ordering},
    };

    use async_trait::async_trait;
    use tokio::time::Instant;

    use super::*;
    use crate::{
        alert::{AlertKind, AlertSender},
        config::{LoginTimeoutPolicy, NavigatorSettings, SenderSettings, Subject},
        navigator::TableRow,
    };

    const LOGIN: &str = "https://portal.example/login";

    /// Shows the login page until it has been asked for its URL `logged_in_after` times.
    struct LoginPage {
        logged_in_after: u32,
        checks: AtomicU32,
    }

    impl LoginPage {
        fn new(logged_in_after: u32) -> Self {
            Self {
                logged_in_after,
                checks: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl PageNavigator for LoginPage {
        async fn navigate(&mut self, _url: &str) -> WatchResult<()> {
            Ok(())
        }

        async fn current_url(&self) -> WatchResult<String> {
            let seen = self.checks.fetch_add(1, Ordering::SeqCst);
            if seen < self.logged_in_after {
                Ok(LOGIN.to_string())
            } else {
                Ok("https://portal.example/agenda".to_string())
            }
        }

        async fn page_title(&self) -> WatchResult<String> {
            Ok("Agendamento".to_string())
        }

        async fn rows(&self) -> WatchResult<Vec<TableRow>> {
            Ok(vec![])
        }
    }

    struct Counter(Arc<Mutex<Vec<AlertKind>>>);

    #[async_trait]
    impl AlertSender for Counter {
        fn id(&self) -> &str {
            "counter"
        }

        async fn alert(&self, kind: AlertKind, _message: Option<&str>) -> anyhow::Result<()> {
            self.0.lock().unwrap().push(kind);
            Ok(())
        }
    }

    fn config(max_login_retries: u32) -> Config {
        Config {
            subjects: vec![Subject {
                key: "s1".into(),
                name: "CNH - Declaração".into(),
            }],
            alert_senders: vec!["counter".into()],
            login_url: LOGIN.into(),
            schedule_url: "https://portal.example/agenda".into(),
            refresh_interval: Duration::from_secs(60),
            login_wait_interval: Duration::from_secs(30),
            max_login_retries,
            unavailable_marker: "unavailable".into(),
            login_title_marker: "gov".into(),
            login_timeout_policy: LoginTimeoutPolicy::Abort,
            navigator: NavigatorSettings::default(),
            senders: SenderSettings::default(),
        }
    }

    fn recording() -> (AlertDispatcher, Arc<Mutex<Vec<AlertKind>>>) {
        let alerts = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = AlertDispatcher::new(vec![Box::new(Counter(alerts.clone()))]);
        (dispatcher, alerts)
    }

    #[tokio::test(start_paused = true)]
    async fn already_logged_in_needs_no_wait() {
        let guard = LoginGuard::new(&config(3));
        let (dispatcher, alerts) = recording();

        let waits = guard
            .ensure_authenticated(&LoginPage::new(0), &dispatcher, LogContext::default())
            .await
            .unwrap();

        assert_eq!(waits, 0);
        assert!(alerts.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn alerts_once_per_wait_until_logged_in() {
        let guard = LoginGuard::new(&config(3));
        let (dispatcher, alerts) = recording();
        let started = Instant::now();

        let waits = guard
            .ensure_authenticated(&LoginPage::new(2), &dispatcher, LogContext::default())
            .await
            .unwrap();

        assert_eq!(waits, 2);
        assert_eq!(
            *alerts.lock().unwrap(),
            [AlertKind::LoginRequired, AlertKind::LoginRequired]
        );
        assert_eq!(started.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn login_on_the_last_wait_still_succeeds() {
        let guard = LoginGuard::new(&config(3));
        let (dispatcher, alerts) = recording();

        let waits = guard
            .ensure_authenticated(&LoginPage::new(3), &dispatcher, LogContext::default())
            .await
            .unwrap();

        assert_eq!(waits, 3);
        assert_eq!(alerts.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_checks() {
        let guard = LoginGuard::new(&config(3));
        let (dispatcher, alerts) = recording();

        let err = guard
            .ensure_authenticated(&LoginPage::new(u32::MAX), &dispatcher, LogContext::default())
            .await
            .unwrap_err();

        assert!(matches!(err, WatchError::LoginTimeout { attempts: 3 }));
        assert_eq!(alerts.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn never_waits_more_than_the_bound() {
        for max in 1..=4 {
            for needed in 0..=6 {
                let guard = LoginGuard::new(&config(max));
                let (dispatcher, alerts) = recording();

                let result = guard
                    .ensure_authenticated(
                        &LoginPage::new(needed),
                        &dispatcher,
                        LogContext::default(),
                    )
                    .await;

                let alerted = alerts.lock().unwrap().len() as u32;
                assert_eq!(alerted, needed.min(max), "max={max} needed={needed}");
                assert_eq!(result.is_ok(), needed <= max, "max={max} needed={needed}");
            }
        }
    }
}
