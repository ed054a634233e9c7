/// Signals that stop the watcher and close the browser.
pub struct ShutdownSignals {
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
}

impl ShutdownSignals {
    /// Signals delivered after this returns are not lost, even before `recv`
    /// is first awaited.
    pub fn install() -> anyhow::Result<Self> {
        #[cfg(unix)]
        {
            use anyhow::Context;
            use tokio::signal::unix::{SignalKind, signal};

            let sigterm =
                signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
            let sigint =
                signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;
            Ok(Self { sigterm, sigint })
        }
        #[cfg(not(unix))]
        Ok(Self {})
    }

    /// Waits for the first shutdown signal and returns its name.
    pub async fn recv(&mut self) -> &'static str {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = self.sigterm.recv() => "SIGTERM",
                _ = self.sigint.recv() => "SIGINT",
            }
        }
        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::warn!("Cannot listen for Ctrl-C: {e}");
            }
            "Ctrl-C"
        }
    }
}
