use std::sync::Arc;

use log::{error, info, warn};
use slotwatch::{
    ChromeNavigator, Config, LOG_FILE, LoadFromEnv, PollLoop, ShutdownSignals, WatchEnv,
    WatchError, build_dispatcher, init_logging,
};

async fn run() -> i32 {
    let env = match WatchEnv::load_from_env() {
        Ok(env) => env,
        Err(e) => {
            error!("{e:#}");
            eprintln!("{e:#}");
            return WatchError::Config(e.to_string()).exit_code();
        }
    };

    info!("Reading configuration file: {}", env.config_path());
    let loaded = Config::load(env.config_path())
        .and_then(|config| build_dispatcher(&config).map(|dispatcher| (config, dispatcher)));
    let (config, dispatcher) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Error reading properties from file {}: {e}", env.config_path());
            eprintln!("{e}");
            return e.exit_code();
        }
    };
    if dispatcher.is_empty() {
        warn!("No alert senders configured, matches will only be logged");
    }

    let mut signals = match ShutdownSignals::install() {
        Ok(signals) => signals,
        Err(e) => {
            error!("{e:#}");
            eprintln!("{e:#}");
            return 1;
        }
    };

    let navigator = match ChromeNavigator::launch(&config.navigator).await {
        Ok(navigator) => navigator,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            return e.exit_code();
        }
    };

    let mut poll_loop = PollLoop::new(Arc::new(config), navigator, dispatcher);
    let outcome = tokio::select! {
        result = poll_loop.run() => Ok(result),
        signal = signals.recv() => Err(signal),
    };
    poll_loop.into_navigator().close().await;

    match outcome {
        Err(signal) => {
            info!("Received {signal}, shutting down");
            0
        }
        Ok(Ok(never)) => match never {},
        Ok(Err(e)) => {
            eprintln!("{e}");
            e.exit_code()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = init_logging(LOG_FILE) {
        eprintln!("{e:#}");
    }
    let code = run().await;
    std::process::exit(code);
}
