use std::{sync::Arc, time::SystemTime};

use rt_inject::*;

// Define regular traits and implementor structs

trait Logger: Send + Sync {
    fn log(&self, content: &str);
}
interface!(dyn Logger);

#[derive(Clone, Default)]
struct LoggerImpl;

impl Logger for LoggerImpl {
    fn log(&self, content: &str) {
        tracing::info!("{}", content);
    }
}
injectable!(LoggerImpl: dyn Logger);

#[derive(Clone)]
struct Clock {
    start: SystemTime,
}
injectable!(Clock);

// A record with injectable fields

struct DateLogger {
    logger: Option<Arc<dyn Logger>>,
    clock: Arc<Clock>,
}
record!(DateLogger { clock });

impl DateLogger {
    fn log_date(&self) {
        let elapsed = self.clock.start.elapsed().unwrap_or_default();
        if let Some(logger) = &self.logger {
            logger.log(&format!("{}ms since start", elapsed.as_millis()));
        }
    }
}

#[derive(Debug)]
struct NotReady;

impl std::fmt::Display for NotReady {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("clock not started")
    }
}

impl std::error::Error for NotReady {}

fn uptime(clock: Clock, logger: Arc<dyn Logger>) -> Result<u128, NotReady> {
    let elapsed = clock.start.elapsed().map_err(|_| NotReady)?;
    logger.log("uptime requested");
    Ok(elapsed.as_millis())
}

fn main() -> Result<(), WiringError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut injector = Container::new();
    injector.bind_zero_value::<LoggerImpl>()?;
    injector.bind_singleton(Arc::new(Clock {
        start: SystemTime::now(),
    }))?;

    // Interfaces are resolved through their bound implementors
    let logger: Arc<dyn Logger> = injector.resolve()?;

    let mut date_logger = DateLogger {
        logger: None,
        clock: Arc::new(Clock {
            start: SystemTime::UNIX_EPOCH,
        }),
    };
    injector.inject(&mut date_logger)?;
    date_logger.logger = Some(logger.clone());
    date_logger.log_date();

    // Functions get their arguments from a child scope
    let scope = injector.child();
    let uptime = scope.pre_inject_all(uptime).actualize();
    let mut millis = 0u128;
    uptime.invoke()?.set(&mut [&mut millis])?;
    logger.log(&format!("uptime: {millis}ms"));
    Ok(())
}
