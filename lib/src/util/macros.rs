/// Evaluates the block, logging how long it took at `debug` level.
macro_rules! time {
    ($label:expr, $($token:tt)*) => ({
        let start = std::time::Instant::now();
        let value = { $($token)* };
        tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "{}", $label);
        value
    });
}

pub(crate) use time;
