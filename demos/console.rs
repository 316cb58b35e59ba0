use std::error::Error;
use std::fmt;

use record_console_stream::init::{init_console_logging, ColorChoice, StreamConfig};
use tracing::{debug, error, info, trace, warn};

#[derive(Debug)]
struct CheckoutError(std::io::Error);

impl fmt::Display for CheckoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "checkout failed")
    }
}

impl Error for CheckoutError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_console_logging(StreamConfig {
        name: "console-demo".to_string(),
        filter: "trace".to_string(),
        color: ColorChoice::Always,
    })?;

    trace!("starting service");
    debug!(port = 8080, "binding listener");
    info!(user = "ada", cart_items = 3, "checkout started");
    warn!(latency_ms = 812.5, "payment provider is slow");

    let err = CheckoutError(std::io::Error::new(
        std::io::ErrorKind::ConnectionReset,
        "connection reset by peer",
    ));
    error!(error = &err as &(dyn Error + 'static), order_id = 42, "order rejected");

    Ok(())
}
