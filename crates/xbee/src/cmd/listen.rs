use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use xbee_session::Session;
use xbee_transport::Transport;

use crate::cmd::ListenArgs;
use crate::exit::{session_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_replies, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let port = args.device.open()?;
    info!(device = %args.device.device.display(), baud = args.device.baud, "listening");
    let mut session = Session::new(port);

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let printed = pump(&mut session, &running, args.count, args.poll, format)?;
    info!(printed, "stopped listening");
    Ok(SUCCESS)
}

/// Print replies until `running` clears or `count` frames have been printed.
fn pump<T: Transport>(
    session: &mut Session<T>,
    running: &AtomicBool,
    count: Option<usize>,
    poll: Duration,
    format: OutputFormat,
) -> CliResult<usize> {
    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let mut replies = session
            .receive()
            .map_err(|err| session_error("receive failed", err))?;

        if let Some(count) = count {
            replies.truncate(count.saturating_sub(printed));
        }
        if !replies.is_empty() {
            print_replies(&replies, printed, format);
            printed = printed.saturating_add(replies.len());
        }

        if count.is_some_and(|count| printed >= count) {
            break;
        }

        std::thread::sleep(poll);
    }

    Ok(printed)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
