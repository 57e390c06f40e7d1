//! Panics are caught while the terminal is in raw mode, where printing them
//! would garble the screen. The hook only records the message and a
//! backtrace; the report is printed once unwinding has dropped the terminal.

use std::cell::RefCell;
use std::panic::{self, UnwindSafe};

use backtrace::Backtrace;
use color_backtrace::termcolor::{ColorChoice, StandardStream};
use color_backtrace::BacktracePrinter;

thread_local! {
    static LAST_PANIC: RefCell<Option<PanicReport>> = RefCell::default();
}

struct PanicReport {
    message: String,
    trace: Backtrace,
}

impl PanicReport {
    fn print(self) {
        let mut stderr = StandardStream::stderr(ColorChoice::Auto);

        if let Err(err) = BacktracePrinter::new()
            .message(self.message)
            .print_trace(&self.trace, &mut stderr)
        {
            log::error!("couldn't print backtrace: {err}");
        }
    }
}

/// Runs `f`, returning `None` if it panicked. The panic is logged and then
/// reported on stderr with a coloured backtrace.
#[must_use]
pub fn catch_and_reprint_panic<T>(f: impl FnOnce() -> T + UnwindSafe) -> Option<T> {
    let prev_hook = panic::take_hook();

    panic::set_hook(Box::new(|info| {
        log::error!("{info}");

        LAST_PANIC.replace(Some(PanicReport {
            message: info.to_string(),
            trace: Backtrace::new(),
        }));
    }));

    let result = panic::catch_unwind(f);

    panic::set_hook(prev_hook);

    match result {
        Ok(value) => Some(value),

        Err(_) => {
            match LAST_PANIC.take() {
                Some(report) => report.print(),
                None => eprintln!("panicked without a report"),
            }

            None
        }
    }
}
