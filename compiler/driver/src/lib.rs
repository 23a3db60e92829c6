//! The command-line front end of the compiler.

use diagnostics::{Class, Diagnostic, error::Result, render};
use session::Session;
use std::borrow::Cow;
use utility::paint::{ColorChoice, epaint};

pub use cli::BuildMode;
pub use pipeline::{OUTPUT_EXTENSION, Pipeline};

mod cli;
mod pipeline;

#[cfg(test)]
mod test;

pub fn main() -> Result {
    set_panic_hook();

    let arguments = cli::arguments();
    let session = Session::new(arguments.options);

    if arguments.unstable_help {
        return cli::unstable_help(session.options().color).map_err(|error| {
            let error = Diagnostic::error()
                .class(Class::Io)
                .message("could not print the unstable options")
                .note(error.to_string())
                .report(session.engine());
            let _ = session.engine().display_to_stderr();
            error
        });
    }

    Pipeline::new(arguments.mode, &arguments.path, &session).run().map(drop)
}

fn set_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let payload = info.payload();

        let message = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("unknown cause")
            .to_owned();

        let backtrace = std::env::var("FOOD_BACKTRACE")
            .is_ok_and(|variable| variable != "0")
            .then(std::backtrace::Backtrace::force_capture);

        let diagnostic = Diagnostic::fatal()
            .class(Class::InternalError)
            .message(message)
            .with(|it| match info.location() {
                Some(location) => it.note(format!("at ‘{location}’")),
                None => it,
            })
            .note(std::thread::current().name().map_or_else(
                || Cow::from("in an unnamed thread"),
                |name| format!("in thread ‘{name}’").into(),
            ))
            .note("the compiler unexpectedly panicked. this is a bug. we would appreciate a bug report")
            .note(format!("food {}", env!("CARGO_PKG_VERSION")))
            .with(|it| match backtrace {
                Some(backtrace) => it.note(format!("with the following backtrace:\n{backtrace}")),
                None => it.help(
                    "rerun with the environment variable ‘FOOD_BACKTRACE=1’ to display a backtrace",
                ),
            })
            .untagged();

        // FIXME: respect `--color`
        let _ = epaint(|painter| render(&diagnostic, None, painter), ColorChoice::Auto);
    }));
}
