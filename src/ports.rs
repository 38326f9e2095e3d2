//! Side-effect ports the linker talks to: progress reporting and the
//! browser that shows the approval page.

use std::io;
use std::process::{Command, Stdio};
use std::thread;
use tokio::sync::mpsc;
use tracing::debug;

/// One-way sink for human-readable status text.
pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str);
}

/// Status lines as a channel of events. A dropped receiver is ignored.
impl ProgressSink for mpsc::UnboundedSender<String> {
    fn report(&self, message: &str) {
        let _ = self.send(message.to_string());
    }
}

pub(crate) fn report(progress: Option<&dyn ProgressSink>, message: &str) {
    if let Some(sink) = progress {
        sink.report(message);
    }
}

/// Opens a URL for the user. Failures are the linker's to log.
pub trait BrowserLauncher: Send + Sync {
    fn launch(&self, url: &str) -> io::Result<()>;
}

/// Launches the platform's default URL handler.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn launch(&self, url: &str) -> io::Result<()> {
        let mut child = opener_command(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        // Openers exit once the handler is running; wait so they are reaped.
        thread::spawn(move || {
            if let Err(e) = child.wait() {
                debug!(error = %e, "Browser opener did not exit cleanly");
            }
        });
        Ok(())
    }
}

#[cfg(target_os = "windows")]
fn opener_command(url: &str) -> Command {
    windows_opener(url)
}

#[cfg(target_os = "macos")]
fn opener_command(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn opener_command(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}

/// The URL goes to the protocol handler as one argument. Routing it through
/// `cmd /C start` would split the query string at `&`.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn windows_opener(url: &str) -> Command {
    let mut cmd = Command::new("rundll32");
    cmd.args(["url.dll,FileProtocolHandler", url]);
    cmd
}
