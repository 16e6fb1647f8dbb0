//! Opening image attachments outside the terminal.

use std::io;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use tracing::debug;

/// Something that can show an image URL to the user.
pub trait ImageViewer: Send + Sync {
    /// Best-effort; returns once the viewer has been launched, not closed.
    fn open(&self, url: &str) -> io::Result<()>;
}

/// Hands the URL to the platform's default opener (`open`, `xdg-open`, `start`).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemViewer;

impl SystemViewer {
    fn command(url: &str) -> Command {
        #[cfg(target_os = "macos")]
        {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        }
        #[cfg(target_os = "windows")]
        {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", url]);
            cmd
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        }
    }
}

/// Start `cmd` detached from the terminal and wait for it on a helper thread
/// so the exited child is reaped.
fn launch(mut cmd: Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(thread::spawn(move || {
        let status = child.wait();
        debug!(?status, "Image viewer exited");
        status
    }))
}

impl ImageViewer for SystemViewer {
    fn open(&self, url: &str) -> io::Result<()> {
        launch(Self::command(url)).map(|_| ())
    }
}
