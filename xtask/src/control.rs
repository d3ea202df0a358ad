//! One-shot monitor helpers: type text or press a key in a running guest.

use anyhow::{Context, Result};
use rayos_harness::CancelToken;
use rayos_harness::control::{ChannelTimeouts, ControlChannel};
use std::path::Path;
use std::time::Duration;

/// Options for `send-text`.
pub struct SendText<'a> {
    pub sock: &'a Path,
    pub text: &'a str,
    pub enter: bool,
    /// Window for the socket to appear.
    pub wait: Duration,
    /// Pause after typing, before an optional `quit`.
    pub after: Duration,
    pub quit: bool,
}

fn channel(sock: &Path, wait: Duration, cancel: &CancelToken) -> ControlChannel {
    let timeouts = ChannelTimeouts {
        connect: wait,
        ..ChannelTimeouts::default()
    };
    ControlChannel::new(sock, timeouts, cancel.clone())
}

/// Type text on the guest keyboard.
pub fn send_text(opts: &SendText<'_>, cancel: &CancelToken) -> Result<()> {
    let mut channel = channel(opts.sock, opts.wait, cancel);
    channel
        .type_text(opts.text, opts.enter)
        .with_context(|| format!("Failed to type into {}", opts.sock.display()))?;
    tracing::info!(chars = opts.text.chars().count(), enter = opts.enter, "text sent");

    if !cancel.sleep(opts.after, Duration::from_millis(50)) {
        anyhow::bail!("interrupted");
    }
    if opts.quit {
        channel.quit().context("Failed to send quit")?;
    }
    Ok(())
}

/// Press one key or combination.
pub fn send_key(sock: &Path, key: &str, cancel: &CancelToken) -> Result<()> {
    channel(sock, ChannelTimeouts::default().connect, cancel)
        .send_key(key)
        .with_context(|| format!("Failed to send key `{key}` to {}", sock.display()))?;
    tracing::info!(key, "key sent");
    Ok(())
}
