use std::io::{self, Write};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use lanprobe_core::scanner::{ProgressCallback, ScanProgress};

use crate::terminal::colors;

static PROGRESS: OnceLock<ProgressBar> = OnceLock::new();

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

/// Hidden until [`start`] so logs before then go straight to stdout.
pub fn bar() -> &'static ProgressBar {
    PROGRESS.get_or_init(ProgressBar::hidden)
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICK_STRINGS)
}

fn scan_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} [{bar:32.green/white}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_strings(TICK_STRINGS)
        .progress_chars("━╸ ")
}

pub fn start(message: &str) {
    let pb = bar();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(spinner_style());
    pb.set_message(format!("{}", message.color(colors::TEXT_DEFAULT)));
    pb.enable_steady_tick(Duration::from_millis(100));
}

/// Turns scanner progress into bar updates. Switches to a bar on the first port of a host.
pub fn scan_callback() -> ProgressCallback {
    Arc::new(|p: ScanProgress| {
        let pb = bar();
        if p.scanned == 1 {
            pb.set_style(scan_style());
            pb.set_length(p.total as u64);
        }
        pb.set_position(p.scanned as u64);
        pb.set_message(format!("port {}", p.port.to_string().bold()));
        if p.scanned == p.total {
            pb.set_style(spinner_style());
            pb.set_message(format!("{}", "waiting for more hosts...".color(colors::TEXT_DEFAULT)));
        }
    })
}

pub fn finish() {
    bar().finish_and_clear();
}

/// Log sink that keeps the progress bar intact.
pub struct ProgressWriter;

impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let pb = bar();
        if pb.is_hidden() || pb.is_finished() {
            io::stdout().write_all(buf)?;
            return Ok(buf.len());
        }

        let msg = String::from_utf8_lossy(buf);
        pb.println(msg.trim_end());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}
