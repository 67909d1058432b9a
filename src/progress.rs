/// Progress reporting for channel history fetches.
///
/// Animated bar in a TTY, plain stderr lines otherwise, and fully silent when
/// hidden (library callers and tests).
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;

/// Maximum width for channel names in progress display.
const CHANNEL_NAME_WIDTH: usize = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Tty,
    Text,
    Hidden,
}

/// Truncates a string to a maximum width with middle ellipsis if needed.
///
/// Counts characters, not bytes, so channel names with emoji never split
/// inside a UTF-8 sequence.
fn truncate_middle(s: &str, max_width: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_width {
        return format!("{:<width$}", s, width = max_width);
    }

    let ellipsis = '…';
    if max_width <= 1 {
        return s.chars().take(max_width).collect();
    }

    let available = max_width - 1;
    let start_len = available.div_ceil(2);
    let end_len = available / 2;
    let start: String = s.chars().take(start_len).collect();
    let end: String = s.chars().skip(char_count - end_len).collect();
    format!("{}{}{}", start, ellipsis, end)
}

/// Formats a fetched channel on a single line.
///
/// Example: `#general                          42 messages`
pub fn format_fetched_channel(channel_name: &str, messages: usize) -> String {
    let name = truncate_middle(&format!("#{}", channel_name), CHANNEL_NAME_WIDTH);
    format!("{} {:>5} messages", name, messages)
}

/// Progress tracking across all channel fetches of one run.
#[derive(Clone)]
pub struct FetchProgress {
    multi: Option<MultiProgress>,
    overall: Option<ProgressBar>,
    mode: Mode,
}

impl FetchProgress {
    /// Creates a progress display for `total_channels` fetches on stderr.
    pub fn new(total_channels: usize) -> Self {
        if !std::io::stderr().is_terminal() {
            return Self {
                multi: None,
                overall: None,
                mode: Mode::Text,
            };
        }

        let mp = MultiProgress::new();
        let overall = mp.add(ProgressBar::new(total_channels as u64));
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} channels ({percent}%)")
        {
            overall.set_style(style.progress_chars("█▓░"));
        }

        Self {
            multi: Some(mp),
            overall: Some(overall),
            mode: Mode::Tty,
        }
    }

    /// A progress handle that reports nothing.
    pub fn hidden() -> Self {
        Self {
            multi: None,
            overall: None,
            mode: Mode::Hidden,
        }
    }

    pub fn inc(&self) {
        if let Some(ref overall) = self.overall {
            overall.inc(1);
        }
    }

    /// Finishes and hides the overall progress bar.
    pub fn finish(&self) {
        if let Some(ref overall) = self.overall {
            overall.finish_and_clear();
        }
    }

    /// Print a line without breaking the progress bar.
    pub fn println(&self, msg: &str) {
        match self.mode {
            Mode::Tty => {
                if let Some(ref mp) = self.multi {
                    let _ = mp.println(msg);
                }
            }
            Mode::Text => eprintln!("{}", msg),
            Mode::Hidden => {}
        }
    }

    pub fn channel_done(&self, channel_name: &str, messages: usize) {
        self.println(&format!("  ✓ {}", format_fetched_channel(channel_name, messages)));
        self.inc();
    }

    pub fn channel_failed(&self, channel_name: &str, reason: &str) {
        self.println(&self.failure_line(channel_name, reason));
        self.inc();
    }

    /// Failure marker is red only on a terminal.
    fn failure_line(&self, channel_name: &str, reason: &str) -> String {
        let name = truncate_middle(&format!("#{}", channel_name), CHANNEL_NAME_WIDTH);
        let marker = match self.mode {
            Mode::Tty => "\x1b[31m✗\x1b[0m",
            Mode::Text | Mode::Hidden => "✗",
        };
        format!("  {} {} ({})", marker, name.trim_end(), reason)
    }
}
