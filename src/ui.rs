//! Terminal output for the `serve` and `setup` commands

use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};

static QUIET: AtomicBool = AtomicBool::new(false);

pub fn set_quiet_mode(enabled: bool) {
    QUIET.store(enabled, Ordering::Relaxed);
}

pub fn is_quiet_mode() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// What the API is about to serve with; printed once the listener is bound
pub struct ServeBanner<'a> {
    pub version: &'a str,
    pub address: &'a str,
    pub store: &'a str,
    pub model: &'a str,
}

impl ServeBanner<'_> {
    fn rows(&self) -> [(&'static str, String); 3] {
        [
            ("API", format!("http://{}/api", self.address)),
            ("Store", self.store.to_string()),
            ("Model", self.model.to_string()),
        ]
    }

    pub fn print(&self) {
        if is_quiet_mode() {
            return;
        }
        println!(
            "{} {}",
            "📚 CourseWeaver".magenta().bold(),
            format!("v{}", self.version).green()
        );
        for (label, value) in self.rows() {
            println!("   {:<6} {}", label.cyan(), value.bold());
        }
    }
}

/// Result of one `setup` check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    Done,
    NeedsAttention,
    Failed,
}

impl SetupStep {
    fn symbol(self) -> &'static str {
        match self {
            Self::Done => "✅",
            Self::NeedsAttention => "⚠️ ",
            Self::Failed => "❌",
        }
    }

    /// Failures are printed even in quiet mode
    pub fn print(self, message: &str) {
        let line = format!("{} {message}", self.symbol());
        match self {
            Self::Done if !is_quiet_mode() => println!("{}", line.green().bold()),
            Self::NeedsAttention if !is_quiet_mode() => println!("{}", line.yellow().bold()),
            Self::Failed => eprintln!("{}", line.red().bold()),
            _ => {}
        }
    }
}

pub fn print_heading(message: &str) {
    if !is_quiet_mode() {
        println!("{}", message.magenta().bold());
    }
}

/// Follow-up instructions under a setup step
pub fn print_hint(message: &str) {
    if !is_quiet_mode() {
        println!("   {}", message.cyan());
    }
}
