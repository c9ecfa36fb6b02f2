use console::style;

use crate::types::{AnalysisUnit, UnitKind};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Aligned `label: value` line
    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        println!("  {:<14} {}", style(format!("{}:", label)).dim(), value);
    }

    /// One line per documented unit
    pub fn unit(&self, unit: &AnalysisUnit) {
        let tag = match unit.kind {
            UnitKind::Folder => style("folder").cyan(),
            UnitKind::File => style("file  ").magenta(),
        };
        let note = if unit.documentation.is_empty() {
            style(" (no matching files)").dim().to_string()
        } else {
            String::new()
        };
        println!("  {} {} {}{}", style("✓").green(), tag, unit.path, note);
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
