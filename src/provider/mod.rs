pub mod cloudflare;

use std::fmt;

/// Outcome of rewriting one record, rendered as a report line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResult {
    pub name: String,
    pub ip: String,
    pub success: bool,
}

impl fmt::Display for UpdateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.success { "✅" } else { "❌" };
        write!(f, "{} {} → {}", mark, self.name, self.ip)
    }
}
