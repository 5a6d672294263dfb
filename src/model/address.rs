//! `From:` header splitting for display.

/// The sender of an archived message.
///
/// # Examples
/// - `"Linus Torvalds <torvalds@linux-foundation.org>"` → `name = "Linus Torvalds"`
/// - `"lkp@intel.com"` → `name = ""`, `address = "lkp@intel.com"`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Sender {
    /// Display name (may be empty).
    pub name: String,
    /// Bare address, or the raw header when no address could be found.
    pub address: String,
}

impl Sender {
    /// Split a `From:` header value into name and address.
    ///
    /// Accepts `addr`, `<addr>`, `Name <addr>` and `"Quoted, Name" <addr>`.
    /// Anything else is kept verbatim as the address.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let (Some(open), Some(close)) = (trimmed.rfind('<'), trimmed.rfind('>')) {
            if close > open {
                return Self {
                    name: strip_quotes(&trimmed[..open]),
                    address: trimmed[open + 1..close].trim().to_string(),
                };
            }
        }

        Self {
            name: String::new(),
            address: trimmed.to_string(),
        }
    }

    /// `"Name <address>"`, or just the address when there is no name.
    pub fn display(&self) -> String {
        if self.name.is_empty() {
            self.address.clone()
        } else {
            format!("{} <{}>", self.name, self.address)
        }
    }
}

fn strip_quotes(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
