//! Automated-sender detection.

/// Sender fragments of CI and notification robots, lowercase.
const BOT_SENDER_FRAGMENTS: &[&str] = &["lkp@intel.com", "bot@", "no-reply@", "robot@"];

/// Whether a `From:` header belongs to an automated sender.
///
/// Plain case-insensitive substring match against a fixed list; new bots
/// are handled by adding fragments.
pub fn is_bot_sender(from: &str) -> bool {
    let from = from.to_lowercase();
    BOT_SENDER_FRAGMENTS
        .iter()
        .any(|fragment| from.contains(fragment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_test_robot() {
        assert!(is_bot_sender("kernel test robot <lkp@intel.com>"));
    }

    #[test]
    fn test_generic_patterns_case_insensitive() {
        assert!(is_bot_sender("syzbot <Syzbot@Syzkaller.appspotmail.com>"));
        assert!(is_bot_sender("CI <No-Reply@ci.example.org>"));
        assert!(is_bot_sender("patchwork-robot@example.org"));
    }

    #[test]
    fn test_humans_pass() {
        assert!(!is_bot_sender("Linus Torvalds <torvalds@linux-foundation.org>"));
        assert!(!is_bot_sender("Robot Fan <fan@example.org>"));
        assert!(!is_bot_sender(""));
    }
}
