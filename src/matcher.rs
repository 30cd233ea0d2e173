// Multi-tier heuristic for matching filesystem entry names against app patterns
use crate::patterns::PatternTable;
use regex::Regex;
use std::collections::HashMap;

/// Remainders accepted after a pattern found at the start of an entry
/// ("discord" + "canary", "teamspeak" style names).
const KNOWN_SUFFIXES: &[&str] = &[
    "canary",
    "beta",
    "alpha",
    "desktop",
    "fordesktop",
    "client",
    "viewer",
    "admin",
    "manager",
    "pro",
    "free",
    "business",
    "personal",
    "streamer",
    "speak",
    "speak3",
    "meet",
    "meetings",
];

/// Vendor words accepted in front of a pattern found at the end of an entry
const KNOWN_PREFIXES: &[&str] = &[
    "microsoft",
    "google",
    "adobe",
    "real",
    "tight",
    "ultra",
    "tiger",
    "free",
    "gnu",
    "open",
];

/// Minimum share of the entry name a prefix/suffix pattern must cover (70%)
const COVERAGE_NUM: usize = 7;
const COVERAGE_DEN: usize = 10;

/// Lowercased, trimmed, without spaces, hyphens and underscores
pub fn clean(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .collect()
}

/// True when `tail` is nothing but edition words, version digits or a short
/// tag, e.g. "canary", "3client", "fordesktopbeta", "x64".
fn edition_tail(tail: &str) -> bool {
    let tail = tail.trim_start_matches(char::is_numeric);
    if tail.chars().count() <= 3 {
        return true;
    }
    KNOWN_SUFFIXES
        .iter()
        .any(|s| tail.strip_prefix(s).is_some_and(edition_tail))
}

fn word_regex(pattern: &str) -> Option<Regex> {
    let word = pattern.trim();
    if word.is_empty() {
        return None;
    }
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word))).ok()
}

/// Name matcher with word-boundary regexes compiled once per pattern
#[derive(Debug, Default)]
pub struct NameMatcher {
    word_patterns: HashMap<String, Regex>,
}

impl NameMatcher {
    pub fn for_table(table: &PatternTable) -> Self {
        let mut word_patterns = HashMap::new();
        for app in table.iter() {
            for pattern in &app.patterns {
                if let Some(re) = word_regex(pattern) {
                    word_patterns.insert(pattern.clone(), re);
                }
            }
        }
        Self { word_patterns }
    }

    /// First application (in table order) with a pattern matching `entry`
    pub fn find_app<'t>(&self, entry: &str, table: &'t PatternTable) -> Option<&'t str> {
        table
            .iter()
            .find(|app| app.patterns.iter().any(|p| self.matches(entry, p)))
            .map(|app| app.name.as_str())
    }

    pub fn matches(&self, entry: &str, pattern: &str) -> bool {
        let entry_clean = clean(entry);
        let pattern_clean = clean(pattern);
        if pattern_clean.is_empty() {
            return false;
        }

        // 1. exact, ignoring case and separators
        if entry_clean == pattern_clean {
            return true;
        }

        // 2. exact as given
        if entry == pattern {
            return true;
        }

        // 3. standalone word
        if self.word_match(entry, pattern) {
            return true;
        }

        // 4. leading or trailing pattern covering most of the name
        let entry_len = entry_clean.chars().count();
        let pattern_len = pattern_clean.chars().count();
        if (entry_clean.starts_with(&pattern_clean) || entry_clean.ends_with(&pattern_clean))
            && pattern_len * COVERAGE_DEN >= entry_len * COVERAGE_NUM
        {
            return true;
        }

        // 5. contained with a recognised edition suffix or vendor prefix
        affix_match(&entry_clean, &pattern_clean)
    }

    fn word_match(&self, entry: &str, pattern: &str) -> bool {
        match self.word_patterns.get(pattern) {
            Some(re) => bounded_hit(re, entry, pattern),
            None => word_regex(pattern).is_some_and(|re| bounded_hit(&re, entry, pattern)),
        }
    }
}

/// A phrase pattern matches on any bounded occurrence. A single-word
/// pattern must be followed only by an edition tail, so "TeamSpeak 3
/// Client" matches "teamspeak" but "Signal Processing" is not "signal".
fn bounded_hit(re: &Regex, entry: &str, pattern: &str) -> bool {
    if pattern.trim().contains(char::is_whitespace) {
        return re.is_match(entry);
    }
    re.find_iter(entry)
        .any(|m| edition_tail(&clean(&entry[m.end()..])))
}

fn affix_match(entry: &str, pattern: &str) -> bool {
    let Some(pos) = entry.find(pattern) else {
        return false;
    };
    let end = pos + pattern.len();

    if pos == 0 {
        if end == entry.len() {
            return true;
        }
        return edition_tail(&entry[end..]);
    }

    if end == entry.len() {
        let prefix = &entry[..pos];
        return KNOWN_PREFIXES.iter().any(|p| prefix.ends_with(p));
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::CHAT_PATTERNS;

    fn m(entry: &str, pattern: &str) -> bool {
        NameMatcher::default().matches(entry, pattern)
    }

    #[test]
    fn test_exact_match() {
        assert!(m("Discord", "discord"));
        assert!(m("proton-vpn", "proton vpn"));
        assert!(m("Private_Internet_Access", "private internet access"));
    }

    #[test]
    fn test_edition_suffix() {
        assert!(m("DiscordCanary", "discord"));
        assert!(m("SkypeForDesktop", "skype"));
        assert!(m("TeamViewer_Free", "teamviewer"));
        assert!(m("teamspeak3client", "teamspeak"));
        assert!(m("zoom5", "zoom"));
        assert!(m("Slack2024", "slack"));
    }

    #[test]
    fn test_unrelated_word_after_pattern_rejected() {
        assert!(!m("Signal Processing", "signal"));
        assert!(!m("wireshark", "wire"));
        assert!(!m("Session Storage", "session"));
        assert!(!m("teamspeak3", "teams"));
        // "pro" alone does not make "processing" an edition word
        assert!(!m("signalprocessing", "signal"));
    }

    #[test]
    fn test_trailing_words_beyond_edition_tail_rejected() {
        assert!(!m("Zoom Rooms", "zoom"));
        assert!(!m("WireGuard Tunnel", "wireguard"));
        assert!(!m("TeamViewer 15 Host", "teamviewer"));
        assert!(!m("anydeskclientsetup", "anydesk"));
        assert!(!m("discordcanaryupdater", "discord"));
        // the edition words alone still match
        assert!(m("TeamViewer 15", "teamviewer"));
        assert!(m("anydeskclient", "anydesk"));
        assert!(m("discordcanary", "discord"));
    }

    #[test]
    fn test_short_version_remainder() {
        // "v15" is at most three characters
        assert!(m("anydeskv15", "anydesk"));
        assert!(m("psiphon3", "psiphon"));
    }

    #[test]
    fn test_vendor_prefix() {
        assert!(m("MicrosoftTeams", "teams"));
        assert!(m("TightVNC", "vnc"));
        assert!(m("OpenVPN", "vpn"));
        assert!(!m("MyCompanyTeams", "teams"));
    }

    #[test]
    fn test_word_boundary() {
        assert!(m("Cisco AnyConnect Secure Mobility Client", "cisco anyconnect"));
        assert!(m("cisco-anyconnect", "anyconnect"));
        assert!(m("TeamSpeak 3 Client", "teamspeak"));
        assert!(m("signal-desktop", "signal"));
        assert!(!m("Zoom Outlook Plugin", "zoom"));
        assert!(m("Hide.me VPN", "hide.me"));
        assert!(!m("openvpnclient", "vpn"));
    }

    #[test]
    fn test_coverage_ratio() {
        // 7 of 10 characters
        assert!(m("openvpngui", "openvpn"));
        // 5 of 8 characters, and "srv" is short enough for the suffix rule
        assert!(m("skypesrv", "skype"));
        // 4 of 13 characters with an unknown remainder
        assert!(!m("zoomoutlookplugin", "zoom"));
    }

    #[test]
    fn test_middle_occurrence_rejected() {
        assert!(!m("mytelegrambackup", "telegram"));
        assert!(!m("xdiscordx", "discord"));
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        assert!(!m("anything", ""));
        assert!(!m("anything", " - "));
    }

    #[test]
    fn test_find_app_uses_declaration_order() {
        let matcher = NameMatcher::for_table(&CHAT_PATTERNS);
        assert_eq!(matcher.find_app("DiscordPTB", &CHAT_PATTERNS), Some("Discord"));
        // "teams" is declared first but only "teamspeak" fits
        assert_eq!(
            matcher.find_app("TeamSpeak 3 Client", &CHAT_PATTERNS),
            Some("TeamSpeak")
        );
        assert_eq!(
            matcher.find_app("Microsoft Teams", &CHAT_PATTERNS),
            Some("Microsoft Teams")
        );
        assert_eq!(matcher.find_app("Photoshop", &CHAT_PATTERNS), None);
    }
}
