// Canonical identity keys for application display names

/// Known variant names and the identity they collapse to. Checked in order;
/// the first alias contained in the name wins.
const ALIASES: &[(&str, &str)] = &[
    ("zalopc", "zalo"),
    ("discord canary", "discord"),
    ("discord ptb", "discord"),
    ("discordcanary", "discord"),
    ("discordptb", "discord"),
    ("microsoft teams", "teams"),
    ("teams-insider", "teams"),
    ("skype for desktop", "skype"),
    ("skypefordesktop", "skype"),
    ("telegram desktop", "telegram"),
    ("whatsapp desktop", "whatsapp"),
    ("signal desktop", "signal"),
    ("element desktop", "element"),
    ("session desktop", "session"),
];

/// Filler words dropped from names without an alias
const FILLER_WORDS: &[&str] = &["desktop", "for desktop", "client", "app", "messenger"];

/// Identity key used to decide that two detections are the same application
pub fn canonicalize(display_name: &str) -> String {
    let name = display_name.to_lowercase();

    if let Some((_, canonical)) = ALIASES.iter().find(|(alias, _)| name.contains(alias)) {
        return canonical.to_string();
    }

    let mut key = name;
    for word in FILLER_WORDS {
        key = key.replace(&format!(" {word}"), "").replace(word, "");
    }

    key.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .to_string()
}
