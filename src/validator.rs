// Installation validity rules: decides whether a name match is a real install
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Substrings that never appear in a genuine install path
const NEVER_INSTALL: &[&str] = &[
    // Office suite
    "microsoft office",
    "office16",
    "office15",
    "office14",
    "office365",
    // IDEs and editors
    "visual studio",
    "vscode",
    "code",
    "session storage",
    "local storage",
    "cache",
    "temp",
    "temporary",
    "logs",
    "log files",
    // Browser profiles
    "google\\chrome",
    "mozilla\\firefox",
    "microsoft\\edge",
    "appdata\\local\\google",
    "appdata\\local\\mozilla",
    // Windows
    "system32",
    "syswow64",
    "windows\\system32",
    "program files\\windows",
    // Build output
    "node_modules",
    ".vs",
    ".vscode",
    "bin",
    "obj",
    "debug",
    "release",
    // Browser state
    "webcache",
    "browsercache",
    "cookies",
    "history",
    // Documents
    "\\desktop\\temp",
    "\\desktop\\cache",
    "desktop\\temp",
    "desktop\\cache",
    "\\documents\\my ",
    "\\downloads\\",
    "\\pictures\\",
    "\\videos\\",
    "\\music\\",
];

const BLOCKED_EXTENSIONS: &[&str] = &["txt", "log", "tmp", "cache", "dat", "dll", "sys"];

/// Segment endings that mark a file rather than an app folder
const FILE_SEGMENT_SUFFIXES: &[&str] = &[".dll", ".sys", ".tmp", ".log"];

type AppValidator = fn(&Path, &str) -> bool;

/// App-specific validators. The first key contained in the lowercase app
/// name wins, so order matters.
const APP_VALIDATORS: &[(&str, AppValidator)] = &[
    ("skype", validate_skype),
    ("session", validate_session),
    ("teams", validate_teams),
    ("discord", validate_discord),
    ("telegram", validate_telegram),
    ("zoom", validate_zoom),
];

/// Lowercase path with `\` separators, the form all rules are written in
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase().replace('/', "\\")
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Installation validator. When anchored to a volume, rules see paths
/// relative to it (`\program files\zoom`), the way they would on a drive root.
#[derive(Debug, Clone, Default)]
pub struct InstallationValidator {
    volume: Option<PathBuf>,
}

impl InstallationValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchored(volume: impl Into<PathBuf>) -> Self {
        Self {
            volume: Some(volume.into()),
        }
    }

    fn key(&self, path: &Path) -> String {
        if let Some(relative) = self.volume.as_deref().and_then(|v| path.strip_prefix(v).ok()) {
            return format!("\\{}", path_key(relative));
        }
        path_key(path)
    }

    pub fn is_valid(&self, app_name: &str, path: &Path) -> bool {
        let key = self.key(path);
        let app = app_name.to_lowercase();

        if path.is_file() && !key.ends_with(".exe") {
            return false;
        }

        let blocked_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| BLOCKED_EXTENSIONS.contains(&e.to_lowercase().as_str()));
        if blocked_ext {
            return false;
        }

        if let Some(hit) = NEVER_INSTALL.iter().find(|p| key.contains(*p)) {
            debug!("Rejected {} for {}: contains {:?}", path.display(), app_name, hit);
            return false;
        }

        if let Some((_, validator)) = APP_VALIDATORS.iter().find(|(k, _)| app.contains(k)) {
            return validator(path, &key);
        }

        generic_install(&app, &key)
    }
}

fn generic_install(app: &str, key: &str) -> bool {
    let base = app.split_whitespace().next().unwrap_or_default();
    if base.is_empty() {
        return false;
    }

    let templates = [
        format!("program files\\{base}"),
        format!("program files (x86)\\{base}"),
        format!("appdata\\local\\{base}"),
        format!("appdata\\roaming\\{base}"),
        format!("local\\programs\\{base}"),
        format!("programs\\{base}"),
        format!("microsoft\\{base}"),
    ];
    if templates.iter().any(|t| key.contains(t.as_str())) {
        return true;
    }
    if contains_any(
        key,
        &[
            "program files\\microsoft\\skype",
            "appdata\\roaming\\telegram",
            "local\\programs\\signal",
        ],
    ) {
        return true;
    }

    let full = app.replace(' ', "");
    let full_templates = [
        format!("program files\\{full}"),
        format!("appdata\\local\\{full}"),
        format!("appdata\\roaming\\{full}"),
    ];
    if full_templates.iter().any(|t| key.contains(t.as_str())) {
        return true;
    }

    key.split('\\')
        .filter(|part| part.starts_with(base))
        .any(|part| !FILE_SEGMENT_SUFFIXES.iter().any(|s| part.ends_with(s)))
}

fn validate_skype(_path: &Path, key: &str) -> bool {
    // SkypeSrv ships inside Office; Lync/Communicator are the old Skype for Business
    if contains_any(
        key,
        &["skypesrv", "office16", "office15", "microsoft office", "lync", "communicator"],
    ) {
        return false;
    }
    contains_any(
        key,
        &[
            "skype for desktop",
            "skypefordesktop",
            "microsoft\\skype",
            "\\skype\\",
            "program files\\skype",
        ],
    )
}

fn validate_session(path: &Path, key: &str) -> bool {
    if contains_any(
        key,
        &[
            "session storage",
            "local storage",
            "webstorage",
            "browser",
            "cache",
            "temp",
            "vscode",
            "code\\session",
        ],
    ) {
        return false;
    }

    if key.ends_with(".exe") {
        let name = key.rsplit('\\').next().unwrap_or(key);
        return name.contains("session");
    }
    if !path.is_dir() {
        return false;
    }

    let Ok(entries) = fs::read_dir(path) else {
        return false;
    };
    let has_session_exe = entries.flatten().any(|entry| {
        let name = entry.file_name().to_string_lossy().to_lowercase();
        name.ends_with(".exe") && name.contains("session")
    });

    has_session_exe
        || key.contains("session-desktop")
        || key.contains("session desktop")
        || (key.ends_with("session") && key.contains("programs"))
}

fn validate_teams(_path: &Path, key: &str) -> bool {
    contains_any(
        key,
        &[
            "microsoft\\teams",
            "program files\\microsoft\\teams",
            "local\\microsoft\\teams",
        ],
    )
}

fn validate_discord(_path: &Path, key: &str) -> bool {
    contains_any(
        key,
        &[
            "local\\discord",
            "local\\discordcanary",
            "local\\discordptb",
            "program files\\discord",
        ],
    )
}

fn validate_telegram(_path: &Path, key: &str) -> bool {
    contains_any(
        key,
        &["telegram desktop", "roaming\\telegram", "program files\\telegram"],
    )
}

fn validate_zoom(_path: &Path, key: &str) -> bool {
    if contains_any(key, &["cache", "temp", "browser"]) {
        return false;
    }
    contains_any(key, &["roaming\\zoom", "program files\\zoom", "local\\zoom"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn valid(app: &str, path: &str) -> bool {
        InstallationValidator::new().is_valid(app, Path::new(path))
    }

    #[test]
    fn test_skype_inside_office_rejected() {
        assert!(!valid(
            "Skype",
            "C:\\Program Files\\Microsoft Office\\root\\Office16\\SkypeSrv"
        ));
        assert!(!valid("Skype", "D:/Apps/Office16/SkypeSrv"));
    }

    #[test]
    fn test_skype_desktop_accepted() {
        assert!(valid(
            "Skype",
            "C:\\Program Files\\Microsoft\\Skype for Desktop"
        ));
        assert!(valid("Skype", "C:\\Users\\u\\AppData\\Roaming\\Skype\\"));
        assert!(!valid("Skype", "C:\\Users\\u\\AppData\\Roaming\\Lync\\Skype"));
    }

    #[test]
    fn test_global_exclusions() {
        assert!(!valid("Slack", "C:\\Users\\u\\AppData\\Local\\Temp\\slack"));
        assert!(!valid("Signal", "C:\\Users\\u\\Downloads\\signal\\"));
        assert!(!valid("Mumble", "C:\\src\\mumble\\bin"));
        assert!(!valid("Slack", "C:\\Program Files\\Slack\\slack.dll"));
        assert!(!valid("Viber", "C:\\Program Files\\Viber\\viber.log"));
    }

    #[test]
    fn test_generic_templates() {
        assert!(valid("Slack", "C:\\Program Files\\Slack"));
        assert!(valid("WireGuard", "C:\\Program Files\\WireGuard"));
        assert!(valid("Viber", "C:\\Users\\u\\AppData\\Local\\Viber"));
        assert!(valid("NoMachine", "C:\\Program Files (x86)\\NoMachine"));
        assert!(valid("Cisco AnyConnect", "C:\\Program Files\\Cisco\\Cisco AnyConnect"));
        assert!(valid(
            "Remote Desktop Manager",
            "C:\\Program Files\\RemoteDesktopManager"
        ));
    }

    #[test]
    fn test_generic_segment_rule() {
        assert!(valid("Mullvad", "E:\\Portable\\mullvad-vpn"));
        assert!(!valid("Mullvad", "E:\\Portable\\other\\tool"));
    }

    #[test]
    fn test_teams_requires_microsoft_folder() {
        assert!(valid("Microsoft Teams", "C:\\Users\\u\\AppData\\Local\\Microsoft\\Teams"));
        assert!(!valid("Microsoft Teams", "C:\\Users\\u\\Projects\\teams"));
    }

    #[test]
    fn test_discord_variants() {
        assert!(valid("Discord", "C:\\Users\\u\\AppData\\Local\\DiscordPTB"));
        assert!(valid("Discord", "C:\\Program Files\\Discord"));
        assert!(!valid("Discord", "C:\\Games\\discord-bot"));
    }

    #[test]
    fn test_telegram_and_zoom() {
        assert!(valid("Telegram", "C:\\Users\\u\\AppData\\Roaming\\Telegram Desktop"));
        assert!(!valid("Telegram", "C:\\Tools\\telegram-cli"));
        assert!(valid("Zoom", "C:\\Users\\u\\AppData\\Roaming\\Zoom"));
        assert!(!valid("Zoom", "C:\\Users\\u\\AppData\\Roaming\\Zoom\\browser"));
    }

    #[test]
    fn test_first_registry_key_wins() {
        // both "session" and "teams" appear; "session" is registered first
        assert!(!valid(
            "Session Teams",
            "C:\\Users\\u\\AppData\\Local\\Microsoft\\Teams"
        ));
    }

    #[test]
    fn test_session_directory_with_executable() {
        let tmp = TempDir::new().unwrap();
        let app_dir = tmp.path().join("Programs").join("Session");
        fs::create_dir_all(&app_dir).unwrap();
        fs::write(app_dir.join("Session.exe"), b"").unwrap();

        let validator = InstallationValidator::anchored(tmp.path());
        assert!(validator.is_valid("Session", &app_dir));
        assert!(validator.is_valid("Session", &app_dir.join("Session.exe")));

        let storage = tmp.path().join("Code").join("Session Storage");
        fs::create_dir_all(&storage).unwrap();
        assert!(!validator.is_valid("Session", &storage));
    }

    #[test]
    fn test_plain_file_rejected() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("Program Files").join("Slack");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("slack"), b"").unwrap();
        fs::write(dir.join("slack.exe"), b"").unwrap();

        let validator = InstallationValidator::anchored(tmp.path());
        assert!(!validator.is_valid("Slack", &dir.join("slack")));
        assert!(validator.is_valid("Slack", &dir.join("slack.exe")));
        assert!(validator.is_valid("Slack", &dir));
    }

    #[test]
    fn test_anchored_key_is_volume_relative() {
        let validator = InstallationValidator::anchored("/mnt/cache-disk");
        assert_eq!(
            validator.key(Path::new("/mnt/cache-disk/Program Files/Zoom")),
            "\\program files\\zoom"
        );
        assert!(validator.is_valid("Zoom", Path::new("/mnt/cache-disk/Program Files/Zoom")));
    }
}
