// Well-known install locations checked directly before the tree walk
use crate::models::{Category, Detection, DetectionMethod, RecordKind};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Base {
    Volume,
    /// `Users\<user>` on the volume
    Profile,
}

/// One known application location. The first existing alternative is
/// reported; the rest are ignored.
struct KnownLocation {
    name: &'static str,
    base: Base,
    alternatives: &'static [&'static str],
}

const fn at(name: &'static str, base: Base, alternatives: &'static [&'static str]) -> KnownLocation {
    KnownLocation {
        name,
        base,
        alternatives,
    }
}

const VPN_LOCATIONS: &[KnownLocation] = &[at(
    "TAP-Windows (OpenVPN)",
    Base::Volume,
    &["Program Files/TAP-Windows", "Program Files (x86)/TAP-Windows"],
)];

const CHAT_LOCATIONS: &[KnownLocation] = &[
    at("Discord", Base::Profile, &["AppData/Local/Discord"]),
    at("Discord Canary", Base::Profile, &["AppData/Local/DiscordCanary"]),
    at("Discord PTB", Base::Profile, &["AppData/Local/DiscordPTB"]),
    at("Zalo", Base::Profile, &["AppData/Local/Programs/Zalo"]),
    at("Zalo", Base::Profile, &["AppData/Local/ZaloPC"]),
    at("Zalo", Base::Volume, &["Program Files/Zalo"]),
    at("Zalo", Base::Volume, &["Program Files (x86)/Zalo"]),
    at("Microsoft Teams", Base::Profile, &["AppData/Local/Microsoft/Teams"]),
    at("Microsoft Teams", Base::Volume, &["Program Files/Microsoft/Teams"]),
    at("Microsoft Teams", Base::Volume, &["Program Files (x86)/Microsoft/Teams"]),
    at("Skype", Base::Profile, &["AppData/Local/Microsoft/SkypeForDesktop"]),
    at("Skype", Base::Volume, &["Program Files/Microsoft/Skype for Desktop"]),
    at("Telegram", Base::Profile, &["AppData/Roaming/Telegram Desktop"]),
    at("WhatsApp", Base::Profile, &["AppData/Local/WhatsApp"]),
    at("Slack", Base::Profile, &["AppData/Local/slack"]),
    at("Zoom", Base::Profile, &["AppData/Roaming/Zoom"]),
    at("Viber", Base::Profile, &["AppData/Local/Viber"]),
];

const KASPERSKY: KnownLocation = at(
    "Kaspersky",
    Base::Volume,
    &["Program Files/Kaspersky Lab", "Program Files (x86)/Kaspersky Lab"],
);

impl KnownLocation {
    /// First existing alternative, or `None`
    fn locate(&self, volume: &Path, profile: &Path) -> Option<PathBuf> {
        let base = match self.base {
            Base::Volume => volume,
            Base::Profile => profile,
        };
        self.alternatives
            .iter()
            .map(|rel| join_relative(base, rel))
            .find(|path| path.exists())
    }
}

fn locations(category: Category) -> (&'static [KnownLocation], RecordKind, DetectionMethod) {
    match category {
        Category::Vpn => (
            VPN_LOCATIONS,
            RecordKind::VpnNetworkAdapter,
            DetectionMethod::DirectCheck,
        ),
        Category::Chat => (
            CHAT_LOCATIONS,
            RecordKind::CommunicationApp,
            DetectionMethod::CommonPathCheck,
        ),
        Category::Remote => (&[], RecordKind::RemoteControlSoftware, DetectionMethod::DirectCheck),
    }
}

fn join_relative(base: &Path, relative: &str) -> PathBuf {
    relative.split('/').fold(base.to_path_buf(), |path, part| path.join(part))
}

/// Records for every known location of `category` that exists on `volume`,
/// in declaration order.
pub fn known_detections(category: Category, volume: &Path, username: &str) -> Vec<Detection> {
    let (known, kind, method) = locations(category);
    let profile = volume.join("Users").join(username);

    known
        .iter()
        .filter(|location| location.base == Base::Volume || !username.is_empty())
        .filter_map(|location| {
            location.locate(volume, &profile).map(|path| Detection {
                name: location.name.to_string(),
                path,
                category: kind,
                detection_method: method,
            })
        })
        .collect()
}

/// Kaspersky Lab install directory on `volume`, if any
pub fn kaspersky_install(volume: &Path) -> Option<PathBuf> {
    KASPERSKY.locate(volume, volume)
}
