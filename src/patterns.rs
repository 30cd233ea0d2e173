// Built-in application pattern tables
use crate::models::Category;
use lazy_static::lazy_static;

/// Name patterns for one application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPatterns {
    pub name: String,
    pub patterns: Vec<String>,
}

/// Ordered app name -> patterns mapping. Declaration order decides which
/// application wins when an entry matches several.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternTable {
    apps: Vec<AppPatterns>,
}

impl PatternTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_static(entries: &[(&str, &[&str])]) -> Self {
        let mut table = Self::new();
        for (name, patterns) in entries {
            table.push(name, patterns);
        }
        table
    }

    /// Append an application. Patterns are stored lowercase.
    pub fn push(&mut self, name: &str, patterns: &[&str]) {
        self.apps.push(AppPatterns {
            name: name.to_string(),
            patterns: patterns.iter().map(|p| p.to_lowercase()).collect(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppPatterns> {
        self.apps.iter()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn position(&self, app_name: &str) -> Option<usize> {
        self.apps.iter().position(|a| a.name == app_name)
    }

    pub fn for_category(category: Category) -> &'static PatternTable {
        match category {
            Category::Vpn => &VPN_PATTERNS,
            Category::Chat => &CHAT_PATTERNS,
            Category::Remote => &REMOTE_PATTERNS,
        }
    }
}

lazy_static! {
    pub static ref VPN_PATTERNS: PatternTable = PatternTable::from_static(&[
        ("NordVPN", &["nordvpn"]),
        ("ExpressVPN", &["expressvpn"]),
        ("Surfshark", &["surfshark"]),
        ("CyberGhost", &["cyberghost"]),
        ("ProtonVPN", &["protonvpn", "proton vpn"]),
        ("Windscribe", &["windscribe"]),
        ("HotspotShield", &["hotspotshield", "hotspot shield"]),
        ("TunnelBear", &["tunnelbear"]),
        ("PrivateInternetAccess", &["privateinternetaccess", "private internet access"]),
        // psiphon3 first: the bare name is a common word in unrelated tools
        ("Psiphon", &["psiphon3", "psiphon"]),
        ("Lantern", &["getlantern", "lantern-installer"]),
        ("Hide.me", &["hide.me", "hideme"]),
        ("Betternet", &["betternet"]),
        ("OpenVPN", &["openvpn", "openvpn-gui"]),
        ("TAP-Windows", &["tap-windows"]),
        ("FortiClient", &["forticlient"]),
        ("Cisco AnyConnect", &["cisco anyconnect", "anyconnect"]),
        ("SoftEther", &["softether vpn", "softether"]),
        ("WireGuard", &["wireguard"]),
        ("IPVanish", &["ipvanish"]),
        ("Mullvad", &["mullvad", "mullvadvpn"]),
        ("PureVPN", &["purevpn"]),
        ("VyprVPN", &["vyprvpn"]),
        ("AtlasVPN", &["atlasvpn"]),
        ("VPN Unlimited", &["vpn unlimited", "keepsolid"]),
        ("StrongVPN", &["strongvpn"]),
        ("Private Tunnel", &["private tunnel", "privatetunnel"]),
    ]);

    pub static ref CHAT_PATTERNS: PatternTable = PatternTable::from_static(&[
        ("Discord", &["discord"]),
        ("Zalo", &["zalo", "zalopc"]),
        ("Skype", &["skype"]),
        ("Microsoft Teams", &["teams", "microsoft teams"]),
        ("Telegram", &["telegram"]),
        ("WhatsApp", &["whatsapp"]),
        ("Slack", &["slack"]),
        ("Zoom", &["zoom"]),
        ("Viber", &["viber"]),
        ("WeChat", &["wechat"]),
        ("Line", &["line desktop", "line for desktop"]),
        ("KakaoTalk", &["kakaotalk"]),
        ("Facebook Messenger", &["messenger"]),
        ("Signal", &["signal"]),
        ("Element", &["element"]),
        ("Threema", &["threema"]),
        ("Wire", &["wire"]),
        ("Jami", &["jami"]),
        ("Tox", &["qtox", "utox"]),
        ("Session", &["session"]),
        ("Wickr", &["wickr"]),
        ("Keybase", &["keybase"]),
        ("Mumble", &["mumble"]),
        ("TeamSpeak", &["teamspeak"]),
        ("Ventrilo", &["ventrilo"]),
        ("Jitsi", &["jitsi"]),
        ("Rocket.Chat", &["rocket.chat", "rocketchat"]),
        ("Mattermost", &["mattermost"]),
        ("Franz", &["franz"]),
        ("Ferdi", &["ferdi"]),
        ("Rambox", &["rambox"]),
        ("Ferdium", &["ferdium"]),
    ]);

    pub static ref REMOTE_PATTERNS: PatternTable = PatternTable::from_static(&[
        ("TeamViewer", &["teamviewer"]),
        ("AnyDesk", &["anydesk"]),
        ("UltraViewer", &["ultraviewer"]),
        ("LogMeIn", &["logmein", "logmein client"]),
        ("RealVNC", &["realvnc", "vnc viewer", "vnc-viewer"]),
        ("TightVNC", &["tightvnc"]),
        ("Radmin", &["radmin viewer", "radmin"]),
        ("Chrome Remote Desktop", &["chrome remote desktop", "remoting_host"]),
        ("Microsoft Remote Desktop", &["microsoft remote desktop", "remote desktop connection"]),
        ("Splashtop", &["splashtop streamer", "splashtop business", "splashtop"]),
        ("Parsec", &["parsec"]),
        ("NoMachine", &["nomachine"]),
        ("Ammyy Admin", &["ammyy admin", "ammyy"]),
        ("ShowMyPC", &["showmypc"]),
        ("DWService", &["dwservice", "dwagent"]),
        ("RemotePC", &["remotepc"]),
        ("GoToMyPC", &["gotomypc"]),
        ("VNC Connect", &["vnc connect", "vnc-connect"]),
        ("UltraVNC", &["ultravnc"]),
        ("TigerVNC", &["tigervnc"]),
        ("RustDesk", &["rustdesk"]),
        ("Remmina", &["remmina"]),
        ("Windows Remote Assistance", &["remote assistance", "msra"]),
        ("ConnectWise Control", &["connectwise control", "screenconnect"]),
        ("Remote Utilities", &["remote utilities", "ru server", "ru viewer"]),
        ("PCAnywhere", &["pcanywhere", "symantec pcanywhere"]),
        ("DameWare", &["dameware mini remote control", "dameware"]),
        ("LiteManager", &["litemanager free", "litemanager pro", "litemanager"]),
        ("NetSupport", &["netsupport manager", "netsupport"]),
        ("Remote Desktop Manager", &["remote desktop manager", "devolutions rdm"]),
        ("Supremo", &["supremo"]),
        ("ISL Online", &["isl online", "isl alwayson", "islonline"]),
        ("BeyondTrust", &["beyondtrust remote support", "beyondtrust"]),
        ("LogMeIn Rescue", &["logmein rescue", "rescue lens"]),
        ("Bomgar", &["bomgar representative console", "bomgar"]),
        ("Mikogo", &["mikogo"]),
        ("Jump Desktop", &["jump desktop"]),
        ("Remote Desktop Plus", &["remote desktop plus"]),
        ("VNC Personal", &["vnc personal"]),
        ("Distant Desktop", &["distant desktop"]),
        ("Microsoft Quick Assist", &["quick assist"]),
        ("Windows Remote Desktop", &["remote desktop", "mstsc"]),
    ]);
}
