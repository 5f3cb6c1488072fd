//! Windows setup answer file
//!
//! Builds the `autounattend.xml` that lifts the Windows 11 hardware checks
//! and trims the out-of-box experience, plus the `LabConfig` registry
//! values the same bypass needs when injected into an offline hive.

use bitflags::bitflags;
use std::fmt::Write;

bitflags! {
    /// What the answer file changes
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UnattendFlags: u32 {
        /// Skip the TPM, Secure Boot and RAM checks
        const SECUREBOOT_TPM_MINRAM = 1 << 0;
        /// Allow setup without a Microsoft account
        const NO_ONLINE_ACCOUNT = 1 << 1;
        /// Decline the privacy questions
        const NO_DATA_COLLECTION = 1 << 2;
        /// Reuse the host's regional settings
        const DUPLICATE_LOCALE = 1 << 3;
        /// Create a local account
        const SET_USER = 1 << 4;
        /// Prevent automatic device encryption
        const DISABLE_BITLOCKER = 1 << 5;

        /// Hardware bypass, offline account, no telemetry
        const DEFAULT = Self::SECUREBOOT_TPM_MINRAM.bits()
            | Self::NO_ONLINE_ACCOUNT.bits()
            | Self::NO_DATA_COLLECTION.bits();
    }
}

impl Default for UnattendFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parse a comma separated list of flag names, e.g. `default,set_user`
///
/// `none` yields the empty set.
pub fn parse_flags(text: &str) -> Result<UnattendFlags, String> {
    let mut flags = UnattendFlags::empty();
    for name in text.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        let name = name.to_ascii_uppercase();
        if name == "NONE" {
            continue;
        }
        flags |= UnattendFlags::from_name(&name).ok_or_else(|| format!("unknown flag {:?}", name))?;
    }
    Ok(flags)
}

/// One registry value set by the bypass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryValue {
    /// Full key path
    pub key: &'static str,
    /// Value name
    pub name: &'static str,
    /// Registry type
    pub kind: &'static str,
    /// DWORD data
    pub data: u32,
}

const LAB_CONFIG: &str = r"HKLM\SYSTEM\Setup\LabConfig";
const OOBE_KEY: &str = r"HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\OOBE";
const BYPASS_NAMES: [&str; 3] = ["BypassTPMCheck", "BypassSecureBootCheck", "BypassRAMCheck"];

/// Base64 of the UTF-16 string "Password", changed at first logon
const INITIAL_PASSWORD: &str = "UABhAHMAcwB3AG8AcgBkAA==";

/// `LabConfig` values that disable the hardware checks
pub fn bypass_registry_keys() -> Vec<RegistryValue> {
    BYPASS_NAMES
        .iter()
        .map(|&name| RegistryValue {
            key: LAB_CONFIG,
            name,
            kind: "REG_DWORD",
            data: 1,
        })
        .collect()
}

/// Escape text for element content and attribute values
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

struct Document {
    text: String,
    arch: String,
}

impl Document {
    fn line(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.text.push_str("  ");
        }
        self.text.push_str(text);
        self.text.push('\n');
    }

    fn component(&mut self, name: &str) {
        let open = format!(
            "<component name=\"{}\" processorArchitecture=\"{}\" language=\"neutral\" \
             xmlns:wcm=\"http://schemas.microsoft.com/WMIConfig/2002/State\" \
             xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
             publicKeyToken=\"31bf3856ad364e35\" versionScope=\"nonSxS\">",
            name, self.arch
        );
        self.line(2, &open);
    }

    fn run_synchronous(&mut self, order: usize, command: &str) {
        self.line(4, "<RunSynchronousCommand wcm:action=\"add\">");
        self.line(5, &format!("<Order>{}</Order>", order));
        self.line(5, &format!("<Path>{}</Path>", escape_xml(command)));
        self.line(4, "</RunSynchronousCommand>");
    }

    fn first_logon(&mut self, order: usize, command: &str) {
        self.line(4, "<SynchronousCommand wcm:action=\"add\">");
        self.line(5, &format!("<Order>{}</Order>", order));
        self.line(5, &format!("<CommandLine>{}</CommandLine>", escape_xml(command)));
        self.line(4, "</SynchronousCommand>");
    }
}

/// Render the answer file
///
/// # Arguments
/// * `flags` - Sections to emit
/// * `username` - Local account for [`UnattendFlags::SET_USER`]; ignored when `None` or empty
/// * `arch` - `processorArchitecture` value (`amd64`, `x86`, `arm64`)
pub fn generate_unattend_xml(flags: UnattendFlags, username: Option<&str>, arch: &str) -> String {
    let mut doc = Document {
        text: String::new(),
        arch: escape_xml(arch),
    };
    doc.line(0, "<?xml version=\"1.0\" encoding=\"utf-8\"?>");
    doc.line(0, "<unattend xmlns=\"urn:schemas-microsoft-com:unattend\">");

    if flags.contains(UnattendFlags::SECUREBOOT_TPM_MINRAM) {
        doc.line(1, "<settings pass=\"windowsPE\">");
        doc.component("Microsoft-Windows-Setup");
        doc.line(3, "<UserData>");
        doc.line(4, "<ProductKey>");
        doc.line(5, "<Key />");
        doc.line(4, "</ProductKey>");
        doc.line(3, "</UserData>");
        doc.line(3, "<RunSynchronous>");
        for (i, name) in BYPASS_NAMES.iter().enumerate() {
            let command = format!("reg add {} /v {} /t REG_DWORD /d 1 /f", LAB_CONFIG, name);
            doc.run_synchronous(i + 1, &command);
        }
        doc.line(3, "</RunSynchronous>");
        doc.line(2, "</component>");
        doc.line(1, "</settings>");
    }

    if flags.contains(UnattendFlags::NO_ONLINE_ACCOUNT) {
        doc.line(1, "<settings pass=\"specialize\">");
        doc.component("Microsoft-Windows-Deployment");
        doc.line(3, "<RunSynchronous>");
        let command = format!("reg add {} /v BypassNRO /t REG_DWORD /d 1 /f", OOBE_KEY);
        doc.run_synchronous(1, &command);
        doc.line(3, "</RunSynchronous>");
        doc.line(2, "</component>");
        doc.line(1, "</settings>");
    }

    let user = username
        .filter(|name| !name.is_empty() && flags.contains(UnattendFlags::SET_USER))
        .map(escape_xml);
    let shell_setup = UnattendFlags::NO_DATA_COLLECTION
        | UnattendFlags::SET_USER
        | UnattendFlags::DUPLICATE_LOCALE;

    if flags.intersects(shell_setup | UnattendFlags::DISABLE_BITLOCKER) {
        doc.line(1, "<settings pass=\"oobeSystem\">");

        if flags.intersects(shell_setup) {
            doc.component("Microsoft-Windows-Shell-Setup");
            if flags.contains(UnattendFlags::NO_DATA_COLLECTION) {
                doc.line(3, "<OOBE>");
                doc.line(4, "<ProtectYourPC>3</ProtectYourPC>");
                doc.line(3, "</OOBE>");
            }
            if let Some(user) = &user {
                doc.line(3, "<UserAccounts>");
                doc.line(4, "<LocalAccounts>");
                doc.line(5, "<LocalAccount wcm:action=\"add\">");
                doc.line(6, &format!("<Name>{}</Name>", user));
                doc.line(6, &format!("<DisplayName>{}</DisplayName>", user));
                doc.line(6, "<Group>Administrators;Power Users</Group>");
                doc.line(6, "<Password>");
                doc.line(7, &format!("<Value>{}</Value>", INITIAL_PASSWORD));
                doc.line(7, "<PlainText>false</PlainText>");
                doc.line(6, "</Password>");
                doc.line(5, "</LocalAccount>");
                doc.line(4, "</LocalAccounts>");
                doc.line(3, "</UserAccounts>");

                // `user` is already escaped; build the raw command from the input
                let raw = username.unwrap_or_default();
                doc.line(3, "<FirstLogonCommands>");
                doc.first_logon(1, &format!("net user \"{}\" /logonpasswordchg:yes", raw));
                doc.first_logon(2, "net accounts /maxpwage:unlimited");
                doc.line(3, "</FirstLogonCommands>");
            }
            doc.line(2, "</component>");
        }

        if flags.contains(UnattendFlags::DISABLE_BITLOCKER) {
            doc.component("Microsoft-Windows-SecureStartup-FilterDriver");
            doc.line(3, "<PreventDeviceEncryption>true</PreventDeviceEncryption>");
            doc.line(2, "</component>");
            doc.component("Microsoft-Windows-EnhancedStorage-Adm");
            doc.line(3, "<TCGSecurityActivationDisabled>1</TCGSecurityActivationDisabled>");
            doc.line(2, "</component>");
        }

        doc.line(1, "</settings>");
    }

    doc.line(0, "</unattend>");
    tracing::debug!(flags = flags.bits(), bytes = doc.text.len(), "answer file generated");
    doc.text
}

/// `reg` commands equivalent to [`bypass_registry_keys`]
pub fn bypass_registry_script() -> String {
    let mut out = String::new();
    for value in bypass_registry_keys() {
        // writing to a String cannot fail
        let _ = writeln!(
            out,
            "reg add {} /v {} /t {} /d {} /f",
            value.key, value.name, value.kind, value.data
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_keys() {
        let keys = bypass_registry_keys();
        assert_eq!(keys.len(), 3);
        assert!(keys.iter().all(|k| k.key == LAB_CONFIG && k.data == 1));
        assert_eq!(keys[0].name, "BypassTPMCheck");
        assert!(bypass_registry_script().contains("/v BypassRAMCheck /t REG_DWORD /d 1 /f"));
    }

    #[test]
    fn test_default_sections() {
        let xml = generate_unattend_xml(UnattendFlags::default(), None, "amd64");
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"));
        assert!(xml.ends_with("</unattend>\n"));
        assert!(xml.contains("<settings pass=\"windowsPE\">"));
        assert!(xml.contains("<settings pass=\"specialize\">"));
        assert!(xml.contains("<ProtectYourPC>3</ProtectYourPC>"));
        assert!(xml.contains("processorArchitecture=\"amd64\""));
        assert!(xml.contains("/v BypassSecureBootCheck"));
        assert!(!xml.contains("LocalAccount"));
        assert!(!xml.contains("PreventDeviceEncryption"));
    }

    #[test]
    fn test_empty_flags() {
        let xml = generate_unattend_xml(UnattendFlags::empty(), Some("bob"), "x86");
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <unattend xmlns=\"urn:schemas-microsoft-com:unattend\">\n\
             </unattend>\n"
        );
    }

    #[test]
    fn test_user_is_escaped() {
        let flags = UnattendFlags::SET_USER;
        let xml = generate_unattend_xml(flags, Some("a<b>&\"c\""), "arm64");
        assert!(xml.contains("<Name>a&lt;b&gt;&amp;&quot;c&quot;</Name>"));
        assert!(xml.contains("net user &quot;a&lt;b&gt;&amp;&quot;c&quot;&quot; /logonpasswordchg:yes"));
        assert!(!xml.contains("<b>"));
    }

    #[test]
    fn test_user_requires_flag_and_name() {
        let xml = generate_unattend_xml(UnattendFlags::DEFAULT, Some("bob"), "amd64");
        assert!(!xml.contains("bob"));
        let xml = generate_unattend_xml(UnattendFlags::SET_USER, Some(""), "amd64");
        assert!(!xml.contains("LocalAccount"));
    }

    #[test]
    fn test_parse_flags() {
        assert_eq!(parse_flags("default").unwrap(), UnattendFlags::DEFAULT);
        assert_eq!(
            parse_flags("set_user, Disable_Bitlocker").unwrap(),
            UnattendFlags::SET_USER | UnattendFlags::DISABLE_BITLOCKER
        );
        assert!(parse_flags("none").unwrap().is_empty());
        assert!(parse_flags("tpm").is_err());
    }

    #[test]
    fn test_bitlocker() {
        let xml = generate_unattend_xml(UnattendFlags::DISABLE_BITLOCKER, None, "amd64");
        assert!(xml.contains("<settings pass=\"oobeSystem\">"));
        assert!(xml.contains("<PreventDeviceEncryption>true</PreventDeviceEncryption>"));
        assert!(!xml.contains("Microsoft-Windows-Shell-Setup"));
    }
}
