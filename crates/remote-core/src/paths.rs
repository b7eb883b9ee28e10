//! Platform configuration directory shared by the client and the host.
//!
//! - Windows:  `%APPDATA%\PiRemote`
//! - Linux:    `$XDG_CONFIG_HOME/pi-remote` or `~/.config/pi-remote`
//! - macOS:    `~/Library/Application Support/PiRemote`

use std::path::PathBuf;

/// Resolves the platform config directory for Pi-Remote.
///
/// Returns `None` when the environment does not say where it is.
pub fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("PiRemote"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("pi-remote"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("PiRemote")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}
