// Host environment detection. Decides which notification mechanism can be
// used: Termux with the Termux:API add-on, Termux without it, a bare Android
// userland, or anything else (desktop).

use std::env;
use std::path::Path;

/// Termux helper that only exists inside a Termux installation.
pub const STORAGE_SETUP_PROGRAM: &str = "termux-setup-storage";
/// Termux:API notification command.
pub const NOTIFICATION_PROGRAM: &str = "termux-notification";
/// Termux:API clipboard command, used by the notification's "Copy" button.
pub const CLIPBOARD_PROGRAM: &str = "termux-clipboard-set";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MobileWithNativeNotifier,
    MobileNoNotifier,
    MobileBareOs,
    Desktop,
}

impl Platform {
    pub fn is_mobile(self) -> bool {
        !matches!(self, Platform::Desktop)
    }
}

/// Boolean questions asked about the host.
pub trait Probe {
    /// Whether we run on a mobile OS (Android).
    fn is_mobile_os(&self) -> bool;

    /// Whether `program` is an executable somewhere on `PATH`.
    fn has_program(&self, program: &str) -> bool;
}

/// Probes the machine the process runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostProbe;

impl Probe for HostProbe {
    fn is_mobile_os(&self) -> bool {
        cfg!(target_os = "android")
            || (env::var_os("ANDROID_ROOT").is_some() && env::var_os("ANDROID_DATA").is_some())
    }

    fn has_program(&self, program: &str) -> bool {
        let Some(paths) = env::var_os("PATH") else {
            return false;
        };
        env::split_paths(&paths).any(|dir| is_executable(&dir.join(program)))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// Evaluate the probes in order; the first match wins.
pub fn detect(probe: &impl Probe) -> Platform {
    if !probe.is_mobile_os() {
        return Platform::Desktop;
    }
    if !probe.has_program(STORAGE_SETUP_PROGRAM) {
        return Platform::MobileBareOs;
    }
    if probe.has_program(NOTIFICATION_PROGRAM) {
        Platform::MobileWithNativeNotifier
    } else {
        Platform::MobileNoNotifier
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Probe answering from fixed values.
    #[derive(Debug, Clone, Copy)]
    pub(crate) struct FixedProbe {
        pub mobile: bool,
        pub termux: bool,
        pub termux_api: bool,
    }

    impl Probe for FixedProbe {
        fn is_mobile_os(&self) -> bool {
            self.mobile
        }

        fn has_program(&self, program: &str) -> bool {
            match program {
                STORAGE_SETUP_PROGRAM => self.termux,
                NOTIFICATION_PROGRAM => self.termux_api,
                _ => false,
            }
        }
    }

    #[test]
    fn decision_tree() {
        let cases = [
            ((false, false, false), Platform::Desktop),
            ((false, true, true), Platform::Desktop),
            ((true, false, false), Platform::MobileBareOs),
            ((true, false, true), Platform::MobileBareOs),
            ((true, true, false), Platform::MobileNoNotifier),
            ((true, true, true), Platform::MobileWithNativeNotifier),
        ];
        for ((mobile, termux, termux_api), expected) in cases {
            let probe = FixedProbe {
                mobile,
                termux,
                termux_api,
            };
            assert_eq!(detect(&probe), expected, "{probe:?}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn host_probe_finds_programs_on_path() {
        // `sh` is on PATH on any unix test host.
        assert!(HostProbe.has_program("sh"));
        assert!(!HostProbe.has_program("definitely-not-a-real-program-7f3a"));
    }
}
