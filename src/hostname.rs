//! Local host name detection.

/// Host name reported when the system name cannot be read.
pub const FALLBACK_HOSTNAME: &str = "localhost";

/// Return the system host name, or [`FALLBACK_HOSTNAME`].
pub fn system_hostname() -> String {
    #[cfg(unix)]
    match nix::unistd::gethostname() {
        Ok(name) => match name.into_string() {
            Ok(name) if !name.trim().is_empty() => return name,
            Ok(_) => log::debug!("system host name is empty"),
            Err(raw) => log::debug!("system host name is not valid UTF-8: {raw:?}"),
        },
        Err(err) => log::debug!("gethostname failed: {err}"),
    }
    FALLBACK_HOSTNAME.to_owned()
}
