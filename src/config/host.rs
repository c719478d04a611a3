use tracing::warn;

/// Identity of the machine the samples are reported for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub instance_id: String,
    pub instance_name: String,
}

impl HostIdentity {
    pub fn new(instance_id: impl Into<String>, instance_name: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            instance_name: instance_name.into(),
        }
    }

    /// Fills whatever was not given explicitly. The name falls back to the
    /// system hostname and the id falls back to the name.
    pub fn resolve(instance_id: Option<String>, instance_name: Option<String>) -> Self {
        let instance_name = instance_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(hostname);
        let instance_id = instance_id
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| instance_name.clone());
        Self {
            instance_id,
            instance_name,
        }
    }
}

fn hostname() -> String {
    if let Ok(name) = std::env::var("HOSTNAME") {
        if !name.is_empty() {
            return name;
        }
    }

    if let Some(name) = system_hostname() {
        return name;
    }

    warn!("Could not determine hostname, using 'unknown'");
    "unknown".to_string()
}

#[cfg(unix)]
fn system_hostname() -> Option<String> {
    let mut buf = [0u8; 256];
    let ret = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if ret != 0 {
        return None;
    }
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    let name = String::from_utf8_lossy(&buf[..len]).into_owned();
    (!name.is_empty()).then_some(name)
}

#[cfg(not(unix))]
fn system_hostname() -> Option<String> {
    std::env::var("COMPUTERNAME").ok().filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_explicit() {
        let host = HostIdentity::resolve(Some("i-123".into()), Some("web-1".into()));
        assert_eq!(host, HostIdentity::new("i-123", "web-1"));
    }

    #[test]
    fn test_resolve_id_falls_back_to_name() {
        let host = HostIdentity::resolve(None, Some("web-1".into()));
        assert_eq!(host.instance_id, "web-1");

        let host = HostIdentity::resolve(Some(String::new()), Some("web-2".into()));
        assert_eq!(host.instance_id, "web-2");
    }

    #[test]
    fn test_resolve_detects_name() {
        let host = HostIdentity::resolve(None, None);
        assert!(!host.instance_name.is_empty());
        assert_eq!(host.instance_id, host.instance_name);
    }
}
