//! Builds the service handle, banner, and prompt from resolved settings.

use std::sync::Arc;

use replterm::{green, red, yellow};
use service_handle::ServiceHandle;
use service_handle_http::{HttpService, HttpServiceConfig, HttpServiceError, ServiceManifest};
use service_handle_mock::MockService;

use crate::config::{RcSource, Target};

pub const MOCK_PROMPT: &str = "[mock://local]#";

pub fn build_service(target: &Target) -> Result<Arc<dyn ServiceHandle>, HttpServiceError> {
    match target {
        Target::Mock => Ok(Arc::new(MockService::default())),
        Target::Http {
            manifest,
            ip,
            port,
            tls,
            service,
        } => {
            let manifest = ServiceManifest::load(manifest)?;
            let config = HttpServiceConfig::new(*ip, *port).with_tls(*tls);
            let service = HttpService::new(config, &manifest, service.as_deref())?;
            Ok(Arc::new(service))
        }
    }
}

/// `[http+tls://10.0.0.12:8443]#`, `[http+insecure://[::1]:8080]#`, or the
/// mock prompt.
pub fn prompt(target: &Target) -> String {
    match target {
        Target::Mock => MOCK_PROMPT.to_string(),
        Target::Http { ip, port, tls, .. } => {
            let scheme = if *tls { "http+tls" } else { "http+insecure" };
            let host = if ip.is_ipv6() {
                format!("[{ip}]")
            } else {
                ip.to_string()
            };
            format!("[{scheme}://{host}:{port}]#")
        }
    }
}

/// Service, host, port, and TLS summary shown before the first prompt.
pub fn banner(target: &Target, service_name: &str) -> String {
    let (host, port, secure) = match target {
        Target::Mock => ("local".to_string(), "-".to_string(), yellow("No")),
        Target::Http { ip, port, tls, .. } => (
            ip.to_string(),
            port.to_string(),
            if *tls { yellow("Yes") } else { red("No") },
        ),
    };
    [
        format!("{} {}", green("Service:"), yellow(service_name)),
        format!("{} {}", green("Host:"), yellow(&host)),
        format!("{} {}", green("Port:"), yellow(&port)),
        format!("{} {secure}", green("Secure:")),
    ]
    .join("\n")
}

pub fn rc_notice(source: &RcSource) -> String {
    format!(
        "Using `{}` config from: {}",
        yellow(&source.section),
        source.path.display()
    )
}
