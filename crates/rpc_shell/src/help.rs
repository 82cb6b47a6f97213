//! Static help texts and the `rpc list` rendering.

use replterm::{blue_bold, gray, yellow};
use service_handle::MethodSignature;

pub fn command_help() -> String {
    [
        "Available commands:".to_string(),
        yellow("  help"),
        yellow("  quit"),
        yellow("  rpc"),
        format!("{}{}", yellow("  message"), gray(" (not implemented)")),
    ]
    .join("\n")
}

pub fn rpc_help(service_name: &str) -> String {
    let service = yellow(service_name);
    [
        format!("Available {} commands:", yellow("rpc")),
        format!("{}                 - Lists all {service} methods", yellow("  list")),
        format!(
            "{} <method>        - Calls the <method> method on {service}",
            yellow("  call")
        ),
        format!("{}                 - Displays this help", yellow("  help")),
    ]
    .join("\n")
}

pub fn message_help() -> String {
    format!(
        "Available {} commands:\n{}<message>   - Describes a protobuf message {}",
        yellow("message"),
        yellow("  describe"),
        gray("(not implemented)")
    )
}

/// One `name(Request) -> Response` line per method, in declaration order.
pub fn method_list(methods: &[MethodSignature]) -> String {
    methods
        .iter()
        .map(|method| {
            format!(
                "{}({}) -> {}",
                blue_bold(&method.call_name()),
                method.request_type,
                method.response_type
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
