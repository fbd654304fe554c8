//! Live system checks for the VPN gateway.
//!
//! Each probe runs one read-only command. A probe whose command fails reports
//! `false`; the other probes are unaffected.

use horizon_system::{CancellationToken, CommandRunner};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Observed gateway state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SystemStatus {
    /// The WireGuard interface exists and is administratively up.
    pub interface_up: bool,
    /// `net.ipv4.ip_forward` is enabled.
    pub ip_forwarding: bool,
    /// A NAT `MASQUERADE` rule covers the VPN range.
    pub masquerading: bool,
}

impl SystemStatus {
    /// Returns `true` when every check passed.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.interface_up && self.ip_forwarding && self.masquerading
    }
}

/// Program names used by the probes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusProbes {
    /// Link inspection tool, invoked as `<tool> link show <iface>`.
    pub link_tool: String,
    /// Kernel parameter tool, invoked as `<tool> -n net.ipv4.ip_forward`.
    pub sysctl_tool: String,
    /// Firewall tool, invoked as `<tool> -t nat -S POSTROUTING`.
    pub firewall_tool: String,
}

impl Default for StatusProbes {
    fn default() -> Self {
        Self {
            link_tool: "ip".to_string(),
            sysctl_tool: "sysctl".to_string(),
            firewall_tool: "iptables".to_string(),
        }
    }
}

/// Runs the gateway status probes through a [`CommandRunner`].
#[derive(Debug)]
pub struct StatusChecker<R> {
    runner: R,
    probes: StatusProbes,
}

impl<R: CommandRunner> StatusChecker<R> {
    /// Creates a checker with the default program names.
    pub fn new(runner: R) -> Self {
        Self::with_probes(runner, StatusProbes::default())
    }

    /// Creates a checker with custom program names.
    pub fn with_probes(runner: R, probes: StatusProbes) -> Self {
        Self { runner, probes }
    }

    /// Returns the program names in use.
    pub fn probes(&self) -> &StatusProbes {
        &self.probes
    }

    /// Checks the interface, forwarding and masquerading state.
    pub async fn check_system(&self, cancel: &CancellationToken, iface: &str, vpn_range: &str) -> SystemStatus {
        let status = SystemStatus {
            interface_up: self
                .probe(cancel, &self.probes.link_tool, &["link", "show", iface])
                .await
                .is_some_and(|out| link_is_up(&out)),
            ip_forwarding: self
                .probe(cancel, &self.probes.sysctl_tool, &["-n", "net.ipv4.ip_forward"])
                .await
                .is_some_and(|out| forwarding_enabled(&out)),
            masquerading: self
                .probe(cancel, &self.probes.firewall_tool, &["-t", "nat", "-S", "POSTROUTING"])
                .await
                .is_some_and(|out| masquerades(&out, vpn_range)),
        };
        debug!(
            iface,
            vpn_range,
            interface_up = status.interface_up,
            ip_forwarding = status.ip_forwarding,
            masquerading = status.masquerading,
            "system status checked"
        );
        status
    }

    async fn probe(&self, cancel: &CancellationToken, program: &str, args: &[&str]) -> Option<String> {
        match self.runner.output(cancel, program, args).await {
            Ok(out) => Some(String::from_utf8_lossy(&out).into_owned()),
            Err(e) => {
                warn!(program, error = %e, "status probe failed");
                None
            }
        }
    }
}

/// Returns `true` if the `<...>` flag list of `ip link show` output has `UP`.
#[must_use]
pub fn link_is_up(output: &str) -> bool {
    let Some(start) = output.find('<') else {
        return false;
    };
    let Some(len) = output[start + 1..].find('>') else {
        return false;
    };
    output[start + 1..start + 1 + len].split(',').any(|flag| flag == "UP")
}

/// Returns `true` if `sysctl -n net.ipv4.ip_forward` printed `1`.
#[must_use]
pub fn forwarding_enabled(output: &str) -> bool {
    output.trim() == "1"
}

/// Returns `true` if some rule masquerades `vpn_range`.
#[must_use]
pub fn masquerades(rules: &str, vpn_range: &str) -> bool {
    rules.lines().any(|line| {
        let mut has_target = false;
        let mut has_range = false;
        for token in line.split_whitespace() {
            has_target |= token == "MASQUERADE";
            has_range |= token == vpn_range;
        }
        has_target && has_range
    })
}

#[cfg(test)]
mod tests {
    use horizon_system::{CommandError, DryRunCommandRunner};
    use test_case::test_case;

    use super::*;

    const LINK_UP: &str = "4: wg0: <POINTOPOINT,NOARP,UP,LOWER_UP> mtu 1420 qdisc noqueue state UNKNOWN mode DEFAULT group default qlen 1000\n    link/none\n";
    const LINK_DOWN: &str = "4: wg0: <POINTOPOINT,NOARP> mtu 1420 qdisc noop state DOWN mode DEFAULT group default qlen 1000\n";
    const NAT_RULES: &str = "-P POSTROUTING ACCEPT\n-A POSTROUTING -s 10.100.0.0/24 -o eth0 -j MASQUERADE\n";

    fn healthy_runner() -> DryRunCommandRunner {
        let runner = DryRunCommandRunner::new();
        runner.add_output("ip link show wg0", LINK_UP);
        runner.add_output("sysctl -n net.ipv4.ip_forward", "1\n");
        runner.add_output("iptables -t nat -S POSTROUTING", NAT_RULES);
        runner
    }

    #[test_case(LINK_UP, true ; "up flag present")]
    #[test_case(LINK_DOWN, false ; "no up flag")]
    #[test_case("4: wg0: <LOWER_UP> mtu 1420 state UP", false ; "state up outside flags")]
    #[test_case("", false ; "empty output")]
    #[test_case("4: wg0: <UP", false ; "unterminated flags")]
    fn link_flags(output: &str, expected: bool) {
        assert_eq!(link_is_up(output), expected);
    }

    #[test_case("1\n", true)]
    #[test_case("0\n", false)]
    #[test_case("", false)]
    #[test_case(" 1 ", true ; "surrounding whitespace")]
    fn forwarding(output: &str, expected: bool) {
        assert_eq!(forwarding_enabled(output), expected);
    }

    #[test_case(NAT_RULES, "10.100.0.0/24", true ; "matching rule")]
    #[test_case(NAT_RULES, "10.200.0.0/24", false ; "other range")]
    #[test_case(NAT_RULES, "10.100.0.0/2", false ; "range must be a whole token")]
    #[test_case("-A POSTROUTING -s 10.100.0.0/24 -j SNAT --to-source 1.2.3.4\n", "10.100.0.0/24", false ; "not masquerade")]
    #[test_case("-A POSTROUTING -o eth0 -j MASQUERADE\n-A POSTROUTING -s 10.100.0.0/24 -j ACCEPT\n", "10.100.0.0/24", false ; "split across rules")]
    fn masquerade_rules(rules: &str, range: &str, expected: bool) {
        assert_eq!(masquerades(rules, range), expected);
    }

    #[tokio::test]
    async fn healthy_system() {
        let checker = StatusChecker::new(healthy_runner());
        let status = checker
            .check_system(&CancellationToken::new(), "wg0", "10.100.0.0/24")
            .await;
        assert!(status.is_healthy());
    }

    #[tokio::test]
    async fn probes_degrade_independently() {
        let runner = healthy_runner();
        runner.add_error(
            "sysctl -n net.ipv4.ip_forward",
            CommandError::non_zero_exit("sysctl -n net.ipv4.ip_forward", 255, "permission denied"),
        );
        let checker = StatusChecker::new(&runner);
        let status = checker
            .check_system(&CancellationToken::new(), "wg0", "10.100.0.0/24")
            .await;

        assert_eq!(
            status,
            SystemStatus {
                interface_up: true,
                ip_forwarding: false,
                masquerading: true,
            }
        );
        assert_eq!(runner.run_commands().len(), 3);
    }

    #[tokio::test]
    async fn missing_tools_report_all_false() {
        let runner = DryRunCommandRunner::new();
        for cmd in ["ip link show wg0", "sysctl -n net.ipv4.ip_forward", "iptables -t nat -S POSTROUTING"] {
            runner.add_error(cmd, CommandError::not_found(cmd));
        }
        let status = StatusChecker::new(&runner)
            .check_system(&CancellationToken::new(), "wg0", "10.100.0.0/24")
            .await;
        assert_eq!(status, SystemStatus::default());
    }

    #[tokio::test]
    async fn custom_probe_programs() {
        let runner = DryRunCommandRunner::new();
        runner.add_output("/sbin/ip link show wg1", LINK_UP);
        let probes = StatusProbes {
            link_tool: "/sbin/ip".to_string(),
            firewall_tool: "iptables-legacy".to_string(),
            ..StatusProbes::default()
        };
        let status = StatusChecker::with_probes(&runner, probes)
            .check_system(&CancellationToken::new(), "wg1", "10.100.0.0/24")
            .await;

        assert!(status.interface_up);
        assert_eq!(
            runner.run_commands(),
            vec![
                "/sbin/ip link show wg1".to_string(),
                "sysctl -n net.ipv4.ip_forward".to_string(),
                "iptables-legacy -t nat -S POSTROUTING".to_string(),
            ]
        );
    }

    #[test]
    fn status_serializes() {
        let json = serde_json::to_string(&SystemStatus {
            interface_up: true,
            ip_forwarding: false,
            masquerading: true,
        })
        .expect("json");
        assert_eq!(json, r#"{"interface_up":true,"ip_forwarding":false,"masquerading":true}"#);
    }
}
