use anyhow::{anyhow, Result};
use pidash_probe::{
    parse_ip_route, parse_proc_net_route, resolve_default_gateway, resolve_targets, RouteSource,
};

struct FakeRoutes {
    command: Option<&'static str>,
    table: Option<&'static str>,
}

impl RouteSource for FakeRoutes {
    fn route_command(&self) -> Result<String> {
        self.command
            .map(str::to_string)
            .ok_or_else(|| anyhow!("ip: command not found"))
    }

    fn route_table(&self) -> Result<String> {
        self.table
            .map(str::to_string)
            .ok_or_else(|| anyhow!("no such file"))
    }
}

#[test]
fn parse_ip_route_default() {
    let text = include_str!("fixtures/ip_route_default.txt");
    assert_eq!(parse_ip_route(text).as_deref(), Some("192.168.1.1"));
}

#[test]
fn parse_proc_route_little_endian() {
    let text = include_str!("fixtures/proc_net_route.txt");
    assert_eq!(parse_proc_net_route(text).as_deref(), Some("192.168.1.1"));
}

#[test]
fn route_command_wins_over_table() {
    let source = FakeRoutes {
        command: Some("default via 10.0.0.1 dev eth0\n"),
        table: Some(include_str!("fixtures/proc_net_route.txt")),
    };
    assert_eq!(resolve_default_gateway(&source).as_deref(), Some("10.0.0.1"));
}

#[test]
fn falls_back_to_route_table() {
    let source = FakeRoutes {
        command: None,
        table: Some(include_str!("fixtures/proc_net_route.txt")),
    };
    assert_eq!(
        resolve_default_gateway(&source).as_deref(),
        Some("192.168.1.1")
    );

    let source = FakeRoutes {
        command: Some(""),
        table: Some(include_str!("fixtures/proc_net_route.txt")),
    };
    assert_eq!(
        resolve_default_gateway(&source).as_deref(),
        Some("192.168.1.1")
    );
}

#[test]
fn no_gateway_drops_gateway_target() {
    let source = FakeRoutes {
        command: None,
        table: None,
    };
    assert_eq!(resolve_default_gateway(&source), None);

    let targets = resolve_targets(&source);
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].name, "dns");
    assert_eq!(targets[0].address, "208.67.222.222");
}

#[test]
fn gateway_target_comes_first() {
    let source = FakeRoutes {
        command: Some(include_str!("fixtures/ip_route_default.txt")),
        table: None,
    };
    let names: Vec<String> = resolve_targets(&source)
        .into_iter()
        .map(|target| target.name)
        .collect();
    assert_eq!(names, vec!["gw".to_string(), "dns".to_string()]);
}
