pub mod gateway;
pub mod parser;
pub mod prober;
pub mod runner;
pub mod table;

pub use gateway::{resolve_default_gateway, resolve_targets, RouteSource, SystemRouteSource};
pub use parser::{parse_ip_route, parse_ping_average, parse_proc_net_route};
pub use prober::{probe_loop, probe_once, spawn_prober, spawn_probers};
pub use runner::{output_with_deadline, run_ping, PingRunner, ProbeSettings, SystemPingRunner};
pub use table::LatencyTable;
