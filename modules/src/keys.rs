/// Route of every message handled by the IBC core.
pub const ROUTER_KEY: &str = "ibc";
