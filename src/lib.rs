//! Keeps a Cloudflare hostname's A records pointed at the currently
//! fastest-ranked Cloudflare edge IPs and reports each run over PushPlus.

pub mod config;
pub mod ip;
pub mod notify;
pub mod pipeline;
pub mod provider;
pub mod retry;

pub use config::Config;
pub use pipeline::{run, Outcome};
