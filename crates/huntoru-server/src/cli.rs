use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "huntoru-server", version, about = "HunToru photo game backend")]
pub struct Args {
    /// Address to listen on.
    #[arg(long, env = "HUNTORU_BIND", default_value = "0.0.0.0:8787")]
    pub bind: SocketAddr,

    /// YAML theme catalog (built-in themes when omitted).
    #[arg(long, env = "HUNTORU_THEMES")]
    pub themes: Option<PathBuf>,

    /// Browser origins allowed by CORS; `*.pages.dev` is always allowed.
    #[arg(
        long = "allowed-origin",
        env = "HUNTORU_ALLOWED_ORIGINS",
        value_delimiter = ','
    )]
    pub allowed_origins: Vec<String>,

    /// Log output format.
    #[arg(long, env = "HUNTORU_LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,
}
