#![allow(missing_docs)]
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::{Context, Result};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use products_api::{Seed, run};

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("products_api=debug,tower_http=debug,info")),
        )
        .init();

    let ServeArgs { host, port, seed } = ServeArgs::parse().context("parsing arguments")?;
    run(SocketAddr::from((host, port)), seed).await
}

/// `products-api [-h HOST] [-p PORT] [--empty]`; the port falls back to `$PORT`.
#[derive(Debug)]
struct ServeArgs {
    host: IpAddr,
    port: u16,
    seed: Seed,
}

impl ServeArgs {
    fn parse() -> Result<Self> {
        let mut pargs = pico_args::Arguments::from_env();

        let seed = if pargs.contains(["-e", "--empty"]) {
            Seed::Empty
        } else {
            Seed::Catalogue
        };
        let host = pargs
            .opt_value_from_str(["-h", "--host"])
            .context("parsing host argument")?
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let port = match pargs
            .opt_value_from_str(["-p", "--port"])
            .context("parsing port argument")?
        {
            Some(port) => port,
            None => port_from_env()?,
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            warn!(?remaining, "ignoring unknown arguments");
        }

        Ok(Self { host, port, seed })
    }
}

fn port_from_env() -> Result<u16> {
    match std::env::var("PORT") {
        Ok(port) => port
            .trim()
            .parse()
            .with_context(|| format!("invalid PORT '{port}'")),
        Err(_) => Ok(DEFAULT_PORT),
    }
}
