use std::net::SocketAddr;
use std::process;

use getopts::Options;
use raid_helper::{DEFAULT_TIMEOUT, DEFAULT_TIMEZONE};
use tokio::time::Duration;

#[derive(Debug, PartialEq, Eq)]
pub struct Args {
    pub address: SocketAddr,
    pub enable_cache: bool,
    pub cache_ttl: Duration,
    pub timezone: String,
    pub timeout: Duration,
    pub servers: Option<Vec<String>>,
}

enum Parsed {
    Run(Args),
    Help(String),
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "a",
        "address",
        "Socket address (IP and port) to listen on [Default: 127.0.0.1:8080]",
        "SOCKET_ADDRESS",
    );
    opts.optflag(
        "c",
        "enable-cache",
        "Enable caching of fetched events [Default: false]",
    );
    opts.optopt(
        "t",
        "cache-ttl",
        "Time-to-live for cached events [Default: 3600]",
        "SECONDS",
    );
    opts.optopt(
        "z",
        "timezone",
        "Timezone used to compute weeks and days [Default: Europe/Prague]",
        "IANA_NAME",
    );
    opts.optopt(
        "T",
        "timeout",
        "Timeout for each Raid-Helper request [Default: 10]",
        "SECONDS",
    );
    opts.optopt(
        "s",
        "servers",
        "Comma separated Discord server IDs [Default: built-in list]",
        "IDS",
    );
    opts
}

pub fn parse(args: Vec<String>) -> Args {
    match try_parse(args) {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Help(usage)) => {
            println!("{usage}");
            process::exit(0);
        }
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

fn try_parse(args: Vec<String>) -> Result<Parsed, String> {
    let opts = opts();
    let matches = opts.parse(args).map_err(|fail| fail.to_string())?;

    if matches.opt_present("help") {
        return Ok(Parsed::Help(
            opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))),
        ));
    }

    let address = matches
        .opt_get_default("address", SocketAddr::from(([127, 0, 0, 1], 8080)))
        .map_err(|err| format!("Provided value for option 'address' is invalid: {err}"))?;

    let enable_cache = matches.opt_present("enable-cache");

    let cache_ttl = matches
        .opt_get_default("cache-ttl", 3600)
        .map(Duration::from_secs)
        .map_err(|err| format!("Provided value for option 'cache-ttl' is invalid: {err}"))?;

    let timeout = matches
        .opt_get_default("timeout", DEFAULT_TIMEOUT.as_secs())
        .map(Duration::from_secs)
        .map_err(|err| format!("Provided value for option 'timeout' is invalid: {err}"))?;

    let timezone = matches
        .opt_str("timezone")
        .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

    let servers = matches.opt_str("servers").map(|servers| {
        servers
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect::<Vec<_>>()
    });

    Ok(Parsed::Run(Args {
        address,
        enable_cache,
        cache_ttl,
        timezone,
        timeout,
        servers,
    }))
}
