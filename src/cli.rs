use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

use events_ical::cache;
use events_ical::server::CALENDAR_PATH;
use events_ical::source::Source;
use getopts::Options;
use log::warn;
use tokio::time::Duration;

const ADDRESS_VAR: &str = "EVENTS_ICAL_ADDR";

pub enum Mode {
    Generate {
        output: PathBuf,
    },
    Serve {
        address: SocketAddr,
        cache: cache::Config,
        feed_url: String,
    },
}

pub struct Args {
    pub source: Source,
    pub mode: Mode,
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "i",
        "input",
        "File or http(s) URL to read events from [Default: events.yaml]",
        "PATH|URL",
    );
    opts.optopt(
        "o",
        "output",
        "File to write the calendar to [Default: calendar.ics]",
        "PATH",
    );
    opts.optflag(
        "s",
        "serve",
        "Serve the event page and calendar feed over HTTP instead of writing a file",
    );
    opts.optopt(
        "a",
        "address",
        concat!(
            "Socket address (IP and port) to listen on [Default: $EVENTS_ICAL_ADDR or ",
            "127.0.0.1:8080]"
        ),
        "SOCKET_ADDRESS",
    );
    opts.optflag(
        "c",
        "enable-cache",
        "Enable caching of loaded events [Default: false]",
    );
    opts.optopt(
        "t",
        "cache-ttl",
        "Time-to-live for cached events [Default: 3600]",
        "SECONDS",
    );
    opts.optopt(
        "u",
        "feed-url",
        "Public URL of the calendar feed shown on the page [Default: http://ADDRESS/calendar.ics]",
        "URL",
    );
    opts
}

fn default_address() -> SocketAddr {
    let fallback = SocketAddr::from(([127, 0, 0, 1], 8080));

    match env::var(ADDRESS_VAR) {
        Ok(value) => match value.parse() {
            Ok(address) => address,
            Err(err) => {
                eprintln!("Failed to parse `{ADDRESS_VAR}` environment variable: {err}");
                process::exit(1);
            }
        },
        Err(_) => fallback,
    }
}

/// Feed URL advertised on the page when `--feed-url` is not given. A wildcard listen
/// address is not reachable by calendar clients, so `localhost` is used instead.
fn default_feed_url(address: SocketAddr) -> String {
    if address.ip().is_unspecified() {
        warn!(
            "Listening on {address} without --feed-url; the page will advertise a localhost feed URL"
        );
        return format!("http://localhost:{}{CALENDAR_PATH}", address.port());
    }

    format!("http://{address}{CALENDAR_PATH}")
}

pub fn parse(args: Vec<String>) -> Args {
    let opts = opts();

    let matches = match opts.parse(args) {
        Ok(matches) => matches,
        Err(fail) => {
            eprintln!("{fail}");
            process::exit(1);
        }
    };

    if matches.opt_present("help") {
        println!("{}", opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))));
        process::exit(0);
    }

    if !matches.free.is_empty() {
        eprintln!("Unexpected argument '{}'", matches.free[0]);
        process::exit(1);
    }

    let source = match matches.opt_get_default("input", Source::File("events.yaml".into())) {
        Ok(source) => source,
        Err(err) => match err {},
    };

    if !matches.opt_present("serve") {
        let output = matches
            .opt_str("output")
            .map_or_else(|| PathBuf::from("calendar.ics"), PathBuf::from);

        return Args {
            source,
            mode: Mode::Generate { output },
        };
    }

    let address = match matches.opt_get::<SocketAddr>("address") {
        Ok(Some(address)) => address,
        Ok(None) => default_address(),
        Err(err) => {
            eprintln!("Provided value for option 'address' is invalid: {err}");
            process::exit(1);
        }
    };

    let enable_cache = matches.opt_present("enable-cache");

    let cache_ttl = match matches.opt_get_default("cache-ttl", 3600) {
        Ok(secs) => Duration::from_secs(secs),
        Err(err) => {
            eprintln!("Provided value for option 'cache-ttl' is invalid: {err}");
            process::exit(1);
        }
    };

    let feed_url = matches
        .opt_str("feed-url")
        .unwrap_or_else(|| default_feed_url(address));

    Args {
        source,
        mode: Mode::Serve {
            address,
            cache: cache::Config {
                enabled: enable_cache,
                ttl: cache_ttl,
            },
            feed_url,
        },
    }
}
