use clap::{Arg, ArgMatches, Command};
use std::env;
use std::time::Duration;

pub struct Config {
    pub poll_interval: Duration,
    pub call_timeout: Duration,
    pub stop_timeout: i32,
}

impl From<ArgMatches> for Config {
    fn from(matches: ArgMatches) -> Self {
        Config {
            poll_interval: Duration::from_secs(
                matches.get_one::<u64>("interval").copied().unwrap_or(60),
            ),
            call_timeout: Duration::from_secs(
                matches.get_one::<u64>("timeout").copied().unwrap_or(30),
            ),
            stop_timeout: matches.get_one::<i32>("stop_timeout").copied().unwrap_or(10),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn command() -> Command {
    let default_interval = env_or("RESTARTER_POLL_INTERVAL", "60");
    let default_timeout = env_or("RESTARTER_CALL_TIMEOUT", "30");
    let default_stop_timeout = env_or("RESTARTER_STOP_TIMEOUT", "10");
    Command::new("container-restarter")
        .version("0.1")
        .about("restart running containers on the interval declared in their RESTART_INTERVAL")
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .help(format!(
                    "Seconds to wait between two checks (default: {default_interval})"
                ))
                .value_name("SECONDS")
                .default_value(default_interval)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help(format!(
                    "Seconds before a docker call is given up on (default: {default_timeout})"
                ))
                .value_name("SECONDS")
                .default_value(default_timeout)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("stop_timeout")
                .long("stop-timeout")
                .help(format!(
                    "Seconds a container gets to stop before it is killed on restart (default: {default_stop_timeout})"
                ))
                .value_name("SECONDS")
                .default_value(default_stop_timeout)
                .value_parser(clap::value_parser!(i32).range(0..)),
        )
}

pub(crate) fn configure_cli() -> Config {
    command().get_matches().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        command()
            .try_get_matches_from(args.iter().copied())
            .unwrap()
            .into()
    }

    #[test]
    fn defaults() {
        let config = parse(&["container-restarter"]);
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.call_timeout, Duration::from_secs(30));
        assert_eq!(config.stop_timeout, 10);
    }

    #[test]
    fn overrides() {
        let config = parse(&[
            "container-restarter",
            "-i",
            "5",
            "--timeout",
            "3",
            "--stop-timeout",
            "0",
        ]);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.call_timeout, Duration::from_secs(3));
        assert_eq!(config.stop_timeout, 0);
    }

    #[test]
    fn rejects_zero_interval() {
        assert!(
            command()
                .try_get_matches_from(["container-restarter", "--interval", "0"])
                .is_err()
        );
    }

    #[test]
    fn rejects_negative_stop_timeout() {
        assert!(
            command()
                .try_get_matches_from(["container-restarter", "--stop-timeout", "-1"])
                .is_err()
        );
    }
}
