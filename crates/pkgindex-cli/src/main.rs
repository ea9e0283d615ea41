use std::time::Duration;

use clap::Parser;
use cli::{Args, Commands};
use error::{CliError, CliResult};
use logging::setup_logging;
use pkgindex_commit::{ClientConfig, CommitApi, GitlabCommitApi, WorkdirCommitApi};
use pkgindex_config::config::Config;
use pkgindex_operations::{
    build_catalog, run_update, ArtifactDir, BuildOptions, Publisher, ReferenceSource,
    UpdateOptions, UpdateOutcome,
};
use tracing::info;
use ureq::{
    http::{HeaderMap, HeaderName, HeaderValue},
    Proxy,
};

mod cli;
mod error;
mod logging;
mod utils;

fn parse_headers(headers: &[String]) -> CliResult<HeaderMap> {
    let mut map = HeaderMap::new();
    for header in headers {
        let invalid = || CliError::InvalidHeader(header.clone());
        let (key, value) = header.split_once(':').ok_or_else(invalid)?;
        let key: HeaderName = key.trim().parse().map_err(|_| invalid())?;
        let value: HeaderValue = value.trim().parse().map_err(|_| invalid())?;
        map.append(key, value);
    }
    Ok(map)
}

fn client_config(args: &Args, timeout: Option<u64>) -> CliResult<ClientConfig> {
    let mut config = ClientConfig::default();

    if let Some(proxy) = args.proxy.as_deref() {
        let proxy = Proxy::new(proxy).map_err(|err| {
            CliError::InvalidProxy {
                value: proxy.to_string(),
                source: err,
            }
        })?;
        config.proxy = Some(proxy);
    }

    if let Some(user_agent) = &args.user_agent {
        config.user_agent = Some(user_agent.clone());
    }

    if let Some(headers) = &args.header {
        config.headers = Some(parse_headers(headers)?);
    }

    config.timeout = timeout.map(Duration::from_secs);

    Ok(config)
}

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    utils::set_color(!args.no_color);
    setup_logging(&args);

    match &args.command {
        Commands::Build {
            metadata_root,
            catalog,
            output,
        } => {
            build_catalog(&BuildOptions {
                metadata_root: metadata_root.clone(),
                catalog: catalog.clone(),
                output: output.clone(),
            })?;
        }
        Commands::Update {
            descriptor,
            artifacts,
            reference,
            reference_file,
            local,
            write_back,
            timeout,
        } => {
            let config = Config::load(args.config.as_deref())?;

            let api: Box<dyn CommitApi> = match local {
                Some(dir) => Box::new(WorkdirCommitApi::new(dir.clone())),
                None => {
                    let client = client_config(&args, *timeout)?;
                    Box::new(GitlabCommitApi::new(config.remote()?, &client))
                }
            };
            let publisher = Publisher::new(config, api);

            let options = UpdateOptions {
                descriptor: descriptor.clone(),
                reference: match reference {
                    Some(reference) => ReferenceSource::Explicit(reference.clone()),
                    None => ReferenceSource::File(reference_file.clone()),
                },
                write_back: *write_back,
            };

            match run_update(&options, &publisher, &ArtifactDir::new(artifacts.clone()))? {
                UpdateOutcome::Unchanged => info!("No change detected"),
                UpdateOutcome::Committed {
                    receipt,
                    ..
                } => {
                    if let Some(id) = receipt.id {
                        info!("Commit {}", id);
                    }
                    info!("{}", receipt.reference);
                }
            }
        }
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headers() {
        let headers = parse_headers(&[
            "X-Trace: 1".to_string(),
            "Accept:application/json".to_string(),
        ])
        .unwrap();
        assert_eq!(headers.get("x-trace").unwrap(), "1");
        assert_eq!(headers.get("accept").unwrap(), "application/json");

        let err = parse_headers(&["no-separator".to_string()]).unwrap_err();
        assert!(matches!(err, CliError::InvalidHeader(_)));
    }

    #[test]
    fn test_client_config_from_args() {
        let args = Args::parse_from([
            "pkgindex",
            "update",
            "-A",
            "index-bot/1.0",
            "-P",
            "http://proxy.example.com:3128",
        ]);
        let config = client_config(&args, Some(30)).unwrap();
        assert_eq!(config.user_agent.as_deref(), Some("index-bot/1.0"));
        assert!(config.proxy.is_some());
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }
}
