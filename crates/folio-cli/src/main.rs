// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use folio_app::{CatalogState, MemorySource};
use runtime::{SharedSource, SourceRuntime};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

const DEMO_RECORDS: usize = 137;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `folio --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    logging::init(&config.log_path()?, config.log_level());
    tracing::info!(
        config = %options.config_path.display(),
        demo = options.demo,
        "folio starting"
    );

    let source: SharedSource = if options.demo {
        Arc::new(MemorySource::demo(DEMO_RECORDS, config.page_size()))
    } else {
        let client = folio_api::Client::new(config.base_url(), config.page_size(), config.timeout()?)
            .with_context(|| {
                format!(
                    "invalid [source] config in {}; fix base_url/page_size/timeout values",
                    options.config_path.display()
                )
            })?;
        if options.check_only {
            let total = client.ping()?;
            println!("ok: {} reports {total} records", client.base_url());
            return Ok(());
        }
        Arc::new(client)
    };
    if options.check_only {
        return Ok(());
    }

    let start_page = options.start_page.unwrap_or_else(|| config.start_page());
    let mut runtime = SourceRuntime::new(source);
    let mut state = CatalogState::new(runtime.page_size());
    let result = folio_tui::run_app(&mut state, &mut runtime, start_page);
    tracing::info!(selected = state.selected_count(), "folio exited");
    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    start_page: Option<u32>,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        start_page: None,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--page" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--page requires a page number"))?;
                let page = value
                    .as_ref()
                    .parse::<u32>()
                    .ok()
                    .filter(|page| *page > 0)
                    .ok_or_else(|| {
                        anyhow!(
                            "--page expects a page number of 1 or more, got {:?}",
                            value.as_ref()
                        )
                    })?;
                options.start_page = Some(page);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("folio: page through a remote catalog and pick records");
    println!("  --config <path>          Use a specific config path");
    println!("  --page <n>               Open page n first (overrides [ui].start_page)");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Browse a generated in-memory catalog");
    println!("  --check                  Validate config and fetch page 1 once");
    println!("  --help                   Show this help");
}
