#![allow(missing_docs)]
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use crudspec_core::{
    BASE_PATH_VAR, BASE_URL_VAR, HarnessConfig, MEAN_LATENCY_VAR, PERF_ITERATIONS_VAR,
    ProductCase, ProductSuite, ReportWriter, TIMEOUT_VAR,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
crudspec: run the product contract suite against a deployment

USAGE:
  crudspec [OPTIONS]

OPTIONS:
  -u, --base-url URL          Base URL            [env: CRUDSPEC_BASE_URL]
  -b, --base-path PATH        Collection path     [env: CRUDSPEC_BASE_PATH]
  -t, --timeout-ms MS         Request timeout     [env: CRUDSPEC_TIMEOUT_MS]
  -l, --mean-latency-ms MS    Latency threshold   [env: CRUDSPEC_MEAN_LATENCY_MS]
  -n, --iterations N          Latency requests    [env: CRUDSPEC_PERF_ITERATIONS]
  -c, --case CODE             Only run cases whose name starts with CODE (repeatable)
  -r, --report FILE           Write the suite report (.json, or .yml with the yaml feature)
  -d, --report-dir DIR        Write one report per scenario
  -h, --help                  Print help
";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Some(args) = AppArgs::parse().context("parsing arguments")? else {
        #[allow(clippy::print_stdout)]
        {
            println!("{HELP}");
        }
        return Ok(ExitCode::SUCCESS);
    };

    let config = HarnessConfig::from_lookup(|key| {
        args.overrides
            .get(key)
            .cloned()
            .or_else(|| std::env::var(key).ok())
    })
    .context("loading configuration")?;
    info!(base_url = %config.base_url, base_path = %config.base_path, "running product suite");

    let cases = args.selected_cases()?;
    let suite = ProductSuite::from_config(&config).context("building the client")?;

    let mut results = Vec::with_capacity(cases.len());
    for case in cases {
        let result = suite.run(case).await;
        match &result.failure {
            None => info!(%result, duration = ?result.duration(), "scenario passed"),
            Some(failure) => error!(%result, step = %failure.step, cause = %failure.message, "scenario failed"),
        }
        results.push(result);
    }

    if let Some(dir) = &args.report_dir {
        let writer = ReportWriter::new(dir);
        for result in &results {
            writer
                .write(result)
                .with_context(|| format!("writing report of '{}'", result.name))?;
        }
    }
    if let Some(path) = &args.report {
        ReportWriter::write_suite(path, &results)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    let failed = results.iter().filter(|it| !it.is_passed()).count();
    info!(passed = results.len() - failed, failed, "suite finished");

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[derive(Debug)]
struct AppArgs {
    overrides: HashMap<&'static str, String>,
    cases: Vec<String>,
    report: Option<PathBuf>,
    report_dir: Option<PathBuf>,
}

impl AppArgs {
    fn parse() -> Result<Option<Self>> {
        let mut pargs = pico_args::Arguments::from_env();
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let flags = [
            ("-u", "--base-url", BASE_URL_VAR),
            ("-b", "--base-path", BASE_PATH_VAR),
            ("-t", "--timeout-ms", TIMEOUT_VAR),
            ("-l", "--mean-latency-ms", MEAN_LATENCY_VAR),
            ("-n", "--iterations", PERF_ITERATIONS_VAR),
        ];
        let mut overrides = HashMap::new();
        for (short, long, var) in flags {
            let value: Option<String> = pargs
                .opt_value_from_str([short, long])
                .with_context(|| format!("parsing {long} argument"))?;
            if let Some(value) = value {
                overrides.insert(var, value);
            }
        }

        let cases = pargs
            .values_from_str(["-c", "--case"])
            .context("parsing case argument")?;
        let report = pargs
            .opt_value_from_os_str(["-r", "--report"], parse_path)
            .context("parsing report argument")?;
        let report_dir = pargs
            .opt_value_from_os_str(["-d", "--report-dir"], parse_path)
            .context("parsing report-dir argument")?;

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            warn!(?remaining, "Warning: unused arguments left");
        }

        Ok(Some(Self {
            overrides,
            cases,
            report,
            report_dir,
        }))
    }

    fn selected_cases(&self) -> Result<Vec<ProductCase>> {
        if self.cases.is_empty() {
            return Ok(ProductCase::ALL.to_vec());
        }

        let mut selected = Vec::new();
        for code in &self.cases {
            let matching = ProductCase::ALL
                .into_iter()
                .filter(|case| case.to_string().starts_with(code.as_str()))
                .collect::<Vec<_>>();
            if matching.is_empty() {
                bail!("no case matches '{code}'");
            }
            for case in matching {
                if !selected.contains(&case) {
                    selected.push(case);
                }
            }
        }
        Ok(selected)
    }
}

fn parse_path(value: &std::ffi::OsStr) -> Result<PathBuf, std::convert::Infallible> {
    Ok(PathBuf::from(value))
}
