use std::fs::OpenOptions;
use std::io::Write;

use anyhow::Context;

use branching_outbreak::config::{self, RunConfig};
use branching_outbreak::{driver, params};

fn main() {
    if let Err(err) = run() {
        eprintln!("outbreaksim: error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("outbreaksim").to_string();

    let Some((mut pars, cfg)) =
        config::parse(&program, args.get(1..).unwrap_or(&[])).context("configuration")?
    else {
        return Ok(()); // --help
    };

    init_logging(&cfg).context("log redirection")?;

    params::solve(&mut pars).context("parameter solver")?;

    let summary = driver::run(&pars, &cfg).context("simulation")?;
    summary.log_report();

    if let Some(path) = &cfg.summary {
        summary.save(path).context("summary output")?;
    }
    Ok(())
}

/// Route the logger per --olog/--elog; log files are opened in append mode
/// with 0644 permissions.
fn init_logging(cfg: &RunConfig) -> anyhow::Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format_timestamp_secs();

    if let Some(path) = cfg.olog.as_ref().or(cfg.elog.as_ref()) {
        let mut open = OpenOptions::new();
        open.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            open.mode(0o644);
        }
        let file = open
            .open(path)
            .with_context(|| format!("cannot open file '{}' in write mode", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file) as Box<dyn Write + Send>));
    }

    builder.init();
    Ok(())
}
