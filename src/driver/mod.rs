/// ==============================================================================================
/// ==================================== Path Driver =============================================
/// ==============================================================================================

use std::fs::File;
use std::io::{BufWriter, Error, ErrorKind, Result, Write};
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use crate::config::RunConfig;
use crate::output::{FrameShape, RunSummary};
use crate::params::model::ModelParams;
use crate::rng::SimRng;
use crate::sim::Walker;
use crate::stats::{SummaryStats, ThreadStats};
use crate::trace::CtLog;

/// Paths assigned to one substream.
///     A pure function of the global substream index, so the multiset of
///     generated paths is invariant under the thread count: the first
///     npaths mod nsets substreams take one extra path.
#[inline]
fn paths_for_substream(npaths: u64, nsets: u64, substream: u64) -> u64 {
    npaths / nsets + u64::from(substream < npaths % nsets)
}

/// Run the full simulation: npaths paths split over nthreads workers, each
/// consuming its own substreams in a fixed order, merging partials in
/// thread-index order afterwards.
pub fn run(pars: &ModelParams, cfg: &RunConfig) -> Result<RunSummary> {
    if cfg.ctout.is_some() && !pars.has_postest() {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "driver::run: contact-tracing output requires the positive-test model \
             (an interrupted period with ttpr/mtpr and tdeltat)",
        ));
    }

    let shape = FrameShape::select(pars);
    info!(
        "simulating {} paths on {} thread(s), {} set(s) per thread, seed {}, {:?} frames",
        cfg.npaths, cfg.nthreads, cfg.nsetsperthread, cfg.seed, shape
    );

    let tlf = Mutex::new(BufWriter::new(File::create(&cfg.output).map_err(|e| {
        Error::new(e.kind(), format!("driver::run: create {}: {e}", cfg.output.display()))
    })?));
    let ctf = match &cfg.ctout {
        Some(path) => Some(Mutex::new(BufWriter::new(File::create(path).map_err(
            |e| Error::new(e.kind(), format!("driver::run: create {}: {e}", path.display())),
        )?))),
        None => None,
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cfg.nthreads as usize)
        .build()
        .map_err(|e| Error::new(ErrorKind::Other, format!("driver::run: thread pool: {e}")))?;

    let pb = ProgressBar::new(cfg.npaths as u64);
    pb.set_style(
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap()
            .progress_chars("=>-"),
    );
    pb.set_message("paths");

    // One closure per pool thread; ctx.index() is the thread id t, which
    // owns substreams t * nsetsperthread .. (t + 1) * nsetsperthread.
    let partials: Vec<Result<(ThreadStats, Option<Vec<u64>>)>> = pool.broadcast(|ctx| {
        worker(ctx.index() as u32, pars, cfg, shape, &tlf, ctf.as_ref(), &pb)
    });
    pb.finish();

    let mut total = ThreadStats::new();
    let mut hist: Option<Vec<u64>> = None;
    for partial in partials {
        let (stats, thread_hist) = partial?;
        total.merge(&stats);
        if let Some(th) = thread_hist {
            let h = hist.get_or_insert_with(Vec::new);
            if h.len() < th.len() {
                h.resize(th.len(), 0);
            }
            for (i, v) in th.iter().enumerate() {
                h[i] += v;
            }
        }
    }

    flush(&tlf, &cfg.output.display().to_string())?;
    if let Some(ctf) = &ctf {
        flush(ctf, &cfg.ctout.as_ref().unwrap().display().to_string())?;
    }

    Ok(RunSummary::build(pars, cfg.nthreads, cfg.nsetsperthread, cfg.seed, &total, hist))
}

fn flush(file: &Mutex<BufWriter<File>>, name: &str) -> Result<()> {
    file.lock()
        .map_err(|_| Error::new(ErrorKind::Other, format!("driver::run: {name}: lock poisoned")))?
        .flush()
        .map_err(|e| Error::new(e.kind(), format!("driver::run: flush {name}: {e}")))
}

/// One worker: loop over this thread's sets, one substream per set, one
/// frame written per path under the timeline-file lock.
fn worker(
    thread: u32,
    pars: &ModelParams,
    cfg: &RunConfig,
    shape: FrameShape,
    tlf: &Mutex<BufWriter<File>>,
    ctf: Option<&Mutex<BufWriter<File>>>,
    pb: &ProgressBar,
) -> Result<(ThreadStats, Option<Vec<u64>>)> {
    let nsets = cfg.nthreads as u64 * cfg.nsetsperthread as u64;

    let mut walker = Walker::from_params(pars);
    let mut stats = SummaryStats::from_params(pars, cfg.ninfhist);
    let mut ct = ctf.map(|_| CtLog::new());
    let mut agg = ThreadStats::new();
    let mut buf: Vec<u8> = Vec::new();

    for set in 0..cfg.nsetsperthread as u64 {
        let substream = thread as u64 * cfg.nsetsperthread as u64 + set;
        let mut rng = SimRng::substream(cfg.seed, substream);

        for _ in 0..paths_for_substream(cfg.npaths as u64, nsets, substream) {
            stats.path_init();
            if let Some(ct) = ct.as_mut() {
                ct.path_init();
            }
            walker.run_path(&mut rng, &mut stats, ct.as_mut());
            agg.record_path(&stats);

            buf.clear();
            shape.write_path(&stats, &mut buf)?;
            {
                let mut f = tlf.lock().map_err(|_| {
                    Error::new(ErrorKind::Other, "worker: timeline file lock poisoned")
                })?;
                f.write_all(&buf)?;
            }

            if let (Some(ct), Some(ctf)) = (ct.as_mut(), ctf) {
                buf.clear();
                ct.write_path(stats.nimaxedoutmintimeindex, &mut buf)?;
                if !buf.is_empty() {
                    let mut f = ctf.lock().map_err(|_| {
                        Error::new(ErrorKind::Other, "worker: tracing file lock poisoned")
                    })?;
                    f.write_all(&buf)?;
                }
            }

            pb.inc(1);
        }
    }

    let hist = stats.ngeninfs().map(|h| h.to_vec());
    Ok((agg, hist))
}
