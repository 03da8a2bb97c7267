/// ==============================================================================================
/// ===================================== Run Options ============================================
/// ==============================================================================================

use std::path::PathBuf;

use crate::rng::DEFAULT_SEED;

/// Simulation-run controls (everything that is not a model parameter).
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub npaths: u32,
    pub nthreads: u32,
    pub nsetsperthread: u32, // 0 until finalised: 100 when nthreads > 1, else 1
    pub seed: u64,
    pub ninfhist: bool,
    pub output: PathBuf,
    pub ctout: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    pub olog: Option<PathBuf>,
    pub elog: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            npaths: 10000,
            nthreads: 1,
            nsetsperthread: 0,
            seed: DEFAULT_SEED,
            ninfhist: false,
            output: PathBuf::from("timelines.bin"),
            ctout: None,
            summary: None,
            olog: None,
            elog: None,
        }
    }
}

pub fn print_usage(name: &str) {
    println!("Usage: {name} [OPTION]");
    println!();
    println!(
        "Stochastic simulation of outbreaks, using gamma distributions for the different time \
         periods and a Poisson distribution for the number of interaction events where \
         transmission can occur."
    );
    println!();
    println!("The basic reproduction number R0 is defined by the expression");
    println!("    R0 = lambda * tbar * mu,");
    println!(
        "where mu is the mean of an unbounded logarithmic distribution with parameter p \
         (mu = -p / ((1 - p) * log(1 - p))). Exactly three of tbar, lambda, (p or mu) and R0 \
         must be provided."
    );
    println!();
    println!("Options");
    println!();
    println!("    --config FILENAME             Read configuration options from FILENAME");
    println!("    --olog FILENAME               Append the log output to FILENAME");
    println!("    --elog FILENAME               Append the error output to FILENAME");
    println!("    --tbar VALUE                  Mean main communicable period");
    println!("    --kappa VALUE                 Gamma shape of the main communicable period");
    println!("    --t95 VALUE                   95th percentile of the main communicable period");
    println!("    --lambda VALUE                Rate of transmission events per infectious individual");
    println!("    --p VALUE                     Logarithmic group-size parameter (0 <= p < 1)");
    println!("    --mu VALUE                    Mean of the unbounded logarithmic distribution (mu >= 1)");
    println!("    --pinf VALUE                  Per-contact infection probability");
    println!("    --R0 VALUE                    Basic reproduction number");
    println!("    --group_log_attendees_plus_1  Attendees = logarithmic variable plus 1 (default)");
    println!("    --group_log_attendees         Attendees = logarithmic variable truncated below 2");
    println!("    --group_log_invitees          Invitees = logarithmic variable truncated below 2");
    println!("    --lbar VALUE                  Mean latent period (default 0)");
    println!("    --kappal VALUE                Gamma shape of the latent period");
    println!("    --l95 VALUE                   95th percentile of the latent period");
    println!("    --q VALUE                     Probability of the alternate communicable period");
    println!("    --mbar VALUE                  Mean alternate communicable period (required if q > 0)");
    println!("    --kappaq VALUE                Gamma shape of the alternate communicable period");
    println!("    --m95 VALUE                   95th percentile of the alternate communicable period");
    println!("    --pit VALUE                   Probability of main-period interruption");
    println!("    --itbar VALUE                 Mean interrupted main period (required if pit > 0)");
    println!("    --kappait VALUE               Gamma shape of the interrupted main period");
    println!("    --it95 VALUE                  95th percentile of the interrupted main period");
    println!("    --pim VALUE                   Probability of alternate-period interruption (default pit)");
    println!("    --imbar VALUE                 Mean interrupted alternate period (default itbar)");
    println!("    --kappaim VALUE               Gamma shape of the interrupted alternate period");
    println!("    --im95 VALUE                  95th percentile of the interrupted alternate period");
    println!("    --ttpr VALUE                  True-positive probability for an interrupted main period");
    println!("    --mtpr VALUE                  True-positive probability for an interrupted alternate period");
    println!("    --tdeltat VALUE               Delay between end of communicable period and test result");
    println!("    --pri_no_main_period          Primaries cannot take the main period");
    println!("    --pri_no_alt_period           Primaries cannot take the alternate period");
    println!("    --pri_no_main_period_int      Primaries cannot have the main period interrupted");
    println!("    --pri_no_alt_period_int       Primaries cannot have the alternate period interrupted");
    println!("    --time_pri_created            Time origin at primary creation (default)");
    println!("    --time_pri_infectious         Time origin where a primary becomes infectious");
    println!("    --time_pri_end                Time origin where a primary ceases to be infectious");
    println!("    --tmax VALUE                  Maximum simulation time for new events (default infinity)");
    println!("    --nstart VALUE                Initial number of infectious individuals (default 1)");
    println!("    --popsize VALUE               Population size (default 0, infinite; finite unsupported)");
    println!("    --nimax VALUE                 Cap on new infections per integer time bin");
    println!("    --lmax VALUE                  Maximum tree depth contributing to the timelines");
    println!("    --ninfhist                    Record the offspring-count histogram");
    println!("    --npaths VALUE                Number of generated simulation paths (default 10000)");
    println!("    --nthreads VALUE              Number of worker threads (default 1)");
    println!("    --nsetsperthread VALUE        Path sets per thread (default 100 when nthreads > 1, else 1)");
    println!("    --seed VALUE                  Master random seed");
    println!("    --out FILENAME                Binary path output file (default timelines.bin)");
    println!("    --ctout FILENAME              Contact-tracing output file (enables the tracing log)");
    println!("    --summary FILENAME            JSON summary of the final aggregates");
    println!("    --help                        Print this usage information and exit");
    println!();
    println!(
        "Each option can be used as shown above from the command line. Dashes for option names \
         are optional. In configuration files, '=', ':' or spaces can separate option names from \
         arguments, and characters following '#' on a line are comments. Options can be used \
         multiple times and configuration files can be read from configuration files."
    );
}
