use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Args, Command, FromArgMatches as _};
use log::{info, LevelFilter};

use crate::context::Context;
use crate::error::EpisimError;
use crate::parameters::{ContextParametersExt, Parameters};
use crate::random::ContextRandomExt;
use crate::report::{ConsoleReport, ContextReportExt, CsvReport, ReportOptions};

/// Default cli arguments for the episim runner
#[derive(Args, Debug, Clone, Default)]
pub struct BaseArgs {
    /// Random seed; overrides the seed in the config file
    #[arg(short, long)]
    pub random_seed: Option<u64>,

    /// Optional path to a JSON parameters file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Optional directory for a CSV report of the population counts
    #[arg(short, long, default_value = "")]
    pub output_dir: String,

    /// Prefix for report file names
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Replace existing report files
    #[arg(short, long)]
    pub force_overwrite: bool,

    /// Enable logging at this level (error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log a module at its own level, e.g. `episim::movement=trace`; may be repeated
    #[arg(long, value_name = "MODULE=LEVEL")]
    pub log_filter: Vec<String>,

    /// Do not print the console report
    #[arg(short, long)]
    pub quiet: bool,
}

fn create_episim_cli() -> Command {
    let cli = Command::new("episim").about("Epidemic simulation of households and workplaces");
    BaseArgs::augment_args(cli)
}

/// Runs a simulation configured from the command line.
///
/// # Parameters
/// - `setup_fn`: called with the configured `Context` before it executes;
///   this is where the population is built.
///
/// # Errors
/// Returns an error if the arguments are invalid, configuration or report
/// setup fails, or the setup function fails.
pub fn run_with_args<F>(setup_fn: F) -> Result<Context, EpisimError>
where
    F: Fn(&mut Context, &BaseArgs) -> Result<(), EpisimError>,
{
    let matches = create_episim_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)
        .map_err(|e| EpisimError::EpisimError(e.to_string()))?;
    run_with_args_internal(&args, setup_fn)
}

/// Same as [`run_with_args`] with already parsed arguments.
///
/// # Errors
/// See [`run_with_args`].
pub fn run_with_args_internal<F>(args: &BaseArgs, setup_fn: F) -> Result<Context, EpisimError>
where
    F: Fn(&mut Context, &BaseArgs) -> Result<(), EpisimError>,
{
    if let Some(level) = &args.log_level {
        let level = LevelFilter::from_str(level)
            .map_err(|_| EpisimError::EpisimError(format!("unknown log level: {level}")))?;
        crate::log::set_log_level(level);
    }
    for filter in &args.log_filter {
        let (module, level) = crate::log::parse_module_filter(filter)?;
        crate::log::set_module_filter(&module, level);
    }

    let mut context = Context::new();

    let mut parameters = if args.config.is_empty() {
        Parameters::default()
    } else {
        info!("loading parameters from {}", args.config);
        Parameters::from_json_file(Path::new(&args.config))?
    };
    if let Some(seed) = args.random_seed {
        parameters.seed = seed;
    }
    context.init_random(parameters.seed);
    context.set_parameters(parameters)?;

    if !args.output_dir.is_empty() {
        let mut options = ReportOptions::new();
        options
            .directory(PathBuf::from(&args.output_dir))
            .file_prefix(args.prefix.clone())
            .overwrite(args.force_overwrite);
        context.add_report_sink(CsvReport::create(&options)?);
    }
    if !args.quiet {
        context.add_report_sink(ConsoleReport::stdout());
    }

    setup_fn(&mut context, args)?;

    context.execute();
    info!("simulation finished at t={}", context.get_current_time());
    Ok(context)
}
