//! The command line interface for the program.
use crate::aqi::{AqiResult, compute_aqi};
use crate::breakpoint::BreakpointTables;
use crate::category::CategoryBands;
use crate::log;
use crate::output::{create_output_directory, get_output_dir, write_study_report};
use crate::pollutant::{Pollutant, PollutantReading};
use crate::settings::Settings;
use crate::study::{PolicyAssessment, Study, StudyReport};
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::fmt::Write;
use std::path::{Path, PathBuf};

pub mod demo;
use demo::DemoSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the program.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Pollutant concentrations for the calculate command
#[derive(Args)]
pub struct ConcentrationOpts {
    /// PM2.5 concentration (µg/m³)
    #[arg(long)]
    pub pm25: Option<f64>,
    /// PM10 concentration (µg/m³)
    #[arg(long)]
    pub pm10: Option<f64>,
    /// NO2 concentration (µg/m³)
    #[arg(long)]
    pub no2: Option<f64>,
    /// SO2 concentration (µg/m³)
    #[arg(long)]
    pub so2: Option<f64>,
    /// CO concentration (mg/m³)
    #[arg(long)]
    pub co: Option<f64>,
    /// O3 concentration (µg/m³)
    #[arg(long)]
    pub o3: Option<f64>,
}

impl ConcentrationOpts {
    /// The concentrations which were given, as a reading
    pub fn reading(&self) -> PollutantReading {
        let mut reading = PollutantReading::new();
        reading.insert_opt(Pollutant::PM25, self.pm25);
        reading.insert_opt(Pollutant::PM10, self.pm10);
        reading.insert_opt(Pollutant::NO2, self.no2);
        reading.insert_opt(Pollutant::SO2, self.so2);
        reading.insert_opt(Pollutant::CO, self.co);
        reading.insert_opt(Pollutant::O3, self.o3);
        reading
    }
}

/// Options for the analyse command
#[derive(Args)]
pub struct AnalyseOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Calculate the AQI for a set of pollutant concentrations.
    Calculate {
        /// The concentrations to use
        #[command(flatten)]
        concentrations: ConcentrationOpts,
    },
    /// Run every policy assessment in a study and write the reports.
    Analyse {
        /// Path to the study directory.
        study_dir: PathBuf,
        /// Other analyse options
        #[command(flatten)]
        opts: AnalyseOpts,
    },
    /// Validate a study.
    Validate {
        /// The path to the study directory.
        study_dir: PathBuf,
    },
    /// Manage the bundled demo studies.
    Demo {
        /// The available subcommands for managing demo studies.
        #[command(subcommand)]
        subcommand: DemoSubcommands,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Calculate { concentrations } => {
                handle_calculate_command(&concentrations.reading(), None)
            }
            Self::Analyse { study_dir, opts } => handle_analyse_command(&study_dir, &opts, None),
            Self::Validate { study_dir } => handle_validate_command(&study_dir, None),
            Self::Demo { subcommand } => subcommand.execute(),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and run the requested command
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ aqi-impact --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load program settings, if not provided
fn load_settings(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// Format an AQI result for the terminal
pub fn format_aqi_result(result: &AqiResult) -> String {
    let mut out = format!(
        "AQI: {} ({})\nDominant pollutant: {}\nHealth impact: {}\nColour: {}\n",
        result.aqi,
        result.category,
        result.dominant_pollutant,
        result.health_impact,
        result.colour
    );
    for (pollutant, sub_index) in &result.sub_indices {
        writeln!(&mut out, "  {pollutant}: {sub_index}").unwrap();
    }

    out
}

/// Handle the `calculate` command.
///
/// The built-in CPCB breakpoints and bands are used.
pub fn handle_calculate_command(
    reading: &PollutantReading,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;

    // No log files are written for a one-off calculation
    log::init(Some(&settings.log_level), None).context("Failed to initialise logging.")?;

    let result = compute_aqi(reading, &BreakpointTables::cpcb(), &CategoryBands::cpcb())
        .context("Failed to calculate AQI.")?;
    print!("{}", format_aqi_result(&result));

    Ok(())
}

/// Handle the `analyse` command.
pub fn handle_analyse_command(
    study_path: &Path,
    opts: &AnalyseOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(study_path)?;
        &pathbuf
    };

    let overwrite = create_output_directory(output_path, opts.overwrite || settings.overwrite)
        .with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    log::init(Some(&settings.log_level), Some(output_path))
        .context("Failed to initialise logging.")?;

    let study = Study::from_path(study_path).context("Failed to load study.")?;
    info!("Loaded study from {}", study_path.display());
    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    let report = study.run_assessments()?;
    log_report_summary(&report);
    write_study_report(output_path, &report).context("Failed to write reports.")?;
    info!("Analysis complete!");

    Ok(())
}

/// Log a line for each successful policy assessment
fn log_report_summary(report: &StudyReport) {
    for (policy_id, assessment) in &report.policies {
        match assessment {
            Ok(PolicyAssessment::Windowed(periods)) => {
                for period in periods.iter().flatten() {
                    info!(
                        "{policy_id} {} to {}: {:.1}% change in AQI, p = {:.4} ({})",
                        period.start,
                        period.end,
                        period.change_during_pct,
                        period.p_value,
                        period.effectiveness
                    );
                }
            }
            Ok(PolicyAssessment::EmergencyThreshold(hazardous)) => info!(
                "{policy_id}: hazardous days {:.1}% before, {:.1}% after ({})",
                hazardous.before_hazardous_pct,
                hazardous.after_hazardous_pct,
                hazardous.assessment()
            ),
            Ok(PolicyAssessment::EmissionStandard(trend)) => info!(
                "{policy_id}: {:.1}% change in mean {} ({})",
                trend.change_pct,
                trend.pollutant,
                trend.assessment()
            ),
            // Already reported when the assessment failed
            Err(_) => {}
        }
    }
}

/// Handle the `validate` command.
pub fn handle_validate_command(study_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = load_settings(settings)?;

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(Some(&settings.log_level), None).context("Failed to initialise logging.")?;

    Study::from_path(study_path).context("Failed to validate study.")?;
    info!("Study validation successful!");

    Ok(())
}
