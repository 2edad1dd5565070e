use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use hpwh_app::{
    first_hour_rating, load_model, run_model_against_schedules, run_test_directory, search_for_uef,
    simplified_uef,
};
use hpwh_model::Preset;

#[derive(Parser)]
#[command(name = "hpwh")]
#[command(about = "Heat-pump water heater stratified-tank simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Step a model through a boundary-condition schedule and write a
    /// results CSV.
    Run {
        /// Path to a `HpwhSimInput` JSON model file.
        #[arg(long, conflicts_with = "preset")]
        model: Option<PathBuf>,
        /// Name of a built-in preset model (see `hpwh make --list`).
        #[arg(long)]
        preset: Option<String>,
        /// Directory of boundary schedule CSVs (and, for the legacy mode,
        /// `testInfo.txt`).
        #[arg(long)]
        schedule_dir: PathBuf,
        /// Read `testInfo.txt` from `schedule_dir` for the test length and
        /// tank overrides instead of passing `--length-of-test-min`.
        #[arg(long)]
        legacy_test_info: bool,
        /// Test length in minutes (ignored with `--legacy-test-info`).
        #[arg(long)]
        length_of_test_min: Option<usize>,
        /// Read a `SoCschedule.csv` state-of-charge channel.
        #[arg(long)]
        use_soc: bool,
        /// Where to write the per-minute results CSV.
        #[arg(long)]
        output: PathBuf,
    },
    /// Run a standardized rating procedure against a model.
    Measure {
        #[arg(long, conflicts_with = "preset")]
        model: Option<PathBuf>,
        #[arg(long)]
        preset: Option<String>,
        /// Report the simplified 24-hour UEF instead of the first-hour
        /// rating.
        #[arg(long)]
        uef: bool,
    },
    /// Emit a built-in preset's JSON model, list the available presets, or
    /// search a preset's tank insulation for one hitting a target UEF.
    Make {
        #[arg(long)]
        preset: Option<String>,
        #[arg(long)]
        list: bool,
        /// Search for a model whose simplified UEF matches this target,
        /// adjusting tank insulation (UA) via bisection.
        #[arg(long)]
        target_uef: Option<f64>,
        /// Where to write the JSON model (defaults to stdout).
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            model,
            preset,
            schedule_dir,
            legacy_test_info,
            length_of_test_min,
            use_soc,
            output,
        } => cmd_run(
            model,
            preset,
            schedule_dir,
            legacy_test_info,
            length_of_test_min,
            use_soc,
            output,
        ),
        Commands::Measure { model, preset, uef } => cmd_measure(model, preset, uef),
        Commands::Make {
            preset,
            list,
            target_uef,
            output,
        } => cmd_make(preset, list, target_uef, output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::from(1)
        }
    }
}

fn cmd_run(
    model: Option<PathBuf>,
    preset: Option<String>,
    schedule_dir: PathBuf,
    legacy_test_info: bool,
    length_of_test_min: Option<usize>,
    use_soc: bool,
    output: PathBuf,
) -> Result<(), String> {
    let report = if legacy_test_info {
        run_test_directory(&schedule_dir, model.as_deref(), preset.as_deref(), &output)
            .map_err(|e| e.to_string())?
    } else {
        let length_of_test_min = length_of_test_min
            .ok_or_else(|| "--length-of-test-min is required without --legacy-test-info".to_string())?;
        let mut hpwh = load_model(model.as_deref(), preset.as_deref()).map_err(|e| e.to_string())?;
        run_model_against_schedules(&mut hpwh, &schedule_dir, length_of_test_min, use_soc, &output)
            .map_err(|e| e.to_string())?
    };

    println!(
        "wrote {} minutes to {}",
        report.minutes_simulated,
        report.results_path.display()
    );
    println!(
        "total energy input {:.3} kWh, output {:.3} kWh",
        report.total_energy_input_kwh, report.total_energy_output_kwh
    );
    Ok(())
}

fn cmd_measure(model: Option<PathBuf>, preset: Option<String>, uef: bool) -> Result<(), String> {
    let mut hpwh = load_model(model.as_deref(), preset.as_deref()).map_err(|e| e.to_string())?;

    if uef {
        let result = simplified_uef(&mut hpwh).map_err(|e| e.to_string())?;
        println!("simplified UEF: {:.3}", result.uef);
        println!(
            "  input {:.3} kWh, delivered {:.3} kWh",
            result.total_energy_input_kwh, result.total_energy_delivered_kwh
        );
    } else {
        let rating = first_hour_rating(&mut hpwh).map_err(|e| e.to_string())?;
        println!(
            "first-hour rating: {} draws completed ({:.1} L), recovered = {}",
            rating.draws_completed, rating.total_draw_volume_l, rating.recovered
        );
    }
    Ok(())
}

fn cmd_make(
    preset: Option<String>,
    list: bool,
    target_uef: Option<f64>,
    output: Option<PathBuf>,
) -> Result<(), String> {
    if list {
        for preset in Preset::all() {
            println!("{}", preset.name());
        }
        return Ok(());
    }

    let name = preset.ok_or_else(|| "--preset <name> is required (or pass --list)".to_string())?;
    let preset = Preset::from_name(&name).ok_or_else(|| format!("no such preset: {name}"))?;

    let model = match target_uef {
        Some(target) => {
            let result = search_for_uef(&preset.input(), target).map_err(|e| e.to_string())?;
            println!(
                "achieved UEF {:.4} (target {:.4}) after {} iterations",
                result.achieved_uef, target, result.iterations
            );
            result.input
        }
        None => preset.input(),
    };
    let json = serde_json::to_string_pretty(&model).map_err(|e| e.to_string())?;

    match output {
        Some(path) => {
            std::fs::write(&path, json).map_err(|e| e.to_string())?;
            println!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
