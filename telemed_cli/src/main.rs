use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use telemed_core::*;

#[derive(Parser)]
#[command(name = "telemed")]
#[command(about = "Telemedicine dosage workflow prototype", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Load configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demonstration scenarios (default)
    Demo,

    /// Calculate and safety-check a dose for one patient weight
    Dose {
        /// Patient weight as entered
        #[arg(long, allow_negative_numbers = true)]
        weight: f64,

        /// Unit of the weight (kg, lbs, g)
        #[arg(long)]
        unit: String,
    },

    /// Run a simulated allergy check with the network fail-safe
    Allergy {
        /// Patient identifier
        #[arg(long, default_value = DEMO_PATIENT)]
        patient: String,

        /// Simulated network latency in milliseconds
        #[arg(long)]
        latency_ms: u64,
    },
}

const DEMO_PATIENT: &str = "Patient_123";

/// One step of the demonstration
enum Scenario {
    Prescription { weight: f64, unit: &'static str },
    AllergyCheck { latency_ms: u64 },
}

const DEMO_SCENARIOS: [(&str, Scenario); 4] = [
    (
        "Handling '20000g' input",
        Scenario::Prescription {
            weight: 20000.0,
            unit: "g",
        },
    ),
    (
        "Protection system activation",
        Scenario::Prescription {
            weight: 100.0,
            unit: "kg",
        },
    ),
    (
        "Fast network allergy check",
        Scenario::AllergyCheck { latency_ms: 50 },
    ),
    (
        "Slow network (3000ms lag)",
        Scenario::AllergyCheck { latency_ms: 3000 },
    ),
];

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.verbose {
        telemed_core::logging::init_with_level("debug");
    } else {
        telemed_core::logging::init();
    }

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    tracing::debug!("Using configuration: {:?}", config);
    let workflow = Workflow::from_config(&config);

    match cli.command {
        Some(Commands::Dose { weight, unit }) => Ok(cmd_dose(&workflow, weight, &unit)),
        Some(Commands::Allergy {
            patient,
            latency_ms,
        }) => Ok(cmd_allergy(&workflow, &patient, latency_ms)),
        Some(Commands::Demo) | None => Ok(cmd_demo(&workflow)),
    }
}

fn cmd_demo(workflow: &Workflow) -> ExitCode {
    println!("TELEMEDICINE PLATFORM PROTOTYPE");
    println!();

    for (index, (title, scenario)) in DEMO_SCENARIOS.iter().enumerate() {
        println!("Scenario {}: {}", index + 1, title);

        // Each scenario stands alone; a blocked one does not stop the rest
        match *scenario {
            Scenario::Prescription { weight, unit } => {
                report_prescription(&workflow.prescribe_raw(weight, unit));
            }
            Scenario::AllergyCheck { latency_ms } => {
                report_screening(workflow, &workflow.screen_allergies(DEMO_PATIENT, latency_ms));
            }
        }

        println!();
    }

    ExitCode::SUCCESS
}

fn cmd_dose(workflow: &Workflow, weight: f64, unit: &str) -> ExitCode {
    let outcome = workflow.prescribe_raw(weight, unit);
    report_prescription(&outcome);

    if outcome.is_sent() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn cmd_allergy(workflow: &Workflow, patient: &str, latency_ms: u64) -> ExitCode {
    let screening = workflow.screen_allergies(patient, latency_ms);
    report_screening(workflow, &screening);

    // Manual verification is the designed fallback, not a failure
    ExitCode::SUCCESS
}

fn report_prescription(outcome: &PrescriptionOutcome) {
    match outcome {
        PrescriptionOutcome::Sent { weight_kg, dose_mg } => {
            println!("  Standardized weight: {:.2} kg", weight_kg);
            println!("  Calculated dose: {} mg", dose_mg);
            println!("SUCCESS: Prescription sent to pharmacy.");
        }
        PrescriptionOutcome::Blocked(e) if e.is_safety_violation() => {
            println!("BLOCKED: {}", e);
            println!("System prevented fatal error.");
        }
        PrescriptionOutcome::Blocked(e) => {
            println!("FAILURE: {}", e);
        }
    }
}

fn report_screening(workflow: &Workflow, screening: &AllergyScreening) {
    match screening {
        AllergyScreening::Clear(payload) => {
            println!("SUCCESS: {}. Proceeding with prescription.", payload);
        }
        AllergyScreening::ManualVerificationRequired(result) => {
            if result.is_timeout() {
                println!(
                    "ALERT: Network timeout after {} ms! Operation aborted.",
                    workflow.allergy.timeout().as_millis()
                );
            } else {
                println!("ALERT: Allergy check failed ({}).", result);
            }
            println!("FAIL-SAFE: Doctor must verify allergies manually.");
        }
    }
}
