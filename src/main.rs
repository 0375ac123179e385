//! Swarm Planner CLI - Optimize steering parameters and export the flight.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use swarm_planner::{
    compute::{PathPlanner, evolution::EvolutionEngine},
    record::{FlightRecord, RecordOptions},
    schema::RunConfig,
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.get(1).map(String::as_str) == Some("--example") {
        print_example_config();
        return;
    }
    if args.get(1).map(String::as_str) == Some("--help") {
        eprintln!("Usage: {} [run.json] [--example]", args[0]);
        eprintln!();
        eprintln!("Tune the drone steering field for a sensor layout, replay the best");
        eprintln!("parameters and write the trajectories to <name>.flight.json.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  run.json   Scenario and evolution settings (default: demo scenario)");
        eprintln!("  --example  Print an example configuration");
        std::process::exit(1);
    }

    let config_path = args.get(1).map(PathBuf::from);

    // Load configuration
    let run: RunConfig = match &config_path {
        Some(path) => {
            let config_str = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading config file: {}", e);
                std::process::exit(1);
            });
            serde_json::from_str(&config_str).unwrap_or_else(|e| {
                eprintln!("Error parsing config: {}", e);
                std::process::exit(1);
            })
        }
        None => RunConfig::default(),
    };

    let output_path = config_path
        .as_ref()
        .map(|p| p.with_extension("flight.json"))
        .unwrap_or_else(|| PathBuf::from("flight.json"));

    println!("Swarm Planner");
    println!("=============");
    println!(
        "Sensors: {}, drones: {}",
        run.scenario.sensors.len(),
        run.scenario.n_drones
    );
    println!(
        "Population: {}, generations: {}",
        run.evolution.population.size, run.evolution.population.max_generations
    );
    println!();

    let mut engine = EvolutionEngine::new(run.scenario.clone(), run.evolution.clone())
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    println!("Running optimizer...");
    let start = Instant::now();
    let total = run.evolution.population.max_generations;

    let result = engine
        .run_with_callback(|progress| {
            // Print progress every 10%
            if (progress.generation + 1) % (total / 10).max(1) == 0 {
                println!(
                    "  Generation {}/{}: best={}, generation best={:.4}, avg={:.4}",
                    progress.generation + 1,
                    total,
                    progress
                        .best_fitness
                        .map_or_else(|| "none".to_string(), |f| format!("{:.4}", f)),
                    progress.generation_best,
                    progress.avg_fitness
                );
            }
        })
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    println!();
    println!("Optimizer finished in {:.2}s", start.elapsed().as_secs_f32());

    let Some(params) = result.best_params() else {
        println!(
            "No parameter set beat the fitness threshold of {}",
            run.evolution.improvement_threshold
        );
        std::process::exit(2);
    };

    println!("Best parameters:");
    println!("{}", serde_json::to_string_pretty(&params).unwrap_or_default());
    println!();

    // Replay the best parameters to obtain trajectories
    let mut planner = PathPlanner::from_scenario(&run.scenario, run.evolution.simulation.clone())
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
    let outcome = planner.run(&params).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let record = FlightRecord::capture(&planner, params, outcome, &RecordOptions::default());
    println!("Replay: {}", record.stats());

    if let Err(e) = record.save(&output_path) {
        eprintln!("Error writing {}: {}", output_path.display(), e);
        std::process::exit(1);
    }
    println!("Trajectories written to {}", output_path.display());
}

fn print_example_config() {
    let run = RunConfig::default();

    println!("Example configuration (run.json):");
    println!("{}", serde_json::to_string_pretty(&run).unwrap());
}
