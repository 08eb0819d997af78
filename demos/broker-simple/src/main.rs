use std::time::Instant;

use clap::Parser;

use dslab_broker::core::config::SimulationConfig;
use dslab_broker::log_info;
use dslab_broker::simulation::CloudSimulation;

fn init_logger() {
    use env_logger::Builder;
    use std::io::Write;
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to simulation config
    #[clap(long, default_value = "config.yaml")]
    config: String,

    /// Overrides job binding algorithm from config, e.g. MinMin or SaturationFill[count=100,target=0]
    #[clap(long)]
    binding: Option<String>,

    /// Print run summary as JSON
    #[clap(long)]
    json: bool,
}

fn main() {
    init_logger();
    let args = Args::parse();

    let mut sim_config = match SimulationConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    if let Some(binding) = args.binding {
        sim_config.binding_algorithm = binding;
    }

    let simulation_start = Instant::now();
    let mut cloud_sim = match CloudSimulation::from_config(sim_config) {
        Ok(cloud_sim) => cloud_sim,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let summary = cloud_sim.run();

    log_info!(
        cloud_sim.context(),
        "Simulation process time {:.2?}",
        simulation_start.elapsed()
    );
    log_info!(cloud_sim.context(), "Total events processed {}", cloud_sim.event_count());
    log_info!(
        cloud_sim.context(),
        "Broker state {:?}, received {} jobs, makespan {:.3}",
        summary.broker_state,
        summary.received_jobs,
        summary.makespan
    );
    if args.json {
        println!("{}", summary.to_json());
    }
}
