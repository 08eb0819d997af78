use dslab_broker::core::broker::BrokerState;
use dslab_broker::core::config::{ConfigError, SimulationConfig};
use dslab_broker::simulation::CloudSimulation;

fn name_wrapper(file_name: &str) -> String {
    format!("test-configs/{}", file_name)
}

#[test]
fn test_read_config() {
    let config = SimulationConfig::from_file(&name_wrapper("config.yaml")).unwrap();
    assert_eq!(config.seed, 7);
    assert_eq!(config.message_delay, 0.5);
    assert_eq!(config.max_recovery_rounds, 3);
    assert_eq!(config.binding_algorithm, "GreedyLoadBalance[baseline=0;0]");
    assert_eq!(config.datacenters.len(), 2);
    assert_eq!(config.datacenters[1].placement_algorithm.as_deref(), Some("RankBased"));
    assert_eq!(config.datacenters[1].hosts[0].name_prefix.as_deref(), Some("large"));
    assert_eq!(config.number_of_hosts(), 3);
    assert_eq!(config.number_of_vms(), 3);
    assert_eq!(config.number_of_jobs(), 6);
    assert_eq!(config.jobs[1].vm, Some(2));
}

#[test]
fn test_default_values() {
    let config = SimulationConfig::from_file(&name_wrapper("config_defaults.yaml")).unwrap();
    assert_eq!(config.seed, 123);
    assert_eq!(config.message_delay, 0.);
    assert_eq!(config.max_recovery_rounds, 5);
    assert_eq!(config.binding_algorithm, "RoundRobin");
    assert_eq!(config.datacenters[0].placement_algorithm, None);
    assert_eq!(config.jobs[0].pes, None);
}

#[test]
fn test_run_from_config() {
    let config = SimulationConfig::from_file(&name_wrapper("config.yaml")).unwrap();
    let mut cloud_sim = CloudSimulation::from_config(config).unwrap();

    let dc = cloud_sim.datacenter_by_name("dc-large").unwrap();
    let host_names: Vec<String> = dc
        .borrow()
        .allocation_policy()
        .hosts()
        .iter()
        .map(|host| host.name.clone())
        .collect();
    assert_eq!(host_names, vec!["large1", "large2"]);

    let summary = cloud_sim.run();
    assert_eq!(summary.broker_state, BrokerState::Done);
    assert_eq!(summary.created_vms, 3);
    assert_eq!(summary.received_jobs, 6);
    assert_eq!(summary.jobs_per_vm.get(&0), Some(&2));
    assert_eq!(summary.jobs_per_vm.get(&1), Some(&2));
    assert_eq!(summary.jobs_per_vm.get(&2), Some(&2));
    assert!(summary.makespan > 10.);
    assert_eq!(cloud_sim.broker().borrow().characteristics().len(), 2);
    assert!(summary.to_json().contains("\"broker_state\": \"Done\""));

    let small = cloud_sim.datacenter_by_name("dc-small").unwrap();
    assert_eq!(small.borrow().executed_job_count(), 0);
    assert!(cloud_sim.datacenter_by_name("dc-medium").is_none());
}

#[test]
fn test_run_with_defaults() {
    let config = SimulationConfig::from_file(&name_wrapper("config_defaults.yaml")).unwrap();
    let summary = CloudSimulation::from_config(config).unwrap().run();
    assert_eq!(summary.broker_state, BrokerState::Done);
    assert_eq!(summary.received_jobs, 2);
    assert_eq!(summary.makespan, 2.);
}

#[test]
fn test_config_errors() {
    let config = SimulationConfig::from_file(&name_wrapper("config_bad_algorithm.yaml")).unwrap();
    assert!(matches!(
        CloudSimulation::from_config(config),
        Err(ConfigError::UnknownAlgorithm(_))
    ));
    assert!(matches!(
        SimulationConfig::from_file(&name_wrapper("config_invalid.yaml")),
        Err(ConfigError::Yaml(_))
    ));
    assert!(matches!(
        SimulationConfig::from_file(&name_wrapper("missing.yaml")),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn test_config_from_yaml_string() {
    let config = SimulationConfig::from_yaml("binding_algorithm: MaxMin\nvms:\n  - pes: 2\n    mips: 10\n    count: 4\n").unwrap();
    assert_eq!(config.binding_algorithm, "MaxMin");
    assert_eq!(config.number_of_vms(), 4);
    assert!(config.datacenters.is_empty());
}
