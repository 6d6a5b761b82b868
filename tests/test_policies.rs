use std::collections::HashMap;

use cluster_policy_bench::domain::{
    job::{Job, WorkloadType},
    machine::Machine,
    policy::{
        MachineSelectionPolicy, PolicyType, round_robin::RoundRobinPolicy, sorted_best_fit::SortedTaskBestFitPolicy,
        weighted_resource::WeightedResourcePolicy,
    },
    utils::id::{JobId, MachineId},
};
use cluster_policy_bench::error::Error;

fn job(id: u64, length: u64, cpu: f64, ram: f64) -> Job {
    Job {
        id: JobId::new(id),
        workload_type: WorkloadType::Balanced,
        length,
        parallelism: 1,
        file_size: 300,
        output_size: 300,
        cpu_utilization: cpu,
        ram_utilization: ram,
        bw_utilization: 0.2,
    }
}

fn machines(ids: &[u64]) -> Vec<Machine> {
    ids.iter().map(|&id| Machine::new(id, 5_000.0, 4, 16_000.0)).collect()
}

#[test]
fn test_round_robin_cycles_in_pool_order() {
    let pool = machines(&[3, 1, 2, 0]);
    let mut policy = RoundRobinPolicy::new();

    let selected: Vec<u64> = (0..8).map(|i| policy.select_machine_for(&job(i, 1_000, 0.5, 0.1), &pool).unwrap().value()).collect();

    assert_eq!(selected, vec![3, 1, 2, 0, 3, 1, 2, 0]);
}

#[test]
fn test_round_robin_fairness() {
    let pool = machines(&[0, 1, 2, 3, 4]);
    let mut policy = RoundRobinPolicy::new();
    let mut per_machine: HashMap<MachineId, usize> = HashMap::new();

    for i in 0..50 {
        let selected = policy.select_machine_for(&job(i, 10_000, 0.7, 0.3), &pool).unwrap();
        *per_machine.entry(selected).or_default() += 1;
    }

    assert_eq!(per_machine.len(), 5);
    assert!(per_machine.values().all(|&count| count == 10), "Uneven distribution: {:?}", per_machine);
}

#[test]
fn test_every_policy_rejects_an_empty_pool() {
    for policy_type in PolicyType::ALL {
        let mut policy = policy_type.get_instance();
        let result = policy.select_machine_for(&job(7, 1_000, 0.5, 0.5), &[]);

        match result {
            Err(Error::ConfigurationError(message)) => assert!(message.contains('7'), "{}: {}", policy_type, message),
            other => panic!("{} returned {:?} for an empty pool", policy_type, other),
        }
    }
}

#[test]
fn test_weighted_tie_goes_to_first_machine_in_input_order() {
    let pool = machines(&[5, 2, 9]);
    let mut policy = WeightedResourcePolicy::new();

    let selected = policy.select_machine_for(&job(0, 50_000, 0.5, 0.3), &pool).unwrap();

    assert_eq!(selected, MachineId::new(5));
}

#[test]
fn test_weighted_prefers_strictly_less_loaded_machine() {
    let pool = machines(&[0, 1]);
    let mut policy = WeightedResourcePolicy::new();

    // The first job lands on machine 0, leaving machine 1 with lower CPU and RAM demand.
    policy.select_machine_for(&job(0, 200_000, 0.8, 0.4), &pool).unwrap();

    let load_0 = policy.load_of(MachineId::new(0));
    let load_1 = policy.load_of(MachineId::new(1));
    assert!(load_1.cpu < load_0.cpu && load_1.ram < load_0.ram);
    assert!(policy.load_score(&pool[1]) < policy.load_score(&pool[0]));

    let selected = policy.select_machine_for(&job(1, 200_000, 0.8, 0.4), &pool).unwrap();
    assert_eq!(selected, MachineId::new(1));
}

#[test]
fn test_weighted_load_accumulates_scaled_cpu_demand() {
    let pool = machines(&[0]);
    let mut policy = WeightedResourcePolicy::new();

    policy.select_machine_for(&job(0, 10_000, 0.5, 0.25), &pool).unwrap();
    policy.select_machine_for(&job(1, 10_000, 0.0, 0.75), &pool).unwrap();

    let load = policy.load_of(MachineId::new(0));
    // 10_000 / 0.5 + 10_000 / 0.01
    assert!((load.cpu - 1_020_000.0).abs() < 1e-6);
    assert!((load.ram - 1.0).abs() < 1e-9);
    assert_eq!(load.job_count, 2);

    // 4 * 1_020_000 / 20_000 + 30 * (0.5 * 4)
    assert!((policy.load_score(&pool[0]) - 264.0).abs() < 1e-6);
}

#[test]
fn test_best_fit_presort_is_ascending_and_stable() {
    let policy = SortedTaskBestFitPolicy::new();
    let mut jobs = vec![
        job(0, 900_000, 0.9, 0.1),
        job(1, 10_000, 0.5, 0.2),
        job(2, 400_000, 0.4, 0.6),
        job(3, 10_000, 0.5, 0.2),
        job(4, 50_000, 1.0, 0.05),
    ];

    policy.presort_jobs(&mut jobs);

    let demands: Vec<f64> = jobs.iter().map(SortedTaskBestFitPolicy::combined_demand).collect();
    assert!(demands.windows(2).all(|w| w[0] <= w[1]), "Not ascending: {:?}", demands);

    let order: Vec<u64> = jobs.iter().map(|j| j.id.value()).collect();
    assert_eq!(order, vec![1, 3, 4, 0, 2]);
}

#[test]
fn test_best_fit_dispatches_with_its_own_weights() {
    let pool = machines(&[0, 1]);
    let mut policy = SortedTaskBestFitPolicy::new();

    assert_eq!(policy.dispatch().weights(), SortedTaskBestFitPolicy::WEIGHTS);
    assert_ne!(policy.dispatch().weights(), WeightedResourcePolicy::WEIGHTS);

    let first = policy.select_machine_for(&job(0, 10_000, 0.5, 0.2), &pool).unwrap();
    let second = policy.select_machine_for(&job(1, 10_000, 0.5, 0.2), &pool).unwrap();
    assert_eq!(first, MachineId::new(0));
    assert_eq!(second, MachineId::new(1));
    assert_eq!(policy.dispatch().load_of(MachineId::new(1)).job_count, 1);
}

#[test]
fn test_other_policies_keep_arrival_order() {
    let original = vec![job(0, 900_000, 0.9, 0.1), job(1, 10_000, 0.5, 0.2), job(2, 400_000, 0.4, 0.6)];

    for policy_type in [PolicyType::RoundRobin, PolicyType::WeightedResource] {
        let mut jobs = original.clone();
        policy_type.get_instance().presort_jobs(&mut jobs);
        assert_eq!(jobs, original, "{} reordered the jobs", policy_type);
    }
}

#[test]
fn test_factory_returns_independent_instances() {
    let pool = machines(&[0, 1, 2]);
    let mut first = PolicyType::RoundRobin.get_instance();
    first.select_machine_for(&job(0, 1_000, 0.5, 0.1), &pool).unwrap();

    let mut second = PolicyType::RoundRobin.get_instance();
    assert_eq!(second.select_machine_for(&job(1, 1_000, 0.5, 0.1), &pool).unwrap(), MachineId::new(0));
}
