//! Sample data for trying the service without a real plant export
//!
//! Readings are drawn uniformly inside the ranges seen in the public
//! milling dataset the model was fitted on.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::table::Table;
use crate::features::layout::FEATURE_COLUMNS;
use crate::features::{FeatureRecord, MachineType};

/// Single example row offered when a batch upload is rejected
pub fn template_record() -> FeatureRecord {
    FeatureRecord {
        machine_type: MachineType::Low,
        air_temperature: 298.1,
        process_temperature: 308.6,
        rotational_speed: 1551.0,
        torque: 42.8,
        tool_wear: 0.0,
    }
}

pub fn template() -> Table {
    records_table(&[template_record()])
}

/// `rows` synthetic records; the same seed yields the same records
pub fn generate(rows: usize, seed: Option<u64>) -> Vec<FeatureRecord> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    (0..rows).map(|_| random_record(&mut rng)).collect()
}

pub fn generate_table(rows: usize, seed: Option<u64>) -> Table {
    records_table(&generate(rows, seed))
}

fn random_record(rng: &mut StdRng) -> FeatureRecord {
    // L 60%, M 30%, H 10%
    let machine_type = match rng.gen_range(0..10) {
        0..=5 => MachineType::Low,
        6..=8 => MachineType::Medium,
        _ => MachineType::High,
    };

    let air_temperature = round_to(rng.gen_range(295.0..305.0), 1);
    let process_temperature = round_to(air_temperature + 10.0 + rng.gen_range(-1.0..1.0), 1);

    FeatureRecord {
        machine_type,
        air_temperature,
        process_temperature,
        rotational_speed: rng.gen_range(1168.0_f64..2886.0).round(),
        torque: round_to(rng.gen_range(3.8..76.6), 1),
        tool_wear: rng.gen_range(0.0_f64..253.0).round(),
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Records as a table with the layout headers
pub fn records_table(records: &[FeatureRecord]) -> Table {
    let headers = FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect();
    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.machine_type.token().to_string(),
                r.air_temperature.to_string(),
                r.process_temperature.to_string(),
                r.rotational_speed.to_string(),
                r.torque.to_string(),
                r.tool_wear.to_string(),
            ]
        })
        .collect();
    Table::new(headers, rows)
}
