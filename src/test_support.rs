use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use unimerge::{FieldSpec, SourceCollection, SourceRecord, Value};

const FIRST_NAMES: [&str; 6] = ["John", "Ada", "Chidi", "Ngozi", "Emeka", "Amara"];
const LAST_NAMES: [&str; 4] = ["Uzendu", "Okafor", "Eze", "Nwosu"];
const SCHOOLS: [&str; 3] = ["ESUST", "UNN", "UNILAG"];
const STATUSES: [&str; 3] = ["Healthy", "Under Treatment", "Recovered"];

/// The health record from the reference citizen scenario
#[allow(dead_code)]
pub fn john_health() -> SourceRecord {
    SourceRecord::from_pairs(
        "health",
        [
            ("citizen_id", "A1234"),
            ("name", "John Uzendu"),
            ("dob", "1990-05-15"),
            ("gender", "M"),
            ("health_status", "Healthy"),
        ],
    )
}

/// The education record from the reference citizen scenario
#[allow(dead_code)]
pub fn john_education() -> SourceRecord {
    SourceRecord::from_pairs(
        "education",
        [
            ("citizen_id", "A1234"),
            ("name", "Johnmicheal Uzendu"),
            ("dob", "1990-05-15"),
            ("gender", "M"),
            ("school_name", "ESUST"),
        ],
    )
}

#[allow(dead_code)]
pub fn citizen_sources(
    health: Vec<SourceRecord>,
    education: Vec<SourceRecord>,
) -> Vec<SourceCollection> {
    vec![
        SourceCollection::new("health", health),
        SourceCollection::new("education", education),
    ]
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct GeneratedDataset {
    pub sources: Vec<SourceCollection>,
    pub spec: FieldSpec,
    /// Number of distinct identifiers across all sources
    pub identifiers: usize,
}

/// Generate a health/education dataset.
///
/// Each identifier lands in health, education or both; `disagreement` is the
/// probability that a shared identifier gets a different name in education.
#[allow(dead_code)]
pub fn generate_dataset(count: u32, disagreement: f64, seed: u64) -> GeneratedDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut health = Vec::new();
    let mut education = Vec::new();

    for i in 0..count {
        let id = format!("C{:06}", i);
        let name = format!(
            "{} {}",
            FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())],
            LAST_NAMES[rng.random_range(0..LAST_NAMES.len())]
        );
        let dob = format!(
            "19{:02}-{:02}-{:02}",
            rng.random_range(50..99),
            rng.random_range(1..13),
            rng.random_range(1..29)
        );
        let gender = if rng.random_bool(0.5) { "M" } else { "F" };

        let placement = rng.random_range(0..3);
        if placement != 1 {
            health.push(SourceRecord::from_pairs(
                "health",
                [
                    ("citizen_id", id.clone()),
                    ("name", name.clone()),
                    ("dob", dob.clone()),
                    ("gender", gender.to_string()),
                    (
                        "health_status",
                        STATUSES[rng.random_range(0..STATUSES.len())].to_string(),
                    ),
                ],
            ));
        }
        if placement != 0 {
            let name = if placement == 2 && rng.random_bool(disagreement) {
                format!("{name} Jr")
            } else {
                name
            };
            let mut record = SourceRecord::from_pairs(
                "education",
                [
                    ("citizen_id", id),
                    ("name", name),
                    ("dob", dob),
                    ("gender", gender.to_string()),
                    (
                        "school_name",
                        SCHOOLS[rng.random_range(0..SCHOOLS.len())].to_string(),
                    ),
                ],
            );
            if rng.random_bool(0.1) {
                record.fields.insert("gender".to_string(), None);
            }
            education.push(record);
        }
    }

    GeneratedDataset {
        sources: citizen_sources(health, education),
        spec: FieldSpec::citizen(),
        identifiers: count as usize,
    }
}

/// Shuffle the record order within every source
#[allow(dead_code)]
pub fn shuffled(sources: &[SourceCollection], seed: u64) -> Vec<SourceCollection> {
    let mut rng = StdRng::seed_from_u64(seed);
    sources
        .iter()
        .map(|collection| {
            let mut records = collection.records.clone();
            records.shuffle(&mut rng);
            SourceCollection::new(collection.source.clone(), records)
        })
        .collect()
}

#[allow(dead_code)]
pub fn text(value: &str) -> Value {
    Value::text(value)
}
