//! Built-in samples, used when a dataset cannot be loaded so the dashboard stays usable.

use serde_json::{json, Value};

use crate::normalize::RawRecordSet;

pub fn states() -> RawRecordSet {
    RawRecordSet::Records(vec![
        json!({
            "state_code": "CA", "state": "California", "usage_index": 1, "total_observations": 1000,
            "most_frequent_topics": [
                { "text": "Provide educational tutoring and academic assistance across multiple subjects and disciplines", "share": 12.7 },
                { "text": "Provide comprehensive software development assistance across multiple programming domains and technologies", "share": 14.0 }
            ],
            "job_groups": [
                { "name": "Computer and Mathematical", "value": 33.3 },
                { "name": "Arts, Design, Entertainment, Sports, and Media", "value": 12.6 },
                { "name": "Office and Administrative Support", "value": 9.9 },
                { "name": "Educational Instruction and Library", "value": 12.7 },
                { "name": "Life, Physical, and Social", "value": 9.3 }
            ]
        }),
        json!({
            "state_code": "NY", "state": "New York", "usage_index": 0.82, "total_observations": 800,
            "most_frequent_topics": [
                { "text": "Provide educational tutoring and academic assistance across multiple subjects and disciplines", "share": 10.4 },
                { "text": "Help edit, improve, and create professional written documents and communications", "share": 8.2 }
            ],
            "job_groups": [
                { "name": "Computer and Mathematical", "value": 28.0 },
                { "name": "Business and Financial Operations", "value": 8.0 },
                { "name": "Arts, Design, Entertainment, Sports, and Media", "value": 10.0 },
                { "name": "Management", "value": 6.0 },
                { "name": "Office and Administrative Support", "value": 7.5 }
            ]
        }),
    ])
}

pub fn countries() -> RawRecordSet {
    RawRecordSet::Records(vec![
        json!({
            "country_code": "USA", "country": "United States", "usage_index": 1.0, "total_observations": 10000,
            "most_frequent_topics": [
                { "text": "Provide comprehensive software development assistance across multiple programming domains and technologies", "share": 15.0 },
                { "text": "Provide educational tutoring and academic assistance across multiple subjects and disciplines", "share": 13.0 }
            ],
            "job_groups": [
                { "name": "Computer and Mathematical", "value": 32.0 },
                { "name": "Educational Instruction and Library", "value": 12.0 },
                { "name": "Arts, Design, Entertainment, Sports, and Media", "value": 12.0 },
                { "name": "Office and Administrative Support", "value": 10.0 }
            ]
        }),
        json!({
            "country_code": "IND", "country": "India", "usage_index": 0.9, "total_observations": 9000,
            "most_frequent_topics": [
                { "text": "Provide comprehensive software development assistance across multiple programming domains and technologies", "share": 18.0 },
                { "text": "Provide technical IT support and troubleshooting assistance", "share": 9.0 }
            ],
            "job_groups": [
                { "name": "Computer and Mathematical", "value": 36.0 },
                { "name": "Business and Financial Operations", "value": 6.0 },
                { "name": "Management", "value": 5.0 },
                { "name": "Office and Administrative Support", "value": 7.0 }
            ]
        }),
    ])
}

/// Flat-row sample for two small countries.
pub fn rows() -> RawRecordSet {
    let mut rows = Vec::new();
    let mut push = |geo: &str, facet: &str, variable: &str, cluster: Option<&str>, value: f64| {
        rows.push(row(geo, facet, variable, cluster, value));
    };

    push("AE", "country", "usage_count", None, 3011.0);
    push("AE", "country", "usage_pct", None, 0.312_184_420_017_128_15);
    for (name, count) in [
        ("directive", 1200.0),
        ("task iteration", 755.0),
        ("learning", 504.0),
        ("feedback loop", 349.0),
        ("validation", 128.0),
    ] {
        push("AE", "collaboration", "collaboration_count", Some(name), count);
    }
    for (name, count, pct) in [
        ("Analyze user needs and software requirements...", 26.0, 0.009),
        ("Assist students who need extra help...", 24.0, 0.008),
        ("Conduct searches to find needed information", 18.0, 0.006),
    ] {
        push("AE", "onet_task", "onet_task_count", Some(name), count);
        push("AE", "onet_task", "onet_task_pct", Some(name), pct);
    }

    push("AD", "country", "usage_count", None, 40.0);
    push("AD", "country", "usage_pct", None, 0.004_147_252_341_642_353);
    push("AD", "collaboration", "collaboration_count", Some("task iteration"), 15.0);
    push("AD", "collaboration", "collaboration_count", Some("none"), 10.0);
    push(
        "AD",
        "onet_task",
        "onet_task_count",
        Some("Conduct searches to find needed information"),
        18.0,
    );
    push("AD", "onet_task", "onet_task_pct", Some("Not classified"), 0.625);
    push("AD", "onet_task", "onet_task_pct", Some("Task iteration"), 0.375);

    RawRecordSet::Rows(rows)
}

fn row(geo: &str, facet: &str, variable: &str, cluster: Option<&str>, value: f64) -> Value {
    json!({
        "geo_id": geo,
        "facet": facet,
        "variable": variable,
        "cluster_name": cluster,
        "value": value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize_set, EntityKind, Facet};

    #[test]
    fn samples_normalize_without_skips() {
        let states = normalize_set(&states(), EntityKind::State, 10);
        let countries = normalize_set(&countries(), EntityKind::Country, 10);
        let rows = normalize_set(&rows(), EntityKind::Country, 10);

        assert_eq!(states.entities.len(), 2);
        assert_eq!(countries.entities.len(), 2);
        assert_eq!(rows.entities.len(), 2);
        assert!(states.skipped.is_empty() && countries.skipped.is_empty() && rows.skipped.is_empty());
    }

    #[test]
    fn andorra_task_facet_falls_back_to_collaboration() {
        let rows = normalize_set(&rows(), EntityKind::Country, 10);
        let ad = rows.entities.iter().find(|e| e.code == "AD").unwrap();
        assert_eq!(ad.title, "Andorra");
        assert_eq!(ad.tree_for(Facet::OnetTask).len(), 2);
        assert_eq!(ad.topics[0].pct, "62.5%");
    }
}
