use rule_dict::data::column_discovery::{discover_columns, LEADING_COLUMN};
use rule_dict::data::section_flattener::{flatten, Section};
use rule_dict::data::unique_values::unique_values;
use rule_dict::data::visibility::visible_columns;
use rule_dict::{Dataset, FilterEngine, FilterMap};
use serde_json::json;

/// A handful of shapes the loader has to cope with
fn sample_datasets() -> Vec<Dataset> {
    vec![
        Dataset::new(),
        Dataset::from_json(json!([
            {"businessRuleId": "R1", "given": {"g1": {"action": "click"}}},
            {"businessRuleId": "R2", "given": {"g1": {"action": ""}}}
        ]))
        .unwrap(),
        Dataset::from_json(json!([
            {"businessRuleId": "R1", "when": [{"action": "type", "value": "bob"}, {"action": "click"}]},
            {"businessRuleId": "R2", "when": [{"action": "type", "value": null}]},
            {"businessRuleId": "R3"}
        ]))
        .unwrap(),
        Dataset::from_json(json!([
            {"businessRuleId": "R1", "given": {"givenId": "G1", "location": "home"}, "then": null},
            {"businessRuleId": 7, "given": {"givenId": "G2", "location": ""}}
        ]))
        .unwrap(),
    ]
}

fn sample_filters() -> Vec<FilterMap> {
    let pairs: Vec<Vec<(&str, &str)>> = vec![
        vec![],
        vec![("businessRuleId", "R")],
        vec![("businessRuleId", "r2")],
        vec![("given.g1.action", "click")],
        vec![("when.0.action", "type"), ("businessRuleId", "1")],
        vec![("given.location", "home")],
        vec![("then.t1.value", "")],
    ];
    pairs
        .into_iter()
        .map(|p| {
            p.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .collect()
}

#[test]
fn test_columns_empty_iff_dataset_empty() {
    for dataset in sample_datasets() {
        let columns = discover_columns(&dataset);
        assert_eq!(columns.is_empty(), dataset.is_empty());
        if !dataset.is_empty() {
            assert_eq!(columns[0], LEADING_COLUMN);
        }
    }
}

#[test]
fn test_empty_filter_map_is_identity() {
    let engine = FilterEngine::default();
    for dataset in sample_datasets() {
        assert_eq!(engine.apply(&dataset, &FilterMap::new()), dataset);
    }
}

#[test]
fn test_filtering_is_idempotent() {
    let engine = FilterEngine::default();
    for dataset in sample_datasets() {
        for filters in sample_filters() {
            let once = engine.apply(&dataset, &filters);
            assert_eq!(engine.apply(&once, &filters), once, "filters {:?}", filters);
        }
    }
}

#[test]
fn test_filtering_keeps_relative_order() {
    let engine = FilterEngine::default();
    for dataset in sample_datasets() {
        for filters in sample_filters() {
            let filtered = engine.apply(&dataset, &filters);
            let mut source = dataset.iter();
            for kept in filtered.iter() {
                assert!(source.any(|record| record == kept));
            }
        }
    }
}

#[test]
fn test_visible_columns_are_the_non_blank_subset() {
    let engine = FilterEngine::default();
    for dataset in sample_datasets() {
        let all = discover_columns(&dataset);
        for filters in sample_filters() {
            let filtered = engine.apply(&dataset, &filters);
            let visible = visible_columns(&filtered, &all);

            assert!(visible.iter().all(|c| all.contains(c)));
            for column in &all {
                assert_eq!(
                    visible.contains(column),
                    !unique_values(&filtered, column).is_empty()
                );
            }
        }
    }
}

#[test]
fn test_unique_values_never_contain_blank() {
    for dataset in sample_datasets() {
        for column in discover_columns(&dataset) {
            assert!(!unique_values(&dataset, &column).contains(""));
        }
    }
}

#[test]
fn test_missing_section_flattens_to_nothing() {
    for dataset in sample_datasets() {
        for record in dataset.iter() {
            for section in Section::ALL {
                if record.get(section.as_str()).is_none() {
                    assert!(flatten(record, section).is_empty());
                }
            }
        }
    }
}

#[test]
fn test_rule_id_scenario_with_exact_matching() {
    let dataset = Dataset::from_json_str(
        r#"[{"businessRuleId":"R1","given":{"g1":{"action":"click"}}},{"businessRuleId":"R2","given":{"g1":{"action":""}}}]"#,
    )
    .unwrap();
    let all = discover_columns(&dataset);
    assert!(all.contains(&"businessRuleId".to_string()));
    assert!(all.contains(&"given.g1.action".to_string()));

    // No free-text columns: every column matches exactly
    let engine = FilterEngine::new(Vec::<String>::new());
    let mut filters = FilterMap::new();
    filters.insert("businessRuleId".to_string(), "R2".to_string());

    let filtered = engine.apply(&dataset, &filters);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered.first().unwrap()["businessRuleId"], json!("R2"));
    assert_eq!(visible_columns(&filtered, &all), vec!["businessRuleId"]);

    // Exact matching does not accept a prefix
    filters.insert("businessRuleId".to_string(), "R".to_string());
    assert!(engine.apply(&dataset, &filters).is_empty());
}

#[test]
fn test_numeric_ids_are_stringified_before_matching() {
    let dataset = sample_datasets().remove(3);
    let engine = FilterEngine::new(Vec::<String>::new());
    let mut filters = FilterMap::new();
    filters.insert("businessRuleId".to_string(), "7".to_string());

    let filtered = engine.apply(&dataset, &filters);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered.first().unwrap()["given"]["givenId"], json!("G2"));
}
