mod common;

use common::{column, column_names, row};
use pretty_assertions::assert_eq;
use search_table::{flatten_response, PortableType, ResultFields, SearchError};
use serde_json::json;

fn state_response() -> serde_json::Value {
    json!({
        "took": 3,
        "timed_out": false,
        "_shards": { "total": 1, "successful": 1, "skipped": 0, "failed": 0 },
        "hits": { "total": { "value": 1001, "relation": "eq" }, "max_score": null, "hits": [] },
        "aggregations": {
            "group_by_state": {
                "doc_count_error_upper_bound": 0,
                "sum_other_doc_count": 743,
                "buckets": [
                    { "key": "TX", "doc_count": 30 },
                    { "key": "MD", "doc_count": 28 },
                    { "key": "ID", "doc_count": 27 }
                ]
            }
        }
    })
}

#[test]
fn single_level_buckets_become_rows() {
    let response = json!({
        "aggregations": {
            "group_by_state": {
                "buckets": [
                    { "key": "TX", "doc_count": 30 },
                    { "key": "MD", "doc_count": 28 }
                ]
            }
        }
    });

    let table = flatten_response(&response, None).unwrap();
    assert_eq!(
        table.columns,
        vec![
            column("group_by_state", PortableType::String),
            column("group_by_state.doc_count", PortableType::Integer),
        ]
    );
    assert_eq!(
        table.rows,
        vec![
            row(json!({ "group_by_state": "TX", "group_by_state.doc_count": 30 })),
            row(json!({ "group_by_state": "MD", "group_by_state.doc_count": 28 })),
        ]
    );
}

#[test]
fn allow_list_selects_grouping_columns() {
    let fields = ResultFields::new(["group_by_state", "group_by_state.doc_count"]);

    let table = flatten_response(&state_response(), Some(&fields)).unwrap();
    assert_eq!(
        table.columns,
        vec![
            column("group_by_state", PortableType::String),
            column("group_by_state.doc_count", PortableType::Integer),
        ]
    );
    assert_eq!(
        table.rows,
        vec![
            row(json!({ "group_by_state": "TX", "group_by_state.doc_count": 30 })),
            row(json!({ "group_by_state": "MD", "group_by_state.doc_count": 28 })),
            row(json!({ "group_by_state": "ID", "group_by_state.doc_count": 27 })),
        ]
    );
}

#[test]
fn top_level_fields_are_carried_into_every_bucket_row() {
    let table = flatten_response(&state_response(), None).unwrap();

    assert_eq!(
        column_names(&table),
        vec![
            "group_by_state.doc_count_error_upper_bound",
            "group_by_state.sum_other_doc_count",
            "group_by_state",
            "group_by_state.doc_count",
        ]
    );
    assert_eq!(table.rows.len(), 3);
    assert_eq!(
        table.rows[1],
        row(json!({
            "group_by_state.doc_count_error_upper_bound": 0,
            "group_by_state.sum_other_doc_count": 743,
            "group_by_state": "MD",
            "group_by_state.doc_count": 28
        }))
    );
}

#[test]
fn metric_under_bucket_keeps_value_suffix() {
    let response = json!({
        "aggregations": {
            "group_by_state": {
                "doc_count_error_upper_bound": -1,
                "sum_other_doc_count": 828,
                "buckets": [
                    { "key": "CO", "doc_count": 14, "average_balance": { "value": 32460.35714285714 } },
                    { "key": "AZ", "doc_count": 14, "average_balance": { "value": 31634.785714285714 } }
                ]
            }
        }
    });
    let fields = ResultFields::new(["group_by_state", "group_by_state.average_balance.value"]);

    let table = flatten_response(&response, Some(&fields)).unwrap();
    assert_eq!(
        table.columns,
        vec![
            column("group_by_state", PortableType::String),
            column("group_by_state.average_balance.value", PortableType::Float),
        ]
    );
    assert_eq!(
        table.rows,
        vec![
            row(json!({ "group_by_state": "CO", "group_by_state.average_balance.value": 32460.35714285714 })),
            row(json!({ "group_by_state": "AZ", "group_by_state.average_balance.value": 31634.785714285714 })),
        ]
    );
}

#[test]
fn multi_value_metrics_keep_each_sub_field() {
    let response = json!({
        "aggregations": {
            "by_state": {
                "buckets": [
                    { "key": "TX", "doc_count": 2, "balance_stats": { "count": 2, "min": 1.0, "max": 3.0 } }
                ]
            }
        }
    });

    let table = flatten_response(&response, None).unwrap();
    assert_eq!(
        column_names(&table),
        vec![
            "by_state",
            "by_state.doc_count",
            "by_state.balance_stats.count",
            "by_state.balance_stats.min",
            "by_state.balance_stats.max",
        ]
    );
}

#[test]
fn nested_buckets_produce_one_row_per_leaf_path() {
    let response = json!({
        "aggregations": {
            "by_state": {
                "buckets": [
                    {
                        "key": "TX",
                        "doc_count": 5,
                        "by_city": {
                            "buckets": [
                                { "key": "Austin", "doc_count": 3, "avg": { "value": 1.5 } },
                                { "key": "Dallas", "doc_count": 2, "avg": { "value": 2.5 } }
                            ]
                        }
                    },
                    {
                        "key": "CO",
                        "doc_count": 1,
                        "by_city": {
                            "buckets": [
                                { "key": "Denver", "doc_count": 1, "avg": { "value": 4.0 } }
                            ]
                        }
                    }
                ]
            }
        }
    });

    let table = flatten_response(&response, None).unwrap();
    assert_eq!(
        table.columns,
        vec![
            column("by_state", PortableType::String),
            column("by_state.doc_count", PortableType::Integer),
            column("by_city", PortableType::String),
            column("by_city.doc_count", PortableType::Integer),
            column("by_city.avg.value", PortableType::Float),
        ]
    );
    assert_eq!(
        table.rows,
        vec![
            row(json!({ "by_state": "TX", "by_state.doc_count": 5, "by_city": "Austin", "by_city.doc_count": 3, "by_city.avg.value": 1.5 })),
            row(json!({ "by_state": "TX", "by_state.doc_count": 5, "by_city": "Dallas", "by_city.doc_count": 2, "by_city.avg.value": 2.5 })),
            row(json!({ "by_state": "CO", "by_state.doc_count": 1, "by_city": "Denver", "by_city.doc_count": 1, "by_city.avg.value": 4.0 })),
        ]
    );
}

#[test]
fn sibling_buckets_do_not_share_fields() {
    let response = json!({
        "aggregations": {
            "by_state": {
                "buckets": [
                    { "key": "TX", "doc_count": 1, "extra": { "value": 9 } },
                    { "key": "CO", "doc_count": 2 }
                ]
            }
        }
    });

    let table = flatten_response(&response, None).unwrap();
    assert_eq!(
        table.rows,
        vec![
            row(json!({ "by_state": "TX", "by_state.doc_count": 1, "by_state.extra.value": 9 })),
            row(json!({ "by_state": "CO", "by_state.doc_count": 2 })),
        ]
    );
}

#[test]
fn key_as_string_wins_over_raw_key() {
    let response = json!({
        "aggregations": {
            "per_day": {
                "buckets": [
                    { "key_as_string": "2024-01-01", "key": 1704067200000_i64, "doc_count": 3 },
                    { "key": 1704153600000_i64, "key_as_string": "2024-01-02", "doc_count": 4 }
                ]
            }
        }
    });

    let table = flatten_response(&response, None).unwrap();
    assert_eq!(table.column("per_day").unwrap().column_type, PortableType::String);
    assert_eq!(
        table.rows,
        vec![
            row(json!({ "per_day": "2024-01-01", "per_day.doc_count": 3 })),
            row(json!({ "per_day": "2024-01-02", "per_day.doc_count": 4 })),
        ]
    );
}

#[test]
fn top_level_metrics_share_one_row() {
    let response = json!({
        "aggregations": {
            "avg_balance": { "value": 10.5 },
            "max_balance": { "value": 20 }
        }
    });

    let table = flatten_response(&response, None).unwrap();
    assert_eq!(
        table.columns,
        vec![
            column("avg_balance.value", PortableType::Float),
            column("max_balance.value", PortableType::Integer),
        ]
    );
    assert_eq!(
        table.rows,
        vec![row(json!({ "avg_balance.value": 10.5, "max_balance.value": 20 }))]
    );
}

#[test]
fn top_level_metrics_are_visible_to_later_bucket_aggregations() {
    let response = json!({
        "aggregations": {
            "total": { "value": 100 },
            "by_state": {
                "buckets": [
                    { "key": "TX", "doc_count": 1 },
                    { "key": "CO", "doc_count": 2 }
                ]
            }
        }
    });

    let table = flatten_response(&response, None).unwrap();
    assert_eq!(
        table.rows,
        vec![
            row(json!({ "total.value": 100, "by_state": "TX", "by_state.doc_count": 1 })),
            row(json!({ "total.value": 100, "by_state": "CO", "by_state.doc_count": 2 })),
        ]
    );
}

#[test]
fn metrics_after_bucket_aggregation_get_their_own_row() {
    let response = json!({
        "aggregations": {
            "by_state": { "buckets": [{ "key": "TX", "doc_count": 1 }] },
            "total": { "value": 100 }
        }
    });

    let table = flatten_response(&response, None).unwrap();
    assert_eq!(
        table.rows,
        vec![
            row(json!({ "by_state": "TX", "by_state.doc_count": 1 })),
            row(json!({ "total.value": 100 })),
        ]
    );
}

#[test]
fn top_level_node_without_buckets_does_not_descend() {
    let response = json!({
        "aggregations": {
            "errors": {
                "doc_count": 7,
                "by_host": {
                    "buckets": [
                        { "key": "a", "doc_count": 4 },
                        { "key": "b", "doc_count": 3 }
                    ]
                }
            }
        }
    });

    let table = flatten_response(&response, None).unwrap();
    assert_eq!(column_names(&table), vec!["errors.doc_count"]);
    assert_eq!(table.rows, vec![row(json!({ "errors.doc_count": 7 }))]);
}

#[test]
fn last_nested_grouping_in_a_bucket_wins() {
    let response = json!({
        "aggregations": {
            "by_state": {
                "buckets": [
                    {
                        "key": "TX",
                        "doc_count": 3,
                        "by_city": { "buckets": [{ "key": "Austin", "doc_count": 3 }] },
                        "by_gender": {
                            "buckets": [
                                { "key": "F", "doc_count": 2 },
                                { "key": "M", "doc_count": 1 }
                            ]
                        }
                    }
                ]
            }
        }
    });

    let table = flatten_response(&response, None).unwrap();
    assert_eq!(
        column_names(&table),
        vec!["by_state", "by_state.doc_count", "by_gender", "by_gender.doc_count"]
    );
    assert_eq!(
        table.rows,
        vec![
            row(json!({
                "by_state": "TX", "by_state.doc_count": 3,
                "by_gender": "F", "by_gender.doc_count": 2
            })),
            row(json!({
                "by_state": "TX", "by_state.doc_count": 3,
                "by_gender": "M", "by_gender.doc_count": 1
            })),
        ]
    );
}

#[test]
fn keyed_buckets_use_their_names_as_keys() {
    let response = json!({
        "aggregations": {
            "levels": {
                "buckets": {
                    "errors": { "doc_count": 2 },
                    "warnings": { "doc_count": 5 }
                }
            }
        }
    });

    let table = flatten_response(&response, None).unwrap();
    assert_eq!(
        table.rows,
        vec![
            row(json!({ "levels": "errors", "levels.doc_count": 2 })),
            row(json!({ "levels": "warnings", "levels.doc_count": 5 })),
        ]
    );
}

#[test]
fn empty_bucket_list_yields_no_rows() {
    let response = json!({ "aggregations": { "by_state": { "buckets": [] } } });

    let table = flatten_response(&response, None).unwrap();
    assert!(table.columns.is_empty());
    assert!(table.rows.is_empty());
}

#[test]
fn null_metric_values_are_recorded() {
    let response = json!({
        "aggregations": {
            "by_state": { "buckets": [{ "key": "TX", "doc_count": 0, "avg": { "value": null } }] }
        }
    });

    let table = flatten_response(&response, None).unwrap();
    assert_eq!(
        table.column("by_state.avg.value"),
        Some(&column("by_state.avg.value", PortableType::String))
    );
    assert_eq!(table.rows[0].get("by_state.avg.value"), Some(&json!(null)));
}

#[test]
fn malformed_bucket_list_is_reported_with_its_path() {
    let response = json!({ "aggregations": { "levels": { "buckets": 5 } } });

    let err = flatten_response(&response, None).unwrap_err();
    match err {
        SearchError::MalformedResponse { path, .. } => {
            assert_eq!(path, "aggregations.levels.buckets");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn non_object_bucket_is_reported() {
    let response = json!({
        "aggregations": {
            "by_state": {
                "buckets": [{ "key": "TX", "doc_count": 1, "by_city": { "buckets": [1] } }]
            }
        }
    });

    let err = flatten_response(&response, None).unwrap_err();
    match err {
        SearchError::MalformedResponse { path, .. } => {
            assert_eq!(path, "aggregations.by_state.buckets[0].by_city.buckets[0]");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn column_order_is_stable_across_runs() {
    let response = state_response();

    let first = flatten_response(&response, None).unwrap();
    let second = flatten_response(&response, None).unwrap();
    assert_eq!(column_names(&first), column_names(&second));
    assert_eq!(first, second);
}
