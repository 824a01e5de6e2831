//! Aggregation tree flattening.
//!
//! Every top-level aggregation name becomes a grouping column. Each nested `buckets`
//! level adds one more grouping column plus the metrics found next to it, and every
//! leaf bucket path yields exactly one row carrying all of its ancestors' values.
//!
//! Rows are built by copying a baseline row before each bucket is merged, so sibling
//! buckets never observe each other's fields.

use serde_json::{Map, Value as JsonValue};

use crate::error::{SearchError, SearchResult};
use crate::options::FlattenOptions;
use crate::table::{Row, TableBuilder};

pub(crate) fn collect_aggregations(
    builder: &mut TableBuilder<'_>,
    aggregations: &Map<String, JsonValue>,
    options: &FlattenOptions,
) -> SearchResult<()> {
    let mut walker = AggregationWalker {
        builder,
        options,
        pending_metrics: false,
    };
    for (name, node) in aggregations {
        walker.walk_node(name, node)?;
    }
    Ok(())
}

struct AggregationWalker<'b, 'a> {
    builder: &'b mut TableBuilder<'a>,
    options: &'b FlattenOptions,
    /// The last output row holds top-level metrics that later aggregations build on.
    pending_metrics: bool,
}

impl AggregationWalker<'_, '_> {
    fn walk_node(&mut self, agg_key: &str, node: &JsonValue) -> SearchResult<()> {
        let path = format!("aggregations.{agg_key}");
        let node = node
            .as_object()
            .ok_or_else(|| SearchError::malformed(&path, "expected an object"))?;

        let carried = std::mem::take(&mut self.pending_metrics);
        let mut row = if carried {
            self.builder.rows_mut().pop().unwrap_or_default()
        } else {
            Row::new()
        };
        self.merge_node_into_row(node, &mut row, agg_key);

        match node.get("buckets") {
            Some(buckets) => {
                let produced = self.walk_buckets(agg_key, buckets, &row, &path)?;
                if produced == 0 && carried {
                    // Nothing to fan out over; keep the earlier metrics visible.
                    self.builder.push_row(row);
                    self.pending_metrics = true;
                }
            }
            None => {
                self.builder.push_row(row);
                self.pending_metrics = true;
            }
        }
        Ok(())
    }

    /// Expands one bucket list under `baseline`, returning how many leaf rows it produced.
    fn walk_buckets(
        &mut self,
        parent_key: &str,
        buckets: &JsonValue,
        baseline: &Row,
        path: &str,
    ) -> SearchResult<usize> {
        let entries: Vec<(Option<&String>, &JsonValue)> = match buckets {
            JsonValue::Array(items) => items.iter().map(|item| (None, item)).collect(),
            JsonValue::Object(keyed) => keyed
                .iter()
                .map(|(name, item)| (Some(name), item))
                .collect(),
            _ => {
                return Err(SearchError::malformed(
                    format!("{path}.buckets"),
                    "expected an array or object of buckets",
                ))
            }
        };

        let mut produced = 0;
        for (position, (keyed_name, bucket)) in entries.into_iter().enumerate() {
            let bucket_path = match keyed_name {
                Some(name) => format!("{path}.buckets.{name}"),
                None => format!("{path}.buckets[{position}]"),
            };
            let bucket = bucket
                .as_object()
                .ok_or_else(|| SearchError::malformed(&bucket_path, "expected an object"))?;

            let mut row = baseline.clone();
            if let Some(name) = keyed_name {
                if !bucket.contains_key("key") {
                    self.record(&mut row, parent_key.to_string(), JsonValue::String(name.clone()));
                }
            }

            match self.merge_node_into_row(bucket, &mut row, parent_key) {
                None => {
                    self.builder.push_row(row);
                    produced += 1;
                }
                Some(sub_key) => {
                    let nested = &bucket[sub_key.as_str()]["buckets"];
                    let nested_path = format!("{bucket_path}.{sub_key}");
                    produced += self.walk_buckets(&sub_key, nested, &row, &nested_path)?;
                }
            }
        }
        Ok(produced)
    }

    /// Merges one node's own fields into `row` and returns the name of the nested
    /// grouping it introduces, if any.
    ///
    /// When several fields carry `buckets`, the last one wins.
    fn merge_node_into_row(
        &mut self,
        node: &Map<String, JsonValue>,
        row: &mut Row,
        agg_key: &str,
    ) -> Option<String> {
        let mut sub_agg_key = None;
        for (field, value) in node {
            match field.as_str() {
                "key_as_string" | "buckets" => continue,
                "key" => {
                    let key = node.get("key_as_string").unwrap_or(value);
                    self.record(row, agg_key.to_string(), key.clone());
                    continue;
                }
                _ => {}
            }

            match value {
                JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_) => {
                    let name = self.options.join(agg_key, field);
                    self.record(row, name, value.clone());
                }
                JsonValue::Object(inner) if inner.contains_key("buckets") => {
                    sub_agg_key = Some(field.clone());
                }
                JsonValue::Object(metric) => {
                    let metric_key = self.options.join(agg_key, field);
                    for (sub_field, sub_value) in metric {
                        let name = self.options.join(&metric_key, sub_field);
                        self.record(row, name, sub_value.clone());
                    }
                }
                JsonValue::Null | JsonValue::Array(_) => {}
            }
        }
        sub_agg_key
    }

    fn record(&mut self, row: &mut Row, name: String, value: JsonValue) {
        self.builder.record(row, name, value);
    }
}
