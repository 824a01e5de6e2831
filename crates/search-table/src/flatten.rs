use serde_json::{Map, Value as JsonValue};

use crate::aggregation::collect_aggregations;
use crate::error::{interpret_error, unrecognized_shape_message, SearchError, SearchResult};
use crate::options::FlattenOptions;
use crate::table::{ResultFields, Row, Table, TableBuilder};

/// Converts a search response into a table with the default options.
pub fn flatten_response(
    response: &JsonValue,
    result_fields: Option<&ResultFields>,
) -> SearchResult<Table> {
    flatten_response_with_options(response, result_fields, &FlattenOptions::default())
}

/// Converts a search response into a table.
///
/// Shape is decided in this order: an `error` key wins over everything, then an
/// `aggregations` tree, then a `hits.hits` list. Anything else is reported with a
/// truncated copy of the payload.
pub fn flatten_response_with_options(
    response: &JsonValue,
    result_fields: Option<&ResultFields>,
    options: &FlattenOptions,
) -> SearchResult<Table> {
    if let Some(error) = response.get("error") {
        let message = interpret_error(error, options);
        log::warn!("search engine reported an error: {message}");
        return Err(SearchError::EngineReported(message));
    }

    let mut builder = TableBuilder::new(result_fields);
    if let Some(aggregations) = response.get("aggregations") {
        log::debug!("flattening aggregation response");
        let aggregations = aggregations
            .as_object()
            .ok_or_else(|| SearchError::malformed("aggregations", "expected an object"))?;
        collect_aggregations(&mut builder, aggregations, options)?;
    } else if let Some(hits) = response
        .get("hits")
        .and_then(|hits| hits.get("hits"))
        .and_then(JsonValue::as_array)
    {
        log::debug!("flattening {} hits", hits.len());
        collect_hits(&mut builder, hits, options)?;
    } else {
        log::warn!("unrecognized search response shape");
        return Err(SearchError::UnrecognizedShape(unrecognized_shape_message(
            response, options,
        )));
    }

    let table = builder.finish();
    log::debug!(
        "flattened response into {} columns and {} rows",
        table.columns.len(),
        table.rows.len()
    );
    Ok(table)
}

fn collect_hits(
    builder: &mut TableBuilder<'_>,
    hits: &[JsonValue],
    options: &FlattenOptions,
) -> SearchResult<()> {
    for (position, hit) in hits.iter().enumerate() {
        let hit = hit
            .as_object()
            .ok_or_else(|| SearchError::malformed(format!("hits[{position}]"), "expected an object"))?;
        let payload = hit.get("_source").or_else(|| hit.get("fields"));

        let mut row = Row::new();
        if let Some(JsonValue::Object(document)) = payload {
            let mut flat = Vec::new();
            flatten_object(None, document, options, &mut flat);
            for (path, value) in flat {
                builder.record(&mut row, path, value);
            }
        }
        builder.push_row(row);
    }
    Ok(())
}

/// Flattens nested objects into `(dotted path, leaf)` pairs, in document order.
///
/// Single-element arrays collapse to their element; every other non-object value is a leaf.
fn flatten_object(
    prefix: Option<&str>,
    object: &Map<String, JsonValue>,
    options: &FlattenOptions,
    out: &mut Vec<(String, JsonValue)>,
) {
    for (key, value) in object {
        let path = match prefix {
            Some(prefix) => options.join(prefix, key),
            None => key.clone(),
        };
        match value {
            JsonValue::Object(child) => flatten_object(Some(&path), child, options, out),
            JsonValue::Array(items) if items.len() == 1 => out.push((path, items[0].clone())),
            leaf => out.push((path, leaf.clone())),
        }
    }
}
