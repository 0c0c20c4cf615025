//! Cypher statements issued by the remote backend
//!
//! Labels, relationship types and property keys come from the ontology and are
//! always backtick-quoted. Values are always passed as parameters.

/// Quote a name as a Cypher identifier
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn node_pattern(var: &str, label: &str, pk_field: &str, param: &str) -> String {
    format!(
        "({}:{} {{{}: ${}}})",
        var,
        quote_identifier(label),
        quote_identifier(pk_field),
        param
    )
}

/// Create the node with `$props`, or merge `$props` into it.
/// Parameters: `pk_value`, `props`.
pub fn upsert_entity(label: &str, pk_field: &str) -> String {
    format!(
        "MERGE {} ON CREATE SET n = $props ON MATCH SET n += $props",
        node_pattern("n", label, pk_field, "pk_value")
    )
}

/// Count how many of the two endpoints exist.
/// Parameters: `from_value`, `to_value`. Returns one row `[from_count, to_count]`.
pub fn count_endpoints(from_label: &str, from_pk: &str, to_label: &str, to_pk: &str) -> String {
    format!(
        "OPTIONAL MATCH {} WITH count(a) AS from_count OPTIONAL MATCH {} RETURN from_count, count(b) AS to_count",
        node_pattern("a", from_label, from_pk, "from_value"),
        node_pattern("b", to_label, to_pk, "to_value")
    )
}

/// Create the edge `a -> b` (or `b -> a` when `reverse`) and merge `$props` into it.
/// Parameters: `from_value`, `to_value`, `props`.
pub fn merge_relationship(
    from_label: &str,
    from_pk: &str,
    to_label: &str,
    to_pk: &str,
    rel_type: &str,
    reverse: bool,
) -> String {
    let arrow = if reverse {
        format!("(b)-[r:{}]->(a)", quote_identifier(rel_type))
    } else {
        format!("(a)-[r:{}]->(b)", quote_identifier(rel_type))
    };
    format!(
        "MATCH {} MATCH {} MERGE {} SET r += $props RETURN count(r)",
        node_pattern("a", from_label, from_pk, "from_value"),
        node_pattern("b", to_label, to_pk, "to_value"),
        arrow
    )
}

/// Properties of every node with the label
pub fn all_by_label(label: &str) -> String {
    format!("MATCH (n:{}) RETURN properties(n)", quote_identifier(label))
}

/// Properties of one node. Parameters: `pk_value`.
pub fn entity_properties(label: &str, pk_field: &str) -> String {
    format!(
        "MATCH {} RETURN properties(n) LIMIT 1",
        node_pattern("n", label, pk_field, "pk_value")
    )
}

/// Properties of range nodes reachable over `rel_type`. Parameters: `from_value`.
pub fn related_entities(from_label: &str, from_pk: &str, rel_type: &str, range_label: &str) -> String {
    format!(
        "MATCH {}-[:{}]->(m:{}) RETURN properties(m)",
        node_pattern("a", from_label, from_pk, "from_value"),
        quote_identifier(rel_type),
        quote_identifier(range_label)
    )
}

/// Properties of one edge. Parameters: `from_value`, `to_value`.
pub fn relationship_properties(
    from_label: &str,
    from_pk: &str,
    rel_type: &str,
    to_label: &str,
    to_pk: &str,
) -> String {
    format!(
        "MATCH {}-[r:{}]->{} RETURN properties(r) LIMIT 1",
        node_pattern("a", from_label, from_pk, "from_value"),
        quote_identifier(rel_type),
        node_pattern("b", to_label, to_pk, "to_value")
    )
}

/// Nodes whose field contains `$term`, ignoring case. Parameters: `term`.
pub fn find_entities(label: &str, field: &str) -> String {
    format!(
        "MATCH (n:{}) WHERE toLower(toString(n.{})) CONTAINS toLower($term) RETURN properties(n)",
        quote_identifier(label),
        quote_identifier(field)
    )
}

pub const COUNT_NODES: &str = "MATCH (n) RETURN count(n)";
pub const COUNT_RELATIONSHIPS: &str = "MATCH ()-[r]->() RETURN count(r)";
pub const DELETE_ALL: &str = "MATCH (n) DETACH DELETE n";
pub const PING: &str = "RETURN 1";
