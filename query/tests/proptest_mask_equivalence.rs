//! Property tests: in-memory masks agree with compiled SQL run on DuckDB
//!
//! Clauses from every dialect are rewritten into DuckDB syntax and executed
//! against the same rows the mask sees.

use proptest::prelude::*;
use telemetry_query::codec::Value;
use telemetry_query::filters::{Filter, FilterCollection, FilterField, FilterMode, SetFilter};
use telemetry_query::memory::{Frame, MaskCompiler};
use telemetry_query::schema::ColumnType;
use telemetry_query::sql::{
    Backend, ClauseCompiler, ColumnBindings, ParamValue, ParameterizedClause,
};

type Row = (Option<String>, Option<i64>);

fn bindings() -> ColumnBindings {
    ColumnBindings::new()
        .bind(FilterField::Session, "session_id", ColumnType::Str)
        .bind(FilterField::EventCode, "event_code", ColumnType::Int)
}

fn to_duckdb(value: &Value) -> duckdb::types::Value {
    match value {
        Value::Null => duckdb::types::Value::Null,
        Value::Int(i) => duckdb::types::Value::BigInt(*i),
        Value::Text(s) => duckdb::types::Value::Text(s.clone()),
        other => duckdb::types::Value::Text(other.to_string()),
    }
}

/// Rewrite a compiled clause into DuckDB syntax with positional parameters.
///
/// MySQL `%s` markers become `?`. BigQuery array parameters are expanded into
/// an `IN (?, ...)` list, scalar `@name`s become `?`. Parameters appear in the
/// text in the order they are listed, so each name is replaced at its first
/// remaining occurrence.
fn to_duckdb_sql(
    backend: Backend,
    clause: &ParameterizedClause,
) -> (String, Vec<duckdb::types::Value>) {
    let mut text = clause.text.replace('`', "\"");
    let mut params = Vec::new();
    for param in &clause.parameters {
        match (backend, &param.value) {
            (Backend::Bigquery, ParamValue::Array(values)) => {
                let name = param.name.as_deref().unwrap();
                let list = vec!["?"; values.len()].join(", ");
                text = text.replacen(&format!("UNNEST(@{})", name), &format!("({})", list), 1);
            }
            (Backend::Bigquery, ParamValue::Scalar(_)) => {
                let name = param.name.as_deref().unwrap();
                text = text.replacen(&format!("@{}", name), "?", 1);
            }
            _ => {}
        }
        params.extend(param.values().into_iter().map(to_duckdb));
    }
    if backend == Backend::Mysql {
        text = text.replace("%s", "?");
    }
    (text, params)
}

/// Ids of the rows the clause keeps when executed by DuckDB
fn sql_ids(rows: &[Row], backend: Backend, clause: &ParameterizedClause) -> Vec<i64> {
    let conn = duckdb::Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE t (id BIGINT, session_id VARCHAR, event_code BIGINT)")
        .unwrap();
    for (id, (session, code)) in rows.iter().enumerate() {
        conn.execute(
            "INSERT INTO t VALUES (?, ?, ?)",
            duckdb::params![id as i64, session.clone(), *code],
        )
        .unwrap();
    }

    let (text, params) = to_duckdb_sql(backend, clause);
    let sql = format!("SELECT id FROM t {} ORDER BY id", text);
    let mut stmt = conn.prepare(&sql).unwrap();
    stmt.query_map(duckdb::params_from_iter(params), |row| row.get::<_, i64>(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

/// Ids of the rows the in-memory mask keeps
fn mask_ids(rows: &[Row], collection: &FilterCollection) -> Vec<i64> {
    let frame = Frame::new(["id", "session_id", "event_code"])
        .with_rows(rows.iter().enumerate().map(|(id, (session, code))| {
            vec![
                Value::Int(id as i64),
                session.clone().map_or(Value::Null, Value::Text),
                code.map_or(Value::Null, Value::Int),
            ]
        }))
        .unwrap();
    let bindings = bindings();
    let clause = MaskCompiler::new(&bindings)
        .compile_collection(collection)
        .unwrap();
    frame
        .filter(&clause)
        .unwrap()
        .rows()
        .iter()
        .map(|row| match row[0] {
            Value::Int(id) => id,
            _ => unreachable!(),
        })
        .collect()
}

fn arb_mode() -> impl Strategy<Value = FilterMode> {
    prop_oneof![Just(FilterMode::Include), Just(FilterMode::Exclude)]
}

fn arb_session() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["s1", "s2", "s3", "s4"]).prop_map(str::to_string)
}

/// Cells are even so odd range bounds never sit on a boundary
fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(
        (
            prop::option::weighted(0.85, arb_session()),
            prop::option::weighted(0.85, (-10i64..10).prop_map(|n| n * 2)),
        ),
        0..24,
    )
}

fn arb_session_filter() -> impl Strategy<Value = Filter<String>> {
    prop_oneof![
        1 => Just(Filter::NoFilter),
        3 => (arb_mode(), prop::collection::btree_set(arb_session(), 0..4))
            .prop_map(|(mode, elements)| Filter::Set(SetFilter::new(mode, elements))),
    ]
}

fn arb_code_filter() -> impl Strategy<Value = Filter<i64>> {
    let odd = || prop::option::of((-11i64..11).prop_map(|n| n * 2 + 1));
    prop_oneof![
        1 => Just(Filter::NoFilter),
        2 => (arb_mode(), prop::collection::btree_set(-20i64..20, 0..5))
            .prop_map(|(mode, elements)| Filter::Set(SetFilter::new(mode, elements))),
        3 => (arb_mode(), odd(), odd()).prop_map(|(mode, a, b)| {
            let (min, max) = match (a, b) {
                (Some(a), Some(b)) if a > b => (Some(b), Some(a)),
                other => other,
            };
            Filter::range(mode, min, max)
        }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Off-boundary data: the mask and every SQL dialect keep the same rows
    #[test]
    fn mask_matches_sql(
        rows in arb_rows(),
        session in arb_session_filter(),
        code in arb_code_filter(),
    ) {
        let mut collection = FilterCollection::new();
        collection.identity.session = session;
        collection.events.event_code = code;

        let bindings = bindings();
        let expected = mask_ids(&rows, &collection);
        for backend in [Backend::Postgres, Backend::Mysql, Backend::Bigquery] {
            let clause = ClauseCompiler::new(backend, &bindings)
                .compile_collection(&collection)
                .unwrap();
            prop_assert_eq!(&expected, &sql_ids(&rows, backend, &clause), "{}", backend);
        }
    }

    /// The mask keeps exactly the rows the filter evaluator accepts
    #[test]
    fn mask_matches_evaluator(
        rows in arb_rows(),
        code in arb_code_filter(),
    ) {
        let mut collection = FilterCollection::new();
        collection.events.event_code = code.clone();

        let expected: Vec<i64> = rows
            .iter()
            .enumerate()
            .filter(|(_, (_, cell))| match cell {
                _ if code.is_trivial() => true,
                None => false,
                Some(value) => code.is_satisfied_by(value),
            })
            .map(|(id, _)| id as i64)
            .collect();

        prop_assert_eq!(mask_ids(&rows, &collection), expected);
    }
}

#[test]
fn test_one_sided_include_boundary_differs() {
    let rows: Vec<Row> = vec![(Some("s1".into()), Some(4)), (Some("s1".into()), Some(6))];
    let mut collection = FilterCollection::new();
    collection.events.event_code = Filter::range(FilterMode::Include, Some(4), None);

    let bindings = bindings();
    let clause = ClauseCompiler::new(Backend::Postgres, &bindings)
        .compile_collection(&collection)
        .unwrap();

    // SQL renders a strict bound, the evaluator an inclusive one
    assert_eq!(sql_ids(&rows, Backend::Postgres, &clause), vec![1]);
    assert_eq!(mask_ids(&rows, &collection), vec![0, 1]);
}

#[test]
fn test_null_cells_dropped_by_both() {
    let rows: Vec<Row> = vec![
        (None, Some(2)),
        (Some("s2".into()), None),
        (Some("s3".into()), Some(8)),
    ];
    let mut collection = FilterCollection::new();
    collection.identity.session = Filter::exclude(["s1".to_string()]);
    collection.events.event_code = Filter::range(FilterMode::Exclude, Some(-1), Some(1));

    let bindings = bindings();
    let clause = ClauseCompiler::new(Backend::Postgres, &bindings)
        .compile_collection(&collection)
        .unwrap();

    assert_eq!(sql_ids(&rows, Backend::Postgres, &clause), vec![2]);
    assert_eq!(mask_ids(&rows, &collection), vec![2]);
}
