use std::fs;

use pretty_assertions::assert_eq;
use sqldoc::prelude::*;

const ORDERS: &str = r#"/*
Purpose:
    One row per order line.
	Loaded nightly.

Dependent Objects:
    Type | Name
    Table | sales.customers

Changelog:
    Date | Author | Change
    2024-01-02 | ops | created
*/
CREATE TABLE sales.orders (
    order_id    bigint NOT NULL,
    customer_id integer,
    amount      numeric(12,2),
    CONSTRAINT orders_pk PRIMARY KEY (order_id)
)
DISTRIBUTED BY (order_id);

COMMENT ON COLUMN sales.orders.amount IS 'Gross amount';
"#;

const CUSTOMERS: &str = r#"/*
Purpose: Customer master.

Dependent Objects:
    Type | Name
*/
CREATE TABLE sales.customers (customer_id integer, name text);
"#;

const REFRESH: &str = r#"/*
Object Name: Refresh_Totals
Object Type: DML
Purpose: Rebuilds the totals table.
*/
TRUNCATE sales.totals;
INSERT INTO sales.totals SELECT customer_id, sum(amount) FROM sales.orders GROUP BY 1;
"#;

const ADD: &str = r#"/*
Parameters:
    Name | Type
    a | integer
    b | integer
Return: integer
*/
CREATE OR REPLACE FUNCTION util.add(a integer, b integer) RETURNS integer AS $$
    SELECT a + b;
$$ LANGUAGE sql;
"#;

fn child<'a>(sections: &'a [Section], id: &str) -> &'a Section {
    sections
        .iter()
        .flat_map(|s| s.children.iter())
        .find(|c| c.id == id)
        .unwrap()
}

fn labels(section: &Section) -> Vec<&str> {
    section
        .blocks
        .iter()
        .filter_map(|b| match b {
            Block::Label(l) => Some(l.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_document_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("tables")).unwrap();
    fs::create_dir_all(dir.path().join("jobs")).unwrap();
    fs::write(dir.path().join("tables/orders.sql"), ORDERS).unwrap();
    fs::write(dir.path().join("tables/customers.sql"), CUSTOMERS).unwrap();
    fs::write(dir.path().join("jobs/refresh.sql"), REFRESH).unwrap();
    fs::write(dir.path().join("add.sql"), ADD).unwrap();
    fs::write(dir.path().join("notes.sql"), "-- scratch\nSELECT 1;").unwrap();

    let doc = document_dir(dir.path(), &DocConfig::default()).unwrap();
    assert_eq!(doc.objects.len(), 4);

    let groups: Vec<&str> = doc.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(groups, ["DML", "FUNCTION", "TABLE"]);

    let tables: Vec<&str> = doc.sections[2]
        .children
        .iter()
        .map(|c| c.title.as_str())
        .collect();
    assert_eq!(tables, ["sales.customers", "sales.orders"]);

    let orders = child(&doc.sections, "sales-orders");
    assert_eq!(
        labels(orders),
        ["PURPOSE:", "DEPENDANT OBJECTS:", "ATTRIBUTES:", "CHANGE LOG:"]
    );
    assert_eq!(orders.blocks[1], Block::Line("DISTRIBUTED BY (order_id)".into()));
    assert_eq!(
        orders.blocks[3],
        Block::Literal("One row per order line.\n    Loaded nightly.".into())
    );

    let customers = child(&doc.sections, "sales-customers");
    assert_eq!(labels(customers), ["PURPOSE:", "ATTRIBUTES:"]);

    let refresh = child(&doc.sections, "refresh-totals");
    assert_eq!(
        refresh.blocks[0],
        Block::Field {
            label: "OBJECT TYPE".into(),
            value: "DML".into()
        }
    );
}

#[test]
fn test_dependency_reference_resolves() {
    let sections = sqldoc::document_sources([ORDERS, CUSTOMERS], &DocConfig::default());
    let orders = child(&sections, "sales-orders");

    let deps = orders
        .blocks
        .iter()
        .find_map(|b| match b {
            Block::Table(t) if t.header == ["Type", "Name"] => Some(t),
            _ => None,
        })
        .unwrap();
    let Cell::Reference { refid, .. } = &deps.rows[0][1] else {
        panic!("expected a reference cell");
    };
    assert_eq!(child(&sections, refid).title, "sales.customers");

    let rst = sections.to_rst();
    assert!(rst.contains(".. _sales-customers:"));
    assert!(rst.contains(":ref:`sales.customers <sales-customers>`"));
}

#[test]
fn test_attribute_table() {
    let d = extract(ORDERS, &DocConfig::default()).unwrap();
    let cols = d.cols().unwrap();
    assert_eq!(cols.header().unwrap(), COLUMN_HEADER);
    assert_eq!(
        cols.body(),
        [
            vec!["order_id", "bigint", ""],
            vec!["customer_id", "integer", ""],
            vec!["amount", "numeric(12,2)", "Gross amount"],
        ]
    );
}

#[test]
fn test_column_toggle_only_affects_attributes() {
    let off = DocConfig {
        include_table_attributes: false,
        ..DocConfig::default()
    };
    let with_cols = render(&[extract(ORDERS, &DocConfig::default()).unwrap()]);
    let without_cols = render(&[extract(ORDERS, &off).unwrap()]);

    let with_cols = child(&with_cols, "sales-orders");
    let without_cols = child(&without_cols, "sales-orders");
    assert!(labels(with_cols).contains(&"ATTRIBUTES:"));
    assert!(!labels(without_cols).contains(&"ATTRIBUTES:"));

    // Dropping the ATTRIBUTES label and the table after it leaves the
    // blocks of the run without columns.
    let at = with_cols
        .blocks
        .iter()
        .position(|b| *b == Block::Label("ATTRIBUTES:".into()))
        .unwrap();
    let mut remaining = with_cols.blocks.clone();
    remaining.drain(at..at + 2);
    assert!(matches!(with_cols.blocks[at + 1], Block::Table(_)));
    assert_eq!(remaining, without_cols.blocks);
}

#[test]
fn test_function_section() {
    let sections = render(&[extract(ADD, &DocConfig::default()).unwrap()]);
    let add = child(&sections, "util-add");
    assert_eq!(
        add.blocks[..3],
        [
            Block::Field {
                label: "OBJECT TYPE".into(),
                value: "FUNCTION".into()
            },
            Block::Field {
                label: "RETURNS".into(),
                value: "integer".into()
            },
            Block::Field {
                label: "LANGUAGE".into(),
                value: "sql".into()
            },
        ]
    );
    assert_eq!(labels(add), ["PARAMETERS:"]);
}

#[test]
fn test_json_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("refresh.sql"), REFRESH).unwrap();

    let doc = document_dir(dir.path(), &DocConfig::default()).unwrap();
    let json: serde_json::Value = serde_json::to_value(&doc).unwrap();
    assert_eq!(json["objects"][0]["type"], "DML");
    assert_eq!(json["objects"][0]["name"], "refresh_totals");
    assert_eq!(json["sections"][0]["children"][0]["blocks"][0]["kind"], "field");
}
