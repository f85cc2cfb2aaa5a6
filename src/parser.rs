//! Column parser for CREATE TABLE statements, using nom.
//!
//! Reads the column list of a table definition and nothing else:
//!
//! ```text
//! CREATE [OR REPLACE] [modifiers] TABLE [IF NOT EXISTS] schema.name (
//!     id          integer NOT NULL,
//!     amount      numeric(12,2),
//!     label       character varying(40) DEFAULT 'x',
//!     PRIMARY KEY (id)
//! ) ...
//! ─┬──────────    ─┬──────────────────── ──┬──────────
//!  │               │                       └── options (ignored)
//!  │               └── type, parameters, array suffix
//!  └── column name
//! ```
//!
//! Table-level constraint items are skipped. Whatever follows the column
//! list (DISTRIBUTED BY, PARTITION BY, WITH, ...) is never looked at.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{opt, recognize},
    multi::{many0, separated_list1},
    sequence::{delimited, preceded, tuple},
    IResult,
};
use serde::Serialize;

use crate::error::{SqlDocError, SqlDocResult};

/// A column read from DDL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DdlColumn {
    pub name: String,
    /// Type name without parameters, e.g. `character varying` or `int[]`.
    pub data_type: String,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub length: Option<u32>,
}

/// Words that start a table-level item rather than a column.
const TABLE_ITEM_KEYWORDS: &[&str] = &[
    "constraint",
    "primary",
    "foreign",
    "unique",
    "check",
    "exclude",
    "like",
];

/// Words that continue a multi-word type name.
const TYPE_CONTINUATIONS: &[&str] = &["varying", "precision", "with", "without", "time", "zone", "local"];

/// Parse the columns of a CREATE TABLE statement, in declaration order.
pub fn parse_columns(ddl: &str) -> SqlDocResult<Vec<DdlColumn>> {
    let input = ddl.trim_start();
    let base = ddl.len() - input.len();

    let (rest, _name) = parse_table_head(input).map_err(|e| to_ddl_error(input, base, e))?;
    let (_, block) = column_block(rest).map_err(|e| to_ddl_error(input, base, e))?;
    let block_offset = base + (input.len() - rest.len()) + 1;

    let mut columns = Vec::new();
    for (offset, item) in split_items(block) {
        let first_word = item
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        if TABLE_ITEM_KEYWORDS.contains(&first_word.as_str()) {
            continue;
        }

        let (_, column) =
            parse_column(&item).map_err(|e| to_ddl_error(&item, block_offset + offset, e))?;
        columns.push(column);
    }

    Ok(columns)
}

/// Map a nom error to a positioned DDL error. `base` is the offset of
/// `source` inside the full statement.
fn to_ddl_error(source: &str, base: usize, err: nom::Err<nom::error::Error<&str>>) -> SqlDocError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let local = (e.input.as_ptr() as usize).saturating_sub(source.as_ptr() as usize);
            let near: String = e.input.chars().take(20).collect();
            SqlDocError::ddl(
                base + local,
                format!("unexpected input near '{}' ({:?})", near.trim(), e.code),
            )
        }
        nom::Err::Incomplete(_) => SqlDocError::ddl(base + source.len(), "unexpected end of input"),
    }
}

/// Parse `CREATE ... TABLE [IF NOT EXISTS] name`, returning the name.
fn parse_table_head(input: &str) -> IResult<&str, &str> {
    let (input, _) = tag_no_case("create")(input)?;
    let (input, _) = opt(preceded(
        multispace1,
        tuple((tag_no_case("or"), multispace1, tag_no_case("replace"))),
    ))(input)?;
    let (input, _) = many0(preceded(multispace1, parse_table_modifier))(input)?;
    let (input, _) = preceded(multispace1, tag_no_case("table"))(input)?;
    let (input, _) = opt(preceded(
        multispace1,
        tuple((
            tag_no_case("if"),
            multispace1,
            tag_no_case("not"),
            multispace1,
            tag_no_case("exists"),
        )),
    ))(input)?;
    let (input, _) = multispace1(input)?;
    let (input, name) = parse_qualified_name(input)?;
    let (input, _) = multispace0(input)?;

    Ok((input, name))
}

/// Parse one modifier between CREATE and TABLE.
fn parse_table_modifier(input: &str) -> IResult<&str, &str> {
    let (rest, word) = alt((
        tag_no_case("global"),
        tag_no_case("local"),
        tag_no_case("temporary"),
        tag_no_case("temp"),
        tag_no_case("unlogged"),
        tag_no_case("writable"),
        tag_no_case("readable"),
        tag_no_case("external"),
        tag_no_case("foreign"),
        tag_no_case("web"),
    ))(input)?;
    // A modifier is a whole word.
    let (rest, _) = nom::combinator::peek(multispace1)(rest)?;
    Ok((rest, word))
}

/// Parse an identifier, plain or double-quoted.
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(delimited(char('"'), take_while(|c| c != '"'), char('"'))),
        take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '$'),
    ))(input)
}

/// Parse a dotted name like `schema.table`.
fn parse_qualified_name(input: &str) -> IResult<&str, &str> {
    recognize(separated_list1(char('.'), parse_identifier))(input)
}

/// Take the text inside the parenthesised column list. Quotes and comments
/// are skipped while balancing parentheses.
fn column_block(input: &str) -> IResult<&str, &str> {
    let (input, _) = char('(')(input)?;

    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                b'\'' | b'"' => quote = Some(c),
                b'-' if bytes.get(i + 1) == Some(&b'-') => {
                    while i < bytes.len() && bytes[i] != b'\n' {
                        i += 1;
                    }
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    i += 2;
                    while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                        i += 1;
                    }
                    i += 1;
                }
                b'(' => depth += 1,
                b')' if depth == 0 => return Ok((&input[i + 1..], &input[..i])),
                b')' => depth -= 1,
                _ => {}
            },
        }
        i += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

/// Split a column list on top-level commas. Comments are dropped and empty
/// items skipped; each item keeps its byte offset inside `block`.
fn split_items(block: &str) -> Vec<(usize, String)> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut start = 0usize;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = block.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' => {
                quote = Some(c);
                current.push(c);
            }
            '-' if chars.peek().map(|&(_, n)| n) == Some('-') => {
                // Line comment: skip to end of line.
                for (_, n) in chars.by_ref() {
                    if n == '\n' {
                        break;
                    }
                }
                current.push(' ');
            }
            '/' if chars.peek().map(|&(_, n)| n) == Some('*') => {
                chars.next();
                let mut prev = ' ';
                for (_, n) in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
                current.push(' ');
            }
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                flush(&mut current, start, &mut items);
                start = i + 1;
            }
            _ => {
                if current.is_empty() {
                    start = i;
                }
                current.push(c);
            }
        }
    }
    flush(&mut current, start, &mut items);

    items
}

fn flush(current: &mut String, start: usize, items: &mut Vec<(usize, String)>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        let lead = current.len() - current.trim_start().len();
        items.push((start + lead, trimmed.to_string()));
    }
    current.clear();
}

/// Parse a single column definition.
fn parse_column(input: &str) -> IResult<&str, DdlColumn> {
    let (input, name) = parse_identifier(input)?;
    let (input, _) = multispace1(input)?;
    let (input, info) = parse_type_info(input)?;

    let (precision, scale, length) = match info.params.as_slice() {
        [p, s] => (*p, *s, None),
        [len] => (None, None, *len),
        _ => (None, None, None),
    };

    Ok((
        input,
        DdlColumn {
            name: name.trim_matches('"').to_string(),
            data_type: info.name,
            precision,
            scale,
            length,
        },
    ))
}

/// Column type info
struct TypeInfo {
    name: String,
    params: Vec<Option<u32>>,
}

/// Parse a type with optional parameters, continuation words and array
/// suffix: `numeric(10,2)`, `character varying(40)`,
/// `timestamp(3) with time zone`, `text[]`.
fn parse_type_info(input: &str) -> IResult<&str, TypeInfo> {
    let (mut input, base) = parse_identifier(input)?;
    let mut words = vec![base.trim_matches('"').to_string()];
    let mut params: Vec<Option<u32>> = Vec::new();
    let mut is_array = false;

    loop {
        if params.is_empty()
            && let Ok((rest, list)) = parse_type_params(input)
        {
            params = list;
            input = rest;
            continue;
        }

        if let Ok((rest, _)) = tuple((multispace0::<&str, nom::error::Error<&str>>, tag("[]")))(input) {
            is_array = true;
            input = rest;
            continue;
        }

        if let Ok((rest, word)) = preceded(
            multispace1::<&str, nom::error::Error<&str>>,
            take_while1(|c: char| c.is_alphabetic()),
        )(input)
            && TYPE_CONTINUATIONS.contains(&word.to_lowercase().as_str())
        {
            words.push(word.to_string());
            input = rest;
            continue;
        }

        break;
    }

    let mut name = words.join(" ");
    if is_array {
        name.push_str("[]");
    }

    Ok((input, TypeInfo { name, params }))
}

/// Parse `(p)` or `(p, s)`. Non-numeric parameters (`max`, `*`) are kept as
/// `None` so the type still parses.
fn parse_type_params(input: &str) -> IResult<&str, Vec<Option<u32>>> {
    let (input, _) = multispace0(input)?;
    let (input, raw) = delimited(
        char('('),
        separated_list1(
            char(','),
            delimited(
                multispace0,
                take_while1(|c: char| c != ',' && c != ')' && !c.is_whitespace()),
                multispace0,
            ),
        ),
        char(')'),
    )(input)?;

    Ok((input, raw.iter().map(|p| p.parse().ok()).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, data_type: &str) -> DdlColumn {
        DdlColumn {
            name: name.to_string(),
            data_type: data_type.to_string(),
            precision: None,
            scale: None,
            length: None,
        }
    }

    #[test]
    fn test_simple_table() {
        let cols = parse_columns("CREATE TABLE s.t (id integer, name text)").unwrap();
        assert_eq!(cols, vec![column("id", "integer"), column("name", "text")]);
    }

    #[test]
    fn test_type_params() {
        let cols = parse_columns(
            "create table if not exists s.items (\n  price numeric(10, 2) not null,\n  code varchar(50) unique\n);",
        )
        .unwrap();
        assert_eq!(cols[0].data_type, "numeric");
        assert_eq!(cols[0].precision, Some(10));
        assert_eq!(cols[0].scale, Some(2));
        assert_eq!(cols[1].data_type, "varchar");
        assert_eq!(cols[1].length, Some(50));
    }

    #[test]
    fn test_multi_word_types() {
        let cols = parse_columns(
            "CREATE TABLE t (a character varying(20), b double precision, c timestamp(3) without time zone, d int[])",
        )
        .unwrap();
        assert_eq!(cols[0].data_type, "character varying");
        assert_eq!(cols[0].length, Some(20));
        assert_eq!(cols[1].data_type, "double precision");
        assert_eq!(cols[2].data_type, "timestamp without time zone");
        assert_eq!(cols[2].length, Some(3));
        assert_eq!(cols[3].data_type, "int[]");
    }

    #[test]
    fn test_modifiers_and_quotes() {
        let cols = parse_columns(
            r#"CREATE UNLOGGED TABLE "Sales"."Orders" ("Order Id" bigint, total money)"#,
        )
        .unwrap();
        assert_eq!(cols[0].name, "Order Id");
        assert_eq!(cols[1].data_type, "money");

        let cols = parse_columns("CREATE READABLE EXTERNAL TABLE ext.t (a text) LOCATION ('x')")
            .unwrap();
        assert_eq!(cols.len(), 1);
    }

    #[test]
    fn test_skips_table_constraints() {
        let cols = parse_columns(
            "CREATE TABLE t (\n  id int,\n  other_id int,\n  PRIMARY KEY (id),\n  FOREIGN KEY (other_id) REFERENCES o(id),\n)",
        )
        .unwrap();
        assert_eq!(cols.len(), 2);
    }

    #[test]
    fn test_comments_and_defaults() {
        let cols = parse_columns(
            "CREATE TABLE t (\n  id int, -- key, unique\n  label text default 'a,b' /* note (x */,\n  flag boolean\n)",
        )
        .unwrap();
        let names: Vec<_> = cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "label", "flag"]);
    }

    #[test]
    fn test_trailing_clauses_ignored() {
        let cols = parse_columns(
            "CREATE TABLE s.t (id int, d date) DISTRIBUTED BY (id) PARTITION BY RANGE (d) (START (date '2020-01-01'))",
        )
        .unwrap();
        assert_eq!(cols.len(), 2);
    }

    #[test]
    fn test_not_a_table() {
        let err = parse_columns("CREATE VIEW s.v AS SELECT 1").unwrap_err();
        assert!(matches!(err, SqlDocError::Ddl { .. }));
    }

    #[test]
    fn test_unterminated_block() {
        assert!(parse_columns("CREATE TABLE t (id int").is_err());
    }

    #[test]
    fn test_bad_column_position() {
        let err = parse_columns("CREATE TABLE t (id int, 'x' text)").unwrap_err();
        match err {
            SqlDocError::Ddl { position, .. } => assert_eq!(position, 24),
            other => panic!("unexpected error: {other}"),
        }
    }
}
