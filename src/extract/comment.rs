//! Top-level block comment and its tags.
//!
//! ```text
//! /*
//! Object Name: my_test_dml            single line
//! Object Type: DML                    single line
//! Purpose:                            free text up to the next tag
//!     Reload the sales facts.
//! Parameters:                         pipe table up to the next tag
//!     Name | Type | Description
//! Return: integer                     single line
//! Dependent Objects:                  pipe table up to the next tag
//!     Type | Name
//! Changelog:                          pipe table up to the end
//!     Date | Author | Ticket | Modification
//! */
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::descriptor::{Comments, TableRows};

/// First `/* ... */` region in a file.
static TOP_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*(.*?)\*/").unwrap());

/// Start of any recognised tag. `Dependent Objects:` is recognised by its
/// `objects:` suffix.
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(object[ \t]+name|object[ \t]+type|parameters|return|purpose|(?:dependent[ \t]+)?objects|changelog)[ \t]*:",
    )
    .unwrap()
});

/// Every tag the grammar knows, in display form.
pub const TAGS: [&str; 7] = [
    "Object Name:",
    "Object Type:",
    "Parameters:",
    "Return:",
    "Purpose:",
    "Dependent Objects:",
    "Changelog:",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    ObjectName,
    ObjectType,
    Parameters,
    Return,
    Purpose,
    Dependencies,
    Changelog,
}

impl Tag {
    fn from_keyword(keyword: &str) -> Self {
        let keyword = keyword.to_lowercase();
        if keyword.starts_with("object") && keyword.ends_with("name") {
            Self::ObjectName
        } else if keyword.starts_with("object") && keyword.ends_with("type") {
            Self::ObjectType
        } else if keyword == "parameters" {
            Self::Parameters
        } else if keyword == "return" {
            Self::Return
        } else if keyword == "purpose" {
            Self::Purpose
        } else if keyword == "changelog" {
            Self::Changelog
        } else {
            Self::Dependencies
        }
    }

    fn is_single_line(self) -> bool {
        matches!(self, Self::ObjectName | Self::ObjectType | Self::Return)
    }
}

/// Fields read from the top-level comment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaggedComment {
    pub object_name: Option<String>,
    pub object_type: Option<String>,
    pub comments: Comments,
}

/// Inner text of the top-level comment, delimiters excluded.
pub fn top_comment(text: &str) -> Option<&str> {
    TOP_COMMENT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// The text with every `--` and `/* */` comment removed. Quoted strings
/// and identifiers are kept as written; line comments keep their newline.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' => {
                quote = Some(c);
                out.push(c);
            }
            '-' if chars.peek() == Some(&'-') => {
                for n in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for n in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    out
}

/// Read the tags of the top-level comment, if the file has one.
pub fn parse(text: &str) -> Option<TaggedComment> {
    top_comment(text).map(parse_tags)
}

/// Read tags from comment text. Each tag runs to the start of the next tag
/// or the end of the text; single-line tags stop at the end of their line.
/// When a tag is repeated, the first occurrence wins.
pub fn parse_tags(inner: &str) -> TaggedComment {
    let marks: Vec<(Tag, usize, usize)> = TAG
        .captures_iter(inner)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let keyword = caps.get(1)?;
            Some((Tag::from_keyword(keyword.as_str()), whole.start(), whole.end()))
        })
        .collect();

    let mut tagged = TaggedComment::default();
    let mut seen: Vec<Tag> = Vec::new();

    for (i, &(tag, _, content_start)) in marks.iter().enumerate() {
        if seen.contains(&tag) {
            continue;
        }
        seen.push(tag);

        let content_end = marks.get(i + 1).map_or(inner.len(), |&(_, start, _)| start);
        let content = &inner[content_start..content_end];

        if tag.is_single_line() {
            let line = content.lines().next().unwrap_or_default().trim();
            let value = (!line.is_empty()).then(|| line.to_string());
            match tag {
                Tag::ObjectName => tagged.object_name = value,
                Tag::ObjectType => tagged.object_type = value,
                _ => tagged.comments.return_type = value,
            }
            continue;
        }

        match tag {
            Tag::Purpose => tagged.comments.purpose = Some(content.trim().to_string()),
            Tag::Parameters => tagged.comments.param = Some(TableRows::from_pipe_text(content)),
            Tag::Dependencies => {
                tagged.comments.dependencies = Some(TableRows::from_pipe_text(content))
            }
            Tag::Changelog => tagged.comments.changelog = Some(TableRows::from_pipe_text(content)),
            _ => {}
        }
    }

    tagged
}
