// src/comments.rs

//! Comment normalization.
//!
//! Comment text is overwritten with spaces instead of being removed, so a
//! normalized file has the same byte length and the same line/column layout
//! as the original. Line terminators inside block comments are kept.

use crate::error::CommentError;
use std::ops::Range;
use tree_sitter::{Node, Parser};

/// Finds the byte ranges of every comment in a source text
pub trait CommentScanner {
    fn comment_spans(&mut self, source: &str) -> Result<Vec<Range<usize>>, CommentError>;
}

/// Java comment scanner backed by tree-sitter
pub struct JavaCommentScanner {
    parser: Parser,
}

impl JavaCommentScanner {
    pub fn new() -> Result<Self, CommentError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| CommentError::Language(e.to_string()))?;
        Ok(Self { parser })
    }
}

impl CommentScanner for JavaCommentScanner {
    fn comment_spans(&mut self, source: &str) -> Result<Vec<Range<usize>>, CommentError> {
        let tree = self.parser.parse(source, None).ok_or(CommentError::Unparsable)?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(CommentError::Malformed { offset: first_error_offset(root) });
        }

        let mut spans = Vec::new();
        let mut cursor = root.walk();
        'walk: loop {
            let node = cursor.node();
            if is_comment(&node) {
                spans.push(node.start_byte()..node.end_byte());
            } else if cursor.goto_first_child() {
                continue;
            }
            while !cursor.goto_next_sibling() {
                if !cursor.goto_parent() {
                    break 'walk;
                }
            }
        }
        Ok(spans)
    }
}

fn is_comment(node: &Node) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment" | "comment")
}

fn first_error_offset(root: Node) -> usize {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return node.start_byte();
        }
        // Descend into the first child that carries the error.
        let mut found = false;
        if cursor.goto_first_child() {
            loop {
                if cursor.node().has_error() {
                    found = true;
                    break;
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        if !found {
            return cursor.node().start_byte();
        }
    }
}

/// Replaces every comment byte except `\n` and `\r` with a space.
pub fn normalize(source: &str, scanner: &mut dyn CommentScanner) -> Result<String, CommentError> {
    let spans = scanner.comment_spans(source)?;
    Ok(blank_spans(source, &spans))
}

/// Blanks the given byte ranges in place, keeping line terminators.
pub fn blank_spans(source: &str, spans: &[Range<usize>]) -> String {
    let mut bytes = source.as_bytes().to_vec();
    for span in spans {
        let end = span.end.min(bytes.len());
        for byte in &mut bytes[span.start.min(end)..end] {
            if *byte != b'\n' && *byte != b'\r' {
                *byte = b' ';
            }
        }
    }
    // Every byte of a multi-byte character inside a span became ASCII, and
    // spans start and end on character boundaries, so this cannot fail.
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(source: &str) -> String {
        let mut scanner = JavaCommentScanner::new().unwrap();
        normalize(source, &mut scanner).unwrap()
    }

    fn newline_positions(text: &str) -> Vec<usize> {
        text.match_indices('\n').map(|(i, _)| i).collect()
    }

    #[test]
    fn blanks_line_comments() {
        let src = "class A {\n  int x = 1; // set x\n}\n";
        let out = strip(src);
        assert_eq!(out, "class A {\n  int x = 1;         \n}\n");
        assert_eq!(out.len(), src.len());
    }

    #[test]
    fn keeps_newlines_inside_block_comments() {
        let src = "/* one\n * two\r\n */\nclass A {}\n";
        let out = strip(src);
        assert_eq!(out.len(), src.len());
        assert_eq!(newline_positions(&out), newline_positions(src));
        assert_eq!(out.lines().count(), src.lines().count());
        assert!(out.lines().take(3).all(|l| l.trim().is_empty()));
        assert!(out.contains("\r\n"));
    }

    #[test]
    fn leaves_comment_markers_in_strings_alone() {
        let src = "class A { String s = \"// not a comment\"; }\n";
        assert_eq!(strip(src), src);
    }

    #[test]
    fn javadoc_becomes_blank_lines() {
        let src = "class A {\n  /**\n   * Doc.\n   */\n  void f() {}\n}\n";
        let out = strip(src);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[1].trim().is_empty());
        assert!(lines[2].trim().is_empty());
        assert!(lines[3].trim().is_empty());
        assert_eq!(lines[4], "  void f() {}");
    }

    #[test]
    fn multibyte_comment_text_keeps_byte_length() {
        let src = "class A {} // caf\u{e9} \u{1f600}\n";
        let out = strip(src);
        assert_eq!(out.len(), src.len());
        assert_eq!(out.trim_end(), "class A {}");
    }

    #[test]
    fn malformed_source_is_reported() {
        let mut scanner = JavaCommentScanner::new().unwrap();
        let err = normalize("class A { void f( { \n", &mut scanner).unwrap_err();
        assert!(matches!(err, CommentError::Malformed { .. }));
    }

    #[test]
    fn blank_spans_clamps_out_of_range() {
        assert_eq!(blank_spans("ab\ncd", &[1..99]), "a \n  ");
    }
}
