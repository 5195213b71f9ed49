use serde::{Deserialize, Serialize};

/// One table-of-contents item. Leaves carry an empty `subcontent`,
/// never a missing one; the serialized form always has both keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocNode {
    pub content: String,
    pub subcontent: Vec<TocNode>,
}

/// Parse an indented markdown bullet list into a forest of [`TocNode`]s.
///
/// The input must use `-` bullet markers and exactly one tab per depth
/// level. Lines without a marker are soft-wrapped continuations of the
/// preceding item. Inconsistent indentation is not validated; behavior
/// on such input is unspecified. `html::normalize_toc_list` produces
/// input in the expected shape.
pub fn parse_toc(toc_markdown: &str) -> Vec<TocNode> {
    if toc_markdown.trim().is_empty() {
        return Vec::new();
    }

    split_items(toc_markdown)
        .into_iter()
        .map(|chunk| {
            let (content, descendants) = split_depth(&chunk);
            TocNode {
                content,
                subcontent: parse_toc(&descendants),
            }
        })
        .collect()
}

/// Split the text into one chunk per top-level item. A top-level item
/// starts at any line beginning with `-` (tab-indented descendants
/// never do); a blank-line separator is inserted before each such
/// boundary so the whole text splits cleanly on `\n\n`.
fn split_items(toc_markdown: &str) -> Vec<String> {
    toc_markdown
        .replace("\n-", "\n\n-")
        .split("\n\n")
        .map(str::to_string)
        .collect()
}

/// Split one chunk into its own content (first line, bullet marker
/// stripped) and the remaining descendant lines with one leading tab
/// removed from each.
fn split_depth(chunk: &str) -> (String, String) {
    let mut lines = chunk.split('\n');
    let first = lines.next().unwrap_or("");
    let content = strip_bullet(first);

    let descendants: Vec<&str> = lines
        .map(|line| {
            let mut chars = line.chars();
            chars.next();
            chars.as_str()
        })
        .collect();

    (content, descendants.join("\n"))
}

fn strip_bullet(line: &str) -> String {
    match line.strip_prefix('-') {
        Some(rest) => rest.trim_start().to_string(),
        None => line.to_string(),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(content: &str) -> TocNode {
        TocNode {
            content: content.to_string(),
            subcontent: Vec::new(),
        }
    }

    /// Render a forest back to dash-and-tab markdown (inverse of parse).
    fn render(nodes: &[TocNode], depth: usize) -> String {
        let mut out = String::new();
        for node in nodes {
            out.push_str(&"\t".repeat(depth));
            out.push_str("- ");
            out.push_str(&node.content);
            out.push('\n');
            out.push_str(&render(&node.subcontent, depth + 1));
        }
        out
    }

    #[test]
    fn empty_input() {
        assert!(parse_toc("").is_empty());
    }

    #[test]
    fn whitespace_input() {
        assert!(parse_toc("   \n").is_empty());
    }

    #[test]
    fn flat_list() {
        let nodes = parse_toc("- A\n- B\n- C");
        assert_eq!(nodes, vec![leaf("A"), leaf("B"), leaf("C")]);
    }

    #[test]
    fn one_level_of_nesting() {
        let nodes = parse_toc("- A\n- B\n\t- B1\n- C");
        assert_eq!(
            nodes,
            vec![
                leaf("A"),
                TocNode {
                    content: "B".to_string(),
                    subcontent: vec![leaf("B1")],
                },
                leaf("C"),
            ]
        );
    }

    #[test]
    fn deep_nesting() {
        let nodes = parse_toc("- A\n\t- A1\n\t\t- A1a\n\t\t- A1b\n\t- A2");
        assert_eq!(nodes.len(), 1);
        let a = &nodes[0];
        assert_eq!(a.content, "A");
        assert_eq!(a.subcontent.len(), 2);
        assert_eq!(a.subcontent[0].content, "A1");
        assert_eq!(
            a.subcontent[0].subcontent,
            vec![leaf("A1a"), leaf("A1b")]
        );
        assert_eq!(a.subcontent[1], leaf("A2"));
    }

    #[test]
    fn encyclopedia_entry_toc() {
        let toc = "- 1. Life and Works\n\t- 1.1 Life\n\t- 1.2 Works\n- 2. Metaphysics\n- Bibliography\n\t- Primary texts\n\t- Secondary literature\n- Related Entries";
        let nodes = parse_toc(toc);
        let top: Vec<&str> = nodes.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(
            top,
            vec!["1. Life and Works", "2. Metaphysics", "Bibliography", "Related Entries"]
        );
        assert_eq!(nodes[0].subcontent.len(), 2);
        assert_eq!(nodes[0].subcontent[0].content, "1.1 Life");
        assert_eq!(nodes[2].subcontent.len(), 2);
        assert!(nodes[3].subcontent.is_empty());
    }

    #[test]
    fn render_reparse_round_trip() {
        let toc = "- 1. First\n\t- 1.1 Inner\n\t\t- 1.1.1 Deep\n- 2. Second\n\t- 2.1 Other";
        let nodes = parse_toc(toc);
        let reparsed = parse_toc(&render(&nodes, 0));
        assert_eq!(nodes, reparsed);
    }

    #[test]
    fn serialized_leaf_keeps_empty_subcontent() {
        let json = serde_json::to_string(&parse_toc("- Only")).unwrap();
        assert_eq!(json, r#"[{"content":"Only","subcontent":[]}]"#);
    }
}
