// Heading structure of a loaded page, shown in the outline panel.

use std::rc::Weak;

use crate::modules::model::Observers;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineNode {
    pub level: u8,
    pub title: String,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    fn new(level: u8, title: &str) -> Self {
        Self {
            level,
            title: title.to_string(),
            children: Vec::new(),
        }
    }
}

/// One visible row of a flattened outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRow {
    pub depth: usize,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    roots: Vec<OutlineNode>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the outline from `#`, `##` and `###` heading lines of a
    /// gemtext document. Headings nest under the closest shallower heading
    /// seen before them; preformatted blocks are skipped.
    pub fn from_gemtext(text: &str) -> Self {
        let mut outline = Self::new();
        let mut preformatted = false;
        for line in text.lines() {
            if line.starts_with("```") {
                preformatted = !preformatted;
                continue;
            }
            if preformatted {
                continue;
            }
            let level = line.bytes().take_while(|&b| b == b'#').count();
            if !(1..=3).contains(&level) {
                continue;
            }
            let title = line[level..].trim();
            if !title.is_empty() {
                outline.push_heading(level as u8, title);
            }
        }
        outline
    }

    /// Adds a heading under the last heading of a lower level, or at the top
    /// when there is none.
    pub fn push_heading(&mut self, level: u8, title: &str) {
        fn insert(nodes: &mut Vec<OutlineNode>, node: OutlineNode) {
            let nests = matches!(nodes.last(), Some(last) if last.level < node.level);
            match nodes.last_mut() {
                Some(last) if nests => insert(&mut last.children, node),
                _ => nodes.push(node),
            }
        }
        insert(&mut self.roots, OutlineNode::new(level, title));
    }

    pub fn roots(&self) -> &[OutlineNode] {
        &self.roots
    }

    /// Text of the first heading, used as a page title.
    pub fn title(&self) -> Option<&str> {
        self.roots.first().map(|n| n.title.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of headings.
    pub fn len(&self) -> usize {
        fn count(nodes: &[OutlineNode]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.roots)
    }

    /// Pre-order rows; with `expanded` false only the top level is listed.
    pub fn rows(&self, expanded: bool) -> Vec<OutlineRow> {
        fn walk(nodes: &[OutlineNode], depth: usize, expanded: bool, out: &mut Vec<OutlineRow>) {
            for node in nodes {
                out.push(OutlineRow {
                    depth,
                    title: node.title.clone(),
                });
                if expanded {
                    walk(&node.children, depth + 1, expanded, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.roots, 0, expanded, &mut out);
        out
    }
}

pub trait OutlineObserver {
    fn outline_reset(&self, outline: &Outline);
}

/// The outline a tab currently shows, plus whoever is watching it.
#[derive(Debug, Default)]
pub struct OutlineModel {
    outline: Outline,
    observers: Observers<dyn OutlineObserver>,
}

impl OutlineModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    /// Swaps in the outline of a freshly loaded page.
    pub fn replace(&mut self, outline: Outline) {
        self.outline = outline;
        let current = &self.outline;
        self.observers.notify(|o| o.outline_reset(current));
    }

    pub fn subscribe(&mut self, observer: Weak<dyn OutlineObserver>) {
        self.observers.subscribe(observer);
    }

    pub fn unsubscribe(&mut self, observer: &Weak<dyn OutlineObserver>) {
        self.observers.unsubscribe(observer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "\
# Project
Intro text.
## Install
### From source
## Usage
```
# not a heading
```
#### too deep
# Changelog
";

    #[test]
    fn test_gemtext_outline_shape() {
        let outline = Outline::from_gemtext(PAGE);

        assert_eq!(outline.title(), Some("Project"));
        assert_eq!(outline.len(), 5);
        assert_eq!(outline.roots().len(), 2);
        assert_eq!(outline.roots()[0].children.len(), 2);
        assert_eq!(outline.roots()[0].children[0].children[0].title, "From source");
    }

    #[test]
    fn test_rows_follow_expansion() {
        let outline = Outline::from_gemtext(PAGE);

        let collapsed: Vec<String> = outline.rows(false).into_iter().map(|r| r.title).collect();
        assert_eq!(collapsed, vec!["Project", "Changelog"]);

        let expanded = outline.rows(true);
        let depths: Vec<usize> = expanded.iter().map(|r| r.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 1, 0]);
    }

    #[test]
    fn test_subheading_without_parent_goes_to_top() {
        let outline = Outline::from_gemtext("### Orphan\n# Top\n## Child\n");
        assert_eq!(outline.roots().len(), 2);
        assert_eq!(outline.roots()[0].title, "Orphan");
        assert_eq!(outline.roots()[1].children[0].title, "Child");
    }

    #[test]
    fn test_empty_headings_ignored() {
        let outline = Outline::from_gemtext("#\n##   \nplain\n");
        assert!(outline.is_empty());
        assert_eq!(outline.title(), None);
    }
}
