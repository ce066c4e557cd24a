use std::borrow::Cow;

/// Output tree of one converted document.
///
/// The four groups are rendered in field order, so tables always follow every
/// paragraph-level node regardless of where they sat in the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentAst {
    pub page_parameters: Vec<Node>,
    pub blocks: Vec<Node>,
    pub tables: Vec<Node>,
    pub footnotes: Vec<Node>,
}

impl DocumentAst {
    /// Builds the `document` root with the groups in output order.
    pub fn to_root(&self) -> Node {
        let mut root = Node::new(NodeLabel::Document);
        root.children.extend(
            self.page_parameters
                .iter()
                .chain(&self.blocks)
                .chain(&self.tables)
                .chain(&self.footnotes)
                .cloned(),
        );
        root
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NodeLabel {
    #[default]
    Document,
    ParametersPage,
    Paragraph,
    /// Document-wide heading ordinal, starting at 1.
    Heading(usize),
    List,
    Figure,
    TocContent,
    /// A run inside a paragraph-level node.
    Content,
    /// Document-wide table ordinal, starting at 1.
    Table(usize),
    Row,
    Cell,
    Footnote,
}

impl NodeLabel {
    pub fn tag(&self) -> Cow<'static, str> {
        match self {
            NodeLabel::Document => Cow::Borrowed("document"),
            NodeLabel::ParametersPage => Cow::Borrowed("parameters_page"),
            NodeLabel::Paragraph => Cow::Borrowed("paragraph"),
            NodeLabel::Heading(n) => Cow::Owned(format!("heading{}", n)),
            NodeLabel::List => Cow::Borrowed("list"),
            NodeLabel::Figure => Cow::Borrowed("figure"),
            NodeLabel::TocContent => Cow::Borrowed("toc_content"),
            NodeLabel::Content => Cow::Borrowed("content"),
            NodeLabel::Table(n) => Cow::Owned(format!("table{}", n)),
            NodeLabel::Row => Cow::Borrowed("row"),
            NodeLabel::Cell => Cow::Borrowed("cell"),
            NodeLabel::Footnote => Cow::Borrowed("footnote"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub label: NodeLabel,
    pub text: Option<String>,
    pub attributes: Vec<(&'static str, String)>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(label: NodeLabel) -> Self {
        Self {
            label,
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    pub fn attrs<I>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, String)>,
    {
        self.attributes.extend(attributes);
        self
    }

    pub fn push(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}
