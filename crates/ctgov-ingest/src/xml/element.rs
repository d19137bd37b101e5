/// An XML element with its attributes, leading text, and child elements.
///
/// `text` holds the character data that appears before the first child
/// element. Character data after a child is not kept, which matches how the
/// study schema places values only in leaf elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub(crate) name: String,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) text: String,
    pub(crate) children: Vec<Element>,
}

impl Element {
    pub(crate) fn new(name: String, attributes: Vec<(String, String)>) -> Self {
        Self {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Tag name as written in the document.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw text content, untrimmed.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Value of the attribute `key`, if present.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    fn children_named<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// First element matching `path`, in document order.
    ///
    /// Each `/`-separated step selects direct children by tag name.
    pub fn find(&self, path: &str) -> Option<&Element> {
        match path.split_once('/') {
            Some((step, rest)) => self
                .children_named(step)
                .find_map(|child| child.find(rest)),
            None => self.children_named(path).next(),
        }
    }

    /// Every element matching `path`, in document order.
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        let mut current = vec![self];
        for step in path.split('/') {
            current = current
                .into_iter()
                .flat_map(|element| element.children_named(step))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    /// Text of the first element matching `path`.
    pub fn find_text(&self, path: &str) -> Option<&str> {
        self.find(path).map(Element::text)
    }
}
