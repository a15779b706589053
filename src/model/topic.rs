//! Conceptual topic tree.
//!
//! Topics form a hierarchy (guides, tutorials, ...). The tree owns every
//! topic in an arena; [`TopicId`] indexes it and [`TopicNode`] is a cheap
//! view for walking parent and child links.

use rustc_hash::FxHashMap;

/// Index of a topic inside its [`TopicTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicId(usize);

#[derive(Debug, Clone)]
struct Topic {
    id: String,
    title: String,
    parent: Option<TopicId>,
    children: Vec<TopicId>,
    pinned_path: Option<String>,
}

/// Arena of topics.
#[derive(Debug, Default)]
pub struct TopicTree {
    topics: Vec<Topic>,
    by_id: FxHashMap<String, TopicId>,
}

impl TopicTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level topic.
    pub fn add_root(&mut self, id: impl Into<String>, title: impl Into<String>) -> TopicId {
        self.insert(id.into(), title.into(), None)
    }

    /// Add a topic under `parent`. `None` if `parent` is not in this tree.
    pub fn add_child(
        &mut self,
        parent: TopicId,
        id: impl Into<String>,
        title: impl Into<String>,
    ) -> Option<TopicId> {
        if parent.0 >= self.topics.len() {
            return None;
        }
        let key = self.insert(id.into(), title.into(), Some(parent));
        self.topics[parent.0].children.push(key);
        Some(key)
    }

    fn insert(&mut self, id: String, title: String, parent: Option<TopicId>) -> TopicId {
        let key = TopicId(self.topics.len());
        self.by_id.insert(id.clone(), key);
        self.topics.push(Topic {
            id,
            title,
            parent,
            children: Vec::new(),
            pinned_path: None,
        });
        key
    }

    /// Pin a topic to an explicit output path (or absolute URL).
    pub fn pin(&mut self, key: TopicId, path: impl Into<String>) {
        if let Some(topic) = self.topics.get_mut(key.0) {
            topic.pinned_path = Some(path.into());
        }
    }

    /// View of a topic.
    pub fn get(&self, key: TopicId) -> Option<TopicNode<'_>> {
        (key.0 < self.topics.len()).then_some(TopicNode { tree: self, key })
    }

    /// Find a topic by its id. When ids repeat, the latest topic wins.
    pub fn find(&self, id: &str) -> Option<TopicNode<'_>> {
        self.by_id.get(id).and_then(|&key| self.get(key))
    }

    /// Top-level topics in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = TopicNode<'_>> {
        self.topics
            .iter()
            .enumerate()
            .filter(|(_, t)| t.parent.is_none())
            .map(|(i, _)| TopicNode {
                tree: self,
                key: TopicId(i),
            })
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

/// Borrowed view of one topic.
#[derive(Clone, Copy)]
pub struct TopicNode<'a> {
    tree: &'a TopicTree,
    key: TopicId,
}

impl<'a> TopicNode<'a> {
    fn topic(&self) -> &'a Topic {
        &self.tree.topics[self.key.0]
    }

    #[inline]
    pub fn key(&self) -> TopicId {
        self.key
    }

    pub fn id(&self) -> &'a str {
        &self.topic().id
    }

    pub fn title(&self) -> &'a str {
        &self.topic().title
    }

    pub fn parent(&self) -> Option<TopicNode<'a>> {
        self.topic().parent.map(|key| TopicNode {
            tree: self.tree,
            key,
        })
    }

    pub fn children(&self) -> impl Iterator<Item = TopicNode<'a>> + 'a {
        let tree = self.tree;
        self.topic()
            .children
            .iter()
            .map(move |&key| TopicNode { tree, key })
    }

    pub fn has_children(&self) -> bool {
        !self.topic().children.is_empty()
    }

    pub fn pinned_path(&self) -> Option<&'a str> {
        self.topic().pinned_path.as_deref()
    }
}

impl std::fmt::Debug for TopicNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicNode")
            .field("key", &self.key)
            .field("id", &self.id())
            .finish()
    }
}
