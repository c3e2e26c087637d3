/// One benchmark input: a named case run against a table of `group` size.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup) -> Self {
        Self { name, group }
    }

    pub fn small(name: &'static str) -> Self {
        Self::new(name, TestGroup::Small)
    }

    pub fn normal(name: &'static str) -> Self {
        Self::new(name, TestGroup::Normal)
    }

    pub fn large(name: &'static str) -> Self {
        Self::new(name, TestGroup::Large)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn size(&self) -> usize {
        self.group.size()
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Normal,
    Large,
}

impl TestGroup {
    /// Number of routes, or of where clauses, the case is built with.
    pub const fn size(self) -> usize {
        match self {
            TestGroup::Small => 8,
            TestGroup::Normal => 64,
            TestGroup::Large => 512,
        }
    }
}

/// The pattern of the `index`-th benchmark route, each with one capture.
pub fn route_pattern(index: usize) -> String {
    format!(r"/resource{index}/(\d+)")
}

/// A path matching [`route_pattern`] for `index`.
pub fn route_path(index: usize) -> String {
    format!("/resource{index}/42")
}

/// The name of the `index`-th benchmark column.
pub fn column(index: usize) -> String {
    format!("column_{index}")
}
