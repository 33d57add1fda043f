/// One benchmark input: a route table to register and resolve against.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    file: RouteFile,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, file: RouteFile) -> Self {
        Self { name, group, file }
    }

    pub fn small(name: &'static str, file: RouteFile) -> Self {
        Self::new(name, TestGroup::Small, file)
    }

    pub fn large(name: &'static str, file: RouteFile) -> Self {
        Self::new(name, TestGroup::Large, file)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn file(&self) -> &RouteFile {
        &self.file
    }
}

/// A route table, one `METHOD /pattern` per line.
#[derive(Debug, Copy, Clone)]
pub struct RouteFile {
    file_name: &'static str,
    content: &'static str,
}

impl RouteFile {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }

    /// `(method, pattern)` pairs; blank lines are skipped.
    pub fn routes(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        self.content.lines().filter_map(|line| line.trim().split_once(' '))
    }

    /// A concrete path for every route, with variables and wildcards filled in.
    pub fn sample_paths(&self) -> Vec<String> {
        self.routes().map(|(_, pattern)| sample_path(pattern)).collect()
    }
}

/// `/users/:id/**` becomes `/users/id/a/b`.
pub fn sample_path(pattern: &str) -> String {
    let segments: Vec<&str> = pattern
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment {
            "**" => "a/b",
            variable if variable.starts_with(':') => &variable[1..],
            literal => literal,
        })
        .collect();
    format!("/{}", segments.join("/"))
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Large,
}
