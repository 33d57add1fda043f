//! Segment tree behind the [`Router`](super::Router).
//!
//! Patterns are split on `/` into literal, `:variable` and `**` wildcard segments. Each node owns
//! its children; within one parent there is at most one node per distinct segment. Matching walks
//! the request path depth by depth, weighting literal matches over variables over wildcards. A
//! wildcard ends the walk at its depth.

use http::Method;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

const LITERAL_WEIGHT: f32 = 1.0;
const VARIABLE_WEIGHT: f32 = 0.5;
const WILDCARD_WEIGHT: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    Variable(String),
    Wildcard,
}

impl Segment {
    pub fn parse(raw: &str) -> Self {
        if raw == "**" {
            Segment::Wildcard
        } else if let Some(name) = raw.strip_prefix(':') {
            Segment::Variable(name.to_owned())
        } else {
            Segment::Literal(raw.to_owned())
        }
    }

    /// The weight of matching `path_segment`; variables never match an empty segment.
    fn weight(&self, path_segment: &str) -> Option<f32> {
        match self {
            Segment::Literal(literal) => (literal == path_segment).then_some(LITERAL_WEIGHT),
            Segment::Variable(_) => (!path_segment.is_empty()).then_some(VARIABLE_WEIGHT),
            Segment::Wildcard => Some(WILDCARD_WEIGHT),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(literal) => f.write_str(literal),
            Segment::Variable(name) => write!(f, ":{name}"),
            Segment::Wildcard => f.write_str("**"),
        }
    }
}

/// Splits a pattern into segments; the root pattern is a single empty literal.
pub fn parse_pattern(pattern: &str) -> Vec<Segment> {
    let segments: Vec<Segment> = pattern.split('/').filter(|s| !s.is_empty()).map(Segment::parse).collect();
    if segments.is_empty() { vec![Segment::Literal(String::new())] } else { segments }
}

/// A handler registered at a node, with the pattern it was registered under.
#[derive(Debug)]
pub struct Route<H> {
    handler: H,
    pattern: String,
    segments: Vec<Segment>,
}

impl<H> Route<H> {
    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Pairs each `:name` of the pattern with the path segment at the same position.
    pub fn bindings<'r, 'p>(&'r self, path: &'p [String]) -> impl Iterator<Item = (&'r str, &'p str)> {
        self.segments.iter().zip(path).filter_map(|(segment, value)| match segment {
            Segment::Variable(name) => Some((name.as_str(), value.as_str())),
            _ => None,
        })
    }
}

#[derive(Debug)]
pub struct RouteNode<H> {
    segment: Segment,
    order: usize,
    methods: HashMap<Method, Route<H>>,
    any: Option<Route<H>>,
    children: Vec<RouteNode<H>>,
}

impl<H> RouteNode<H> {
    fn new(segment: Segment, order: usize) -> Self {
        Self { segment, order, methods: HashMap::new(), any: None, children: Vec::new() }
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn children(&self) -> &[RouteNode<H>] {
        &self.children
    }

    /// The route for `method`, falling back to the any-method route.
    pub fn route(&self, method: &Method) -> Option<&Route<H>> {
        self.methods.get(method).or(self.any.as_ref())
    }

    fn is_wildcard(&self) -> bool {
        self.segment == Segment::Wildcard
    }
}

/// A node reached by the search, with the weight of its own segment and of the whole path to it.
#[derive(Debug)]
pub struct RouteMatch<'t, H> {
    node: &'t RouteNode<H>,
    weight: f32,
    path_weight: f32,
}

impl<'t, H> RouteMatch<'t, H> {
    pub fn node(&self) -> &'t RouteNode<H> {
        self.node
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    fn rank(&self, other: &Self) -> Ordering {
        other
            .weight
            .total_cmp(&self.weight)
            .then_with(|| other.path_weight.total_cmp(&self.path_weight))
            .then_with(|| self.node.order.cmp(&other.node.order))
    }
}

#[derive(Debug)]
pub struct RouteTree<H> {
    roots: Vec<RouteNode<H>>,
    nodes: usize,
}

impl<H> Default for RouteTree<H> {
    fn default() -> Self {
        Self { roots: Vec::new(), nodes: 0 }
    }
}

impl<H> RouteTree<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes == 0
    }

    /// Registers `handler` for `method` (any method when `None`). Re-registering overwrites.
    pub fn insert(&mut self, method: Option<Method>, pattern: &str, handler: H) {
        let segments = parse_pattern(pattern);
        let route = Route { handler, pattern: pattern.trim_matches('/').to_owned(), segments: segments.clone() };

        // parse_pattern never returns an empty list
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut children = &mut self.roots;
        for segment in parents {
            children = &mut child_mut(children, segment.clone(), &mut self.nodes).children;
        }
        let node = child_mut(children, last.clone(), &mut self.nodes);

        match method {
            Some(method) => {
                node.methods.insert(method, route);
            }
            None => node.any = Some(route),
        }
    }

    /// Finds every node the path can end at, best first.
    ///
    /// The path is walked depth by depth. A wildcard matched at some depth consumes the rest of the
    /// path and ends the walk there; only nodes matched at that depth compete, and other segments
    /// only when the path ends at that depth too. Matches are ordered by the weight of their last
    /// segment, then by the summed weight of the whole path, then by creation order.
    pub fn search(&self, path: &[String]) -> Vec<RouteMatch<'_, H>> {
        let root_path = [String::new()];
        let path = if path.is_empty() { &root_path[..] } else { path };

        let mut candidates: Vec<(&RouteNode<H>, f32)> = self.roots.iter().map(|node| (node, 0.0)).collect();
        let mut matched: Vec<RouteMatch<'_, H>> = Vec::new();

        for (depth, path_segment) in path.iter().enumerate() {
            let last = depth + 1 == path.len();
            matched = candidates
                .iter()
                .filter_map(|&(node, path_weight)| {
                    let weight = node.segment.weight(path_segment)?;
                    Some(RouteMatch { node, weight, path_weight: path_weight + weight })
                })
                .collect();

            if matched.iter().any(|found| found.node.is_wildcard()) {
                if !last {
                    matched.retain(|found| found.node.is_wildcard());
                    matched.sort_by(RouteMatch::rank);
                    return matched;
                }
                break;
            }

            if !last {
                candidates = matched
                    .iter()
                    .flat_map(|found| found.node.children.iter().map(move |child| (child, found.path_weight)))
                    .collect();
            }
        }

        // the path ended on these nodes; a wildcard below them matches nothing
        let wildcards: Vec<RouteMatch<'_, H>> = matched
            .iter()
            .filter(|found| !found.node.is_wildcard())
            .flat_map(|found| {
                found.node.children.iter().filter(|child| child.is_wildcard()).map(move |child| RouteMatch {
                    node: child,
                    weight: WILDCARD_WEIGHT,
                    path_weight: found.path_weight + WILDCARD_WEIGHT,
                })
            })
            .collect();
        matched.extend(wildcards);
        matched.sort_by(RouteMatch::rank);
        matched
    }
}

fn child_mut<'a, H>(children: &'a mut Vec<RouteNode<H>>, segment: Segment, nodes: &mut usize) -> &'a mut RouteNode<H> {
    let index = match children.iter().position(|child| child.segment == segment) {
        Some(index) => index,
        None => {
            children.push(RouteNode::new(segment, *nodes));
            *nodes += 1;
            children.len() - 1
        }
    };
    &mut children[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(raw: &str) -> Vec<String> {
        raw.split('/').filter(|s| !s.is_empty()).map(str::to_owned).collect()
    }

    fn tree(patterns: &[&'static str]) -> RouteTree<&'static str> {
        let mut tree = RouteTree::new();
        for pattern in patterns {
            tree.insert(Some(Method::GET), pattern, *pattern);
        }
        tree
    }

    fn resolve(tree: &RouteTree<&'static str>, raw: &str) -> Option<&'static str> {
        tree.search(&path(raw)).iter().find_map(|found| found.node().route(&Method::GET)).map(|route| *route.handler())
    }

    #[test]
    fn parses_segments() {
        assert_eq!(
            parse_pattern("/users/:id/**"),
            vec![Segment::Literal("users".into()), Segment::Variable("id".into()), Segment::Wildcard]
        );
        assert_eq!(parse_pattern("/"), vec![Segment::Literal(String::new())]);
        assert_eq!(parse_pattern("/a/"), parse_pattern("a"));
    }

    #[test]
    fn literal_beats_variable() {
        let tree = tree(&["/a/:x", "/a/literal", "/users/:id", "/users/active"]);

        assert_eq!(resolve(&tree, "/a/literal"), Some("/a/literal"));
        assert_eq!(resolve(&tree, "/a/other"), Some("/a/:x"));
        assert_eq!(resolve(&tree, "/users/active"), Some("/users/active"));
        assert_eq!(resolve(&tree, "/users/42"), Some("/users/:id"));
    }

    #[test]
    fn whole_path_weight_breaks_ties() {
        let tree = tree(&["/:kind/list", "/users/list"]);
        assert_eq!(resolve(&tree, "/users/list"), Some("/users/list"));
        assert_eq!(resolve(&tree, "/groups/list"), Some("/:kind/list"));
    }

    #[test]
    fn equal_weights_keep_registration_order() {
        let tree = tree(&["/items/:id", "/items/:slug"]);
        assert_eq!(resolve(&tree, "/items/9"), Some("/items/:id"));
    }

    #[test]
    fn wildcard_matches_the_rest() {
        let tree = tree(&["/files/**", "/files/:id/meta"]);

        assert_eq!(resolve(&tree, "/files/a/b/c"), Some("/files/**"));
        assert_eq!(resolve(&tree, "/files/a"), Some("/files/**"));
        assert_eq!(resolve(&tree, "/files"), Some("/files/**"));
        assert_eq!(resolve(&tree, "/files/7/meta"), Some("/files/**"));
    }

    #[test]
    fn wildcard_consumes_deeper_routes() {
        let tree = tree(&["/files/**", "/files/a/b"]);
        assert_eq!(resolve(&tree, "/files/a/b"), Some("/files/**"));
    }

    #[test]
    fn literal_ending_beside_a_wildcard_wins() {
        let tree = tree(&["/files/**", "/files/upload"]);

        assert_eq!(resolve(&tree, "/files/upload"), Some("/files/upload"));
        assert_eq!(resolve(&tree, "/files/upload/x"), Some("/files/**"));
    }

    #[test]
    fn shallow_wildcard_wins() {
        let tree = tree(&["/**", "/docs/**"]);

        assert_eq!(resolve(&tree, "/docs/a/b"), Some("/**"));
        assert_eq!(resolve(&tree, "/docs"), Some("/docs/**"));
        assert_eq!(resolve(&tree, "/other"), Some("/**"));
        assert_eq!(resolve(&tree, "/"), Some("/**"));
    }

    #[test]
    fn root_route() {
        let tree = tree(&["/", "/:id"]);

        assert_eq!(resolve(&tree, ""), Some("/"));
        assert_eq!(resolve(&tree, "/x"), Some("/:id"));
    }

    #[test]
    fn unmatched_path() {
        let tree = tree(&["/a/b"]);

        assert_eq!(resolve(&tree, "/a"), None);
        assert_eq!(resolve(&tree, "/a/b/c"), None);
        assert!(tree.search(&path("/z")).is_empty());
    }

    #[test]
    fn methods_and_overwrite() {
        let mut tree = RouteTree::new();
        tree.insert(Some(Method::GET), "/x", "get");
        tree.insert(None, "/x", "any");
        tree.insert(Some(Method::GET), "/x/", "get again");

        assert_eq!(tree.len(), 1);

        let matches = tree.search(&path("/x"));
        let node = matches[0].node();
        assert_eq!(node.route(&Method::GET).map(|r| *r.handler()), Some("get again"));
        assert_eq!(node.route(&Method::DELETE).map(|r| *r.handler()), Some("any"));
    }

    #[test]
    fn bindings_follow_pattern_positions() {
        let mut tree = RouteTree::new();
        tree.insert(Some(Method::GET), "/orgs/:org/users/:id", ());

        let path = path("/orgs/acme/users/42");
        let matches = tree.search(&path);
        let route = matches[0].node().route(&Method::GET).unwrap();

        assert_eq!(route.pattern(), "orgs/:org/users/:id");
        assert_eq!(route.bindings(&path).collect::<Vec<_>>(), vec![("org", "acme"), ("id", "42")]);
    }
}
