/// Tree of relation names parsed from `connections=client.phones,contractorsList`.
///
/// Paths are separated by `,`; segments within a path by `.` or `/`.
/// Paths sharing a prefix are merged, so `client,client.phones` loads
/// `client` once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionGraph {
    nodes: Vec<ConnectionNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionNode {
    pub name: String,
    pub children: ConnectionGraph,
}

impl ConnectionGraph {
    pub fn parse(raw: &str) -> Self {
        let mut graph = ConnectionGraph::default();
        for path in raw.split(',') {
            let segments: Vec<&str> = path
                .split(['.', '/'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            graph.insert(&segments);
        }
        graph
    }

    fn insert(&mut self, segments: &[&str]) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };
        let position = match self.nodes.iter().position(|n| n.name == *first) {
            Some(position) => position,
            None => {
                self.nodes.push(ConnectionNode { name: first.to_string(), children: ConnectionGraph::default() });
                self.nodes.len() - 1
            }
        };
        self.nodes[position].children.insert(rest);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[ConnectionNode] {
        &self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_paths_with_either_separator() {
        let graph = ConnectionGraph::parse("a,b.c,b/d");
        let names: Vec<&str> = graph.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(graph.nodes()[0].children.is_empty());
        let nested: Vec<&str> = graph.nodes()[1].children.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(nested, vec!["c", "d"]);
    }

    #[test]
    fn blank_segments_are_skipped() {
        assert!(ConnectionGraph::parse("").is_empty());
        assert!(ConnectionGraph::parse(" , ..").is_empty());
        assert_eq!(ConnectionGraph::parse("client,,client").nodes().len(), 1);
    }
}
