// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

//! Graph partitions, the local data of the connected components job.
//!
//! Partitions are stored in a plain text file with one section per node:
//!
//! ```text
//! 0
//! a:b
//! c:d
//! 1
//! a:bc
//! ```
//!
//! A line without a `:` names the node which owns the following adjacency
//! lines. An adjacency line `a:bc` declares vertex `a` with neighbors `b` and
//! `c`, every vertex is a single character. Blank lines are ignored.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::node::NodeSet;
use crate::{NodeName, PartitionErr};

#[cfg(test)]
mod tests;

/// A graph vertex
pub type Vertex = char;

/// A node name with the graph partition it owns
pub type Partition = (NodeName, Graph);

/// Errors reading, writing or installing graph partitions
#[derive(Debug)]
pub enum GraphErr {
    /// The file could not be read or written
    Io(std::io::Error),
    /// An adjacency line appeared before any node name (1-based line number)
    MissingHeader(usize),
    /// A line is neither a node name nor a valid adjacency line
    MalformedLine {
        /// 1-based line number
        line: usize,
        /// The offending line
        content: String,
    },
    /// The same node owns two sections
    DuplicatePartition(NodeName),
    /// The input contains no partition at all
    Empty,
    /// A section names a node which is not part of the network
    UnknownNode(NodeName),
    /// A node already holds a partition
    Partition(PartitionErr),
    /// A node name which cannot be written as a section header: empty,
    /// containing `:` or a line break, or with surrounding whitespace
    InvalidNodeName(NodeName),
    /// A vertex which cannot be written in an adjacency line: `:` or whitespace
    InvalidVertex(Vertex),
}

impl std::error::Error for GraphErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(inner) => Some(inner),
            Self::Partition(inner) => Some(inner),
            _ => None,
        }
    }
}

impl Display for GraphErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "Graph I/O failed: {err}"),
            Self::MissingHeader(line) => {
                write!(f, "Line {line}: adjacency list before any node name")
            }
            Self::MalformedLine { line, content } => {
                write!(f, "Line {line}: malformed adjacency list '{content}'")
            }
            Self::DuplicatePartition(node) => {
                write!(f, "Node '{node}' owns more than one partition")
            }
            Self::Empty => write!(f, "No graph partitions found"),
            Self::UnknownNode(node) => write!(f, "Node '{node}' is not part of the network"),
            Self::Partition(err) => write!(f, "{err}"),
            Self::InvalidNodeName(node) => {
                write!(f, "Node name '{node}' cannot be used as a partition header")
            }
            Self::InvalidVertex(vertex) => {
                write!(f, "Vertex {vertex:?} cannot be written in an adjacency list")
            }
        }
    }
}

impl From<std::io::Error> for GraphErr {
    fn from(value: std::io::Error) -> Self {
        GraphErr::Io(value)
    }
}

impl From<PartitionErr> for GraphErr {
    fn from(value: PartitionErr) -> Self {
        GraphErr::Partition(value)
    }
}

/// An adjacency list graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    adjacency: BTreeMap<Vertex, Vec<Vertex>>,
}

impl Graph {
    /// An empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `vertex` with edges to `neighbors`. Declaring a vertex twice
    /// extends its neighbor list.
    pub fn add_vertex(&mut self, vertex: Vertex, neighbors: impl IntoIterator<Item = Vertex>) {
        self.adjacency.entry(vertex).or_default().extend(neighbors);
    }

    /// The declared neighbors of `vertex`
    pub fn neighbors(&self, vertex: Vertex) -> &[Vertex] {
        self.adjacency
            .get(&vertex)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterate the declared vertices with their neighbors, ordered by vertex
    pub fn iter(&self) -> impl Iterator<Item = (Vertex, &[Vertex])> {
        self.adjacency
            .iter()
            .map(|(vertex, neighbors)| (*vertex, neighbors.as_slice()))
    }

    /// The number of declared vertices
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Determine if no vertex is declared
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Count the connected components, treating every edge as undirected.
    /// Vertices which only appear as a neighbor are part of the graph too.
    pub fn connected_components(&self) -> usize {
        let mut undirected: BTreeMap<Vertex, BTreeSet<Vertex>> = BTreeMap::new();
        for (vertex, neighbors) in self.iter() {
            undirected.entry(vertex).or_default();
            for &neighbor in neighbors {
                undirected.entry(vertex).or_default().insert(neighbor);
                undirected.entry(neighbor).or_default().insert(vertex);
            }
        }

        let mut visited = HashSet::with_capacity(undirected.len());
        let mut components = 0;
        for &start in undirected.keys() {
            if !visited.insert(start) {
                continue;
            }
            components += 1;

            let mut stack = vec![start];
            while let Some(vertex) = stack.pop() {
                for &next in &undirected[&vertex] {
                    if visited.insert(next) {
                        stack.push(next);
                    }
                }
            }
        }
        components
    }
}

impl FromIterator<(Vertex, Vec<Vertex>)> for Graph {
    fn from_iter<T: IntoIterator<Item = (Vertex, Vec<Vertex>)>>(iter: T) -> Self {
        let mut graph = Graph::new();
        for (vertex, neighbors) in iter {
            graph.add_vertex(vertex, neighbors);
        }
        graph
    }
}

fn parse_adjacency(line: &str, number: usize) -> Result<(Vertex, Vec<Vertex>), GraphErr> {
    let malformed = || GraphErr::MalformedLine {
        line: number,
        content: line.to_string(),
    };

    let (vertex, neighbors) = line.split_once(':').ok_or_else(malformed)?;
    let mut vertex_chars = vertex.trim().chars();
    let (Some(vertex), None) = (vertex_chars.next(), vertex_chars.next()) else {
        return Err(malformed());
    };
    let neighbors = neighbors.chars().filter(|c| !c.is_whitespace()).collect();
    Ok((vertex, neighbors))
}

/// Parse the partitions of a graph file, in file order
pub fn parse_partitions<R: BufRead>(reader: R) -> Result<Vec<Partition>, GraphErr> {
    let mut partitions: Vec<Partition> = Vec::new();
    let mut seen = HashSet::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let number = i + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if !trimmed.contains(':') {
            let name = trimmed.to_string();
            if !seen.insert(name.clone()) {
                return Err(GraphErr::DuplicatePartition(name));
            }
            partitions.push((name, Graph::new()));
            continue;
        }

        let (vertex, neighbors) = parse_adjacency(trimmed, number)?;
        match partitions.last_mut() {
            Some((_, graph)) => graph.add_vertex(vertex, neighbors),
            None => return Err(GraphErr::MissingHeader(number)),
        }
    }

    if partitions.is_empty() {
        return Err(GraphErr::Empty);
    }
    Ok(partitions)
}

fn check_node_name(name: &str) -> Result<(), GraphErr> {
    if name.is_empty() || name.contains([':', '\n', '\r']) || name.trim() != name {
        return Err(GraphErr::InvalidNodeName(name.to_string()));
    }
    Ok(())
}

fn check_vertex(vertex: Vertex) -> Result<(), GraphErr> {
    if vertex == ':' || vertex.is_whitespace() {
        return Err(GraphErr::InvalidVertex(vertex));
    }
    Ok(())
}

/// Write partitions in the format [parse_partitions] reads.
///
/// Everything is validated before the first byte is written, names and
/// vertices which would not read back the same are rejected with
/// [GraphErr::InvalidNodeName] or [GraphErr::InvalidVertex].
pub fn write_partitions<W: Write>(mut writer: W, partitions: &[Partition]) -> Result<(), GraphErr> {
    for (node, graph) in partitions {
        check_node_name(node)?;
        for (vertex, neighbors) in graph.iter() {
            check_vertex(vertex)?;
            neighbors.iter().try_for_each(|&neighbor| check_vertex(neighbor))?;
        }
    }

    for (node, graph) in partitions {
        writeln!(writer, "{node}")?;
        for (vertex, neighbors) in graph.iter() {
            let neighbors = neighbors.iter().collect::<String>();
            writeln!(writer, "{vertex}:{neighbors}")?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Install partitions on the nodes they name
///
/// Returns the number of installed partitions. Fails on the first partition
/// naming an unknown node, or a node which already holds data.
pub fn install_partitions(nodes: &NodeSet, partitions: Vec<Partition>) -> Result<usize, GraphErr> {
    let count = partitions.len();
    for (name, graph) in partitions {
        let node = nodes
            .get(&name)
            .ok_or_else(|| GraphErr::UnknownNode(name.clone()))?;
        node.set_partition(graph)?;
        log::debug!("Installed graph partition on node '{name}'");
    }
    Ok(count)
}

/// Read a graph file and install its partitions on the network's nodes. Must
/// complete before any job reading the partitions runs.
pub fn load_partitions(path: impl AsRef<Path>, nodes: &NodeSet) -> Result<usize, GraphErr> {
    let path = path.as_ref();
    let partitions = parse_partitions(BufReader::new(File::open(path)?))?;
    let installed = install_partitions(nodes, partitions)?;
    log::info!(
        "Loaded {installed} graph partitions from '{}'",
        path.display()
    );
    Ok(installed)
}

/// Give every node a copy of `graph`
pub fn generate_partitions(node_names: &[NodeName], graph: &Graph) -> Vec<Partition> {
    node_names
        .iter()
        .map(|name| (name.clone(), graph.clone()))
        .collect()
}

/// The two-component graph `a - b`, `c - d`
pub fn two_component_graph() -> Graph {
    [('a', vec!['b']), ('c', vec!['d'])].into_iter().collect()
}

/// Write a test graph file in which every node owns a [two_component_graph].
/// Node names are validated before the file is created.
pub fn create_test_graphs(path: impl AsRef<Path>, node_names: &[NodeName]) -> Result<(), GraphErr> {
    node_names.iter().try_for_each(|name| check_node_name(name))?;
    let partitions = generate_partitions(node_names, &two_component_graph());
    let file = File::create(path)?;
    write_partitions(BufWriter::new(file), &partitions)
}

/// The connected component count over all partitions, computed sequentially.
/// This is the reference the distributed computation must match.
pub fn count_components_sequentially(partitions: &[Partition]) -> usize {
    partitions
        .iter()
        .map(|(_, graph)| graph.connected_components())
        .sum()
}
