// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use super::*;
use crate::node::NodeSettings;
use crate::registry::MethodRegistry;

fn graph(edges: &[(Vertex, &str)]) -> Graph {
    edges
        .iter()
        .map(|(vertex, neighbors)| (*vertex, neighbors.chars().collect()))
        .collect()
}

fn node_set(count: usize) -> Arc<NodeSet> {
    NodeSet::build(
        (0..count).map(|i| i.to_string()).collect(),
        Arc::new(MethodRegistry::new()),
        NodeSettings::default(),
    )
    .unwrap()
}

#[test]
fn test_connected_components() {
    assert_eq!(0, Graph::new().connected_components());
    assert_eq!(1, graph(&[('a', "a")]).connected_components());
    assert_eq!(2, two_component_graph().connected_components());
    assert_eq!(1, graph(&[('a', "bc"), ('b', "a"), ('g', "b")]).connected_components());
    assert_eq!(3, graph(&[('a', ""), ('b', ""), ('c', "")]).connected_components());
}

#[test]
fn test_edges_are_undirected() {
    // `b` only points back at `a`, the direction must not split the component
    assert_eq!(1, graph(&[('b', "a"), ('a', "")]).connected_components());
    assert_eq!(1, graph(&[('a', "b"), ('c', "b")]).connected_components());
}

#[test]
fn test_random_disjoint_chains() {
    let mut rng = rand::thread_rng();
    let mut alphabet = ('a'..='z').collect::<Vec<_>>();

    for _ in 0..20 {
        alphabet.shuffle(&mut rng);
        let chains = rng.gen_range(1..=5);
        let mut g = Graph::new();
        for chain in alphabet.chunks(26 / chains).take(chains) {
            for pair in chain.windows(2) {
                g.add_vertex(pair[0], [pair[1]]);
            }
        }
        assert_eq!(chains, g.connected_components());
    }
}

#[test]
fn test_parse_partitions() {
    let input = "0\na:b\nc:d\n\n1\na:bc\n";
    let partitions = parse_partitions(input.as_bytes()).expect("Valid input");

    assert_eq!(2, partitions.len());
    assert_eq!("0", partitions[0].0);
    assert_eq!(graph(&[('a', "b"), ('c', "d")]), partitions[0].1);
    assert_eq!("1", partitions[1].0);
    assert_eq!(&['b', 'c'], partitions[1].1.neighbors('a'));
}

#[test]
fn test_parse_errors() {
    assert!(matches!(
        parse_partitions("a:b\n".as_bytes()),
        Err(GraphErr::MissingHeader(1))
    ));
    assert!(matches!(
        parse_partitions("0\nab:c\n".as_bytes()),
        Err(GraphErr::MalformedLine { line: 2, .. })
    ));
    assert!(matches!(
        parse_partitions("0\n:c\n".as_bytes()),
        Err(GraphErr::MalformedLine { line: 2, .. })
    ));
    assert!(matches!(
        parse_partitions("0\na:b\n0\n".as_bytes()),
        Err(GraphErr::DuplicatePartition(name)) if name == "0"
    ));
    assert!(matches!(
        parse_partitions("\n\n".as_bytes()),
        Err(GraphErr::Empty)
    ));
}

#[test]
fn test_write_then_parse() {
    let names = vec!["n0".to_string(), "n1".to_string()];
    let partitions = vec![
        (names[0].clone(), graph(&[('a', "bc"), ('x', "")])),
        (names[1].clone(), two_component_graph()),
    ];

    let mut buffer = Vec::new();
    write_partitions(&mut buffer, &partitions).expect("Writing to memory");
    assert_eq!(partitions, parse_partitions(buffer.as_slice()).unwrap());
}

#[test]
fn test_unreadable_names_are_not_written() {
    for name in ["n:1", " padded ", "", "trailing\t", "two\nlines"] {
        let partitions = vec![(name.to_string(), two_component_graph())];
        let mut buffer = Vec::new();
        assert!(
            matches!(
                write_partitions(&mut buffer, &partitions),
                Err(GraphErr::InvalidNodeName(ref invalid)) if invalid == name
            ),
            "name {name:?}"
        );
        assert!(buffer.is_empty(), "name {name:?}");
    }

    for vertex in [':', ' ', '\n'] {
        for broken in [graph(&[(vertex, "a")]), graph(&[('a', vertex.to_string().as_str())])] {
            let mut buffer = Vec::new();
            assert!(
                matches!(
                    write_partitions(&mut buffer, &[("0".to_string(), broken)]),
                    Err(GraphErr::InvalidVertex(v)) if v == vertex
                ),
                "vertex {vertex:?}"
            );
        }
    }

    let path = std::env::temp_dir().join(format!(
        "distgraph_invalid_names_{}.txt",
        std::process::id()
    ));
    assert!(matches!(
        create_test_graphs(&path, &["ok".to_string(), "not:ok".to_string()]),
        Err(GraphErr::InvalidNodeName(_))
    ));
    assert!(!path.exists());
}

#[test]
fn test_written_names_read_back() {
    let names = ["0", "node-1", "with inner space", "ünïcode"];
    let partitions = names
        .iter()
        .map(|name| (name.to_string(), two_component_graph()))
        .collect::<Vec<_>>();

    let mut buffer = Vec::new();
    write_partitions(&mut buffer, &partitions).expect("Valid names");
    let parsed = parse_partitions(buffer.as_slice()).expect("Written files parse");
    assert_eq!(
        names.to_vec(),
        parsed.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>()
    );
    assert_eq!(partitions, parsed);
}

#[test]
fn test_install_partitions() {
    let nodes = node_set(3);
    let partitions = generate_partitions(&nodes.names(), &two_component_graph());

    assert_eq!(3, install_partitions(&nodes, partitions).unwrap());
    for node in nodes.iter() {
        assert_eq!(Some(&two_component_graph()), node.partition::<Graph>());
    }

    // partitions are write-once
    let again = generate_partitions(&["0".to_string()], &Graph::new());
    assert!(matches!(
        install_partitions(&nodes, again),
        Err(GraphErr::Partition(PartitionErr::AlreadySet(_)))
    ));
}

#[test]
fn test_install_unknown_node() {
    let nodes = node_set(2);
    let partitions = generate_partitions(&["7".to_string()], &Graph::new());
    assert!(matches!(
        install_partitions(&nodes, partitions),
        Err(GraphErr::UnknownNode(name)) if name == "7"
    ));
}

#[test]
fn test_load_test_graphs_from_file() {
    let path = std::env::temp_dir().join(format!(
        "distgraph_test_graphs_{}.txt",
        std::process::id()
    ));
    let nodes = node_set(4);

    create_test_graphs(&path, &nodes.names()).expect("Failed to write test graphs");
    assert_eq!(4, load_partitions(&path, &nodes).expect("Failed to load"));

    let partitions = parse_partitions(std::io::BufReader::new(
        std::fs::File::open(&path).unwrap(),
    ))
    .unwrap();
    assert_eq!(8, count_components_sequentially(&partitions));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_load_missing_file() {
    let nodes = node_set(1);
    assert!(matches!(
        load_partitions("/definitely/not/a/graph/file.txt", &nodes),
        Err(GraphErr::Io(_))
    ));
}
