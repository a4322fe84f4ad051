// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

use std::sync::Arc;

use bytes::Bytes;

use super::*;
use crate::graph::two_component_graph;

#[test]
fn test_builtin_registry() {
    let registry = builtin_registry();
    assert_eq!(
        vec![COUNT_CONNECTED_COMPONENTS, COUNT_NODES],
        registry.registered()
    );

    let mut registry = builtin_registry();
    assert_eq!(
        Err(RegistryErr::AlreadyRegistered(COUNT_NODES.to_string())),
        register_builtins(&mut registry)
    );
}

#[test]
fn test_sum_replies() {
    let replies = vec![Reply::success("1"), Reply::success("41"), Reply::success(" 2 ")];
    assert_eq!(Bytes::from_static(b"44"), sum_replies(&replies));

    let with_garbage = vec![Reply::success("3"), Reply::success("x"), Reply::failure()];
    assert_eq!(Bytes::from_static(b"3"), sum_replies(&with_garbage));

    assert_eq!(Bytes::from_static(b"0"), sum_replies(&[]));
}

#[test]
fn test_parse_count() {
    assert_eq!(Some(12), parse_count(b"12"));
    assert_eq!(None, parse_count(b""));
    assert_eq!(None, parse_count(b"-1"));
    assert_eq!(None, parse_count(&[0xff, 0xfe]));
}

#[tokio::test]
async fn test_count_nodes_steps() {
    let node = Node::standalone("n", Arc::new(builtin_registry()));
    assert_eq!(Bytes::from_static(b"1"), CountNodes.map(&node, Bytes::new()).await);
    assert_eq!(
        Bytes::from_static(b"3"),
        CountNodes
            .reduce(&node, vec![Reply::success("1"); 3])
            .await
    );
}

#[tokio::test]
async fn test_connected_components_map() {
    let node = Node::standalone("n", Arc::new(builtin_registry()));
    // no partition yet
    assert!(CountConnectedComponents
        .map(&node, Bytes::new())
        .await
        .is_empty());

    node.set_partition(two_component_graph()).unwrap();
    assert_eq!(
        Bytes::from_static(b"2"),
        CountConnectedComponents.map(&node, Bytes::new()).await
    );
}
