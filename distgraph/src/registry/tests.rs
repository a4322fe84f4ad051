// Copyright (c) Sean Lawlor
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree.

//! Tests on the method registry

use std::sync::Arc;

use bytes::Bytes;

use super::{MethodRegistry, RegistryErr};
use crate::message::Reply;
use crate::node::Node;
use crate::RpcErr;

fn echo_registry() -> MethodRegistry {
    let mut registry = MethodRegistry::new();
    registry
        .register_fn(
            "Echo",
            |node, args| Bytes::from(format!("{}:{}", node.name(), String::from_utf8_lossy(args))),
            |_, replies| Bytes::from(replies.len().to_string()),
        )
        .expect("Failed to register echo job");
    registry
}

#[test]
fn test_basic_registration() {
    let registry = echo_registry();
    assert!(registry.contains("Echo"));
    assert!(registry.get("Echo").is_some());
    assert_eq!(vec!["Echo".to_string()], registry.registered());
}

#[test]
fn test_duplicate_registration() {
    let mut registry = echo_registry();
    let second = registry.register_fn("Echo", |_, _| Bytes::new(), |_, _| Bytes::new());
    assert_eq!(Err(RegistryErr::AlreadyRegistered("Echo".to_string())), second);
}

#[tokio::test]
async fn test_invoke_steps() {
    let registry = Arc::new(echo_registry());
    let node = Node::standalone("n0", registry.clone());

    let mapped = registry
        .invoke_map("Echo", &node, Bytes::from_static(b"hi"))
        .await
        .expect("Echo is registered");
    assert_eq!(Bytes::from_static(b"n0:hi"), mapped);

    let reduced = registry
        .invoke_reduce("Echo", &node, vec![Reply::success("a"), Reply::success("b")])
        .await
        .expect("Echo is registered");
    assert_eq!(Bytes::from_static(b"2"), reduced);
}

#[tokio::test]
async fn test_missing_method() {
    let registry = Arc::new(echo_registry());
    let node = Node::standalone("n0", registry.clone());

    assert!(registry.get("Missing").is_none());
    assert_eq!(
        Err(RpcErr::MethodNotFound("Missing".to_string())),
        registry.invoke_map("Missing", &node, Bytes::new()).await
    );
    assert_eq!(
        Err(RpcErr::MethodNotFound("Missing".to_string())),
        registry.invoke_reduce("Missing", &node, vec![]).await
    );
}

#[test]
fn test_registered_is_sorted() {
    let mut registry = MethodRegistry::new();
    for name in ["b", "c", "a"] {
        registry
            .register_fn(name, |_, _| Bytes::new(), |_, _| Bytes::new())
            .unwrap();
    }
    assert_eq!(vec!["a", "b", "c"], registry.registered());
}
