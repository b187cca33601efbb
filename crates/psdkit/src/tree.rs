/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Layer group reconstruction
//!
//! Layer records carry no parent links. Groups are recovered from the flat
//! list: walking it top most first, a layer flagged as pixel data
//! irrelevant opens a group and a divider layer named like
//! `</Layer group>` closes the innermost open one.
//!
//! The divider names are a convention of the Photoshop versions that
//! write them, not part of the file format, so this is best effort.
use alloc::vec::Vec;

use crate::layer::Layer;

/// Names of the hidden layers closing a group
const GROUP_END_NAMES: [&str; 2] = ["</Layer set>", "</Layer group>"];

/// A layer and, for groups, its children in top most first order
#[derive(Debug, Clone, PartialEq)]
pub struct LayerNode<'a> {
    pub layer:    &'a Layer,
    pub children: Vec<LayerNode<'a>>
}

impl<'a> LayerNode<'a> {
    fn new(layer: &'a Layer) -> LayerNode<'a> {
        LayerNode {
            layer,
            children: Vec::new()
        }
    }
    pub fn is_group(&self) -> bool {
        self.layer.is_group_marker()
    }
    /// Count this node and everything below it
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(LayerNode::len).sum::<usize>()
    }
}

/// Returns true for the hidden layers that close a group
pub fn is_group_end(layer: &Layer) -> bool {
    GROUP_END_NAMES.iter().any(|x| layer.name.contains(x))
        || (layer.name == " copy" && layer.height() == 0)
}

fn attach<'a>(node: LayerNode<'a>, stack: &mut [LayerNode<'a>], roots: &mut Vec<LayerNode<'a>>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node)
    }
}

/// Build the group tree from layers in file order (bottom most first)
///
/// Layers with an empty rectangle that neither open nor close a group are
/// left out. Groups still open at the end are closed into their parents,
/// an outermost one only shows up if it has children.
pub fn build_layer_tree(layers: &[Layer]) -> Vec<LayerNode<'_>> {
    let mut roots = Vec::new();
    let mut stack: Vec<LayerNode> = Vec::new();

    for layer in layers.iter().rev() {
        if is_group_end(layer) {
            if let Some(group) = stack.pop() {
                attach(group, &mut stack, &mut roots);
            }
        } else if layer.is_group_marker() {
            stack.push(LayerNode::new(layer));
        } else if !layer.is_empty() {
            attach(LayerNode::new(layer), &mut stack, &mut roots);
        }
    }

    while let Some(group) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(group),
            None if !group.children.is_empty() => roots.push(group),
            None => ()
        }
    }
    roots
}
