/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The decoded document
use alloc::string::String;
use alloc::vec::Vec;

use psdkit_core::bit_depth::BitDepth;

use crate::constants::{resource_ids, ColorModes, CompressionMethod};
use crate::layer::{ExtraData, Layer};
use crate::resources::{Resource, ResourceKind, ResolutionInfo, Thumbnail, XmpMetadata};
use crate::tree::{build_layer_tree, LayerNode};

/// A decoded PSD document
///
/// Built once by [`PsdDecoder::decode`](crate::PsdDecoder::decode) and
/// independent of the input buffer afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub width:              usize,
    pub height:             usize,
    pub depth:              BitDepth,
    /// Channels of the merged image, 1 to 24
    pub channels:           u16,
    pub color_mode:         ColorModes,
    /// Palette for indexed documents, duotone specification for duotone
    /// ones, empty otherwise
    pub color_mode_data:    Vec<u8>,
    pub resources:          Vec<Resource>,
    /// Layers in file order, bottom most first
    pub layers:             Vec<Layer>,
    /// Set when the layer count was stored negative, the first alpha
    /// channel then holds the merged transparency
    pub absolute_alpha:     bool,
    /// Global layer mask info, kept raw
    pub global_mask:        Vec<u8>,
    /// Tagged blocks following the global layer mask
    pub global_extra_data:  Vec<ExtraData>,
    pub merged_compression: Option<CompressionMethod>,
    /// Merged image planes, one per channel, `height * columns` bytes each
    pub merged:             Vec<Vec<u8>>
}

impl Document {
    /// Bytes per row of a merged plane
    pub const fn columns(&self) -> usize {
        self.depth.columns(self.width)
    }

    /// First resource with the given id
    pub fn resource(&self, id: u16) -> Option<&Resource> {
        self.resources.iter().find(|x| x.id == id)
    }

    pub fn resolution(&self) -> Option<&ResolutionInfo> {
        match &self.resource(resource_ids::RESOLUTION_INFO)?.kind {
            ResourceKind::ResolutionInfo(info) => Some(info),
            _ => None
        }
    }

    /// Embedded preview, the current format is preferred over the legacy one
    pub fn thumbnail(&self) -> Option<&Thumbnail> {
        [resource_ids::THUMBNAIL, resource_ids::THUMBNAIL_LEGACY]
            .iter()
            .filter_map(|id| self.resource(*id))
            .find_map(|x| match &x.kind {
                ResourceKind::Thumbnail(thumb) => Some(thumb),
                _ => None
            })
    }

    pub fn xmp(&self) -> Option<&XmpMetadata> {
        match &self.resource(resource_ids::XMP_METADATA)?.kind {
            ResourceKind::XmpMetadata(xmp) => Some(xmp),
            _ => None
        }
    }

    /// `photoshop:Category` from the XMP metadata
    pub fn category(&self) -> Option<&str> {
        self.xmp()?.category.as_deref()
    }

    pub fn alpha_channel_names(&self) -> Option<&[String]> {
        match &self.resource(resource_ids::ALPHA_CHANNEL_NAMES)?.kind {
            ResourceKind::AlphaChannelNames(names) => Some(names),
            _ => None
        }
    }

    /// Group the layers into a tree, see [`build_layer_tree`]
    pub fn layer_tree(&self) -> Vec<LayerNode<'_>> {
        build_layer_tree(&self.layers)
    }
}
