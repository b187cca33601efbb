/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fs::read;

use psdkit::color::{layer_to_rgba, merged_to_rgba};
use psdkit::constants::{resource_ids, ColorModes, CompressionMethod};
use psdkit::resources::ResourceKind;
use psdkit::text::Justification;
use psdkit::tree::LayerNode;
use psdkit::{Document, PsdDecodeErrors, PsdDecoder};
use psdkit_core::options::DecoderOptions;

use crate::builder::{pattern, Compression, TestChannel, TestDocument, TestLayer};
use crate::{fixture_path, hash};

/// Render a tree as `Group{Child,Child},Layer`
fn render_tree(nodes: &[LayerNode]) -> String {
    nodes
        .iter()
        .map(|node| {
            if node.children.is_empty() {
                node.layer.name.clone()
            } else {
                format!("{}{{{}}}", node.layer.name, render_tree(&node.children))
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn decode(desc: &TestDocument) -> Result<Document, PsdDecodeErrors> {
    PsdDecoder::new(&desc.to_bytes()).decode()
}

/// Compare a decoded document against its description, returning the
/// problems found
fn check_document(desc: &TestDocument, document: &Document) -> Vec<String> {
    let mut problems = Vec::new();

    if (document.width, document.height) != (desc.width as usize, desc.height as usize) {
        problems.push(format!(
            "dimensions {}x{}",
            document.width, document.height
        ));
    }
    if document.depth.bits() != desc.depth {
        problems.push(format!("depth {:?}", document.depth));
    }
    if document.absolute_alpha != desc.negative_count {
        problems.push(String::from("absolute alpha flag"));
    }
    for (index, plane) in document.merged.iter().enumerate() {
        if hash(plane) != hash(&desc.merged_plane(index as u16)) {
            problems.push(format!("merged plane {index}"));
        }
    }
    if document.merged.len() != usize::from(desc.channels) {
        problems.push(format!("{} merged planes", document.merged.len()));
    }
    if document.layers.len() != desc.layers.len() {
        problems.push(format!("{} layers", document.layers.len()));
        return problems;
    }
    for (layer, expected) in document.layers.iter().zip(&desc.layers) {
        let name = expected.unicode_name.as_ref().unwrap_or(&expected.name);

        if &layer.name != name {
            problems.push(format!("layer name {:?}, expected {:?}", layer.name, name));
        }
        for channel in &expected.channels {
            let pixels = layer.channel(channel.id).map(|x| x.pixels.as_slice());

            if pixels.map(hash) != Some(hash(&desc.layer_pixels(expected, channel))) {
                problems.push(format!("layer {name:?} channel {}", channel.id));
            }
        }
        if let Some(mask) = &layer.mask {
            let from_channel = layer.channel(-2).map(|x| x.pixels.as_slice());

            if mask.width() > 0 && from_channel != Some(mask.pixels.as_slice()) {
                problems.push(format!("layer {name:?} mask pixels"));
            }
        }
        let rgba = layer_to_rgba(document, layer);

        if rgba.map(|x| x.len()) != (!layer.is_empty()).then(|| layer.width() * layer.height() * 4) {
            problems.push(format!("layer {name:?} rgba size"));
        }
    }
    let tree = render_tree(&document.layer_tree());

    if tree != desc.tree {
        problems.push(format!("tree {tree:?}, expected {:?}", desc.tree));
    }
    problems
}

#[test]
fn test_psd() {
    let file = fixture_path().join("psd.json");

    let json_file = read(file).unwrap();

    let documents: Vec<TestDocument> = serde_json::from_slice(&json_file).unwrap();

    let mut failures = Vec::new();

    for desc in &documents {
        match decode(desc) {
            Ok(document) => {
                let problems = check_document(desc, &document);

                if !problems.is_empty() {
                    eprintln!("{}: {:#?}\n", desc.name, problems);
                    failures.push(desc.name.clone());
                }
            }
            Err(err) => {
                eprintln!("{}: could not decode, {:?}\n", desc.name, err);
                failures.push(desc.name.clone());
            }
        }
    }
    if !failures.is_empty() {
        panic!("Errors found during test decoding\n {:#?}", failures);
    }
}

fn plain_document(layers: Vec<TestLayer>) -> TestDocument {
    TestDocument {
        name:            String::from("inline"),
        width:           4,
        height:          4,
        depth:           8,
        mode:            3,
        channels:        3,
        compression:     Compression::Raw,
        color_mode_data: Vec::new(),
        resources:       Vec::new(),
        negative_count:  false,
        layers,
        merged:          None,
        tree:            String::new(),
        comment:         None
    }
}

fn plain_layer(name: &str, records: Vec<(String, Vec<u8>)>) -> TestLayer {
    TestLayer {
        name: String::from(name),
        rect: [0, 0, 2, 2],
        flags: 0,
        opacity: None,
        compression: Compression::Rle,
        channels: (0..3)
            .map(|id| TestChannel {
                id,
                seed: id as u32,
                pixels: None
            })
            .collect(),
        mask: None,
        unicode_name: None,
        records
    }
}

fn utf16(text: &str) -> Vec<u8> {
    let mut out = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        out.extend(unit.to_be_bytes());
    }
    out
}

#[test]
fn text_layer() {
    let mut payload = vec![0, 1];
    for value in [1.0_f64, 0.0, 0.0, 1.0, 12.0, 30.0] {
        payload.extend(value.to_be_bytes());
    }
    payload.extend(b"<< /EngineDict << /Editor << /Text (");
    payload.extend(utf16("Start game\r"));
    payload.extend(b") >> /ParagraphRun << /Justification 1\n >>\n");
    payload.extend(b"/StyleRun << /FontSize 24.5\n /FillColor << /Values [ 1.0 0.25 0.5 0.75 ] >> >>\n");
    payload.extend(b"/ResourceDict << /FontSet [ << /Name (");
    payload.extend(utf16("Arial-BoldMT"));
    payload.extend(b") >> ] >> >>");

    let desc = plain_document(vec![plain_layer(
        "Start game",
        vec![(String::from("TySh"), payload)]
    )]);
    let document = decode(&desc).unwrap();
    let layer = &document.layers[0];
    let text = layer.text.as_ref().unwrap();

    assert!(layer.is_text_layer());
    assert_eq!(text.text, "Start game\r");
    assert_eq!(text.font_name, "Arial-BoldMT");
    assert_eq!(text.font_size, 24.5);
    assert_eq!(text.justification, Justification::Right);
    assert_eq!(text.fill_color.to_rgba8(), [64, 128, 191, 255]);
    assert_eq!(text.transform.map(|x| x[4]), Some(12.0));
    assert!(check_document(&desc, &document).iter().all(|x| x.starts_with("tree")));
}

#[test]
fn broken_extra_data_strict_and_lenient() {
    // a colour tag needs two bytes
    let desc = plain_document(vec![
        plain_layer("broken", vec![(String::from("lclr"), vec![1])]),
        plain_layer("fine", vec![(String::from("lclr"), vec![0, 2])]),
    ]);
    let document = decode(&desc).unwrap();

    assert_eq!(document.layers.len(), 2);
    assert!(document.layers[0].color_tag.is_none());
    assert!(document.layers[0].extra(b"lclr").is_some());
    assert!(document.layers[1].color_tag.is_some());
    assert_eq!(render_tree(&document.layer_tree()), "fine,broken");

    let strict = PsdDecoder::new_with_options(&desc.to_bytes(), DecoderOptions::new_strict()).decode();
    assert!(matches!(strict, Err(PsdDecodeErrors::IoErrors(_))));
}

#[test]
fn resources() {
    let mut desc = plain_document(Vec::new());

    let mut resolution = Vec::new();
    resolution.extend((72_u32 << 16).to_be_bytes());
    resolution.extend([0, 1, 0, 1]);
    resolution.extend((300_u32 << 16).to_be_bytes());
    resolution.extend([0, 1, 0, 2]);

    let xmp = br#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"><rdf:Description xmlns:photoshop="http://ns.adobe.com/photoshop/1.0/"><photoshop:Category>UI</photoshop:Category></rdf:Description></rdf:RDF></x:xmpmeta>"#;

    desc.resources = vec![
        (resource_ids::RESOLUTION_INFO, resolution),
        (1010, vec![1, 2, 3]),
        (resource_ids::XMP_METADATA, xmp.to_vec()),
    ];
    let document = decode(&desc).unwrap();

    assert_eq!(document.resources.len(), 3);
    let resolution = document.resolution().unwrap();
    assert_eq!((resolution.h_res, resolution.v_res), (72.0, 300.0));
    assert_eq!(document.resource(1010).map(|x| &x.kind), Some(&ResourceKind::Other));
    assert_eq!(document.resource(1010).map(|x| x.data.len()), Some(3));
    assert_eq!(document.category(), Some("UI"));
    assert!(document.thumbnail().is_none());
}

#[test]
fn cmyk_merged_image() {
    let mut desc = plain_document(Vec::new());
    desc.width = 2;
    desc.height = 1;
    desc.mode = 4;
    desc.channels = 4;
    desc.compression = Compression::Rle;
    // stored planes hold 255 for no ink
    desc.merged = Some(vec![vec![255, 255], vec![255, 255], vec![255, 255], vec![255, 0]]);

    let document = decode(&desc).unwrap();

    assert_eq!(document.color_mode, ColorModes::CMYK);
    assert_eq!(document.merged_compression, Some(CompressionMethod::RLE));

    let rgba = merged_to_rgba(&document).unwrap();
    assert!(rgba[..3].iter().all(|x| *x > 250));
    assert_eq!(rgba[4..8], [0, 0, 0, 255]);
}

#[test]
fn layer_pixels_can_be_skipped() {
    let desc = plain_document(vec![plain_layer("a", Vec::new())]);
    let options = DecoderOptions::default()
        .set_decode_layer_pixels(false)
        .set_decode_merged_image(false);

    let document = PsdDecoder::new_with_options(&desc.to_bytes(), options)
        .decode()
        .unwrap();
    let channel = document.layers[0].channel(0).unwrap();

    assert!(channel.pixels.is_empty());
    assert_eq!(channel.data.len(), channel.length as usize);
    assert!(document.merged.is_empty());
}

#[test]
fn pattern_has_runs() {
    let pixels = pattern(3, 16);

    assert_eq!(pixels[..4], [3, 3, 3, 3]);
    assert_eq!(pixels[8..12], [5, 5, 5, 5]);
}
