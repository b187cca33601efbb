#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = psdkit::PsdDecoder::new(data);

    if let Ok(document) = decoder.decode() {
        let _ = document.layer_tree();

        for layer in &document.layers {
            let _ = psdkit::color::layer_to_rgba(&document, layer);
        }
        let _ = psdkit::color::merged_to_rgba(&document);
    }
});
