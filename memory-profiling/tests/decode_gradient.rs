#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use qoif::{decoder::Decoder, encoder::Encoder, Image, Pixel};

#[test]
fn decode_gradient() {
    let pixels = (0..256u32)
        .flat_map(|y| (0..256u32).map(move |x| Pixel::rgb(x as u8, y as u8, (x ^ y) as u8)))
        .collect();
    let image = Image::new(256, 256, pixels).unwrap();
    let compressed = Encoder::encode_to_vec(&image).unwrap();

    let _profiler = dhat::Profiler::builder().testing().build();

    let start_stats = dhat::HeapStats::get();

    let decompressed = Decoder::decode(&compressed[..]).unwrap();

    let stats = dhat::HeapStats::get();

    println!("{start_stats:?}");
    println!("{stats:?}");

    // The pixel buffer and the read buffer, nothing else.
    dhat::assert!(stats.total_blocks - start_stats.total_blocks <= 2);
    assert_eq!(decompressed, image);
}
