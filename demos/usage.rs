use anyhow::Result;
use qoif::{decoder::Decoder, encoder::Encoder, Image, Pixel};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // A soft vertical gradient with a hard edge in the middle.
    let (width, height) = (64, 48);
    let pixels = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                if x < width / 2 {
                    Pixel::rgb(200, (y * 4) as u8, 40)
                } else {
                    Pixel::rgba(10, 10, (y * 5) as u8, 180)
                }
            })
        })
        .collect();
    let image = Image::new(width, height, pixels)?;

    let compressed = Encoder::encode_to_vec(&image)?;

    let header = Decoder::decode_header(&compressed[..])?;
    println!(
        "{}x{} image, {} bytes raw, {} bytes compressed",
        header.width,
        header.height,
        image.pixels().len() * 4,
        compressed.len()
    );

    let decompressed = Decoder::decode(&compressed[..])?;
    assert_eq!(decompressed, image);

    Ok(())
}
