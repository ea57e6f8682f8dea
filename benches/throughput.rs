use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qoif::{decoder::Decoder, encoder::Encoder, Image, Pixel};
use rand::{prelude::StdRng, RngCore, SeedableRng};

const WIDTH: u32 = 512;
const HEIGHT: u32 = 512;

fn bench_random(c: &mut Criterion) {
    let image = prepare_random_image();

    bench(c, "Random pixels", &image);
}

fn bench_gradient(c: &mut Criterion) {
    let image = prepare_gradient_image();

    bench(c, "Gradient", &image);
}

fn bench_flat(c: &mut Criterion) {
    let image = Image::filled(WIDTH, HEIGHT, Pixel::rgb(40, 80, 120));

    bench(c, "Flat color", &image);
}

fn bench(c: &mut Criterion, name: &str, image: &Image) {
    encoding(c, name, image);
    decoding(c, name, image);
}

fn encoding(c: &mut Criterion, name: &str, image: &Image) {
    let mut group = c.benchmark_group("Throughput");

    let mut encoded = Encoder::encode_to_vec(image).expect("Error");

    let id = BenchmarkId::new(name, "Encode");
    group.throughput(Throughput::Bytes(raw_size(image)));
    group.bench_with_input(id, image, |b, image| {
        b.iter(|| {
            encoded.clear();
            Encoder::encode(black_box(image), &mut encoded)
        })
    });
    group.finish();
}

fn decoding(c: &mut Criterion, name: &str, image: &Image) {
    let mut group = c.benchmark_group("Throughput");

    let encoded = Encoder::encode_to_vec(image).expect("Error");

    let id = BenchmarkId::new(name, "Decode");
    group.throughput(Throughput::Bytes(raw_size(image)));
    group.bench_with_input(id, &encoded[..], |b, encoded| {
        b.iter(|| Decoder::decode(black_box(encoded)))
    });
    group.finish();
}

fn raw_size(image: &Image) -> u64 {
    image.pixels().len() as u64 * 4
}

fn prepare_random_image() -> Image {
    let mut rand = StdRng::seed_from_u64(42);
    let mut data: Vec<u8> = vec![0; (WIDTH * HEIGHT * 4) as usize];
    rand.fill_bytes(&mut data[..]);

    Image::from_raw(WIDTH, HEIGHT, data).expect("Wrong buffer size")
}

/// Smooth horizontal and vertical ramps, mostly encoded as small diffs.
fn prepare_gradient_image() -> Image {
    let pixels = (0..HEIGHT)
        .flat_map(|y| (0..WIDTH).map(move |x| Pixel::rgb((x / 2) as u8, (y / 2) as u8, 128)))
        .collect();

    Image::new(WIDTH, HEIGHT, pixels).expect("Wrong pixel count")
}

criterion_group!(benches, bench_random, bench_gradient, bench_flat);

criterion_main!(benches);
