use crate::pixel::Pixel;

/// Number of slots in the color cache.
pub const CACHE_SIZE: usize = 64;

/// A direct-mapped table of recently seen pixels.
///
/// The encoder and the decoder each own one and update it in lockstep. A pixel always lives at
/// slot `hash % 64`; a colliding pixel simply evicts the previous occupant.
#[derive(Debug, Clone)]
pub struct ColorCache {
    slots: [Pixel; CACHE_SIZE],
}

impl ColorCache {
    /// A cache where every slot holds transparent black.
    pub fn new() -> Self {
        Self {
            slots: [Pixel::transparent(); CACHE_SIZE],
        }
    }

    /// The slot `pixel` belongs to, in `0..64`.
    #[inline]
    pub fn index_of(pixel: Pixel) -> u8 {
        pixel.hash() % CACHE_SIZE as u8
    }

    #[inline]
    pub fn lookup(&self, index: u8) -> Pixel {
        self.slots[index as usize % CACHE_SIZE]
    }

    #[inline]
    pub fn store(&mut self, index: u8, pixel: Pixel) {
        self.slots[index as usize % CACHE_SIZE] = pixel;
    }

    /// Store `pixel` at its own slot.
    #[inline]
    pub fn insert(&mut self, pixel: Pixel) {
        self.store(Self::index_of(pixel), pixel);
    }
}

impl Default for ColorCache {
    fn default() -> Self {
        Self::new()
    }
}
