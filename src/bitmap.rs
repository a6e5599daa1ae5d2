/// Occupancy bitmap with one bit per arena byte offset.
///
/// A set bit means a slot starting at that offset is allocated. Bits are packed
/// into 64-bit words, lowest offset in the least significant bit.
pub(crate) struct OccupancyBitmap {
	words: Box<[u64]>,
	len: usize,
}

impl OccupancyBitmap {
	/// Number of bits per word.
	const WORD_BITS: usize = 64;

	/// Create a bitmap of `len` cleared bits.
	pub fn new(len: usize) -> Self {
		let words = vec![0u64; len.div_ceil(Self::WORD_BITS)].into_boxed_slice();
		Self {
			words,
			len,
		}
	}

	#[inline]
	fn locate(offset: usize) -> (usize, u64) {
		(offset / Self::WORD_BITS, 1u64 << (offset % Self::WORD_BITS))
	}

	/// Number of tracked offsets.
	pub fn len(&self) -> usize {
		self.len
	}

	/// Whether the bit at `offset` is set.
	#[inline]
	pub fn is_set(&self, offset: usize) -> bool {
		debug_assert!(offset < self.len, "offset {offset} out of bitmap range {}", self.len);
		let (word, mask) = Self::locate(offset);
		self.words[word] & mask != 0
	}

	/// Mark `offset` as occupied.
	#[inline]
	pub fn set(&mut self, offset: usize) {
		debug_assert!(offset < self.len, "offset {offset} out of bitmap range {}", self.len);
		let (word, mask) = Self::locate(offset);
		self.words[word] |= mask;
	}

	/// Mark `offset` as free.
	#[inline]
	pub fn clear(&mut self, offset: usize) {
		debug_assert!(offset < self.len, "offset {offset} out of bitmap range {}", self.len);
		let (word, mask) = Self::locate(offset);
		self.words[word] &= !mask;
	}

	/// Total number of set bits.
	pub fn count_ones(&self) -> usize {
		self.words.iter().map(|w| w.count_ones() as usize).sum()
	}

	/// Snapshot of the raw words, for equality checks in tests.
	#[cfg(test)]
	pub fn words(&self) -> &[u64] {
		&self.words
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_bitmap_starts_clear() {
		let bitmap = OccupancyBitmap::new(130);
		assert_eq!(bitmap.len(), 130);
		assert_eq!(bitmap.words().len(), 3);
		assert_eq!(bitmap.count_ones(), 0);
		assert!((0..130).all(|i| !bitmap.is_set(i)));
	}

	#[test]
	fn test_bitmap_set_and_clear() {
		let mut bitmap = OccupancyBitmap::new(200);

		bitmap.set(0);
		bitmap.set(63);
		bitmap.set(64);
		bitmap.set(199);
		assert_eq!(bitmap.count_ones(), 4);
		assert!(bitmap.is_set(63));
		assert!(bitmap.is_set(64));
		assert!(!bitmap.is_set(65));

		bitmap.clear(63);
		assert!(!bitmap.is_set(63));
		assert_eq!(bitmap.count_ones(), 3);

		// Clearing an already clear bit is a no-op
		bitmap.clear(63);
		assert_eq!(bitmap.count_ones(), 3);
	}

	#[test]
	fn test_bitmap_empty() {
		let bitmap = OccupancyBitmap::new(0);
		assert_eq!(bitmap.len(), 0);
		assert_eq!(bitmap.count_ones(), 0);
	}
}
