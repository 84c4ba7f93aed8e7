/// One write cycle of a sequential write
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Chunk {
	/// full page starting at a page boundary
	Page { address: usize, offset: usize },
	Byte { address: usize, offset: usize },
}

impl Chunk {
	pub fn address(&self) -> usize {
		match *self {
			Chunk::Page { address, .. } | Chunk::Byte { address, .. } => address,
		}
	}

	/// offset into the source buffer
	pub fn offset(&self) -> usize {
		match *self {
			Chunk::Page { offset, .. } | Chunk::Byte { offset, .. } => offset,
		}
	}
}

/// Splits `length` bytes at `address` into write cycles:
/// - single bytes up to the first page boundary (none if aligned)
/// - `body / page_size` full pages
/// - `body % page_size` single bytes after the last page
///
/// A page chunk never crosses a page boundary, so the device's in-page
/// wrap never kicks in.
#[derive(Clone, Debug)]
pub struct WritePlan {
	address: usize,
	page_size: usize,
	head: usize,
	pages: usize,
	length: usize,
	offset: usize,
}

impl WritePlan {
	pub fn new(address: usize, length: usize, page_size: usize) -> Self {
		assert!(page_size > 0);
		let head = ((page_size - address % page_size) % page_size).min(length);
		let pages = (length - head) / page_size;
		WritePlan {
			address,
			page_size,
			head,
			pages,
			length,
			offset: 0,
		}
	}

	pub fn page_writes(&self) -> usize {
		self.pages
	}

	pub fn byte_writes(&self) -> usize {
		self.length - self.pages * self.page_size
	}
}

impl Iterator for WritePlan {
	type Item = Chunk;

	fn next(&mut self) -> Option<Chunk> {
		let address = self.address + self.offset;
		let offset = self.offset;
		let pages_end = self.head + self.pages * self.page_size;

		if offset >= self.length {
			return None;
		}
		if offset >= self.head && offset < pages_end {
			self.offset += self.page_size;
			Some(Chunk::Page { address, offset })
		} else {
			self.offset += 1;
			Some(Chunk::Byte { address, offset })
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn coverage(plan: WritePlan, page_size: usize) -> Vec<usize> {
		let mut covered = Vec::new();
		for chunk in plan {
			let len = match chunk {
				Chunk::Page { .. } => page_size,
				Chunk::Byte { .. } => 1,
			};
			covered.extend(chunk.offset()..chunk.offset() + len);
		}
		covered
	}

	#[test]
	fn sixty_two_bytes_at_0x10() {
		let chunks: Vec<Chunk> = WritePlan::new(0x10, 62, 8).collect();
		let pages: Vec<usize> = chunks.iter().filter_map(|c| match c {
			Chunk::Page { address, .. } => Some(*address),
			_ => None,
		}).collect();
		let bytes: Vec<usize> = chunks.iter().filter_map(|c| match c {
			Chunk::Byte { address, .. } => Some(*address),
			_ => None,
		}).collect();
		assert_eq!(pages, vec![0x10, 0x18, 0x20, 0x28, 0x30, 0x38, 0x40]);
		assert_eq!(bytes, vec![0x48, 0x49, 0x4a, 0x4b, 0x4c, 0x4d]);
	}

	#[test]
	fn aligned_split_is_division_plus_remainder() {
		for length in 0..100 {
			let plan = WritePlan::new(0x20, length, 8);
			assert_eq!(plan.page_writes(), length / 8);
			assert_eq!(plan.byte_writes(), length % 8);
			let chunks: Vec<Chunk> = plan.clone().collect();
			assert_eq!(chunks.len(), length / 8 + length % 8);
			assert_eq!(coverage(plan, 8), (0..length).collect::<Vec<_>>());
		}
	}

	#[test]
	fn unaligned_pages_stay_within_boundaries() {
		for address in 0..16 {
			for length in 0..40 {
				let plan = WritePlan::new(address, length, 8);
				for chunk in plan.clone() {
					if let Chunk::Page { address, .. } = chunk {
						assert_eq!(address % 8, 0);
					}
					assert_eq!(chunk.address(), address + chunk.offset());
				}
				assert_eq!(coverage(plan, 8), (0..length).collect::<Vec<_>>());
			}
		}
	}

	#[test]
	fn empty_plan() {
		assert_eq!(WritePlan::new(0x13, 0, 8).next(), None);
	}
}
