//! 24C02-style serial EEPROM: 256 bytes, 8-byte pages, one-byte word
//! address.
//!
//! - write: SLA+W, word address, data bytes..., STOP commits the page
//!   buffer; bytes past the page end wrap to the start of the same page
//! - read: the internal address counter continues where the last access
//!   ended (wrapping at the end of memory); a random read sets it with a
//!   "dummy write" of the word address followed by a repeated START
//! - while the write cycle runs the device NAKs its address

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WriteCycle {
	pub address: usize,
	pub length: usize,
}

#[derive(Clone, PartialEq, Eq, Debug)]
enum State {
	Idle,
	WordAddress,
	Writing {
		address: usize,
		data: Vec<u8>,
	},
	Reading,
}

pub struct At24c {
	address: u8,
	memory: Vec<u8>,
	counter: usize,
	state: State,
	write_cycle_polls: usize,
	busy_polls: usize,
	write_cycles: Vec<WriteCycle>,
}

impl At24c {
	pub const CAPACITY: usize = 256;
	pub const PAGE_SIZE: usize = 8;
	/// address polls NAKed after each committed write
	pub const DEFAULT_WRITE_CYCLE_POLLS: usize = 3;

	pub fn new(address: u8) -> Self {
		At24c {
			address,
			memory: vec![0xff; Self::CAPACITY],
			counter: 0,
			state: State::Idle,
			write_cycle_polls: Self::DEFAULT_WRITE_CYCLE_POLLS,
			busy_polls: 0,
			write_cycles: Vec::new(),
		}
	}

	pub fn with_write_cycle_polls(mut self, polls: usize) -> Self {
		self.write_cycle_polls = polls;
		self
	}

	pub fn address(&self) -> u8 {
		self.address
	}

	pub fn memory(&self) -> &[u8] {
		&self.memory
	}

	pub fn memory_mut(&mut self) -> &mut [u8] {
		&mut self.memory
	}

	/// committed write cycles, oldest first
	pub fn write_cycles(&self) -> &[WriteCycle] {
		&self.write_cycles
	}

	pub fn clear_write_cycles(&mut self) {
		self.write_cycles.clear();
	}

	pub fn is_busy(&self) -> bool {
		self.busy_polls > 0
	}

	pub(super) fn start(&mut self) {
		// a repeated START aborts a pending write
		self.state = State::Idle;
	}

	// returns ACK
	pub(super) fn select(&mut self, read: bool) -> bool {
		if self.busy_polls > 0 {
			self.busy_polls -= 1;
			return false;
		}
		self.state = if read { State::Reading } else { State::WordAddress };
		true
	}

	// master -> device; returns ACK
	pub(super) fn receive(&mut self, data: u8) -> bool {
		if let State::Writing { data: buffer, .. } = &mut self.state {
			buffer.push(data);
			return true;
		}
		if self.state != State::WordAddress {
			return false;
		}
		let address = data as usize % Self::CAPACITY;
		self.counter = address;
		self.state = State::Writing { address, data: Vec::new() };
		true
	}

	// device -> master
	pub(super) fn transmit(&mut self) -> u8 {
		let data = self.memory[self.counter];
		self.counter = (self.counter + 1) % Self::CAPACITY;
		data
	}

	pub(super) fn stop(&mut self) {
		let state = std::mem::replace(&mut self.state, State::Idle);
		if let State::Writing { address, data } = state {
			if !data.is_empty() {
				self.commit(address, &data);
			}
		}
	}

	fn commit(&mut self, address: usize, data: &[u8]) {
		let page = address - address % Self::PAGE_SIZE;
		let mut offset = address % Self::PAGE_SIZE;
		for &b in data {
			self.memory[page + offset] = b;
			offset = (offset + 1) % Self::PAGE_SIZE;
		}
		self.counter = page + offset;
		self.write_cycles.push(WriteCycle { address, length: data.len() });
		self.busy_polls = self.write_cycle_polls;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn write(device: &mut At24c, address: u8, data: &[u8]) {
		device.start();
		assert!(device.select(false));
		assert!(device.receive(address));
		for &b in data {
			assert!(device.receive(b));
		}
		device.stop();
	}

	#[test]
	fn page_write_wraps_within_page() {
		let mut device = At24c::new(0x50).with_write_cycle_polls(0);
		write(&mut device, 0x16, &[1, 2, 3, 4]);
		assert_eq!(&device.memory()[0x10..0x18], &[3, 4, 0xff, 0xff, 0xff, 0xff, 1, 2]);
		assert_eq!(device.memory()[0x18], 0xff);
		assert_eq!(device.write_cycles(), &[WriteCycle { address: 0x16, length: 4 }]);
	}

	#[test]
	fn busy_after_write_cycle() {
		let mut device = At24c::new(0x50).with_write_cycle_polls(2);
		write(&mut device, 0x00, &[0x42]);
		assert!(device.is_busy());
		assert!(!device.select(false));
		assert!(!device.select(false));
		assert!(device.select(false));
	}

	#[test]
	fn address_only_write_commits_nothing() {
		let mut device = At24c::new(0x50);
		write(&mut device, 0x20, &[]);
		assert!(device.write_cycles().is_empty());
		assert!(!device.is_busy());
		assert!(device.select(true));
		assert_eq!(device.transmit(), 0xff);
	}

	#[test]
	fn sequential_read_wraps_at_end_of_memory() {
		let mut device = At24c::new(0x50);
		device.memory_mut()[0xff] = 0xaa;
		device.memory_mut()[0x00] = 0xbb;
		write(&mut device, 0xff, &[]);
		device.start();
		assert!(device.select(true));
		assert_eq!(device.transmit(), 0xaa);
		assert_eq!(device.transmit(), 0xbb);
	}
}
