use std::ptr;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Register {
	BitRate, // TWBR
	Status,  // TWSR
	Data,    // TWDR
	Control, // TWCR
}

#[allow(dead_code)]
pub mod bits {
	// TWCR
	pub const TWINT: u8 = 0x80; // event complete; write 1 to clear and trigger
	pub const TWEA:  u8 = 0x40; // acknowledge received bytes
	pub const TWSTA: u8 = 0x20; // request START
	pub const TWSTO: u8 = 0x10; // request STOP; cleared by hardware when done
	pub const TWWC:  u8 = 0x08; // write collision
	pub const TWEN:  u8 = 0x04; // peripheral enable
	pub const TWIE:  u8 = 0x01; // interrupt enable (never used here)

	// TWSR
	pub const TWSR_STATUS_MASK:    u8 = 0xf8;
	pub const TWSR_PRESCALER_MASK: u8 = 0x03;
}

/// Raw access to the TWI peripheral
pub trait Registers {
	fn read(&mut self, reg: Register) -> u8;
	fn write(&mut self, reg: Register, value: u8);

	// called once per iteration while busy-waiting for the hardware
	fn relax(&mut self) {
		std::hint::spin_loop();
	}
}

impl<'a, R: ?Sized + Registers> Registers for &'a mut R {
	fn read(&mut self, reg: Register) -> u8 {
		R::read(*self, reg)
	}
	fn write(&mut self, reg: Register, value: u8) {
		R::write(*self, reg, value)
	}
	fn relax(&mut self) {
		R::relax(*self)
	}
}

/// Offsets of the TWI registers relative to some base address
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RegisterLayout {
	pub bit_rate: usize,
	pub status: usize,
	pub data: usize,
	pub control: usize,
}

impl RegisterLayout {
	/// ATmega328P data space addresses (base 0)
	pub const ATMEGA328P: RegisterLayout = RegisterLayout {
		bit_rate: 0xb8,
		status: 0xb9,
		data: 0xbb,
		control: 0xbc,
	};

	pub fn offset(&self, reg: Register) -> usize {
		match reg {
			Register::BitRate => self.bit_rate,
			Register::Status => self.status,
			Register::Data => self.data,
			Register::Control => self.control,
		}
	}
}

/// Volatile access to memory-mapped TWI registers
#[derive(Debug)]
pub struct MemoryMapped {
	base: ptr::NonNull<u8>, // u8 for easier offset operations
	layout: RegisterLayout,
}

impl MemoryMapped {
	/// # Safety
	///
	/// `base + offset` must be valid for volatile reads and writes for every
	/// offset in `layout`, for as long as the returned value lives, and
	/// nothing else may access those registers meanwhile.
	pub unsafe fn new(base: ptr::NonNull<u8>, layout: RegisterLayout) -> Self {
		MemoryMapped { base, layout }
	}

	pub fn layout(&self) -> RegisterLayout {
		self.layout
	}
}

impl Registers for MemoryMapped {
	fn read(&mut self, reg: Register) -> u8 {
		let offset = self.layout.offset(reg);
		unsafe { ptr::read_volatile(self.base.as_ptr().add(offset)) }
	}

	fn write(&mut self, reg: Register, value: u8) {
		let offset = self.layout.offset(reg);
		unsafe { ptr::write_volatile(self.base.as_ptr().add(offset), value) }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn memory_mapped_uses_layout_offsets() {
		let mut space = [0u8; 0x100];
		{
			let base = ptr::NonNull::new(space.as_mut_ptr()).unwrap();
			let mut regs = unsafe { MemoryMapped::new(base, RegisterLayout::ATMEGA328P) };
			regs.write(Register::BitRate, 0x48);
			regs.write(Register::Control, bits::TWEN);
			regs.write(Register::Data, 0xa1);
			assert_eq!(regs.read(Register::Data), 0xa1);
		}
		assert_eq!(space[0xb8], 0x48);
		assert_eq!(space[0xbc], bits::TWEN);
		assert_eq!(space[0xbb], 0xa1);
		assert_eq!(space[0xb9], 0);
	}
}
