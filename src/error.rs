use std::fmt;

use failure::Fail;

use crate::twi::Status;

/// Bus event a failure happened in
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Phase {
	Start,
	Stop,
	Address,
	Transmit,
	Receive,
}

impl fmt::Display for Phase {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let name = match self {
			Phase::Start => "START",
			Phase::Stop => "STOP",
			Phase::Address => "address",
			Phase::Transmit => "data transmit",
			Phase::Receive => "data receive",
		};
		f.write_str(name)
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Fail)]
pub enum Error {
	/// device didn't acknowledge where it should have, or arbitration lost
	#[fail(display = "bus fault during {}: status {}", phase, status)]
	Bus {
		phase: Phase,
		status: Status,
	},

	/// peripheral never signalled completion of a bus event
	#[fail(display = "TWI peripheral didn't complete {} within {} polls", phase, polls)]
	Timeout {
		phase: Phase,
		polls: usize,
	},

	/// device kept refusing its address after a write cycle
	#[fail(display = "device 0x{:02x} still busy after {} acknowledge polls", device, polls)]
	Unresponsive {
		device: u8,
		polls: usize,
	},

	#[fail(display = "invalid buffer length {} (expected {})", length, expected)]
	InvalidLength {
		length: usize,
		expected: usize,
	},

	#[fail(display = "range 0x{:02x}+{} exceeds device capacity of {} bytes", address, length, capacity)]
	OutOfRange {
		address: usize,
		length: usize,
		capacity: usize,
	},
}

impl Error {
	/// caller passed something invalid; no bus activity happened
	pub fn is_misuse(&self) -> bool {
		match self {
			Error::InvalidLength { .. } | Error::OutOfRange { .. } => true,
			_ => false,
		}
	}
}
