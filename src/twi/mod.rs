/// Master-mode driver for the ATmega "two-wire serial interface" (TWI), the
/// AVR flavour of I²C.
///
/// The peripheral has four registers:
/// - TWBR: bit rate divisor
/// - TWSR: status (bits 7..3) and prescaler (bits 1..0)
/// - TWDR: data in/out (address byte during the address phase)
/// - TWCR: control; writing TWINT=1 starts the next bus event, hardware sets
///   TWINT again once the event completed
///
/// Every event is reported through a status code in TWSR:
/// - 0x08 START, 0x10 repeated START
/// - 0x18/0x20 SLA+W ACK/NAK, 0x28/0x30 data sent ACK/NAK
/// - 0x38 arbitration lost (or NAK)
/// - 0x40/0x48 SLA+R ACK/NAK, 0x50/0x58 data received, ACK/NAK returned
///
/// A transaction on the wire: START, 7-bit address + R/W bit (MSB first),
/// ACK/NAK from the slave, data bytes each followed by ACK/NAK, then STOP
/// or a repeated START to change direction.

mod clock;
mod controller;
mod hardware;
mod status;

pub use self::clock::{
	BusSpeed,
	ClockSetting,
};

pub use self::controller::{
	DEFAULT_POLL_LIMIT,
	Direction,
	Twi,
};

pub use self::hardware::{
	MemoryMapped,
	Register,
	RegisterLayout,
	Registers,
	bits,
};

pub use self::status::{
	Decoded,
	Status,
};
