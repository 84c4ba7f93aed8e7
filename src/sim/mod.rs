/// Host-side model of the TWI peripheral with a serial EEPROM attached.
///
/// Writing TWCR with TWINT set executes the requested bus event right away
/// and sets TWINT again, so busy-waits complete on the first poll. Status
/// codes follow the ATmega master transmitter/receiver tables.

mod at24c;

pub use self::at24c::{
	At24c,
	WriteCycle,
};

use crate::twi::{
	Register,
	Registers,
	Status,
	bits::*,
};

/// What happened on the wire, in order
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WireEvent {
	Start,
	Stop,
	Address { address: u8, read: bool, ack: bool },
	Sent { data: u8, ack: bool },
	Received { data: u8, ack: bool },
}

pub struct SimulatedTwi {
	twbr: u8,
	twsr: u8,
	twdr: u8,
	twcr: u8,
	holding_bus: bool,
	stuck: bool,
	arbitration_lost: bool,
	device: Option<At24c>,
	wire: Vec<WireEvent>,
}

impl SimulatedTwi {
	pub fn new(device: Option<At24c>) -> Self {
		SimulatedTwi {
			twbr: 0,
			twsr: Status::IDLE.0,
			twdr: 0xff,
			twcr: 0,
			holding_bus: false,
			stuck: false,
			arbitration_lost: false,
			device,
			wire: Vec::new(),
		}
	}

	/// peripheral stops completing events (TWINT never sets, TWSTO never clears)
	pub fn set_stuck(&mut self, stuck: bool) {
		self.stuck = stuck;
	}

	/// every following address phase loses arbitration
	pub fn set_arbitration_lost(&mut self, lost: bool) {
		self.arbitration_lost = lost;
	}

	pub fn device(&self) -> Option<&At24c> {
		self.device.as_ref()
	}

	pub fn device_mut(&mut self) -> Option<&mut At24c> {
		self.device.as_mut()
	}

	pub fn wire(&self) -> &[WireEvent] {
		&self.wire
	}

	pub fn clear_wire(&mut self) {
		self.wire.clear();
	}

	fn status(&self) -> Status {
		Status::from_register(self.twsr)
	}

	fn complete(&mut self, status: Status) {
		self.twsr = (self.twsr & TWSR_PRESCALER_MASK) | status.0;
		self.twcr |= TWINT;
	}

	fn write_control(&mut self, value: u8) {
		// writing a one clears TWINT
		self.twcr = value & !TWINT;
		if self.stuck || 0 == value & TWEN || 0 == value & TWINT {
			return;
		}

		if 0 != value & TWSTA {
			self.start();
		} else if 0 != value & TWSTO {
			self.stop();
		} else {
			self.transfer(value);
		}
	}

	fn start(&mut self) {
		let status = if self.holding_bus { Status::REPEATED_START } else { Status::START };
		self.holding_bus = true;
		if let Some(device) = self.device.as_mut() {
			device.start();
		}
		self.wire.push(WireEvent::Start);
		self.complete(status);
	}

	fn stop(&mut self) {
		if let Some(device) = self.device.as_mut() {
			device.stop();
		}
		self.holding_bus = false;
		self.wire.push(WireEvent::Stop);
		// STOP doesn't set TWINT; TWSTO clears once it went out
		self.twcr &= !TWSTO;
		self.twsr = (self.twsr & TWSR_PRESCALER_MASK) | Status::IDLE.0;
	}

	fn transfer(&mut self, control: u8) {
		let status = self.status();
		if status.is_start() {
			self.address_phase();
		} else if status == Status::SLA_W_ACK || status == Status::DATA_SENT_ACK {
			let data = self.twdr;
			let ack = match self.device.as_mut() {
				Some(device) => device.receive(data),
				None => false,
			};
			self.wire.push(WireEvent::Sent { data, ack });
			self.complete(if ack { Status::DATA_SENT_ACK } else { Status::DATA_SENT_NAK });
		} else if status == Status::SLA_R_ACK || status == Status::DATA_RECV_ACK {
			let ack = 0 != control & TWEA;
			let data = match self.device.as_mut() {
				Some(device) => device.transmit(),
				None => 0xff,
			};
			self.twdr = data;
			self.wire.push(WireEvent::Received { data, ack });
			self.complete(if ack { Status::DATA_RECV_ACK } else { Status::DATA_RECV_NAK });
		} else {
			// no transfer possible in this state: bus error
			self.complete(Status(0x00));
		}
	}

	fn address_phase(&mut self) {
		if self.arbitration_lost {
			// lost the bus to another master
			self.holding_bus = false;
			self.complete(Status::ARBITRATION_LOST);
			return;
		}

		let address = self.twdr >> 1;
		let read = 0 != self.twdr & 0x01;
		let ack = match self.device.as_mut() {
			Some(device) if device.address() == address => device.select(read),
			_ => false,
		};
		self.wire.push(WireEvent::Address { address, read, ack });
		self.complete(match (read, ack) {
			(false, true) => Status::SLA_W_ACK,
			(false, false) => Status::SLA_W_NAK,
			(true, true) => Status::SLA_R_ACK,
			(true, false) => Status::SLA_R_NAK,
		});
	}
}

impl Registers for SimulatedTwi {
	fn read(&mut self, reg: Register) -> u8 {
		match reg {
			Register::BitRate => self.twbr,
			Register::Status => self.twsr,
			Register::Data => self.twdr,
			Register::Control => self.twcr,
		}
	}

	fn write(&mut self, reg: Register, value: u8) {
		match reg {
			Register::BitRate => self.twbr = value,
			Register::Status => {
				self.twsr = (self.twsr & TWSR_STATUS_MASK) | (value & TWSR_PRESCALER_MASK);
			},
			Register::Data => self.twdr = value,
			Register::Control => self.write_control(value),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn control(sim: &mut SimulatedTwi, value: u8) -> Status {
		sim.write(Register::Control, value);
		Status::from_register(sim.read(Register::Status))
	}

	#[test]
	fn status_register_keeps_status_bits_on_write() {
		let mut sim = SimulatedTwi::new(None);
		sim.write(Register::Status, 0xff);
		assert_eq!(sim.read(Register::Status), 0xfb);
	}

	#[test]
	fn disabled_peripheral_does_nothing() {
		let mut sim = SimulatedTwi::new(None);
		assert_eq!(control(&mut sim, TWINT | TWSTA), Status::IDLE);
		assert!(sim.wire().is_empty());
	}

	#[test]
	fn data_after_nak_is_bus_error() {
		let mut sim = SimulatedTwi::new(None);
		assert_eq!(control(&mut sim, TWINT | TWSTA | TWEN), Status::START);
		sim.write(Register::Data, 0xa0);
		assert_eq!(control(&mut sim, TWINT | TWEN), Status::SLA_W_NAK);
		assert_eq!(control(&mut sim, TWINT | TWEN), Status(0x00));
	}

	#[test]
	fn arbitration_loss_releases_bus() {
		let mut sim = SimulatedTwi::new(Some(At24c::new(0x50)));
		sim.set_arbitration_lost(true);
		assert_eq!(control(&mut sim, TWINT | TWSTA | TWEN), Status::START);
		sim.write(Register::Data, 0xa0);
		assert_eq!(control(&mut sim, TWINT | TWEN), Status::ARBITRATION_LOST);
		// bus was released, so the next START isn't a repeated one
		assert_eq!(control(&mut sim, TWINT | TWSTA | TWEN), Status::START);
	}
}
