use crate::error::{
	Error,
	Phase,
};

use super::{
	BusSpeed,
	ClockSetting,
	Register,
	Registers,
	Status,
	bits::*,
};

/// busy-wait iterations before a bus event counts as timed out
pub const DEFAULT_POLL_LIMIT: usize = 0xffff;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Direction {
	Write,
	Read,
}

impl Direction {
	pub fn bit(self) -> u8 {
		match self {
			Direction::Write => 0,
			Direction::Read => 1,
		}
	}
}

/// The bus controller; owns the peripheral registers.
///
/// Each primitive maps to exactly one bus event and returns once the
/// peripheral reports completion. Primitives don't interpret the outcome;
/// check `status()` afterwards.
pub struct Twi<R: Registers> {
	regs: R,
	poll_limit: usize,
}

impl<R: Registers> Twi<R> {
	/// takes ownership of the registers; call `init` before anything else
	pub fn new(regs: R) -> Self {
		Twi {
			regs,
			poll_limit: DEFAULT_POLL_LIMIT,
		}
	}

	pub fn with_poll_limit(mut self, poll_limit: usize) -> Self {
		self.poll_limit = poll_limit.max(1);
		self
	}

	pub fn poll_limit(&self) -> usize {
		self.poll_limit
	}

	pub fn registers(&self) -> &R {
		&self.regs
	}

	pub fn registers_mut(&mut self) -> &mut R {
		&mut self.regs
	}

	pub fn into_inner(self) -> R {
		self.regs
	}

	/// configure prescaler and bit rate, then enable the peripheral
	pub fn init(&mut self, speed: BusSpeed) -> ClockSetting {
		let setting = speed.clock_setting();
		// only the prescaler bits of TWSR are writable
		self.regs.write(Register::Status, setting.prescaler_bits & TWSR_PRESCALER_MASK);
		self.regs.write(Register::BitRate, setting.bit_rate);
		self.regs.write(Register::Control, TWEN);
		debug!(
			"TWI init: TWBR=0x{:02x}, prescaler {} -> SCL {} Hz",
			setting.bit_rate,
			setting.prescaler(),
			setting.scl_hz(speed.cpu_hz),
		);
		setting
	}

	pub fn status(&mut self) -> Status {
		Status::from_register(self.regs.read(Register::Status))
	}

	/// START, or repeated START if the bus is still held
	pub fn start(&mut self) -> Result<(), Error> {
		self.regs.write(Register::Control, TWINT | TWSTA | TWEN);
		self.wait_complete(Phase::Start)
	}

	/// STOP; waits until the peripheral released the bus
	pub fn stop(&mut self) -> Result<(), Error> {
		self.regs.write(Register::Control, TWINT | TWSTO | TWEN);
		for _ in 0..self.poll_limit {
			if 0 == self.regs.read(Register::Control) & TWSTO {
				trace!("STOP");
				return Ok(());
			}
			self.regs.relax();
		}
		Err(Error::Timeout { phase: Phase::Stop, polls: self.poll_limit })
	}

	/// SLA+R/W: 7-bit address followed by the direction bit
	pub fn send_address(&mut self, address: u8, direction: Direction) -> Result<(), Error> {
		self.regs.write(Register::Data, (address << 1) | direction.bit());
		self.regs.write(Register::Control, TWINT | TWEN);
		self.wait_complete(Phase::Address)
	}

	pub fn send_byte(&mut self, data: u8) -> Result<(), Error> {
		self.regs.write(Register::Data, data);
		self.regs.write(Register::Control, TWINT | TWEN);
		self.wait_complete(Phase::Transmit)
	}

	/// receive a byte and ACK it: the slave should keep sending
	pub fn read_byte_ack(&mut self) -> Result<u8, Error> {
		self.regs.write(Register::Control, TWINT | TWEN | TWEA);
		self.wait_complete(Phase::Receive)?;
		Ok(self.regs.read(Register::Data))
	}

	/// receive a byte and NAK it: last byte the master accepts
	pub fn read_byte_nak(&mut self) -> Result<u8, Error> {
		self.regs.write(Register::Control, TWINT | TWEN);
		self.wait_complete(Phase::Receive)?;
		Ok(self.regs.read(Register::Data))
	}

	// TWINT gets set by hardware once the current event completed
	fn wait_complete(&mut self, phase: Phase) -> Result<(), Error> {
		for _ in 0..self.poll_limit {
			if 0 != self.regs.read(Register::Control) & TWINT {
				if log_enabled!(log::Level::Trace) {
					trace!("{}: {}", phase, self.status());
				}
				return Ok(());
			}
			self.regs.relax();
		}
		Err(Error::Timeout { phase, polls: self.poll_limit })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sim::{
		At24c,
		SimulatedTwi,
	};

	fn twi() -> Twi<SimulatedTwi> {
		let mut twi = Twi::new(SimulatedTwi::new(Some(At24c::new(0x50))));
		twi.init(BusSpeed::standard(16_000_000));
		twi
	}

	fn register_snapshot(twi: &mut Twi<SimulatedTwi>) -> [u8; 4] {
		let regs = twi.registers_mut();
		[
			regs.read(Register::BitRate),
			regs.read(Register::Status),
			regs.read(Register::Data),
			regs.read(Register::Control),
		]
	}

	#[test]
	fn init_configures_standard_speed() {
		let mut twi = twi();
		let [twbr, twsr, _, twcr] = register_snapshot(&mut twi);
		assert_eq!(twbr, 0x48);
		assert_eq!(twsr & TWSR_PRESCALER_MASK, 0);
		assert_eq!(twcr, TWEN);
	}

	#[test]
	fn init_is_idempotent() {
		let mut once = twi();
		let mut twice = twi();
		twice.init(BusSpeed::standard(16_000_000));
		assert_eq!(register_snapshot(&mut once), register_snapshot(&mut twice));
	}

	#[test]
	fn start_then_repeated_start() {
		let mut twi = twi();
		twi.start().unwrap();
		assert_eq!(twi.status(), Status::START);
		twi.start().unwrap();
		assert_eq!(twi.status(), Status::REPEATED_START);
		twi.stop().unwrap();
		assert_eq!(twi.status(), Status::IDLE);
	}

	#[test]
	fn address_byte_carries_direction() {
		let mut twi = twi();
		twi.start().unwrap();
		twi.send_address(0x50, Direction::Write).unwrap();
		assert_eq!(twi.registers_mut().read(Register::Data), 0xa0);
		assert_eq!(twi.status(), Status::SLA_W_ACK);

		twi.start().unwrap();
		twi.send_address(0x50, Direction::Read).unwrap();
		assert_eq!(twi.registers_mut().read(Register::Data), 0xa1);
		assert_eq!(twi.status(), Status::SLA_R_ACK);
		assert_eq!(twi.read_byte_nak().unwrap(), 0xff);
		assert_eq!(twi.status(), Status::DATA_RECV_NAK);
		twi.stop().unwrap();
	}

	#[test]
	fn absent_device_naks() {
		let mut twi = twi();
		twi.start().unwrap();
		twi.send_address(0x51, Direction::Write).unwrap();
		assert_eq!(twi.status(), Status::SLA_W_NAK);
		twi.stop().unwrap();
	}

	#[test]
	fn stuck_peripheral_times_out() {
		let mut twi = twi().with_poll_limit(16);
		twi.registers_mut().set_stuck(true);
		assert_eq!(twi.start(), Err(Error::Timeout { phase: Phase::Start, polls: 16 }));
		assert_eq!(twi.stop(), Err(Error::Timeout { phase: Phase::Stop, polls: 16 }));
	}
}
