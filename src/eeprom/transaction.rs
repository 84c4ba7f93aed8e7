use crate::error::{
	Error,
	Phase,
};
use crate::twi::{
	Direction,
	Registers,
	Status,
	Twi,
};

/// One START..STOP sequence with status checks after every step.
///
/// Dropping an unfinished transaction sends STOP, so an error anywhere
/// along the way doesn't leave the bus held.
pub(super) struct Transaction<'a, R: Registers + 'a> {
	twi: &'a mut Twi<R>,
	open: bool,
}

impl<'a, R: Registers> Transaction<'a, R> {
	pub fn begin(twi: &'a mut Twi<R>) -> Result<Self, Error> {
		let mut tx = Transaction { twi, open: true };
		tx.start()?;
		Ok(tx)
	}

	/// repeated START, keeps the bus
	pub fn restart(&mut self) -> Result<(), Error> {
		self.start()
	}

	pub fn address(&mut self, device: u8, direction: Direction) -> Result<(), Error> {
		self.twi.send_address(device, direction)?;
		let expected = match direction {
			Direction::Write => Status::SLA_W_ACK,
			Direction::Read => Status::SLA_R_ACK,
		};
		self.expect(Phase::Address, &[expected])
	}

	/// SLA+W where a NAK is an expected answer; returns whether the device ACKed
	pub fn probe(&mut self, device: u8) -> Result<bool, Error> {
		self.twi.send_address(device, Direction::Write)?;
		match self.twi.status() {
			Status::SLA_W_ACK => Ok(true),
			Status::SLA_W_NAK => Ok(false),
			status => Err(Error::Bus { phase: Phase::Address, status }),
		}
	}

	pub fn send(&mut self, data: u8) -> Result<(), Error> {
		self.twi.send_byte(data)?;
		self.expect(Phase::Transmit, &[Status::DATA_SENT_ACK])
	}

	/// fill `target`: ACK every byte but the last one
	pub fn receive(&mut self, target: &mut [u8]) -> Result<(), Error> {
		let last = match target.len().checked_sub(1) {
			None => return Ok(()),
			Some(last) => last,
		};
		for t in target[..last].iter_mut() {
			*t = self.twi.read_byte_ack()?;
			self.expect(Phase::Receive, &[Status::DATA_RECV_ACK])?;
		}
		target[last] = self.twi.read_byte_nak()?;
		self.expect(Phase::Receive, &[Status::DATA_RECV_NAK])
	}

	pub fn finish(mut self) -> Result<(), Error> {
		self.open = false;
		self.twi.stop()
	}

	fn start(&mut self) -> Result<(), Error> {
		self.twi.start()?;
		self.expect(Phase::Start, &[Status::START, Status::REPEATED_START])
	}

	fn expect(&mut self, phase: Phase, accepted: &[Status]) -> Result<(), Error> {
		let status = self.twi.status();
		if accepted.contains(&status) {
			Ok(())
		} else {
			debug!("{}: unexpected status {}", phase, status);
			Err(Error::Bus { phase, status })
		}
	}
}

impl<'a, R: Registers> Drop for Transaction<'a, R> {
	fn drop(&mut self) {
		if self.open {
			if let Err(e) = self.twi.stop() {
				warn!("Couldn't release bus: {}", e);
			}
		}
	}
}
