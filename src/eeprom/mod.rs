/// Byte-addressable serial EEPROM (24C02 class) on the TWI bus.
///
/// - random read: START, SLA+W, word address, repeated START, SLA+R,
///   data (NAK), STOP
/// - sequential read: like random read, but ACK all bytes except the last
/// - byte write: START, SLA+W, word address, data, STOP
/// - page write: START, SLA+W, word address, 8 data bytes, STOP; bytes
///   beyond the page end wrap to the start of the same page
///
/// After STOP of a write the device runs its internal write cycle and NAKs
/// its address until done ("acknowledge polling").

mod plan;
mod transaction;

pub use self::plan::{
	Chunk,
	WritePlan,
};

use crate::error::Error;
use crate::twi::{
	Direction,
	Registers,
	Twi,
};

use self::transaction::Transaction;

pub mod consts {
	pub const DEVICE_ADDRESS: u8 = 0x50; // 0b1010_A2_A1_A0
	pub const PAGE_SIZE: usize = 8;
	pub const CAPACITY: usize = 256; // one word address byte

	// write cycle is 5ms max, each poll takes ~100us at 100 kHz
	pub const DEFAULT_ACK_POLL_LIMIT: usize = 0x400;
}

use self::consts::*;

pub struct Eeprom<R: Registers> {
	twi: Twi<R>,
	device: u8,
	ack_poll_limit: usize,
}

impl<R: Registers> Eeprom<R> {
	/// takes over the (initialized) bus controller
	pub fn new(twi: Twi<R>) -> Self {
		Eeprom {
			twi,
			device: DEVICE_ADDRESS,
			ack_poll_limit: DEFAULT_ACK_POLL_LIMIT,
		}
	}

	pub fn with_device_address(mut self, device: u8) -> Self {
		self.device = device & 0x7f;
		self
	}

	pub fn with_ack_poll_limit(mut self, limit: usize) -> Self {
		self.ack_poll_limit = limit.max(1);
		self
	}

	pub fn device_address(&self) -> u8 {
		self.device
	}

	pub fn twi(&self) -> &Twi<R> {
		&self.twi
	}

	pub fn twi_mut(&mut self) -> &mut Twi<R> {
		&mut self.twi
	}

	pub fn into_inner(self) -> Twi<R> {
		self.twi
	}

	/// Acknowledge polling: re-address the device until it ACKs.
	///
	/// Returns the number of polls it took.
	pub fn write_completion_wait(&mut self) -> Result<usize, Error> {
		let device = self.device;
		let limit = self.ack_poll_limit;

		let mut tx = Transaction::begin(&mut self.twi)?;
		for poll in 1..=limit {
			if poll > 1 {
				tx.restart()?;
			}
			if tx.probe(device)? {
				tx.finish()?;
				trace!("write cycle done after {} polls", poll);
				return Ok(poll);
			}
		}
		drop(tx);

		Err(Error::Unresponsive { device, polls: limit })
	}

	pub fn read_byte(&mut self, address: u8) -> Result<u8, Error> {
		let mut data = [0u8; 1];
		self.read_into(address, &mut data)?;
		Ok(data[0])
	}

	pub fn write_byte(&mut self, address: u8, data: u8) -> Result<(), Error> {
		self.write_cycle(address, &[data])
	}

	/// Write exactly one page; `address % PAGE_SIZE` is where writing starts
	/// within the device's page buffer (the rest wraps to the page start).
	pub fn write_page(&mut self, address: u8, data: &[u8]) -> Result<(), Error> {
		if data.len() != PAGE_SIZE {
			return Err(Error::InvalidLength { length: data.len(), expected: PAGE_SIZE });
		}
		self.write_cycle(address, data)
	}

	/// Page writes for every full page, single byte writes for the rest.
	pub fn sequential_write(&mut self, address: u8, data: &[u8]) -> Result<(), Error> {
		check_range(address, data.len())?;
		if data.is_empty() {
			return Ok(());
		}

		let plan = WritePlan::new(address as usize, data.len(), PAGE_SIZE);
		debug!(
			"sequential write of {} bytes at 0x{:02x}: {} page writes, {} byte writes",
			data.len(), address, plan.page_writes(), plan.byte_writes(),
		);
		for chunk in plan {
			match chunk {
				Chunk::Page { address, offset } => {
					self.write_page(address as u8, &data[offset..offset + PAGE_SIZE])?;
				},
				Chunk::Byte { address, offset } => {
					self.write_byte(address as u8, data[offset])?;
				},
			}
		}
		Ok(())
	}

	/// Fill `target` in one continuous read starting at `address`.
	pub fn sequential_read(&mut self, address: u8, target: &mut [u8]) -> Result<(), Error> {
		check_range(address, target.len())?;
		if target.is_empty() {
			return Ok(());
		}
		debug!("sequential read of {} bytes at 0x{:02x}", target.len(), address);
		self.read_into(address, target)
	}

	/// read back and compare; returns offset of the first mismatch
	pub fn verify(&mut self, address: u8, expected: &[u8]) -> Result<Option<usize>, Error> {
		let mut actual = vec![0u8; expected.len()];
		self.sequential_read(address, &mut actual)?;
		Ok(actual.iter().zip(expected).position(|(a, e)| a != e))
	}

	fn read_into(&mut self, address: u8, target: &mut [u8]) -> Result<(), Error> {
		let device = self.device;
		let mut tx = Transaction::begin(&mut self.twi)?;
		tx.address(device, Direction::Write)?;
		tx.send(address)?;
		tx.restart()?;
		tx.address(device, Direction::Read)?;
		tx.receive(target)?;
		tx.finish()
	}

	fn write_cycle(&mut self, address: u8, data: &[u8]) -> Result<(), Error> {
		let device = self.device;
		{
			let mut tx = Transaction::begin(&mut self.twi)?;
			tx.address(device, Direction::Write)?;
			tx.send(address)?;
			for &b in data {
				tx.send(b)?;
			}
			tx.finish()?;
		}
		self.write_completion_wait()?;
		Ok(())
	}
}

fn check_range(address: u8, length: usize) -> Result<(), Error> {
	if address as usize + length > CAPACITY {
		return Err(Error::OutOfRange { address: address as usize, length, capacity: CAPACITY });
	}
	Ok(())
}
