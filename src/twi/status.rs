use std::fmt;

use super::bits::TWSR_STATUS_MASK;

/// Masked content of TWSR after a bus event
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Status(pub u8);

impl Status {
	pub const START:            Status = Status(0x08);
	pub const REPEATED_START:   Status = Status(0x10);
	pub const SLA_W_ACK:        Status = Status(0x18);
	pub const SLA_W_NAK:        Status = Status(0x20);
	pub const DATA_SENT_ACK:    Status = Status(0x28);
	pub const DATA_SENT_NAK:    Status = Status(0x30);
	pub const ARBITRATION_LOST: Status = Status(0x38); // or NAK, depending on mode
	pub const SLA_R_ACK:        Status = Status(0x40);
	pub const SLA_R_NAK:        Status = Status(0x48);
	pub const DATA_RECV_ACK:    Status = Status(0x50);
	pub const DATA_RECV_NAK:    Status = Status(0x58);
	pub const IDLE:             Status = Status(0xf8); // no relevant state information

	pub fn from_register(twsr: u8) -> Self {
		Status(twsr & TWSR_STATUS_MASK)
	}

	pub fn code(&self) -> u8 {
		self.0
	}

	pub fn decode(&self) -> Decoded {
		match *self {
			Status::START => Decoded::Start,
			Status::REPEATED_START => Decoded::RepeatedStart,
			Status::SLA_W_ACK => Decoded::AddressWriteAck,
			Status::SLA_W_NAK => Decoded::AddressWriteNak,
			Status::DATA_SENT_ACK => Decoded::DataSentAck,
			Status::DATA_SENT_NAK => Decoded::DataSentNak,
			Status::ARBITRATION_LOST => Decoded::ArbitrationLostOrNak,
			Status::SLA_R_ACK => Decoded::AddressReadAck,
			Status::SLA_R_NAK => Decoded::AddressReadNak,
			Status::DATA_RECV_ACK => Decoded::DataReceivedAck,
			Status::DATA_RECV_NAK => Decoded::DataReceivedNak,
			Status(other) => Decoded::Unrecognized(other),
		}
	}

	pub fn is_start(&self) -> bool {
		*self == Status::START || *self == Status::REPEATED_START
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self.decode() {
			Decoded::Unrecognized(_) => write!(f, "0x{:02x}", self.0),
			d => write!(f, "0x{:02x} ({})", self.0, d),
		}
	}
}

impl fmt::Debug for Status {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "Status({})", self)
	}
}

/// Diagnostic classification of a status code
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Decoded {
	Start,
	RepeatedStart,
	ArbitrationLostOrNak,
	// master transmitter
	AddressWriteAck,
	AddressWriteNak,
	DataSentAck,
	DataSentNak,
	// master receiver
	AddressReadAck,
	AddressReadNak,
	DataReceivedAck,
	DataReceivedNak,
	Unrecognized(u8),
}

impl Decoded {
	/// label for everything but `Unrecognized`
	pub fn label(&self) -> Option<&'static str> {
		Some(match self {
			Decoded::Start => "START",
			Decoded::RepeatedStart => "RESTART",
			Decoded::ArbitrationLostOrNak => "NOARB/NAK",
			Decoded::AddressWriteAck => "MT SLA+W, ACK",
			Decoded::AddressWriteNak => "MT SLA+W, NAK",
			Decoded::DataSentAck => "MT DATA+W, ACK",
			Decoded::DataSentNak => "MT DATA+W, NAK",
			Decoded::AddressReadAck => "MR SLA+R, ACK",
			Decoded::AddressReadNak => "MR SLA+R, NAK",
			Decoded::DataReceivedAck => "MR DATA+R, ACK",
			Decoded::DataReceivedNak => "MR DATA+R, NAK",
			Decoded::Unrecognized(_) => return None,
		})
	}
}

impl fmt::Display for Decoded {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		if let Decoded::Unrecognized(code) = self {
			return write!(f, "N/A {:02X}", code);
		}
		f.write_str(self.label().unwrap_or("?"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const DOCUMENTED: [(u8, &str); 11] = [
		(0x08, "START"),
		(0x10, "RESTART"),
		(0x18, "MT SLA+W, ACK"),
		(0x20, "MT SLA+W, NAK"),
		(0x28, "MT DATA+W, ACK"),
		(0x30, "MT DATA+W, NAK"),
		(0x38, "NOARB/NAK"),
		(0x40, "MR SLA+R, ACK"),
		(0x48, "MR SLA+R, NAK"),
		(0x50, "MR DATA+R, ACK"),
		(0x58, "MR DATA+R, NAK"),
	];

	#[test]
	fn documented_codes_have_distinct_labels() {
		let mut labels = Vec::new();
		for &(code, label) in DOCUMENTED.iter() {
			let decoded = Status(code).decode();
			assert_eq!(decoded.label(), Some(label), "code 0x{:02x}", code);
			assert_eq!(decoded.to_string(), label);
			labels.push(label);
		}
		labels.sort();
		labels.dedup();
		assert_eq!(labels.len(), DOCUMENTED.len());
	}

	#[test]
	fn everything_else_is_unrecognized() {
		for code in 0..=0xffu8 {
			if DOCUMENTED.iter().any(|&(c, _)| c == code) {
				continue;
			}
			let decoded = Status(code).decode();
			assert_eq!(decoded, Decoded::Unrecognized(code));
			assert_eq!(decoded.label(), None);
			assert_eq!(decoded.to_string(), format!("N/A {:02X}", code));
		}
	}

	#[test]
	fn register_masks_prescaler_bits() {
		assert_eq!(Status::from_register(0x1b), Status::SLA_W_ACK);
		assert_eq!(Status::from_register(0xf9), Status::IDLE);
	}

	#[test]
	fn display_includes_raw_code() {
		assert_eq!(Status::SLA_R_NAK.to_string(), "0x48 (MR SLA+R, NAK)");
		assert_eq!(Status(0x00).to_string(), "0x00");
	}
}
