/// Target bus clock for a given CPU clock
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BusSpeed {
	pub cpu_hz: u32,
	pub scl_hz: u32,
}

impl BusSpeed {
	pub const STANDARD_SCL_HZ: u32 = 100_000;
	pub const FAST_SCL_HZ: u32 = 400_000;

	/// 100 kHz
	pub fn standard(cpu_hz: u32) -> Self {
		BusSpeed { cpu_hz, scl_hz: Self::STANDARD_SCL_HZ }
	}

	/// 400 kHz
	pub fn fast(cpu_hz: u32) -> Self {
		BusSpeed { cpu_hz, scl_hz: Self::FAST_SCL_HZ }
	}

	// SCL = CPU / (16 + 2 * TWBR * prescaler); picks the smallest prescaler
	// that gets TWBR into 8 bits.
	pub fn clock_setting(&self) -> ClockSetting {
		let scl_hz = self.scl_hz.max(1);
		let ratio = self.cpu_hz / scl_hz;
		if ratio < 16 {
			warn!("SCL {} Hz unreachable with CPU clock {} Hz, using fastest setting", self.scl_hz, self.cpu_hz);
			return ClockSetting { prescaler_bits: 0, bit_rate: 0 };
		}
		for prescaler_bits in 0..4u8 {
			let prescaler = ClockSetting::prescaler_value(prescaler_bits);
			let bit_rate = (ratio - 16) / (2 * prescaler);
			if bit_rate <= 0xff {
				return ClockSetting { prescaler_bits, bit_rate: bit_rate as u8 };
			}
		}
		warn!("SCL {} Hz unreachable with CPU clock {} Hz, using slowest setting", self.scl_hz, self.cpu_hz);
		ClockSetting { prescaler_bits: 3, bit_rate: 0xff }
	}
}

/// Register values for TWSR prescaler bits and TWBR
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ClockSetting {
	pub prescaler_bits: u8,
	pub bit_rate: u8,
}

impl ClockSetting {
	fn prescaler_value(bits: u8) -> u32 {
		match bits & 0x3 {
			0 => 1,
			1 => 4,
			2 => 16,
			3 => 64,
			_ => unreachable!(),
		}
	}

	pub fn prescaler(&self) -> u32 {
		Self::prescaler_value(self.prescaler_bits)
	}

	pub fn scl_hz(&self, cpu_hz: u32) -> u32 {
		cpu_hz / (16 + 2 * self.bit_rate as u32 * self.prescaler())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn standard_speed_at_16mhz() {
		let setting = BusSpeed::standard(16_000_000).clock_setting();
		assert_eq!(setting, ClockSetting { prescaler_bits: 0, bit_rate: 0x48 });
		assert_eq!(setting.scl_hz(16_000_000), 100_000);
	}

	#[test]
	fn fast_speed_at_16mhz() {
		let setting = BusSpeed::fast(16_000_000).clock_setting();
		assert_eq!(setting.bit_rate, 12);
		assert_eq!(setting.scl_hz(16_000_000), 400_000);
	}

	#[test]
	fn slow_bus_needs_prescaler() {
		// 16 MHz / 10 kHz = 1600 -> (1600 - 16) / 2 = 792 doesn't fit, /8 = 198 does
		let setting = BusSpeed { cpu_hz: 16_000_000, scl_hz: 10_000 }.clock_setting();
		assert_eq!(setting, ClockSetting { prescaler_bits: 1, bit_rate: 198 });
		assert_eq!(setting.prescaler(), 4);
	}

	#[test]
	fn unreachable_speeds_clamp() {
		let too_fast = BusSpeed { cpu_hz: 1_000_000, scl_hz: 400_000 }.clock_setting();
		assert_eq!(too_fast, ClockSetting { prescaler_bits: 0, bit_rate: 0 });
		let too_slow = BusSpeed { cpu_hz: 16_000_000, scl_hz: 100 }.clock_setting();
		assert_eq!(too_slow, ClockSetting { prescaler_bits: 3, bit_rate: 0xff });
	}
}
