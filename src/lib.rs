#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

pub type AResult<T> = Result<T, failure::Error>;

mod error;

pub mod eeprom;
pub mod sim;
pub mod twi;

pub use self::error::{
	Error,
	Phase,
};

pub use self::eeprom::Eeprom;

pub use self::twi::{
	BusSpeed,
	Direction,
	Status,
	Twi,
};
