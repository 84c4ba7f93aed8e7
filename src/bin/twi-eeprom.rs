#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate avr_twi_eeprom;
use avr_twi_eeprom::*;

use std::process::exit;

use avr_twi_eeprom::eeprom::consts::{
	CAPACITY,
	DEVICE_ADDRESS,
	PAGE_SIZE,
};
use avr_twi_eeprom::sim::{
	At24c,
	SimulatedTwi,
};

const DEFAULT_CPU_HZ: u32 = 16_000_000;
const DEFAULT_BYTEWISE_TEXT: &str = "Daniel";
// 7 full pages + 6 bytes
const DEFAULT_SEQUENTIAL_TEXT: &str = "The quick brown fox jumps over the lazy dog, twice per page!!.";

fn get_param_or<T>(matches: &clap::ArgMatches, name: &str, default: T) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => return Ok(default),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid paramater {}: {}", name, e);
		e.context(msg).into()
	})
}

fn parse_hex_u8(name: &str, value: &str) -> AResult<u8> {
	let digits = value.trim_start_matches("0x").trim_start_matches("0X");
	u8::from_str_radix(digits, 16).map_err(|e| format_err!("invalid {} {:?}: {}", name, value, e))
}

fn get_address(matches: &clap::ArgMatches, default: u8) -> AResult<u8> {
	match matches.value_of("address") {
		Some(a) => parse_hex_u8("address", a),
		None => Ok(default),
	}
}

fn open_eeprom(matches: &clap::ArgMatches) -> AResult<Eeprom<SimulatedTwi>> {
	let cpu_hz: u32 = get_param_or(matches, "cpu_hz", DEFAULT_CPU_HZ)?;
	let scl_hz: u32 = get_param_or(matches, "scl_hz", BusSpeed::STANDARD_SCL_HZ)?;
	let write_cycle: usize = get_param_or(matches, "write_cycle", At24c::DEFAULT_WRITE_CYCLE_POLLS)?;

	let device = At24c::new(DEVICE_ADDRESS).with_write_cycle_polls(write_cycle);
	let mut twi = Twi::new(SimulatedTwi::new(Some(device)));
	let setting = twi.init(BusSpeed { cpu_hz, scl_hz });
	info!(
		"TWI: TWBR=0x{:02x}, prescaler {} -> SCL {} Hz",
		setting.bit_rate,
		setting.prescaler(),
		setting.scl_hz(cpu_hz),
	);

	Ok(Eeprom::new(twi))
}

fn write_cycle_summary(ee: &Eeprom<SimulatedTwi>) {
	if let Some(device) = ee.twi().registers().device() {
		let cycles = device.write_cycles();
		let pages = cycles.iter().filter(|c| c.length == PAGE_SIZE).count();
		info!("{} write cycles: {} page writes, {} byte writes", cycles.len(), pages, cycles.len() - pages);
	}
}

fn decode_status(sub_m: &clap::ArgMatches) -> AResult<()> {
	for code in sub_m.values_of("CODE").into_iter().flatten() {
		let code = parse_hex_u8("status code", code)?;
		println!("0x{:02x}: {}", code, Status(code).decode());
	}
	Ok(())
}

fn bytewise(ee: &mut Eeprom<SimulatedTwi>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let address = get_address(sub_m, 0x10)?;
	let data = sub_m.value_of("TEXT").unwrap_or(DEFAULT_BYTEWISE_TEXT).as_bytes();
	ensure!(address as usize + data.len() <= CAPACITY, "{} bytes at 0x{:02x} don't fit into the EEPROM", data.len(), address);

	for (i, &b) in data.iter().enumerate() {
		ee.write_byte(address + i as u8, b)?;
	}
	let mut buffer = vec![0u8; data.len()];
	for (i, t) in buffer.iter_mut().enumerate() {
		*t = ee.read_byte(address + i as u8)?;
	}

	println!("{}", String::from_utf8_lossy(&buffer));
	write_cycle_summary(ee);
	ensure!(&buffer[..] == data, "read back {:?}, expected {:?}", buffer, data);
	Ok(())
}

fn sequential(ee: &mut Eeprom<SimulatedTwi>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let address = get_address(sub_m, 0x10)?;
	let data = sub_m.value_of("TEXT").unwrap_or(DEFAULT_SEQUENTIAL_TEXT).as_bytes();

	ee.sequential_write(address, data)?;
	let mut buffer = vec![0u8; data.len()];
	ee.sequential_read(address, &mut buffer)?;

	println!("{}", String::from_utf8_lossy(&buffer));
	write_cycle_summary(ee);
	ensure!(&buffer[..] == data, "read back {:?}, expected {:?}", buffer, data);
	Ok(())
}

fn dump(ee: &mut Eeprom<SimulatedTwi>, sub_m: &clap::ArgMatches) -> AResult<()> {
	if let Some(text) = sub_m.value_of("write") {
		let address = get_address(sub_m, 0x00)?;
		ee.sequential_write(address, text.as_bytes())?;
		if let Some(offset) = ee.verify(address, text.as_bytes())? {
			bail!("Verify failed at 0x{:02x}", address as usize + offset);
		}
	}

	let mut image = vec![0u8; CAPACITY];
	ee.sequential_read(0, &mut image)?;
	for (i, b) in image.iter().enumerate() {
		if 0 == i % 16 {
			print!("{:04x} ", i);
		} else if 0 == i % 8 {
			print!(" ");
		}
		print!(" {:02x}", b);
		if 15 == i % 16 {
			println!();
		}
	}
	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg cpu_hz: --cpu_hz +takes_value "CPU clock in Hz (default 16000000)")
		(@arg scl_hz: --scl_hz +takes_value "bus clock in Hz (default 100000)")
		(@arg write_cycle: --write_cycle +takes_value "address polls the simulated EEPROM stays busy after a write")
		(@subcommand status =>
			(about: "decode TWI status codes")
			(@arg CODE: +required +multiple "status byte (hex)")
		)
		(@subcommand bytewise =>
			(about: "write text byte by byte, read it back byte by byte")
			(@arg address: -a --address +takes_value "start address (hex, default 0x10)")
			(@arg TEXT: "text to write (default \"Daniel\")")
		)
		(@subcommand sequential =>
			(about: "write text with page writes, read it back in one sequential read")
			(@arg address: -a --address +takes_value "start address (hex, default 0x10)")
			(@arg TEXT: "text to write (default: 62 bytes)")
		)
		(@subcommand dump =>
			(about: "hex dump of the EEPROM contents")
			(@arg address: -a --address +takes_value "address for --write (hex, default 0x00)")
			(@arg write: -w --write +takes_value "text to write before dumping")
		)
	).get_matches();

	if let ("status", Some(sub_m)) = matches.subcommand() {
		return decode_status(sub_m);
	}

	let mut ee = open_eeprom(&matches)?;
	match matches.subcommand() {
		("bytewise", Some(sub_m)) => {
			bytewise(&mut ee, sub_m)
		},
		("sequential", Some(sub_m)) => {
			sequential(&mut ee, sub_m)
		},
		("dump", Some(sub_m)) => {
			dump(&mut ee, sub_m)
		},
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
