use fintake_core::error::FintakeError;
use serde::Serialize;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), FintakeError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
