//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `mars_core` linkage and print version info.
//! - Optionally open a database and print a deterministic summary of it.
//!
//! Usage: `mars_cli [DB_PATH]`. `MARS_LOG_DIR` (absolute) enables file logs,
//! `MARS_LOG_LEVEL` overrides the build-mode default level.

use mars_core::db::open_db;
use mars_core::{
    CustomerListQuery, CustomerRepository, DeviceInFieldListQuery, DeviceInFieldRepository,
    DeviceListQuery, DeviceRepository, OrderListQuery, OrderRepository, SqliteCustomerRepository,
    SqliteDeviceInFieldRepository, SqliteDeviceRepository, SqliteOrderRepository,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(err) = init_logging_from_env() {
        eprintln!("logging disabled: {err}");
    }

    println!("mars_core ping={}", mars_core::ping());
    println!("mars_core version={}", mars_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match summarize(&db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_summary module=cli status=error");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging_from_env() -> Result<(), String> {
    let Ok(log_dir) = std::env::var("MARS_LOG_DIR") else {
        return Ok(());
    };
    let level = std::env::var("MARS_LOG_LEVEL")
        .unwrap_or_else(|_| mars_core::default_log_level().to_string());
    mars_core::init_logging(&level, &log_dir)
}

fn summarize(db_path: &str) -> Result<(), Box<dyn Error>> {
    let conn = open_db(db_path)?;

    let devices = SqliteDeviceRepository::try_new(&conn)?.list_devices(&DeviceListQuery::default())?;
    let customers =
        SqliteCustomerRepository::try_new(&conn)?.list_customers(&CustomerListQuery::default())?;
    let field_repo = SqliteDeviceInFieldRepository::try_new(&conn)?;
    let units = field_repo.list_devices_in_field(&DeviceInFieldListQuery::default())?;
    let orders = SqliteOrderRepository::try_new(&conn)?.list_orders(&OrderListQuery::default())?;

    println!("devices={}", devices.len());
    println!("customers={}", customers.len());
    println!("devices_in_field={}", units.len());
    println!("orders={}", orders.len());

    for order in &orders {
        let unit_label = field_repo
            .device_in_field_label(order.device)?
            .unwrap_or_else(|| "?".to_string());
        println!("{} unit={}", order.label(), unit_label);
    }

    Ok(())
}
