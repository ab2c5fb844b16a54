//! axis-selftest: self-checking test for an AXI-Stream FIFO coprocessor

use std::env;
use std::path::Path;
use std::process;

use axis_selftest::config::HarnessConfig;
use axis_selftest::device::{DeviceConfig, MmioFifo, SimFifo};
use axis_selftest::harness::{HarnessError, RunReport, StreamHarness, VectorSet};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();

    let mut use_mmio = false;
    let mut device_arg: Option<u16> = None;
    let mut config_path: Option<String> = None;

    let mut iter = args[1..].iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--mmio" => use_mmio = true,
            "--sim" => use_mmio = false,
            "--device" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--device needs an id"))?;
                device_arg = Some(value.parse()?);
            }
            "--config" => {
                config_path = Some(
                    iter.next()
                        .ok_or_else(|| anyhow::anyhow!("--config needs a path"))?
                        .clone(),
                );
            }
            "--list-devices" => {
                list_devices();
                return Ok(());
            }
            "--sample-config" => {
                print_sample_config();
                return Ok(());
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage(&args[0]);
                process::exit(2);
            }
        }
    }

    let config = match config_path {
        Some(path) => HarnessConfig::load_from_file(Path::new(&path))
            .ok_or_else(|| anyhow::anyhow!("could not load config from {}", path))?,
        None => HarnessConfig::get().clone(),
    };

    let device_id = device_arg.unwrap_or_else(|| config.device_id());
    let device_config = DeviceConfig::lookup(device_id)
        .unwrap_or_else(|| fail(HarnessError::Config { device_id }));

    println!(
        "Running self-test against device {} ({})",
        device_id,
        if use_mmio { "mmio" } else { "simulator" }
    );

    let vectors = VectorSet::canonical();
    let poll_iterations = config.poll_iterations();

    let outcome = if use_mmio {
        // Requires the register block to be mapped at the configured base
        // address; only meaningful on the target platform.
        let device = unsafe { MmioFifo::initialize(device_config) }
            .unwrap_or_else(|e| fail(HarnessError::Init(e)));
        StreamHarness::new(device, vectors)
            .with_poll_budget(poll_iterations)
            .run()
    } else {
        let device = SimFifo::initialize(device_config)
            .unwrap_or_else(|e| fail(HarnessError::Init(e)));
        StreamHarness::new(device, vectors)
            .with_poll_budget(poll_iterations)
            .run()
    };

    let report = outcome.unwrap_or_else(|e| fail(e));
    finish(report)
}

/// Print the verdict and translate it into the process exit code.
fn finish(report: RunReport) -> anyhow::Result<()> {
    println!("{}", report.summary());
    if report.passed() {
        println!("Test Success");
        Ok(())
    } else {
        println!("Test Failed");
        process::exit(1);
    }
}

/// Report a fatal harness error and exit non-zero.
fn fail(error: HarnessError) -> ! {
    log::error!("{}", error);
    println!("Test Failed: {}", error);
    process::exit(1);
}

fn list_devices() {
    println!("Known devices:");
    for config in DeviceConfig::all() {
        println!(
            "  id {:3}  base 0x{:08X}  tx depth {:4}  rx depth {:4}",
            config.device_id, config.base_address, config.tx_fifo_depth, config.rx_fifo_depth
        );
    }
}

fn print_sample_config() {
    if let Some(path) = HarnessConfig::user_config_path() {
        println!("# Default user config location: {}", path.display());
    }
    print!("{}", HarnessConfig::sample_config());
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --sim             Run against the in-memory simulator (default)");
    eprintln!("  --mmio            Run against the mapped register block");
    eprintln!("  --device <id>     FIFO device id (default from config, then 0)");
    eprintln!("  --config <path>   Load configuration from a specific file");
    eprintln!("  --list-devices    Print the compiled-in device table");
    eprintln!("  --sample-config   Print an annotated sample config file");
}
