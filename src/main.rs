//! mmio-console - Main entry point
//!
//! On the ESP-IDF target:
//! 1. Initialize logging and UART1
//! 2. Start the RX thread feeding the receive queue
//! 3. Run the console loop against physical memory
//!
//! On the host the same console runs over stdin/stdout against a simulated
//! register file, which is handy for scripting the protocol.

use mmio_console::{ByteQueue, Console, Transport};

/// Receive queue shared by the RX side and the console loop.
static RX_QUEUE: ByteQueue = ByteQueue::new();

#[cfg(target_os = "espidf")]
mod platform {
    use super::*;

    use esp_idf_svc::hal::delay::{FreeRtos, BLOCK};
    use esp_idf_svc::hal::gpio::AnyIOPin;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::uart::{config::Config, UartDriver, UartTxDriver};
    use esp_idf_svc::hal::units::Hertz;
    use esp_idf_svc::sys::EspError;
    use mmio_console::VolatileMemory;

    /// UART configuration for the console.
    struct UartConsoleConfig {
        baud_rate: u32,
    }

    impl Default for UartConsoleConfig {
        fn default() -> Self {
            Self { baud_rate: 115200 }
        }
    }

    /// Console replies go out on UART1 TX.
    struct UartTransport<'d>(UartTxDriver<'d>);

    impl Transport for UartTransport<'_> {
        fn send(&mut self, mut bytes: &[u8]) {
            while !bytes.is_empty() {
                match self.0.write(bytes) {
                    Ok(n) => bytes = &bytes[n..],
                    Err(e) => {
                        log::warn!("uart tx failed: {}", e);
                        return;
                    }
                }
            }
        }
    }

    pub fn run() -> Result<(), EspError> {
        // Initialize ESP-IDF
        esp_idf_svc::sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();

        let uart_config = UartConsoleConfig::default();
        let peripherals = Peripherals::take()?;
        let config = Config::default().baudrate(Hertz(uart_config.baud_rate));
        let uart = UartDriver::new(
            peripherals.uart1,
            peripherals.pins.gpio17,
            peripherals.pins.gpio18,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &config,
        )?;
        let (tx, rx) = uart.into_split();

        std::thread::spawn(move || {
            let mut buf = [0u8; 64];
            loop {
                match rx.read(&mut buf, BLOCK) {
                    // Excess bytes are dropped and counted by the queue
                    Ok(n) => {
                        RX_QUEUE.receive(&buf[..n]);
                    }
                    Err(e) => log::warn!("uart rx failed: {}", e),
                }
            }
        });

        // SAFETY: The console exists to give the operator raw register access.
        let mem = unsafe { VolatileMemory::new() };
        let mut console = Console::new(mem, UartTransport(tx));
        console.run(&RX_QUEUE, || FreeRtos::delay_ms(1))
    }
}

#[cfg(not(target_os = "espidf"))]
mod platform {
    use super::*;

    use std::io::{self, Read, Write};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use mmio_console::RegisterFile;

    /// Replies go to stdout.
    struct StdoutTransport(io::Stdout);

    impl Transport for StdoutTransport {
        fn send(&mut self, bytes: &[u8]) {
            let mut out = self.0.lock();
            if let Err(e) = out.write_all(bytes).and_then(|_| out.flush()) {
                log::warn!("stdout write failed: {}", e);
            }
        }
    }

    pub fn run() -> Result<(), io::Error> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let input_done = Arc::new(AtomicBool::new(false));
        let reader = {
            let input_done = Arc::clone(&input_done);
            thread::spawn(move || {
                let mut stdin = io::stdin().lock();
                let mut buf = [0u8; 64];
                loop {
                    let n = match stdin.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => n,
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            log::error!("stdin read failed: {}", e);
                            break;
                        }
                    };

                    // A pipe can be paced, so wait for room instead of dropping
                    let mut pending = &buf[..n];
                    while !pending.is_empty() {
                        pending = &pending[RX_QUEUE.receive(pending)..];
                        if !pending.is_empty() {
                            thread::sleep(Duration::from_millis(1));
                        }
                    }
                }
                input_done.store(true, Ordering::Release);
            })
        };

        let mut console = Console::new(RegisterFile::<256>::new(), StdoutTransport(io::stdout()));
        console.log_banner();

        loop {
            if console.poll(&RX_QUEUE) == 0 {
                if input_done.load(Ordering::Acquire) && RX_QUEUE.is_empty() {
                    break;
                }
                thread::sleep(Duration::from_millis(1));
            }
        }

        if reader.join().is_err() {
            log::error!("stdin reader panicked");
        }
        Ok(())
    }
}

fn main() {
    if let Err(e) = platform::run() {
        log::error!("console stopped: {}", e);
        std::process::exit(1);
    }
}
