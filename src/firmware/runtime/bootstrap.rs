use esp_hal::{
    timer::timg::TimerGroup,
    uart::{Config as UartConfig, Uart},
};
use esp_println::println;

use super::super::{
    config::{STATION_APPLY_POLICY, UART_BAUD, WIFI_HEAP_BYTES},
    net::{self, NetRuntime, StationConfigStore},
    types::LinkPolicy,
};
use super::serial_task;

pub fn run() -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default());
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // The Wi-Fi stack needs an internal-capability heap; the application
    // itself stays static.
    esp_alloc::heap_allocator!(size: WIFI_HEAP_BYTES);

    let uart_cfg = UartConfig::default().with_baudrate(UART_BAUD);
    let uart = Uart::new(peripherals.UART0, uart_cfg)
        .expect("failed to init UART0")
        .with_rx(peripherals.GPIO3)
        .with_tx(peripherals.GPIO1)
        .into_async();

    println!("boot: udplink {}", env!("CARGO_PKG_VERSION"));

    let mut store = StationConfigStore::new(peripherals.FLASH);
    println!(
        "boot: flash capacity={} station_record_offset={:#x}",
        store.capacity(),
        store.record_offset()
    );

    let credentials = match net::configured_credentials() {
        Some(desired) => {
            let wrote = net::apply_station_credentials(&mut store, desired);
            println!(
                "boot: station credentials {} (policy={:?})",
                if wrote { "persisted" } else { "unchanged" },
                STATION_APPLY_POLICY
            );
            Some(desired)
        }
        None => {
            let stored = store.load();
            if stored.is_none() {
                println!("boot: no station credentials available");
            }
            stored
        }
    };

    let policy = LinkPolicy::defaults().sanitized();

    let NetRuntime {
        controller,
        runner,
        stack,
    } = match net::setup(peripherals.WIFI) {
        Ok(runtime) => runtime,
        Err(message) => {
            println!("{}", message);
            halt_forever();
        }
    };

    let mut executor = esp_rtos::embassy::Executor::new();
    let executor = unsafe { make_static(&mut executor) };
    executor.run(move |spawner| {
        spawner.must_spawn(net::station_task(controller, credentials, policy));
        spawner.must_spawn(net::net_task(runner));
        spawner.must_spawn(net::link_monitor_task(stack, policy));
        spawner.must_spawn(net::peer_channel_task(stack));
        spawner.must_spawn(serial_task::serial_bridge_task(uart));
    });
}

fn halt_forever() -> ! {
    loop {
        core::hint::spin_loop();
    }
}

unsafe fn make_static<T>(value: &mut T) -> &'static mut T {
    unsafe { core::mem::transmute(value) }
}
