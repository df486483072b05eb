//! On-target checks for the runtime plumbing the firmware tasks lean on:
//! periodic timers must advance under esp-rtos (the link monitor's cadence)
//! and channel delivery must preserve order (the peer-to-serial path).

#![no_std]
#![no_main]

#[cfg(test)]
#[embedded_test::tests(executor = esp_rtos::embassy::Executor::new())]
mod tests {
    use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
    use embassy_time::{Duration, Instant, Ticker};

    #[init]
    fn init() {
        let peripherals = esp_hal::init(esp_hal::Config::default());
        let timg0 = esp_hal::timer::timg::TimerGroup::new(peripherals.TIMG0);
        esp_rtos::start(timg0.timer0);
    }

    #[test]
    async fn periodic_ticker_advances_monotonic_time() {
        let started = Instant::now();
        let mut ticker = Ticker::every(Duration::from_millis(20));
        ticker.next().await;
        ticker.next().await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    async fn channel_delivers_in_order() {
        static SMOKE: Channel<CriticalSectionRawMutex, u8, 2> = Channel::new();
        SMOKE.try_send(1).unwrap();
        SMOKE.try_send(2).unwrap();
        assert_eq!(SMOKE.receive().await, 1);
        assert_eq!(SMOKE.receive().await, 2);
    }
}
