use embedded_storage::{ReadStorage, Storage};
use esp_storage::FlashStorage;

use crate::firmware::{
    config::{STATION_STORE_MAGIC, STATION_STORE_RECORD_LEN, STATION_STORE_VERSION},
    types::{StationCredentials, WIFI_PASSWORD_MAX, WIFI_SSID_MAX},
};

const MAGIC_END: usize = 4;
const VERSION_AT: usize = MAGIC_END;
const SSID_LEN_AT: usize = VERSION_AT + 1;
const SSID_START: usize = SSID_LEN_AT + 1;
const PASSWORD_LEN_AT: usize = SSID_START + WIFI_SSID_MAX;
const PASSWORD_START: usize = PASSWORD_LEN_AT + 1;
const CHECKSUM_AT: usize = STATION_STORE_RECORD_LEN - 1;

pub(crate) fn record_bytes(credentials: StationCredentials) -> [u8; STATION_STORE_RECORD_LEN] {
    let mut record = [0xFFu8; STATION_STORE_RECORD_LEN];
    record[..MAGIC_END].copy_from_slice(&STATION_STORE_MAGIC.to_le_bytes());
    record[VERSION_AT] = STATION_STORE_VERSION;
    record[SSID_LEN_AT] = credentials.ssid_len;
    record[SSID_START..SSID_START + WIFI_SSID_MAX].copy_from_slice(&credentials.ssid);
    record[PASSWORD_LEN_AT] = credentials.password_len;
    record[PASSWORD_START..PASSWORD_START + WIFI_PASSWORD_MAX]
        .copy_from_slice(&credentials.password);
    record[CHECKSUM_AT] = checksum8(&record[..CHECKSUM_AT]);
    record
}

/// Decodes a persisted record. Erased flash, a foreign magic, a version we do
/// not speak, out-of-range lengths, and checksum damage all read as `None`.
pub(crate) fn record_from_bytes(
    record: &[u8; STATION_STORE_RECORD_LEN],
) -> Option<StationCredentials> {
    if record.iter().all(|&byte| byte == 0xFF) {
        return None;
    }
    if u32::from_le_bytes([record[0], record[1], record[2], record[3]]) != STATION_STORE_MAGIC {
        return None;
    }
    if record[VERSION_AT] != STATION_STORE_VERSION {
        return None;
    }
    if checksum8(&record[..CHECKSUM_AT]) != record[CHECKSUM_AT] {
        return None;
    }
    let ssid_len = record[SSID_LEN_AT] as usize;
    let password_len = record[PASSWORD_LEN_AT] as usize;
    if ssid_len == 0 || ssid_len > WIFI_SSID_MAX || password_len > WIFI_PASSWORD_MAX {
        return None;
    }
    StationCredentials::from_parts(
        &record[SSID_START..SSID_START + ssid_len],
        &record[PASSWORD_START..PASSWORD_START + password_len],
    )
    .ok()
}

/// Station credentials persisted in the last flash sector, below the app
/// partition.
pub(crate) struct StationConfigStore<'d> {
    flash: FlashStorage<'d>,
    offset: u32,
}

impl<'d> StationConfigStore<'d> {
    pub(crate) fn new(flash_peripheral: esp_hal::peripherals::FLASH<'d>) -> Self {
        let flash = FlashStorage::new(flash_peripheral).multicore_auto_park();
        let capacity = flash.capacity() as u32;
        let offset = capacity.saturating_sub(FlashStorage::SECTOR_SIZE);
        Self { flash, offset }
    }

    pub(crate) fn capacity(&self) -> u32 {
        self.flash.capacity() as u32
    }

    pub(crate) fn record_offset(&self) -> u32 {
        self.offset
    }

    pub(crate) fn load(&mut self) -> Option<StationCredentials> {
        let mut record = [0u8; STATION_STORE_RECORD_LEN];
        self.flash.read(self.offset, &mut record).ok()?;
        record_from_bytes(&record)
    }

    pub(crate) fn save(&mut self, credentials: StationCredentials) {
        let record = record_bytes(credentials);
        let _ = self.flash.write(self.offset, &record);
    }
}

fn checksum8(bytes: &[u8]) -> u8 {
    let mut acc = 0x5Au8;
    for &byte in bytes {
        acc ^= byte.rotate_left(1);
    }
    acc
}
