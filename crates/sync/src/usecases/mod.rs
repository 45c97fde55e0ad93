pub mod u501_sync_to_ozon;
pub mod u502_sync_to_yandex;
